// src/main.rs
use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ghost_hand::cli::{Cli, Commands, ConfigAction};
use ghost_hand::config::Config;
use ghost_hand::data::SessionRecorder;
use ghost_hand::input::LogSink;
use ghost_hand::mediapipe_bridge::ReplaySource;
use ghost_hand::Session;

fn main() {
    let cli = Cli::parse_args();

    // Initialize logging (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    match cli.command {
        Commands::Replay { input, export, profile } => {
            let mut config = Config::load(&config_path);
            if let Some(name) = profile {
                config.select(&name)?;
            }
            info!("Using profile '{}'", config.current_profile);

            let mut source = ReplaySource::open(&input)
                .with_context(|| format!("Failed to open recording {}", input.display()))?;
            let mut sink = LogSink::new();
            let mut session = Session::from_profile(config.current());

            let reports = session.run(&mut source, &mut sink)?;

            let mut recorder = match &export {
                Some(dir) => SessionRecorder::new(dir, None),
                None => SessionRecorder::unbound(None),
            };
            for report in &reports {
                recorder.add_tick(report);
            }

            let summary = recorder.summary();
            info!(
                "{} ticks, {} wakes, {} sleeps, {} clicks, {} commands dispatched",
                summary.ticks,
                summary.wakes,
                summary.sleeps,
                summary.clicks,
                sink.dispatched()
            );

            if recorder.session_dir().is_some() {
                let csv = recorder.export_csv()?;
                let json = recorder.export_summary()?;
                info!("Session log: {} / {}", csv.display(), json.display());
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = Config::load(&config_path);
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    bail!("{} already exists (use --force)", config_path.display());
                }
                Config::default()
                    .save(&config_path)
                    .with_context(|| format!("Failed to write {}", config_path.display()))?;
                println!("Wrote {}", config_path.display());
            }
            ConfigAction::Profiles => {
                let config = Config::load(&config_path);
                for name in config.profiles.keys() {
                    let marker = if *name == config.current_profile { "*" } else { " " };
                    println!("{} {}", marker, name);
                }
            }
        },
    }

    Ok(())
}
