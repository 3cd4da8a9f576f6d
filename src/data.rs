// src/data.rs - Session log export (per-tick CSV + JSON summary)
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Local;
use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::app::TickReport;
use crate::error::{GhostHandError, Result};
use crate::gesture::{GestureAction, GestureState};

#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub frame: usize,
    pub timestamp: f64,
    pub hand_present: bool,
    pub state: &'static str,
    pub action: &'static str,
    pub raw_x: Option<f64>,
    pub raw_y: Option<f64>,
    pub smoothed_x: Option<f64>,
    pub smoothed_y: Option<f64>,
    pub commands: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_name: String,
    pub ticks: usize,
    pub hand_present_ratio: f64,
    pub wakes: usize,
    pub sleeps: usize,
    pub clicks: usize,
    pub scroll_ticks: usize,
    pub tracking_ticks: usize,
}

pub struct SessionRecorder {
    /// `None` keeps ticks for the summary only.
    output_dir: Option<PathBuf>,
    session_name: String,
    records: Vec<TickRecord>,
    tracking_ticks: usize,
}

impl SessionRecorder {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        Self::with_output(Some(output_dir.as_ref().to_path_buf()), session_name)
    }

    /// A recorder that can summarise but not export.
    pub fn unbound(session_name: Option<String>) -> Self {
        Self::with_output(None, session_name)
    }

    fn with_output(output_dir: Option<PathBuf>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir,
            session_name,
            records: Vec::new(),
            tracking_ticks: 0,
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn session_dir(&self) -> Option<PathBuf> {
        self.output_dir.as_ref().map(|dir| dir.join(&self.session_name))
    }

    fn require_session_dir(&self) -> Result<PathBuf> {
        self.session_dir().ok_or(GhostHandError::NoOutputDir)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    pub fn add_tick(&mut self, report: &TickReport) {
        if matches!(report.state, GestureState::Tracking | GestureState::ClickPending) {
            self.tracking_ticks += 1;
        }
        self.records.push(TickRecord {
            frame: self.records.len(),
            timestamp: report.timestamp,
            hand_present: report.raw_cursor.is_some(),
            state: report.state.as_str(),
            action: report.action.as_str(),
            raw_x: report.raw_cursor.map(|(x, _)| x),
            raw_y: report.raw_cursor.map(|(_, y)| y),
            smoothed_x: report.cursor.map(|(x, _)| x),
            smoothed_y: report.cursor.map(|(_, y)| y),
            commands: report.commands.len(),
        });
    }

    pub fn summary(&self) -> SessionSummary {
        let ticks = self.records.len();
        let count_action = |a: GestureAction| {
            self.records.iter().filter(|r| r.action == a.as_str()).count()
        };
        let present = self.records.iter().filter(|r| r.hand_present).count();

        SessionSummary {
            session_name: self.session_name.clone(),
            ticks,
            hand_present_ratio: if ticks == 0 { 0.0 } else { present as f64 / ticks as f64 },
            wakes: count_action(GestureAction::Wake),
            sleeps: count_action(GestureAction::Sleep),
            clicks: count_action(GestureAction::Click),
            scroll_ticks: count_action(GestureAction::Scroll),
            tracking_ticks: self.tracking_ticks,
        }
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.require_session_dir()?.join("ticks.csv");

        // Create directory if it doesn't exist
        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&csv_path)?;
        let mut writer = Writer::from_writer(file);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!("Wrote {} ticks to {}", self.records.len(), csv_path.display());
        Ok(csv_path)
    }

    pub fn export_summary(&self) -> Result<PathBuf> {
        let path = self.require_session_dir()?.join("summary.json");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(&self.summary())?)?;
        Ok(path)
    }
}
