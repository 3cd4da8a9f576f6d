mod common;

use std::fs;
use std::io::Cursor;

use common::{frame, jsonl, pointing};
use ghost_hand::config::Config;
use ghost_hand::data::SessionRecorder;
use ghost_hand::input::{DeviceCommand, RecordingSink};
use ghost_hand::mediapipe_bridge::{LandmarkSource, ReplaySource, ScriptedSource};
use ghost_hand::{GestureAction, GestureState, GhostHandError, Session};
use tempfile::tempdir;

const DT: f64 = 1.0 / 30.0;

fn click_script() -> Vec<ghost_hand::mediapipe_bridge::LandmarkFrame> {
    let mut frames = Vec::new();
    for (i, ratio) in [0.6, 0.1, 0.1, 0.3, 0.3].into_iter().enumerate() {
        frames.push(frame(i as f64 * DT, Some(pointing(0.5 + 0.01 * i as f64, ratio))));
    }
    frames.push(frame(5.0 * DT, None));
    frames
}

#[test]
fn replay_file_drives_session_and_exports_log() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("recording.jsonl");
    fs::write(&input, jsonl(&click_script())).unwrap();

    let mut session = Session::default();
    session.request_wake();
    let mut source = ReplaySource::open(&input).unwrap();
    let mut sink = RecordingSink::new();
    let reports = session.run(&mut source, &mut sink).unwrap();

    assert_eq!(reports.len(), 6);
    assert_eq!(reports[3].action, GestureAction::Click);
    assert_eq!(reports[3].state, GestureState::ClickPending);
    assert_eq!(sink.clicks(), 1);
    assert!(sink
        .commands
        .iter()
        .any(|c| matches!(c, DeviceCommand::MoveCursor { dx, .. } if *dx > 0.0)));
    assert_eq!(reports[5].state, GestureState::Tracking);
    assert!(reports[5].commands.is_empty());

    let mut recorder = SessionRecorder::new(dir.path(), Some("test_session".to_string()));
    for report in &reports {
        recorder.add_tick(report);
    }
    let csv_path = recorder.export_csv().unwrap();
    let summary_path = recorder.export_summary().unwrap();

    let csv = fs::read_to_string(csv_path).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("frame,timestamp,hand_present,state,action"));
    assert_eq!(lines.count(), 6);
    assert!(csv.contains("CLICK_PENDING,CLICK"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(summary_path).unwrap()).unwrap();
    assert_eq!(summary["clicks"], 1);
    assert_eq!(summary["ticks"], 6);
}

#[test]
fn scripted_and_replayed_sources_agree() {
    let frames = click_script();
    let mut scripted = ScriptedSource::new(frames.clone());
    let mut replayed = ReplaySource::new(Cursor::new(jsonl(&frames)));

    loop {
        let (a, b) = match (scripted.next_frame().unwrap(), replayed.next_frame().unwrap()) {
            (Some(a), Some(b)) => (a, b),
            (None, None) => break,
            other => panic!("sources diverged: {:?}", other),
        };
        assert!((a.timestamp - b.timestamp).abs() < 1e-12);
        assert_eq!(a.hand.is_some(), b.hand.is_some());
        if let (Some(ha), Some(hb)) = (a.hand, b.hand) {
            assert_eq!(ha.handedness, hb.handedness);
            for (pa, pb) in ha.landmarks.iter().zip(hb.landmarks.iter()) {
                assert!((pa - pb).norm() < 1e-12);
            }
        }
    }
}

#[test]
fn malformed_recording_is_an_error() {
    let mut source = ReplaySource::new(Cursor::new("{\"timestamp\": 0.0, \"landmarks\": [[0.5]]}\n"));
    let mut session = Session::default();
    let mut sink = RecordingSink::new();
    let err = session.run(&mut source, &mut sink).unwrap_err();
    assert!(matches!(err, GhostHandError::Replay { line: 1, .. }));
}

#[test]
fn config_round_trips_and_drives_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::load(&path);
    config.add_profile("Laptop").unwrap();
    config.current_mut().click_threshold = 0.5;
    config.current_mut().invert_scroll = true;
    config.save(&path).unwrap();

    let loaded = Config::load(&path);
    assert_eq!(loaded, config);
    assert_eq!(loaded.current_profile, "Laptop");

    let session = Session::from_profile(loaded.current());
    assert_eq!(session.engine().config().click_threshold, 0.5);
    assert!(session.settings().invert_scroll);
}

#[test]
fn corrupt_config_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();
    assert_eq!(Config::load(&path), Config::default());

    fs::write(&path, r#"{"profiles": {"Default": {"click_threshold": 4.0}}}"#).unwrap();
    assert_eq!(Config::load(&path).current().click_threshold, 0.20);
}
