//! Shared test fixtures for integration tests.
#![allow(dead_code)] // Not every test file uses every fixture

use chrono::{DateTime, TimeZone, Utc};
use clockchoreo::models::{CellAddress, Hand, Keyframe, LoopRange};
use clockchoreo::playback::{Frame, PlaybackSettings, Sequencer};
use clockchoreo::services::{EditorSession, KeyframeStore};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Shorthand for a valid cell address.
pub fn at(slave: usize, clock: usize) -> CellAddress {
    CellAddress::new(slave, clock).unwrap()
}

/// Deterministic timestamp for exports.
pub fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

/// Keyframe commented `KF{index}` whose hour hands all point at `index * 30`°.
pub fn numbered_keyframe(index: usize) -> Keyframe {
    let mut keyframe = Keyframe::new();
    keyframe.set_comment(format!("KF{index}"));
    #[allow(clippy::cast_precision_loss)]
    let angle = index as f64 * 30.0;
    for cell in CellAddress::all() {
        keyframe.clock_mut(cell).set_angle(Hand::Hour, angle);
    }
    keyframe
}

/// Store of `n` numbered keyframes.
pub fn numbered_store(n: usize) -> KeyframeStore {
    KeyframeStore::from_keyframes((0..n).map(numbered_keyframe).collect()).unwrap()
}

/// Session named "wave" with `n` numbered keyframes, first one current.
pub fn numbered_session(n: usize) -> EditorSession {
    let mut session = EditorSession::new("wave");
    for index in 1..n {
        session.append_keyframe();
        session.set_comment(format!("KF{index}"));
        #[allow(clippy::cast_precision_loss)]
        let angle = index as f64 * 30.0;
        session.set_all_angles(angle, 180.0);
    }
    session.select_keyframe(0).unwrap();
    session.set_comment("KF0");
    session.set_all_angles(0.0, 180.0);
    session
}

/// Comments of every keyframe, in order.
pub fn comments(store: &KeyframeStore) -> Vec<String> {
    store.keyframes().iter().map(|k| k.comment.clone()).collect()
}

/// Source index of each of the first `transitions` transitions, using
/// default timing (1000 ms moves, 500 ms pauses).
pub fn visited_sources(keyframes: &[Keyframe], loop_range: &LoopRange, transitions: usize) -> Vec<usize> {
    let settings = PlaybackSettings::default();
    let mut sequencer = Sequencer::new(settings);
    sequencer.toggle(0, keyframes, loop_range).unwrap();

    let mut now = 0;
    let mut sources = Vec::new();
    while sources.len() < transitions {
        let frame: Frame = sequencer.tick(now, keyframes, loop_range).unwrap();
        sources.push(frame.from_index);
        now += u64::from(settings.transition_ms);
        sequencer.tick(now, keyframes, loop_range).unwrap();
        now += u64::from(settings.pause_ms);
    }
    sources
}

/// Snapshot written by an early designer version: numeric ids, no motion
/// parameters, no loop object and a truncated clock grid.
pub fn legacy_snapshot_json() -> &'static str {
    r#"{
  "name": "legacy",
  "version": "1.0",
  "created": "2024-06-01T08:00:00.000Z",
  "keyframes": [
    {
      "id": 1717228800000,
      "comment": "start",
      "clocks": [
        [{"angleH": 0, "angleM": 90, "dirH": "CW", "dirM": "CCW"}, {"angleH": 45, "angleM": 45}, {}],
        [{"angleH": 270, "angleM": 270, "dirH": "CCW", "dirM": "CCW"}]
      ]
    },
    {
      "id": 1717228800001,
      "comment": "end",
      "speed": 800,
      "accel": 300,
      "delayMs": 250,
      "cascadeMode": "diagonal",
      "cascadeDelayMs": 40
    }
  ]
}"#
}

/// Writes `content` to a project file in a fresh temp directory.
pub fn create_temp_project_file(content: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("project.json");
    fs::write(&path, content).unwrap();
    (path, temp_dir)
}
