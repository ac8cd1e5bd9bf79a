//! Integration tests for controller code generation.

mod fixtures;
use fixtures::*;

use clockchoreo::export::{c_identifier, FirmwareExporter};
use clockchoreo::models::{CascadeMode, Direction, Hand, LoopRange};
use clockchoreo::services::{EditorSession, KeyframeStore};

fn generate(session: &EditorSession) -> String {
    FirmwareExporter::new(session.name(), session.store(), session.loop_range())
        .with_timestamp(fixed_timestamp())
        .generate()
}

#[test]
fn test_header_and_estimates() {
    let session = numbered_session(2);
    let code = generate(&session);

    assert!(code.starts_with("// ClockClock24 Choreographie: wave\n"));
    assert!(code.contains("// Generated: 2025-01-01T12:00:00.000Z"));
    // 11520 / 400 = 28 s for a quarter turn, plus 500 ms margin
    assert!(code.contains("//   KF 1: 28500 ms at 400 steps/s"));
    assert!(code.contains("// Estimated single pass (with delays): 57000 ms"));
}

#[test]
fn test_tables_are_sized_for_the_sequence() {
    let session = numbered_session(3);
    let code = generate(&session);

    assert!(code.contains("const t_keyframe_params wave_params[3] = {"));
    assert!(code.contains("const uint16_t wave_keyframes[3][8][3][2] = {"));
    assert!(code.contains("const uint8_t wave_directions[3][8][3][2] = {"));
    assert!(code.contains("const char* wave_comments[3] = {"));
    assert!(code.contains("const uint8_t wave_cascade_steps[8][8][3] = {"));
    assert!(code.contains("void apply_wave_keyframe(int keyframe_index) {"));
    assert!(code.contains("void play_wave_choreography() {"));
    assert!(code.contains("const int total_keyframes = 3;"));
}

#[test]
fn test_parameters_and_angles() {
    let mut session = numbered_session(2);
    session.select_keyframe(1).unwrap();
    session.set_speed(800);
    session.set_delay_ms(250);
    session.set_cascade_mode(CascadeMode::Snake);
    session.set_cascade_delay_ms(40);
    session.set_angle(at(0, 0), Hand::Minute, 89.6);
    session.set_direction(at(0, 0), Hand::Hour, Direction::Ccw);

    let code = generate(&session);
    assert!(code.contains("    { 400, 150, 0, 0, 100 }, // KF 1: KF0\n"));
    assert!(code.contains("    { 800, 150, 250, 6, 40 } // KF 2: KF1\n"));
    assert!(code.contains("{ {30, 90}, {30, 180}, {30, 180} }, // Slave 1"));
    assert!(code.contains("    // Keyframe 2 -> 1\n"));
    assert!(code.contains("{ {COUNTER_CLOCKWISE, CLOCKWISE}, {CLOCKWISE, CLOCKWISE}"));
}

#[test]
fn test_delays_fit_controller_fields() {
    let mut long_hold = numbered_keyframe(0);
    long_hold.delay_ms = 100_000;
    long_hold.cascade_delay_ms = 70_000;
    let store = KeyframeStore::from_keyframes(vec![long_hold, numbered_keyframe(1)]).unwrap();

    let code = FirmwareExporter::new("wave", &store, &LoopRange::new())
        .with_timestamp(fixed_timestamp())
        .generate();
    assert!(code.contains("    uint16_t delayMs;"));
    assert!(code.contains("    { 400, 150, 65535, 0, 65535 }, // KF 1: KF0\n"));
    // 2 × 28500 ms transitions plus the capped hold
    assert!(code.contains("// Estimated single pass (with delays): 122535 ms"));
}

#[test]
fn test_loop_constants() {
    let mut session = numbered_session(4);
    let unset = generate(&session);
    assert!(unset.contains("const int wave_loop_start = -1; // -1 = no loop"));
    assert!(unset.contains("const int wave_loop_end = -1;"));
    assert!(unset.contains("const int wave_loop_count = 3; // 0 = infinite"));

    session.set_loop_start(1).unwrap();
    session.set_loop_end(3).unwrap();
    session.set_loop_count(0);
    let set = generate(&session);
    assert!(set.contains("const int wave_loop_start = 1;"));
    assert!(set.contains("const int wave_loop_end = 3;"));
    assert!(set.contains("const int wave_loop_count = 0;"));
}

#[test]
fn test_cascade_enum_lists_every_mode() {
    let code = generate(&numbered_session(2));
    assert!(code.contains(
        "enum CascadeMode { CASCADE_NONE = 0, CASCADE_COLUMN = 1, CASCADE_ROW = 2, \
         CASCADE_DIAGONAL = 3, CASCADE_RIPPLE = 4, CASCADE_RIPPLE_IN = 5, \
         CASCADE_SNAKE = 6, CASCADE_SPIRAL = 7 };"
    ));
    assert!(code.contains(
        "    { {0, 0, 0}, {1, 1, 1}, {2, 2, 2}, {3, 3, 3}, {4, 4, 4}, {5, 5, 5}, {6, 6, 6}, {7, 7, 7} }, // column"
    ));
}

#[test]
fn test_comments_are_escaped() {
    let mut session = EditorSession::new("2 Hands \"Show\"");
    session.set_comment("say \"hi\"\nthen wave");
    session.append_keyframe();

    let code = generate(&session);
    assert!(code.contains("// ClockClock24 Choreographie: _2_Hands__Show_"));
    assert!(code.contains("    \"say \\\"hi\\\"\\nthen wave\",\n"));
    assert!(code.contains("// KF 1: say \"hi\" then wave\n"));
}

#[test]
fn test_identifier_rules() {
    assert_eq!(c_identifier("wave"), "wave");
    assert_eq!(c_identifier("my show-2"), "my_show_2");
    assert_eq!(c_identifier("24h"), "_24h");
    assert_eq!(c_identifier("   "), "choreographie");
}

#[test]
fn test_session_export_matches_exporter() {
    let session = numbered_session(2);
    let code = session.export_firmware();
    assert!(code.contains("void play_wave_choreography() {"));
    assert!(code.contains("apply_wave_keyframe(current_kf);"));
    // Session export is stamped with the current time
    assert!(!code.contains("2025-01-01T12:00:00.000Z"));
}
