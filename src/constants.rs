//! Application-wide constants.
//!
//! Grid dimensions, motion-parameter defaults and the playback timing used
//! when no configuration overrides them.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "ClockChoreo";

/// Number of slave units (columns) in the display.
pub const SLAVE_COUNT: usize = 8;

/// Number of clock faces stacked on each slave (rows).
pub const CLOCKS_PER_SLAVE: usize = 3;

/// Angle of the 6 o'clock calibration pose, in degrees.
pub const CALIBRATION_ANGLE: f64 = 180.0;

/// Default motor speed in steps/sec.
pub const DEFAULT_SPEED: u32 = 400;
/// Slowest motor speed accepted, in steps/sec.
pub const MIN_SPEED: u32 = 200;
/// Fastest motor speed accepted, in steps/sec.
pub const MAX_SPEED: u32 = 5000;

/// Default acceleration in steps/sec².
pub const DEFAULT_ACCEL: u32 = 150;
/// Lowest acceleration accepted, in steps/sec².
pub const MIN_ACCEL: u32 = 100;
/// Highest acceleration accepted, in steps/sec².
pub const MAX_ACCEL: u32 = 2000;

/// Default hold time after a keyframe is reached, in milliseconds.
pub const DEFAULT_DELAY_MS: u32 = 0;

/// Default delay between cascade groups, in milliseconds.
pub const DEFAULT_CASCADE_DELAY_MS: u32 = 100;

/// Longest hold or cascade delay, in milliseconds. The controller stores
/// both in 16-bit fields.
pub const MAX_DELAY_MS: u32 = 65_535;

/// Default number of loop repetitions (0 means infinite).
pub const DEFAULT_LOOP_COUNT: u32 = 3;

/// Snapshot schema version written on export.
pub const FORMAT_VERSION: &str = "1.1";

/// Project name used when none has been chosen.
pub const DEFAULT_PROJECT_NAME: &str = "choreographie";

/// Preview transition length between two keyframes, in milliseconds.
pub const DEFAULT_TRANSITION_MS: u32 = 1000;

/// Preview pause between two transitions, in milliseconds.
pub const DEFAULT_PAUSE_MS: u32 = 500;

/// Stepper steps covering a 90° move (46080 steps per revolution).
pub const STEPS_PER_QUARTER_TURN: u32 = 11_520;

/// Margin the controller adds to every transition estimate, in milliseconds.
pub const TRANSITION_MARGIN_MS: u32 = 500;
