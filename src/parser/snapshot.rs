//! Versioned choreography snapshot: schema, import defaulting and export.
//!
//! # File Format
//!
//! ```json
//! {
//!   "name": "wave",
//!   "version": "1.1",
//!   "created": "2024-01-15T10:30:00.000Z",
//!   "keyframes": [
//!     {
//!       "id": "…", "comment": "", "speed": 400, "accel": 150,
//!       "delayMs": 0, "cascadeMode": "none", "cascadeDelayMs": 100,
//!       "clocks": [[{"angleH": 180, "angleM": 180, "dirH": "CW", "dirM": "CW"}, …], …]
//!     }
//!   ],
//!   "loop": {"start": 1, "end": 2, "count": 3}
//! }
//! ```
//!
//! Older files may lack motion parameters, per-clock fields, whole `clocks`
//! rows or the `loop` object; all of those are filled with defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{
    CLOCKS_PER_SLAVE, DEFAULT_ACCEL, DEFAULT_CASCADE_DELAY_MS, DEFAULT_DELAY_MS,
    DEFAULT_LOOP_COUNT, DEFAULT_SPEED, FORMAT_VERSION, MAX_ACCEL, MAX_DELAY_MS, MAX_SPEED, MIN_ACCEL,
    MIN_SPEED,
    SLAVE_COUNT,
};
use crate::error::{ChoreoError, ChoreoResult};
use crate::models::{CascadeMode, ClockTarget, Direction, Keyframe, LoopRange};

/// Name given to imported snapshots that carry none.
pub const IMPORTED_NAME: &str = "imported";

/// Everything needed to restore an editing session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Project name
    pub name: String,
    /// Schema version the snapshot was written with
    pub version: String,
    /// Creation timestamp (RFC 3339 on disk)
    pub created: DateTime<Utc>,
    /// Keyframes in playback order (never empty)
    pub keyframes: Vec<Keyframe>,
    /// Loop markers
    #[serde(rename = "loop")]
    pub loop_range: LoopRange,
}

impl Snapshot {
    /// Builds a snapshot stamped with the current format version and time.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreoError::MinimumViolation`] when `keyframes` is empty.
    pub fn new(
        name: impl Into<String>,
        keyframes: Vec<Keyframe>,
        loop_range: LoopRange,
    ) -> ChoreoResult<Self> {
        if keyframes.is_empty() {
            return Err(ChoreoError::MinimumViolation);
        }
        Ok(Self {
            name: name.into(),
            version: FORMAT_VERSION.to_string(),
            created: Utc::now(),
            keyframes,
            loop_range,
        })
    }
}

/// Keyframe id as found on disk: older files used plain numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClock {
    angle_h: Option<f64>,
    angle_m: Option<f64>,
    dir_h: Option<Direction>,
    dir_m: Option<Direction>,
}

impl RawClock {
    fn into_target(self) -> ClockTarget {
        let calibration = ClockTarget::calibration();
        ClockTarget::new(
            self.angle_h.unwrap_or(calibration.angle_h),
            self.angle_m.unwrap_or(calibration.angle_m),
            self.dir_h.unwrap_or_default(),
            self.dir_m.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawKeyframe {
    id: Option<RawId>,
    comment: Option<String>,
    speed: Option<f64>,
    accel: Option<f64>,
    delay_ms: Option<f64>,
    cascade_mode: Option<String>,
    cascade_delay_ms: Option<f64>,
    clocks: Option<Vec<Vec<RawClock>>>,
}

#[derive(Debug, Deserialize)]
struct RawLoop {
    start: Option<usize>,
    end: Option<usize>,
    count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    name: Option<String>,
    #[serde(alias = "formatVersion")]
    version: Option<String>,
    created: Option<String>,
    keyframes: Vec<RawKeyframe>,
    #[serde(rename = "loop")]
    loop_range: Option<RawLoop>,
}

/// Rounds to the nearest whole number, saturating at the `u32` bounds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn saturate(value: f64) -> u32 {
    value.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Rounds and clamps `value` into `[min, max]`, warning when it had to move.
#[allow(clippy::float_cmp)]
fn clamp_with_warning(field: &str, index: usize, value: f64, min: u32, max: u32) -> u32 {
    let clamped = saturate(value).clamp(min, max);
    if f64::from(clamped) != value {
        warn!(keyframe = index, field, value, clamped, "Clamped out-of-range value on import");
    }
    clamped
}

fn convert_keyframe(index: usize, raw: RawKeyframe) -> Keyframe {
    let mut keyframe = Keyframe::new();

    if let Some(id) = raw.id {
        keyframe.id = id.into_string();
    }
    if let Some(comment) = raw.comment {
        keyframe.comment = comment;
    }

    keyframe.speed = raw.speed.map_or(DEFAULT_SPEED, |speed| {
        clamp_with_warning("speed", index, speed, MIN_SPEED, MAX_SPEED)
    });
    keyframe.accel = raw.accel.map_or(DEFAULT_ACCEL, |accel| {
        clamp_with_warning("accel", index, accel, MIN_ACCEL, MAX_ACCEL)
    });
    keyframe.delay_ms = raw.delay_ms.map_or(DEFAULT_DELAY_MS, |delay| {
        clamp_with_warning("delayMs", index, delay, 0, MAX_DELAY_MS)
    });
    keyframe.cascade_delay_ms = raw.cascade_delay_ms.map_or(DEFAULT_CASCADE_DELAY_MS, |delay| {
        clamp_with_warning("cascadeDelayMs", index, delay, 0, MAX_DELAY_MS)
    });

    keyframe.cascade_mode = match raw.cascade_mode.as_deref() {
        None => CascadeMode::None,
        Some(name) => CascadeMode::from_name(name).unwrap_or_else(|| {
            warn!(keyframe = index, name, "Unknown cascade mode, using none");
            CascadeMode::None
        }),
    };

    if let Some(columns) = raw.clocks {
        if columns.len() > SLAVE_COUNT {
            warn!(keyframe = index, slaves = columns.len(), "Ignoring extra slaves");
        }
        for (slave, column) in columns.into_iter().take(SLAVE_COUNT).enumerate() {
            for (clock, raw_clock) in column.into_iter().take(CLOCKS_PER_SLAVE).enumerate() {
                keyframe.clocks[slave][clock] = raw_clock.into_target();
            }
        }
    }

    keyframe
}

fn convert_loop(raw: Option<RawLoop>) -> ChoreoResult<LoopRange> {
    let Some(raw) = raw else {
        return Ok(LoopRange::new());
    };
    LoopRange::from_parts(raw.start, raw.end, raw.count.unwrap_or(DEFAULT_LOOP_COUNT)).map_err(
        |err| ChoreoError::InvalidFormat(format!("loop: {err}")),
    )
}

fn parse_created(created: Option<&str>) -> DateTime<Utc> {
    match created.map(DateTime::parse_from_rfc3339) {
        Some(Ok(timestamp)) => timestamp.with_timezone(&Utc),
        Some(Err(err)) => {
            warn!(error = %err, "Unreadable creation timestamp, using now");
            Utc::now()
        }
        None => Utc::now(),
    }
}

/// Parses a snapshot from JSON text, applying import defaults.
///
/// # Errors
///
/// Returns [`ChoreoError::InvalidFormat`] for:
/// - text that is not JSON, or a top level that is not an object
/// - a `keyframes` field that is absent, not an array, or empty
/// - fields of the wrong type
/// - a loop whose start comes after its end
pub fn parse_snapshot(json: &str) -> ChoreoResult<Snapshot> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|err| ChoreoError::InvalidFormat(err.to_string()))?;

    match value.get("keyframes") {
        Some(serde_json::Value::Array(keyframes)) if keyframes.is_empty() => {
            return Err(ChoreoError::InvalidFormat(
                "snapshot contains no keyframes".to_string(),
            ));
        }
        Some(serde_json::Value::Array(_)) => {}
        Some(_) => {
            return Err(ChoreoError::InvalidFormat(
                "`keyframes` must be an array".to_string(),
            ));
        }
        None => {
            return Err(ChoreoError::InvalidFormat(
                "missing `keyframes` array".to_string(),
            ));
        }
    }

    let raw: RawSnapshot =
        serde_json::from_value(value).map_err(|err| ChoreoError::InvalidFormat(err.to_string()))?;

    let loop_range = convert_loop(raw.loop_range)?;
    let keyframes: Vec<Keyframe> = raw
        .keyframes
        .into_iter()
        .enumerate()
        .map(|(index, keyframe)| convert_keyframe(index, keyframe))
        .collect();

    let snapshot = Snapshot {
        name: raw.name.unwrap_or_else(|| IMPORTED_NAME.to_string()),
        version: raw.version.unwrap_or_else(|| FORMAT_VERSION.to_string()),
        created: parse_created(raw.created.as_deref()),
        keyframes,
        loop_range,
    };
    debug!(
        name = %snapshot.name,
        version = %snapshot.version,
        keyframes = snapshot.keyframes.len(),
        "Parsed snapshot"
    );
    Ok(snapshot)
}

/// Serializes a snapshot as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ChoreoError::InvalidFormat`] if serialization fails.
pub fn snapshot_to_json(snapshot: &Snapshot) -> ChoreoResult<String> {
    serde_json::to_string_pretty(snapshot).map_err(|err| ChoreoError::InvalidFormat(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellAddress;

    fn at(slave: usize, clock: usize) -> CellAddress {
        CellAddress::new(slave, clock).unwrap()
    }

    #[test]
    fn test_rejects_missing_or_wrong_keyframes() {
        for json in [
            "{}",
            r#"{"keyframes": {}}"#,
            r#"{"keyframes": "none"}"#,
            r#"{"keyframes": []}"#,
            "[1, 2]",
            "not json",
        ] {
            assert!(
                matches!(parse_snapshot(json), Err(ChoreoError::InvalidFormat(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_minimal_keyframe_gets_defaults() {
        let snapshot = parse_snapshot(r#"{"keyframes": [{}]}"#).unwrap();
        let kf = &snapshot.keyframes[0];
        assert_eq!(kf.speed, 400);
        assert_eq!(kf.accel, 150);
        assert_eq!(kf.delay_ms, 0);
        assert_eq!(kf.cascade_mode, CascadeMode::None);
        assert_eq!(kf.cascade_delay_ms, 100);
        assert!(!kf.id.is_empty());
        assert_eq!(*kf.clock(at(5, 1)), ClockTarget::calibration());

        assert_eq!(snapshot.name, "imported");
        assert_eq!(snapshot.version, "1.1");
        assert_eq!(snapshot.loop_range, LoopRange::new());
    }

    #[test]
    fn test_numeric_ids_kept_as_text() {
        let snapshot = parse_snapshot(r#"{"keyframes": [{"id": 1700000000123}, {"id": "abc"}]}"#)
            .unwrap();
        assert_eq!(snapshot.keyframes[0].id, "1700000000123");
        assert_eq!(snapshot.keyframes[1].id, "abc");
    }

    #[test]
    fn test_partial_clocks_are_padded() {
        let json = r#"{"keyframes": [{"clocks": [[{"angleH": 450, "dirM": "CCW"}]]}]}"#;
        let snapshot = parse_snapshot(json).unwrap();
        let kf = &snapshot.keyframes[0];
        let first = kf.clock(at(0, 0));
        assert!((first.angle_h - 90.0).abs() < 1e-9);
        assert!((first.angle_m - 180.0).abs() < 1e-9);
        assert_eq!(first.dir_h, Direction::Cw);
        assert_eq!(first.dir_m, Direction::Ccw);
        assert_eq!(*kf.clock(at(0, 1)), ClockTarget::calibration());
        assert_eq!(*kf.clock(at(7, 2)), ClockTarget::calibration());
    }

    #[test]
    fn test_out_of_range_motion_is_clamped() {
        let json = r#"{"keyframes": [{"speed": 10000, "accel": 20}]}"#;
        let kf = &parse_snapshot(json).unwrap().keyframes[0];
        assert_eq!(kf.speed, 5000);
        assert_eq!(kf.accel, 100);
    }

    #[test]
    fn test_fractional_numbers_are_rounded() {
        let json = r#"{"keyframes": [{"speed": 400.0, "accel": 150.6, "delayMs": 250.4, "cascadeDelayMs": 99.5}]}"#;
        let kf = &parse_snapshot(json).unwrap().keyframes[0];
        assert_eq!(kf.speed, 400);
        assert_eq!(kf.accel, 151);
        assert_eq!(kf.delay_ms, 250);
        assert_eq!(kf.cascade_delay_ms, 100);
    }

    #[test]
    fn test_delays_are_capped_on_import() {
        let json = r#"{"keyframes": [{"delayMs": 100000, "cascadeDelayMs": -20}]}"#;
        let kf = &parse_snapshot(json).unwrap().keyframes[0];
        assert_eq!(kf.delay_ms, MAX_DELAY_MS);
        assert_eq!(kf.cascade_delay_ms, 0);
    }

    #[test]
    fn test_unknown_cascade_mode_falls_back() {
        let json = r#"{"keyframes": [{"cascadeMode": "zigzag"}, {"cascadeMode": "ripple_in"}]}"#;
        let snapshot = parse_snapshot(json).unwrap();
        assert_eq!(snapshot.keyframes[0].cascade_mode, CascadeMode::None);
        assert_eq!(snapshot.keyframes[1].cascade_mode, CascadeMode::RippleIn);
    }

    #[test]
    fn test_loop_import_rules() {
        let snapshot =
            parse_snapshot(r#"{"keyframes": [{}], "loop": {"start": 0, "end": 2}}"#).unwrap();
        assert_eq!(snapshot.loop_range.bounds(), Some((0, 2)));
        assert_eq!(snapshot.loop_range.count(), 3);

        let snapshot = parse_snapshot(
            r#"{"keyframes": [{}], "loop": {"start": null, "end": null, "count": 0}}"#,
        )
        .unwrap();
        assert!(snapshot.loop_range.is_infinite());
        assert_eq!(snapshot.loop_range.bounds(), None);

        let inverted = r#"{"keyframes": [{}], "loop": {"start": 3, "end": 1, "count": 2}}"#;
        assert!(matches!(parse_snapshot(inverted), Err(ChoreoError::InvalidFormat(_))));
    }

    #[test]
    fn test_created_and_version_alias() {
        let json = r#"{"formatVersion": "1.0", "created": "2024-01-15T10:30:00.000Z", "keyframes": [{}]}"#;
        let snapshot = parse_snapshot(json).unwrap();
        assert_eq!(snapshot.version, "1.0");
        assert_eq!(snapshot.created.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_wrong_field_type_is_invalid_format() {
        let json = r#"{"keyframes": [{"speed": "fast"}]}"#;
        assert!(matches!(parse_snapshot(json), Err(ChoreoError::InvalidFormat(_))));
    }

    #[test]
    fn test_export_then_import_preserves_content() {
        let mut kf = Keyframe::new();
        kf.set_comment("tick");
        kf.set_cascade_mode(CascadeMode::Spiral);
        kf.clock_mut(at(2, 2)).dir_h = Direction::Ccw;
        let loop_range = LoopRange::from_parts(Some(0), Some(1), 0).unwrap();
        let snapshot = Snapshot::new("wave", vec![kf, Keyframe::new()], loop_range).unwrap();

        let json = snapshot_to_json(&snapshot).unwrap();
        assert!(json.contains("\"loop\""));
        assert!(json.contains("\"version\": \"1.1\""));

        let back = parse_snapshot(&json).unwrap();
        assert_eq!(back.name, "wave");
        assert_eq!(back.keyframes, snapshot.keyframes);
        assert_eq!(back.loop_range, loop_range);
    }

    #[test]
    fn test_snapshot_new_requires_keyframes() {
        assert_eq!(
            Snapshot::new("x", Vec::new(), LoopRange::new()),
            Err(ChoreoError::MinimumViolation)
        );
    }
}
