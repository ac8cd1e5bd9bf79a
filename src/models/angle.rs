//! Angle math for clock hands.
//!
//! Angles follow the clock convention: 0° is 12 o'clock, 90° is 3 o'clock,
//! and values grow clockwise. Stored angles are always normalized to [0, 360).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Forced rotation direction of a hand when leaving a keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Clockwise (angles increase)
    #[default]
    #[serde(rename = "CW")]
    Cw,
    /// Counter-clockwise (angles decrease)
    #[serde(rename = "CCW")]
    Ccw,
}

impl Direction {
    /// Returns the other direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Cw => Self::Ccw,
            Self::Ccw => Self::Cw,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cw => write!(f, "CW"),
            Self::Ccw => write!(f, "CCW"),
        }
    }
}

/// One of the two hands on a clock face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    /// Hour hand
    Hour,
    /// Minute hand
    Minute,
}

/// Wraps any angle into [0, 360).
#[must_use]
pub fn normalize(angle: f64) -> f64 {
    let wrapped = ((angle % 360.0) + 360.0) % 360.0;
    // -0.0 and rounding up to 360.0 both collapse onto 0.
    if wrapped >= 360.0 || wrapped == 0.0 {
        0.0
    } else {
        wrapped
    }
}

/// Mirrors an angle across the vertical axis (left/right symmetry).
///
/// Pair with [`Direction::opposite`] on the same hand.
#[must_use]
pub fn mirror_vertical(angle: f64) -> f64 {
    normalize((360.0 - angle) % 360.0)
}

/// Mirrors an angle across the horizontal axis (top/bottom symmetry).
///
/// Pair with [`Direction::opposite`] on the same hand.
#[must_use]
pub fn mirror_horizontal(angle: f64) -> f64 {
    normalize((180.0 - angle + 360.0) % 360.0)
}

/// Signed travel from `from` to `to` when forced to rotate in `direction`.
///
/// Clockwise travel is always in (0, 360], counter-clockwise in [-360, 0).
/// Equal endpoints therefore produce a full turn, never a zero move.
#[must_use]
pub fn directed_delta(from: f64, to: f64, direction: Direction) -> f64 {
    let mut delta = to - from;
    match direction {
        Direction::Cw => {
            if delta <= 0.0 {
                delta += 360.0;
            }
        }
        Direction::Ccw => {
            if delta >= 0.0 {
                delta -= 360.0;
            }
        }
    }
    delta
}

/// Position of a hand moving from `from` to `to` in `direction`, at `progress` ∈ [0, 1].
///
/// The hand never takes the shorter arc when it opposes the commanded
/// direction: a physical hand only turns one way per transition.
///
/// # Examples
///
/// ```
/// use clockchoreo::models::angle::{interpolate_angle, Direction};
///
/// assert!((interpolate_angle(10.0, 350.0, Direction::Cw, 0.5) - 180.0).abs() < 1e-9);
/// assert!(interpolate_angle(10.0, 350.0, Direction::Ccw, 0.5).abs() < 1e-9);
/// ```
#[must_use]
pub fn interpolate_angle(from: f64, to: f64, direction: Direction, progress: f64) -> f64 {
    let delta = directed_delta(from, to, direction);
    normalize(delta.mul_add(progress, from))
}

/// Cubic ease-in-out applied to raw time progress.
#[must_use]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0f64).mul_add(t, 2.0).powi(3) / 2.0
    }
}
