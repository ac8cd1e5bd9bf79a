//! Loop-aware playback state machine.
//!
//! The sequencer never owns or mutates keyframes. Every call receives the
//! current keyframe slice and loop range, so edits made between ticks are
//! picked up on the next tick.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_PAUSE_MS, DEFAULT_TRANSITION_MS};
use crate::error::{ChoreoError, ChoreoResult};
use crate::models::angle::ease_in_out_cubic;
use crate::models::{Keyframe, LoopRange};
use crate::playback::frame::{interpolate_grid, interpolate_grid_with, Frame, FrameSink, TimeSource};

/// Preview timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Length of one transition, in milliseconds
    pub transition_ms: u32,
    /// Hold between two transitions, in milliseconds
    pub pause_ms: u32,
    /// Stagger cell start times with the source keyframe's cascade
    pub apply_cascade: bool,
    /// Add the reached keyframe's `delay_ms` to the pause
    pub honor_keyframe_delay: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            transition_ms: DEFAULT_TRANSITION_MS,
            pause_ms: DEFAULT_PAUSE_MS,
            apply_cascade: false,
            honor_keyframe_delay: false,
        }
    }
}

/// Where the sequencer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not playing
    Idle,
    /// Moving between two keyframes
    Transitioning {
        /// Source keyframe index
        from: usize,
        /// Target keyframe index
        to: usize,
        /// Time the transition began, in milliseconds
        started_at: u64,
    },
    /// Holding on a reached keyframe before the next transition
    Pausing {
        /// Keyframe just reached (source of the next transition)
        from: usize,
        /// Target already chosen for the next transition
        to: usize,
        /// Time the next transition begins, in milliseconds
        until: u64,
    },
}

/// Result of a play/stop toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackToggle {
    /// Playback began at keyframe 0
    Started,
    /// Running playback was stopped
    Stopped,
}

/// Drives timed transitions through the keyframe sequence.
#[derive(Debug, Clone)]
pub struct Sequencer {
    settings: PlaybackSettings,
    state: PlaybackState,
    loop_iteration: u32,
}

impl Sequencer {
    /// Creates an idle sequencer.
    #[must_use]
    pub const fn new(settings: PlaybackSettings) -> Self {
        Self {
            settings,
            state: PlaybackState::Idle,
            loop_iteration: 0,
        }
    }

    /// Current timing.
    #[must_use]
    pub const fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Replaces the timing; a running transition picks it up on the next tick.
    pub fn set_settings(&mut self, settings: PlaybackSettings) {
        self.settings = settings;
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether playback is running (transitioning or pausing).
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        !matches!(self.state, PlaybackState::Idle)
    }

    /// Completed passes through the loop body in the current run.
    #[must_use]
    pub const fn loop_iteration(&self) -> u32 {
        self.loop_iteration
    }

    /// Starts playback from keyframe 0, or stops it when already running.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreoError::InsufficientKeyframes`] when starting with
    /// fewer than two keyframes; the sequencer stays idle.
    pub fn toggle(
        &mut self,
        now_ms: u64,
        keyframes: &[Keyframe],
        loop_range: &LoopRange,
    ) -> ChoreoResult<PlaybackToggle> {
        if self.is_playing() {
            self.stop();
            return Ok(PlaybackToggle::Stopped);
        }
        if keyframes.len() < 2 {
            return Err(ChoreoError::InsufficientKeyframes {
                count: keyframes.len(),
            });
        }

        self.loop_iteration = 0;
        let to = self.next_index(0, keyframes.len(), loop_range);
        self.state = PlaybackState::Transitioning {
            from: 0,
            to,
            started_at: now_ms,
        };
        info!(keyframes = keyframes.len(), %loop_range, "Playback started");
        Ok(PlaybackToggle::Started)
    }

    /// Halts immediately; no further frames are emitted.
    pub fn stop(&mut self) {
        if self.is_playing() {
            info!("Playback stopped");
        }
        self.state = PlaybackState::Idle;
        self.loop_iteration = 0;
    }

    /// Advances to `now_ms` and returns the frame to draw, if any.
    ///
    /// Returns `None` while idle or pausing. A tick that reaches the end of
    /// a transition still returns its final frame, then enters the pause.
    pub fn tick(
        &mut self,
        now_ms: u64,
        keyframes: &[Keyframe],
        loop_range: &LoopRange,
    ) -> Option<Frame> {
        if !self.is_playing() {
            return None;
        }
        let len = keyframes.len();
        if len < 2 {
            warn!(keyframes = len, "Too few keyframes left, stopping playback");
            self.stop();
            return None;
        }

        if let PlaybackState::Pausing { from, to, until } = self.state {
            if now_ms < until {
                return None;
            }
            self.state = PlaybackState::Transitioning {
                from,
                to,
                started_at: now_ms,
            };
        }

        let PlaybackState::Transitioning {
            from,
            to,
            started_at,
        } = self.state
        else {
            return None;
        };
        let (from, to) = self.bring_into_range(from, to, len);
        self.state = PlaybackState::Transitioning {
            from,
            to,
            started_at,
        };

        let source = &keyframes[from];
        let target = &keyframes[to];
        let elapsed = now_ms.saturating_sub(started_at);
        let duration_ms = u64::from(self.settings.transition_ms.max(1));
        let duration = duration_ms as f64;
        let raw = (elapsed as f64 / duration).min(1.0);

        let (grid, total_ms) = if self.settings.apply_cascade {
            let grid = interpolate_grid_with(source, target, |cell| {
                let local = elapsed.saturating_sub(source.cascade_offset_ms(cell)) as f64 / duration;
                ease_in_out_cubic(local.min(1.0))
            });
            (grid, duration_ms + source.max_cascade_offset_ms())
        } else {
            (
                interpolate_grid(source, target, ease_in_out_cubic(raw)),
                duration_ms,
            )
        };

        let frame = Frame {
            from_index: from,
            to_index: to,
            progress: ease_in_out_cubic(raw),
            grid,
        };

        if elapsed >= total_ms {
            self.complete(now_ms, to, keyframes, loop_range);
        }
        Some(frame)
    }

    /// Reads `time`, ticks and forwards any frame to `sink`.
    ///
    /// Returns whether a frame was rendered.
    pub fn drive(
        &mut self,
        time: &impl TimeSource,
        keyframes: &[Keyframe],
        loop_range: &LoopRange,
        sink: &mut impl FrameSink,
    ) -> bool {
        match self.tick(time.now_ms(), keyframes, loop_range) {
            Some(frame) => {
                sink.render(&frame);
                true
            }
            None => false,
        }
    }

    /// Picks the next target and enters the pause on `reached`.
    fn complete(&mut self, now_ms: u64, reached: usize, keyframes: &[Keyframe], loop_range: &LoopRange) {
        let next = self.next_index(reached, keyframes.len(), loop_range);
        let mut pause = u64::from(self.settings.pause_ms);
        if self.settings.honor_keyframe_delay {
            pause += u64::from(keyframes[reached].delay_ms);
        }
        self.state = PlaybackState::Pausing {
            from: reached,
            to: next,
            until: now_ms.saturating_add(pause),
        };
    }

    /// Keyframe that follows `from`, updating the loop counter.
    fn next_index(&mut self, from: usize, len: usize, loop_range: &LoopRange) -> usize {
        let mut candidate = from + 1;

        if let Some((start, end)) = loop_range.bounds() {
            if from == end {
                self.loop_iteration = self.loop_iteration.saturating_add(1);
                if loop_range.is_infinite() || self.loop_iteration < loop_range.count() {
                    candidate = start;
                } else {
                    candidate = end + 1;
                    self.loop_iteration = 0;
                }
            }
        }

        // Whole-sequence wrap wins over loop bookkeeping
        if candidate >= len {
            candidate = 0;
            self.loop_iteration = 0;
        }

        debug!(from, to = candidate, iteration = self.loop_iteration, "Next keyframe chosen");
        candidate
    }

    /// Pulls indices back inside a sequence that shrank under playback.
    fn bring_into_range(&mut self, from: usize, to: usize, len: usize) -> (usize, usize) {
        let from = from.min(len - 1);
        let to = if to >= len {
            self.loop_iteration = 0;
            0
        } else {
            to
        };
        (from, to)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(PlaybackSettings::default())
    }
}
