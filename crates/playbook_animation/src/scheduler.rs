//! Playback scheduler
//!
//! Converts wall-clock time into a `(keyframe index, fraction)` pair.
//!
//! Progress through a play is a single number in `[0, 1]`. Whenever the
//! speed multiplier changes, the progress accrued under the old speed is
//! folded into a baseline and timing restarts from the moment of the change,
//! so a speed change never makes tokens jump.
//!
//! The host drives the scheduler from its display-refresh callback: `start`
//! hands out a [`TickHandle`] and every `tick` must present it. `stop` and
//! `reset` bump a generation counter, so a tick scheduled before the
//! cancellation is rejected instead of mutating state.

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

/// Time one keyframe transition takes at 1x speed
pub const DEFAULT_TRANSITION: Duration = Duration::from_secs(2);

/// Slowest allowed speed multiplier
pub const MIN_SPEED: f32 = 0.5;

/// Fastest allowed speed multiplier
pub const MAX_SPEED: f32 = 3.0;

/// Scheduler tuning
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Duration of one keyframe transition at 1x
    pub transition: Duration,
    pub min_speed: f32,
    pub max_speed: f32,
    pub default_speed: f32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            transition: DEFAULT_TRANSITION,
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,
            default_speed: 1.0,
        }
    }
}

/// Whether the animation clock is running
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Keyframe index plus progress towards the next keyframe
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FramePosition {
    pub index: usize,
    /// In `[0, 1)`; always 0 on the last keyframe
    pub fraction: f32,
}

impl FramePosition {
    pub const START: Self = Self {
        index: 0,
        fraction: 0.0,
    };
}

/// Proof that a tick belongs to the current playback run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
}

/// Result of a scheduler tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Still playing; draw this frame and tick again
    Frame(FramePosition),
    /// Reached the end; draw this frame and stop ticking
    Finished(FramePosition),
    /// The handle was cancelled; nothing changed
    Stale,
}

/// Progress (as a share of the whole play) covered in `elapsed` at `speed`
pub fn progress_delta(
    elapsed: Duration,
    transition: Duration,
    speed: f32,
    keyframe_count: usize,
) -> f64 {
    let transitions = keyframe_count.saturating_sub(1);
    if transitions == 0 {
        return 1.0;
    }
    let frame_duration = transition.as_secs_f64() / speed as f64;
    let total_duration = transitions as f64 * frame_duration;
    elapsed.as_secs_f64() / total_duration
}

/// Map overall progress onto a keyframe index and fraction
pub fn frame_position(progress: f64, keyframe_count: usize) -> FramePosition {
    let transitions = keyframe_count.saturating_sub(1);
    if transitions == 0 || progress >= 1.0 {
        return FramePosition {
            index: transitions,
            fraction: 0.0,
        };
    }

    let scaled = progress.max(0.0) * transitions as f64;
    let index = scaled.floor() as usize;
    let fraction = (scaled - index as f64) as f32;

    // Narrowing to f32 can round a fraction just below 1 up to 1
    if fraction >= 1.0 {
        return FramePosition {
            index: (index + 1).min(transitions),
            fraction: 0.0,
        };
    }
    FramePosition { index, fraction }
}

/// Timing state for one playback run
#[derive(Clone, Copy, Debug)]
struct PlaybackClock {
    started_at: Instant,
    keyframe_count: usize,
    /// Progress accrued under earlier speed regimes
    baseline: f64,
    /// When the current speed regime began
    regime_start: Instant,
    regime_speed: f32,
}

/// Drives playback through a play's keyframes
#[derive(Debug)]
pub struct PlaybackScheduler {
    config: SchedulerConfig,
    state: PlaybackState,
    position: FramePosition,
    progress: f64,
    speed: f32,
    clock: Option<PlaybackClock>,
    generation: u64,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        let default_speed = if config.default_speed.is_finite() {
            config.default_speed
        } else {
            warn!(speed = config.default_speed, "non-finite default speed, using 1x");
            1.0
        };
        Self {
            speed: default_speed.clamp(config.min_speed, config.max_speed),
            config,
            state: PlaybackState::Stopped,
            position: FramePosition::START,
            progress: 0.0,
            clock: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Last published keyframe index and fraction
    pub fn position(&self) -> FramePosition {
        self.position
    }

    /// Overall progress computed by the last tick
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// When the current run started, if playing
    pub fn playing_since(&self) -> Option<Instant> {
        self.clock.map(|c| c.started_at)
    }

    /// Set the speed multiplier, clamped to the configured range.
    ///
    /// While playing, the change is folded into the clock on the next tick.
    pub fn set_speed(&mut self, speed: f32) {
        if !speed.is_finite() {
            warn!(speed, "ignoring non-finite playback speed");
            return;
        }
        let speed = speed.clamp(self.config.min_speed, self.config.max_speed);
        if speed != self.speed {
            debug!(from = self.speed, to = speed, "playback speed changed");
            self.speed = speed;
        }
    }

    /// Start playing from the first keyframe.
    ///
    /// Returns `None` without changing anything when there is nothing to
    /// animate (fewer than two keyframes).
    pub fn start(&mut self, now: Instant, keyframe_count: usize) -> Option<TickHandle> {
        if keyframe_count <= 1 {
            debug!(keyframe_count, "not enough keyframes to play");
            return None;
        }

        self.generation += 1;
        self.state = PlaybackState::Playing;
        self.position = FramePosition::START;
        self.progress = 0.0;
        self.clock = Some(PlaybackClock {
            started_at: now,
            keyframe_count,
            baseline: 0.0,
            regime_start: now,
            regime_speed: self.speed,
        });

        debug!(keyframe_count, speed = self.speed, "playback started");
        Some(TickHandle {
            generation: self.generation,
        })
    }

    /// Advance playback to `now`
    pub fn tick(&mut self, handle: TickHandle, now: Instant) -> TickOutcome {
        if handle.generation != self.generation || self.state != PlaybackState::Playing {
            trace!("stale tick ignored");
            return TickOutcome::Stale;
        }
        let Some(clock) = self.clock.as_mut() else {
            return TickOutcome::Stale;
        };

        let transition = self.config.transition;
        if self.speed != clock.regime_speed {
            let elapsed = now.saturating_duration_since(clock.regime_start);
            clock.baseline +=
                progress_delta(elapsed, transition, clock.regime_speed, clock.keyframe_count);
            clock.regime_start = now;
            clock.regime_speed = self.speed;
            debug!(baseline = clock.baseline, speed = self.speed, "clock rebased");
        }

        let elapsed = now.saturating_duration_since(clock.regime_start);
        let progress = clock.baseline
            + progress_delta(elapsed, transition, clock.regime_speed, clock.keyframe_count);
        let keyframe_count = clock.keyframe_count;

        self.progress = progress.min(1.0);
        self.position = frame_position(progress, keyframe_count);

        if progress >= 1.0 {
            self.halt();
            debug!("playback finished");
            return TickOutcome::Finished(self.position);
        }

        trace!(
            progress,
            index = self.position.index,
            fraction = self.position.fraction,
            "tick"
        );
        TickOutcome::Frame(self.position)
    }

    /// Stop playing, leaving the last published frame in place
    pub fn stop(&mut self) {
        if self.is_playing() {
            debug!(index = self.position.index, "playback stopped");
        }
        self.halt();
    }

    /// Stop and rewind to the first keyframe
    pub fn reset(&mut self) {
        self.halt();
        self.position = FramePosition::START;
        self.progress = 0.0;
    }

    /// Park the clock on an explicit frame, e.g. when the editor selects a
    /// keyframe. Stops playback.
    pub fn seek(&mut self, index: usize) {
        self.halt();
        self.position = FramePosition {
            index,
            fraction: 0.0,
        };
    }

    fn halt(&mut self) {
        self.generation += 1;
        self.state = PlaybackState::Stopped;
        self.clock = None;
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new()
    }
}
