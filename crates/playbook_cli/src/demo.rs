//! Headless playback of a built-in set play
//!
//! Stands in for a display surface: a simulated refresh clock drives the
//! session and every frame is written to stdout as one JSON line.

use std::io::Write;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use playbook_animation::{PlaybackSession, SchedulerConfig};
use playbook_core::{FieldPoint, FieldSize, Play, Team};
use thiserror::Error;
use tracing::info;

/// A speed change applied partway through a run, written `AT_SECS:SPEED`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedChange {
    pub at: Duration,
    pub speed: f32,
}

#[derive(Error, Debug, PartialEq)]
pub enum SpeedChangeError {
    #[error("expected AT_SECS:SPEED, got `{0}`")]
    Format(String),
    #[error("invalid time `{0}`")]
    Time(String),
    #[error("invalid speed `{0}`")]
    Speed(String),
}

impl FromStr for SpeedChange {
    type Err = SpeedChangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (at, speed) = s
            .split_once(':')
            .ok_or_else(|| SpeedChangeError::Format(s.to_string()))?;
        let at: f64 = at
            .trim()
            .parse()
            .ok()
            .filter(|t: &f64| t.is_finite() && *t >= 0.0)
            .ok_or_else(|| SpeedChangeError::Time(at.to_string()))?;
        let speed: f32 = speed
            .trim()
            .parse()
            .ok()
            .filter(|s: &f32| s.is_finite() && *s > 0.0)
            .ok_or_else(|| SpeedChangeError::Speed(speed.to_string()))?;
        Ok(Self {
            at: Duration::from_secs_f64(at),
            speed,
        })
    }
}

/// Options for a headless run
#[derive(Debug)]
pub struct DemoOptions {
    pub field: FieldSize,
    pub scheduler: SchedulerConfig,
    pub refresh_hz: u32,
    pub speed_changes: Vec<SpeedChange>,
    /// Print every n-th frame; the final frame is always printed
    pub every: u32,
}

/// Scrum-half feeds the fly-half, who hits the inside centre on a crash line.
pub fn crash_ball_play(field: FieldSize) -> playbook_core::Result<Play> {
    let mut play = Play::new(field);
    let w = field.width;
    let h = field.height;
    let at = |fx: f32, fy: f32| FieldPoint::new(w * fx, h * fy);

    let scrum_half = play.add_player(Team::Attack);
    let fly_half = play.add_player(Team::Attack);
    let inside_centre = play.add_player(Team::Attack);
    let outside_centre = play.add_player(Team::Attack);
    let flanker = play.add_player(Team::Defense);
    let defending_ten = play.add_player(Team::Defense);
    let defending_twelve = play.add_player(Team::Defense);

    let layout = [
        // Start
        [
            at(0.40, 0.50),
            at(0.30, 0.62),
            at(0.24, 0.74),
            at(0.20, 0.86),
            at(0.50, 0.50),
            at(0.55, 0.64),
            at(0.56, 0.78),
        ],
        // Pass
        [
            at(0.40, 0.52),
            at(0.34, 0.64),
            at(0.30, 0.72),
            at(0.26, 0.86),
            at(0.47, 0.55),
            at(0.51, 0.66),
            at(0.53, 0.77),
        ],
        // Crash
        [
            at(0.41, 0.55),
            at(0.38, 0.66),
            at(0.45, 0.70),
            at(0.33, 0.84),
            at(0.45, 0.60),
            at(0.48, 0.68),
            at(0.49, 0.74),
        ],
    ];
    let players = [
        scrum_half,
        fly_half,
        inside_centre,
        outside_centre,
        flanker,
        defending_ten,
        defending_twelve,
    ];
    let holders = [scrum_half, fly_half, inside_centre];

    for (index, points) in layout.iter().enumerate() {
        if index > 0 {
            play.add_keyframe();
        }
        for (player, point) in players.iter().zip(points) {
            play.place_player(index, *player, *point)?;
        }
        play.toggle_ball(holders[index])?;
    }
    Ok(play)
}

/// Run the play to completion, writing frames to `out`. Returns the number
/// of frames rendered.
pub fn run(play: Play, options: &DemoOptions, out: &mut impl Write) -> Result<u64> {
    let mut session = PlaybackSession::with_config(play, options.scheduler);
    let frame_interval = Duration::from_secs_f64(1.0 / options.refresh_hz as f64);
    let every = options.every.max(1) as u64;

    let mut pending: Vec<SpeedChange> = options.speed_changes.clone();
    pending.sort_by(|a, b| a.at.cmp(&b.at));
    let mut pending = pending.into_iter().peekable();

    let t0 = Instant::now();
    if !session.start(t0) {
        anyhow::bail!("the play needs at least two keyframes to animate");
    }
    info!(
        keyframes = session.play().keyframe_count(),
        players = session.play().roster().len(),
        speed = session.scheduler().speed(),
        "playing"
    );

    let mut frames = 0u64;
    let mut elapsed = Duration::ZERO;
    while session.wants_frames() {
        elapsed += frame_interval;
        while let Some(change) = pending.next_if(|c| c.at <= elapsed) {
            info!(at = ?change.at, speed = change.speed, "changing speed");
            session.set_speed(change.speed);
        }

        let Some(frame) = session.on_frame(t0 + elapsed) else {
            break;
        };
        frames += 1;

        if frames % every == 0 || !frame.playing {
            let line = serde_json::to_string(&frame).context("Failed to encode frame")?;
            writeln!(out, "{line}").context("Failed to write frame")?;
        }
    }

    info!(frames, elapsed = ?elapsed, "finished");
    Ok(frames)
}
