//! Playbook Animation System
//!
//! Keyframe interpolation and playback timing for set plays.
//!
//! # Features
//!
//! - **Position Resolver**: linear interpolation between consecutive keyframes,
//!   with a discrete possession switch at the midpoint
//! - **Ball Marker**: follows the holder, or flies between holders when
//!   possession changes
//! - **Playback Scheduler**: wall-clock driven, re-basable speed changes,
//!   generation-checked ticks
//! - **Sessions**: stop-before-mutate editing and frame snapshots for hosts

pub mod frame;
pub mod resolver;
pub mod scheduler;
pub mod session;

pub use frame::{FrameSnapshot, TokenFrame};
pub use resolver::{resolve, resolve_ball, ResolvedPosition};
pub use scheduler::{
    FramePosition, PlaybackScheduler, PlaybackState, SchedulerConfig, TickHandle, TickOutcome,
};
pub use session::PlaybackSession;
