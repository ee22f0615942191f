//! Playbook Core
//!
//! The data model for sketching rugby set plays:
//!
//! - **Field geometry**: resolution-independent field-space coordinates
//! - **Roster**: player tokens with stable ids and per-team numbers
//! - **Keyframes**: named snapshots of every player's position and the ball
//! - **Play**: the editing surface that keeps all of the above consistent
//!
//! # Example
//!
//! ```rust
//! use playbook_core::{FieldPoint, Play, Team};
//!
//! let mut play = Play::default();
//! let nine = play.add_player(Team::Attack);
//! play.toggle_ball(nine).unwrap();
//!
//! play.add_keyframe();
//! play.move_player(nine, FieldPoint::new(300.0, 200.0)).unwrap();
//!
//! assert_eq!(play.keyframe_count(), 2);
//! assert_eq!(play.keyframe(1).unwrap().ball_holder().map(|p| p.player), Some(nine));
//! ```

pub mod error;
pub mod geometry;
pub mod keyframe;
pub mod play;
pub mod roster;

pub use error::{PlayError, Result};
pub use geometry::{FieldPoint, FieldSize};
pub use keyframe::{Keyframe, KeyframeId, Position};
pub use play::Play;
pub use roster::{Player, PlayerId, Roster, Team};
