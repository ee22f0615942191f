//! Keyframes
//!
//! A keyframe is a named snapshot of where every player stands and who holds
//! the ball. The ordered sequence of keyframes is the playback order.

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::geometry::FieldPoint;
use crate::roster::PlayerId;

new_key_type! {
    /// Identifier for a keyframe, unique within a play
    pub struct KeyframeId;
}

/// One player's placement in one keyframe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub player: PlayerId,
    pub point: FieldPoint,
    pub has_ball: bool,
}

impl Position {
    pub fn new(player: PlayerId, point: FieldPoint) -> Self {
        Self {
            player,
            point,
            has_ball: false,
        }
    }
}

/// Per-keyframe position list; a full side of fifteen stays inline
pub type Positions = SmallVec<[Position; 16]>;

/// A named snapshot in a play
#[derive(Clone, Debug)]
pub struct Keyframe {
    pub id: KeyframeId,
    pub name: String,
    positions: Positions,
}

impl Keyframe {
    pub fn new(id: KeyframeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            positions: SmallVec::new(),
        }
    }

    /// Copy of this keyframe's positions under a new identity
    pub fn duplicate(&self, id: KeyframeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            positions: self.positions.clone(),
        }
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Position entry for a player
    pub fn position(&self, player: PlayerId) -> Option<&Position> {
        self.positions.iter().find(|p| p.player == player)
    }

    /// The position entry currently holding the ball
    pub fn ball_holder(&self) -> Option<&Position> {
        self.positions.iter().find(|p| p.has_ball)
    }

    pub(crate) fn insert(&mut self, position: Position) {
        self.positions.push(position);
    }

    pub(crate) fn remove(&mut self, player: PlayerId) {
        self.positions.retain(|p| p.player != player);
    }

    /// Move a player, returning false if it has no entry here
    pub(crate) fn set_point(&mut self, player: PlayerId, point: FieldPoint) -> bool {
        match self.positions.iter_mut().find(|p| p.player == player) {
            Some(position) => {
                position.point = point;
                true
            }
            None => false,
        }
    }

    /// Flip `player`'s ball flag and clear it everywhere else
    pub(crate) fn toggle_ball(&mut self, player: PlayerId) {
        for position in self.positions.iter_mut() {
            position.has_ball = position.player == player && !position.has_ball;
        }
    }

    pub(crate) fn scale(&mut self, sx: f32, sy: f32) {
        for position in self.positions.iter_mut() {
            position.point.x *= sx;
            position.point.y *= sy;
        }
    }
}
