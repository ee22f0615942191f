//! Frame snapshots handed to the rendering surface

use playbook_core::{FieldPoint, FieldSize, Play, PlayerId, Team};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::resolver::{resolve, resolve_ball};
use crate::scheduler::FramePosition;

/// One player token as it should be drawn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenFrame {
    pub player: PlayerId,
    pub team: Team,
    pub number: u32,
    pub position: FieldPoint,
    pub has_ball: bool,
    pub selected: bool,
}

/// Everything the rendering surface needs to draw one frame
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub keyframe_index: usize,
    pub fraction: f32,
    pub playing: bool,
    pub speed: f32,
    pub field: FieldSize,
    pub token_radius: f32,
    pub tokens: SmallVec<[TokenFrame; 32]>,
    /// Ball marker position, if anyone holds the ball
    pub ball: Option<FieldPoint>,
    pub selected: Option<PlayerId>,
}

impl FrameSnapshot {
    /// Resolve every token and the ball at `at`
    pub fn capture(play: &Play, at: FramePosition, playing: bool, speed: f32) -> Self {
        let selected = play.selected_player();
        let tokens = play
            .roster()
            .iter()
            .map(|player| {
                let resolved = resolve(play, player.id, at.index, at.fraction);
                TokenFrame {
                    player: player.id,
                    team: player.team,
                    number: player.number,
                    position: resolved.point(),
                    has_ball: resolved.has_ball,
                    selected: selected == Some(player.id),
                }
            })
            .collect();

        Self {
            keyframe_index: at.index,
            fraction: at.fraction,
            playing,
            speed,
            field: play.field(),
            token_radius: play.field().token_radius(),
            tokens,
            ball: resolve_ball(play, at.index, at.fraction),
            selected,
        }
    }

    pub fn token(&self, player: PlayerId) -> Option<&TokenFrame> {
        self.tokens.iter().find(|t| t.player == player)
    }
}
