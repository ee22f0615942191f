//! Play editing
//!
//! A [`Play`] owns the roster and the keyframe sequence and is the only way
//! to mutate them, which keeps every keyframe's position list in lockstep
//! with the roster and the sequence non-empty.

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::error::{PlayError, Result};
use crate::geometry::{FieldPoint, FieldSize};
use crate::keyframe::{Keyframe, KeyframeId, Position};
use crate::roster::{Player, PlayerId, Roster, Team};

/// Name given to the keyframe every play starts with
pub const FIRST_KEYFRAME_NAME: &str = "Start";

/// A set play: players, keyframes, and the editor's selection state
#[derive(Debug)]
pub struct Play {
    field: FieldSize,
    roster: Roster,
    keyframes: Vec<Keyframe>,
    current: usize,
    selected_player: Option<PlayerId>,
    dragging: Option<PlayerId>,
    /// Live keyframe ids; removed when their keyframe is deleted
    keyframe_ids: SlotMap<KeyframeId, ()>,
}

impl Play {
    /// Create an empty play with a single starting keyframe
    pub fn new(field: FieldSize) -> Self {
        let mut keyframe_ids = SlotMap::with_key();
        let first = keyframe_ids.insert(());
        Self {
            field,
            roster: Roster::new(),
            keyframes: vec![Keyframe::new(first, FIRST_KEYFRAME_NAME)],
            current: 0,
            selected_player: None,
            dragging: None,
            keyframe_ids,
        }
    }

    pub fn field(&self) -> FieldSize {
        self.field
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.get(id)
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// Position of a keyframe in playback order
    pub fn keyframe_index(&self, id: KeyframeId) -> Option<usize> {
        self.keyframes.iter().position(|kf| kf.id == id)
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    pub fn last_index(&self) -> usize {
        self.keyframes.len() - 1
    }

    /// Index of the keyframe being edited or displayed
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_keyframe(&self) -> &Keyframe {
        &self.keyframes[self.current]
    }

    pub fn selected_player(&self) -> Option<PlayerId> {
        self.selected_player
    }

    pub fn dragging(&self) -> Option<PlayerId> {
        self.dragging
    }

    // ========================================================================
    // Roster
    // ========================================================================

    /// Where a newly added player appears
    pub fn spawn_point(&self, team: Team) -> FieldPoint {
        let x = match team {
            Team::Attack => self.field.width * 0.3,
            Team::Defense => self.field.width * 0.7,
        };
        FieldPoint::new(x, self.field.height / 2.0)
    }

    /// Add a player, placing it at the team's spawn point in every keyframe
    pub fn add_player(&mut self, team: Team) -> PlayerId {
        let id = self.roster.add(team);
        let point = self.spawn_point(team);
        for keyframe in &mut self.keyframes {
            keyframe.insert(Position::new(id, point));
        }
        debug!(?id, %team, "player added");
        id
    }

    /// Remove a player from the roster and from every keyframe
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Player> {
        let player = self.roster.remove(id).ok_or(PlayError::UnknownPlayer(id))?;
        for keyframe in &mut self.keyframes {
            keyframe.remove(id);
        }
        if self.selected_player == Some(id) {
            self.selected_player = None;
        }
        if self.dragging == Some(id) {
            self.dragging = None;
        }
        debug!(?id, "player removed");
        Ok(player)
    }

    /// Give the ball to a player in the current keyframe, or take it away if
    /// the player already has it
    pub fn toggle_ball(&mut self, id: PlayerId) -> Result<()> {
        if !self.roster.contains(id) {
            return Err(PlayError::UnknownPlayer(id));
        }
        self.keyframes[self.current].toggle_ball(id);
        Ok(())
    }

    pub fn select_player(&mut self, id: Option<PlayerId>) -> Result<()> {
        if let Some(id) = id {
            if !self.roster.contains(id) {
                return Err(PlayError::UnknownPlayer(id));
            }
        }
        self.selected_player = id;
        Ok(())
    }

    // ========================================================================
    // Keyframes
    // ========================================================================

    /// Append a copy of the last keyframe and select it
    pub fn add_keyframe(&mut self) -> KeyframeId {
        let id = self.keyframe_ids.insert(());

        let name = format!("Frame {}", self.keyframes.len());
        let keyframe = self.keyframes[self.last_index()].duplicate(id, name);
        self.keyframes.push(keyframe);
        self.current = self.last_index();

        debug!(?id, count = self.keyframes.len(), "keyframe added");
        id
    }

    /// Delete a keyframe, keeping the selection on a sensible neighbour
    pub fn delete_keyframe(&mut self, index: usize) -> Result<Keyframe> {
        let len = self.keyframes.len();
        if len <= 1 {
            warn!("refusing to delete the only keyframe");
            return Err(PlayError::LastKeyframe);
        }
        if index >= len {
            return Err(PlayError::KeyframeOutOfRange { index, len });
        }

        let removed = self.keyframes.remove(index);
        self.keyframe_ids.remove(removed.id);
        if self.current >= self.keyframes.len() {
            self.current = self.last_index();
        } else if self.current == index && index > 0 {
            self.current = index - 1;
        }

        debug!(index, count = self.keyframes.len(), "keyframe deleted");
        Ok(removed)
    }

    pub fn select_keyframe(&mut self, index: usize) -> Result<()> {
        if index >= self.keyframes.len() {
            return Err(PlayError::KeyframeOutOfRange {
                index,
                len: self.keyframes.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Stored position of a player in the current keyframe, or the field
    /// center when there is none
    pub fn current_point(&self, id: PlayerId) -> FieldPoint {
        self.current_keyframe()
            .position(id)
            .map(|p| p.point)
            .unwrap_or_else(|| self.field.center())
    }

    /// Move a player in the current keyframe, clamped to the field
    pub fn move_player(&mut self, id: PlayerId, point: FieldPoint) -> Result<FieldPoint> {
        if !self.roster.contains(id) {
            return Err(PlayError::UnknownPlayer(id));
        }
        let clamped = self.field.clamp_token(point);
        self.keyframes[self.current].set_point(id, clamped);
        Ok(clamped)
    }

    /// Set a player's position in any keyframe.
    ///
    /// Used when laying out a play programmatically; unlike [`Play::move_player`]
    /// the point is stored exactly as given.
    pub fn place_player(&mut self, index: usize, id: PlayerId, point: FieldPoint) -> Result<()> {
        if !self.roster.contains(id) {
            return Err(PlayError::UnknownPlayer(id));
        }
        let len = self.keyframes.len();
        let keyframe = self
            .keyframes
            .get_mut(index)
            .ok_or(PlayError::KeyframeOutOfRange { index, len })?;
        keyframe.set_point(id, point);
        Ok(())
    }

    /// First player (in roster order) whose token covers `point`
    pub fn player_at(&self, point: FieldPoint) -> Option<PlayerId> {
        let radius = self.field.token_radius();
        self.roster
            .iter()
            .find(|p| self.current_point(p.id).distance(point) <= radius)
            .map(|p| p.id)
    }

    /// Pointer down: select the player under the pointer and start dragging
    /// it, or clear the selection on a miss
    pub fn begin_drag(&mut self, point: FieldPoint) -> Option<PlayerId> {
        let hit = self.player_at(point);
        self.selected_player = hit;
        self.dragging = hit;
        hit
    }

    /// Pointer move: move the dragged player, if any
    pub fn drag_to(&mut self, point: FieldPoint) -> Option<FieldPoint> {
        let id = self.dragging?;
        self.move_player(id, point).ok()
    }

    /// Pointer up
    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    /// Resize the field, rescaling every stored coordinate so the layout
    /// keeps its proportions
    pub fn resize(&mut self, size: FieldSize) {
        if size == self.field || size.width <= 0.0 || size.height <= 0.0 {
            return;
        }
        let (sx, sy) = self.field.scale_to(size);
        for keyframe in &mut self.keyframes {
            keyframe.scale(sx, sy);
        }
        debug!(width = size.width, height = size.height, "field resized");
        self.field = size;
    }
}

impl Default for Play {
    fn default() -> Self {
        Self::new(FieldSize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_lockstep(play: &Play) {
        for keyframe in play.keyframes() {
            assert_eq!(keyframe.positions().len(), play.roster().len());
            for player in play.roster().iter() {
                assert!(keyframe.position(player.id).is_some());
            }
        }
    }

    #[test]
    fn test_new_play_has_start_keyframe() {
        let play = Play::default();
        assert_eq!(play.keyframe_count(), 1);
        assert_eq!(play.keyframes()[0].name, FIRST_KEYFRAME_NAME);
        assert_eq!(play.current_index(), 0);
    }

    #[test]
    fn test_add_player_fans_out() {
        let mut play = Play::default();
        play.add_keyframe();
        play.add_keyframe();

        let attacker = play.add_player(Team::Attack);
        let defender = play.add_player(Team::Defense);
        assert_in_lockstep(&play);

        let kf = play.keyframe(2).unwrap();
        assert_eq!(kf.position(attacker).unwrap().point, FieldPoint::new(240.0, 250.0));
        assert_eq!(kf.position(defender).unwrap().point, FieldPoint::new(560.0, 250.0));
    }

    #[test]
    fn test_remove_player_cascades() {
        let mut play = Play::default();
        let a = play.add_player(Team::Attack);
        let b = play.add_player(Team::Attack);
        play.add_keyframe();
        play.select_player(Some(a)).unwrap();

        let removed = play.remove_player(a).unwrap();
        assert_eq!(removed.number, 1);
        assert_in_lockstep(&play);
        assert_eq!(play.selected_player(), None);
        assert_eq!(play.player(b).map(|p| p.number), Some(2));

        assert_eq!(play.remove_player(a), Err(PlayError::UnknownPlayer(a)));
    }

    #[test]
    fn test_add_keyframe_copies_last_and_selects() {
        let mut play = Play::default();
        let a = play.add_player(Team::Attack);
        play.move_player(a, FieldPoint::new(100.0, 100.0)).unwrap();

        play.add_keyframe();
        assert_eq!(play.current_index(), 1);
        assert_eq!(play.keyframes()[1].name, "Frame 1");

        play.move_player(a, FieldPoint::new(300.0, 100.0)).unwrap();
        assert_eq!(
            play.keyframe(0).unwrap().position(a).unwrap().point,
            FieldPoint::new(100.0, 100.0)
        );
        assert_eq!(
            play.keyframe(1).unwrap().position(a).unwrap().point,
            FieldPoint::new(300.0, 100.0)
        );
    }

    #[test]
    fn test_keyframe_ids_are_slotmap_keys() {
        let mut play = Play::default();
        let start = play.keyframes()[0].id;
        let second = play.add_keyframe();
        let third = play.add_keyframe();

        assert_ne!(start, second);
        assert_eq!(play.keyframe_index(third), Some(2));

        let removed = play.delete_keyframe(1).unwrap();
        assert_eq!(removed.id, second);
        assert_eq!(play.keyframe_index(second), None);
        assert_eq!(play.keyframe_index(third), Some(1));

        // A key freed by deletion is never handed out again
        let fourth = play.add_keyframe();
        assert_ne!(fourth, second);
        assert_eq!(play.keyframe_index(fourth), Some(2));
    }

    #[test]
    fn test_delete_only_keyframe_rejected() {
        let mut play = Play::default();
        assert!(matches!(play.delete_keyframe(0), Err(PlayError::LastKeyframe)));
        assert_eq!(play.keyframe_count(), 1);
    }

    #[test]
    fn test_delete_keyframe_adjusts_selection() {
        let mut play = Play::default();
        play.add_keyframe();
        play.add_keyframe();

        // Selected keyframe deleted: selection moves back one
        play.select_keyframe(1).unwrap();
        play.delete_keyframe(1).unwrap();
        assert_eq!(play.current_index(), 0);

        // Selection past the end after deletion is clamped
        play.select_keyframe(1).unwrap();
        play.delete_keyframe(0).unwrap();
        assert_eq!(play.current_index(), 0);
        assert_eq!(play.keyframe_count(), 1);
    }

    #[test]
    fn test_delete_keyframe_out_of_range() {
        let mut play = Play::default();
        play.add_keyframe();
        assert_eq!(
            play.delete_keyframe(5).unwrap_err(),
            PlayError::KeyframeOutOfRange { index: 5, len: 2 }
        );
        assert_eq!(play.keyframe_count(), 2);
    }

    #[test]
    fn test_toggle_ball_on_current_keyframe_only() {
        let mut play = Play::default();
        let a = play.add_player(Team::Attack);
        let b = play.add_player(Team::Attack);
        play.add_keyframe();

        play.toggle_ball(a).unwrap();
        play.toggle_ball(b).unwrap();

        let current = play.current_keyframe();
        assert!(!current.position(a).unwrap().has_ball);
        assert!(current.position(b).unwrap().has_ball);
        assert!(play.keyframe(0).unwrap().ball_holder().is_none());
    }

    #[test]
    fn test_drag_clamps_to_field() {
        let mut play = Play::default();
        let a = play.add_player(Team::Attack);

        assert_eq!(play.begin_drag(FieldPoint::new(245.0, 248.0)), Some(a));
        assert_eq!(play.selected_player(), Some(a));

        let moved = play.drag_to(FieldPoint::new(-100.0, 250.0));
        assert_eq!(moved, Some(FieldPoint::new(15.0, 250.0)));
        play.end_drag();
        assert_eq!(play.drag_to(FieldPoint::new(400.0, 250.0)), None);

        // Missing the tokens clears the selection
        assert_eq!(play.begin_drag(FieldPoint::new(700.0, 50.0)), None);
        assert_eq!(play.selected_player(), None);
    }

    #[test]
    fn test_resize_scales_every_keyframe() {
        let mut play = Play::default();
        let a = play.add_player(Team::Attack);
        play.move_player(a, FieldPoint::new(100.0, 100.0)).unwrap();
        play.add_keyframe();
        play.move_player(a, FieldPoint::new(400.0, 200.0)).unwrap();

        play.resize(FieldSize::new(400.0, 250.0));

        assert_eq!(play.field(), FieldSize::new(400.0, 250.0));
        assert_eq!(
            play.keyframe(0).unwrap().position(a).unwrap().point,
            FieldPoint::new(50.0, 50.0)
        );
        assert_eq!(
            play.keyframe(1).unwrap().position(a).unwrap().point,
            FieldPoint::new(200.0, 100.0)
        );
    }
}
