//! Playback session
//!
//! Couples one [`Play`] with one [`PlaybackScheduler`]. Editing goes through
//! the session so that anything that reshapes the keyframe sequence stops
//! playback before it touches the data.

use std::time::Instant;

use playbook_core::{FieldPoint, FieldSize, KeyframeId, Play, PlayerId, Result, Team};
use tracing::{debug, warn};

use crate::frame::FrameSnapshot;
use crate::scheduler::{
    FramePosition, PlaybackScheduler, SchedulerConfig, TickHandle, TickOutcome,
};

/// A play being edited and played back
#[derive(Debug)]
pub struct PlaybackSession {
    play: Play,
    scheduler: PlaybackScheduler,
    pending: Option<TickHandle>,
}

impl PlaybackSession {
    pub fn new(play: Play) -> Self {
        Self::with_config(play, SchedulerConfig::default())
    }

    pub fn with_config(play: Play, config: SchedulerConfig) -> Self {
        let mut scheduler = PlaybackScheduler::with_config(config);
        scheduler.seek(play.current_index());
        Self {
            play,
            scheduler,
            pending: None,
        }
    }

    pub fn play(&self) -> &Play {
        &self.play
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn position(&self) -> FramePosition {
        self.scheduler.position()
    }

    /// Whether the host should keep requesting display-refresh callbacks
    pub fn wants_frames(&self) -> bool {
        self.pending.is_some()
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Play from the first keyframe. Returns false when the play has a
    /// single keyframe and cannot animate.
    pub fn start(&mut self, now: Instant) -> bool {
        let Some(handle) = self.scheduler.start(now, self.play.keyframe_count()) else {
            return false;
        };
        self.pending = Some(handle);
        self.play.end_drag();
        self.show(FramePosition::START);
        true
    }

    /// Stop where we are
    pub fn pause(&mut self) {
        self.pending = None;
        self.scheduler.stop();
    }

    /// Stop and go back to the first keyframe
    pub fn rewind(&mut self) {
        self.pending = None;
        self.scheduler.reset();
        self.show(FramePosition::START);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.scheduler.set_speed(speed);
    }

    /// Display-refresh callback: advance the clock to `now` and return the
    /// frame to draw, or `None` if playback is not running.
    pub fn on_frame(&mut self, now: Instant) -> Option<FrameSnapshot> {
        let handle = self.pending?;
        match self.scheduler.tick(handle, now) {
            TickOutcome::Frame(position) => {
                self.show(position);
            }
            TickOutcome::Finished(position) => {
                self.pending = None;
                self.show(position);
            }
            TickOutcome::Stale => {
                self.pending = None;
                return None;
            }
        }
        Some(self.snapshot())
    }

    /// The frame for the current state, without advancing time
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(
            &self.play,
            self.scheduler.position(),
            self.scheduler.is_playing(),
            self.scheduler.speed(),
        )
    }

    fn show(&mut self, position: FramePosition) {
        if let Err(err) = self.play.select_keyframe(position.index) {
            warn!(%err, index = position.index, "published frame outside the keyframe sequence");
        }
    }

    fn stop_for_edit(&mut self) {
        if self.scheduler.is_playing() {
            debug!("stopping playback before structural edit");
            self.pause();
        }
    }

    fn park_on_current(&mut self) {
        self.scheduler.seek(self.play.current_index());
    }

    // ========================================================================
    // Editing
    // ========================================================================

    pub fn add_player(&mut self, team: Team) -> PlayerId {
        self.play.add_player(team)
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Result<()> {
        self.stop_for_edit();
        self.play.remove_player(id).map(|_| ())
    }

    pub fn toggle_ball(&mut self, id: PlayerId) -> Result<()> {
        self.play.toggle_ball(id)
    }

    pub fn select_player(&mut self, id: Option<PlayerId>) -> Result<()> {
        self.play.select_player(id)
    }

    pub fn add_keyframe(&mut self) -> KeyframeId {
        self.stop_for_edit();
        let id = self.play.add_keyframe();
        self.park_on_current();
        id
    }

    /// Delete a keyframe, stopping playback first if it is running or the
    /// keyframe is the one on screen
    pub fn delete_keyframe(&mut self, index: usize) -> Result<()> {
        if self.scheduler.is_playing() || index == self.play.current_index() {
            self.pending = None;
            self.scheduler.stop();
        }
        self.play.delete_keyframe(index)?;
        self.park_on_current();
        Ok(())
    }

    pub fn select_keyframe(&mut self, index: usize) -> Result<()> {
        self.stop_for_edit();
        self.play.select_keyframe(index)?;
        self.park_on_current();
        Ok(())
    }

    /// Set a player's position in a keyframe without clamping
    pub fn place_player(&mut self, index: usize, id: PlayerId, point: FieldPoint) -> Result<()> {
        self.play.place_player(index, id, point)
    }

    /// Pointer down. Ignored while playing.
    pub fn begin_drag(&mut self, point: FieldPoint) -> Option<PlayerId> {
        if self.scheduler.is_playing() {
            return None;
        }
        self.play.begin_drag(point)
    }

    /// Pointer move. Ignored while playing.
    pub fn drag_to(&mut self, point: FieldPoint) -> Option<FieldPoint> {
        if self.scheduler.is_playing() {
            return None;
        }
        self.play.drag_to(point)
    }

    pub fn end_drag(&mut self) {
        self.play.end_drag();
    }

    pub fn resize(&mut self, size: FieldSize) {
        self.play.resize(size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn two_keyframe_session() -> (PlaybackSession, PlayerId) {
        let mut play = Play::default();
        let p = play.add_player(Team::Attack);
        play.add_keyframe();
        play.place_player(1, p, FieldPoint::new(400.0, 250.0)).unwrap();
        (PlaybackSession::new(play), p)
    }

    #[test]
    fn test_start_resets_to_first_keyframe() {
        let (mut session, _) = two_keyframe_session();
        assert_eq!(session.play().current_index(), 1);

        assert!(session.start(Instant::now()));
        assert_eq!(session.play().current_index(), 0);
        assert!(session.wants_frames());
    }

    #[test]
    fn test_out_of_range_frame_keeps_selection() {
        let (mut session, _) = two_keyframe_session();
        session.show(FramePosition {
            index: 1,
            fraction: 0.0,
        });
        assert_eq!(session.play().current_index(), 1);

        session.show(FramePosition {
            index: 7,
            fraction: 0.0,
        });
        assert_eq!(session.play().current_index(), 1);
    }

    #[test]
    fn test_single_keyframe_cannot_start() {
        let mut session = PlaybackSession::new(Play::default());
        assert!(!session.start(Instant::now()));
        assert!(!session.is_playing());
        assert_eq!(session.position(), FramePosition::START);
        assert!(session.on_frame(Instant::now()).is_none());
    }

    #[test]
    fn test_pause_drops_pending_tick() {
        let (mut session, _) = two_keyframe_session();
        let t0 = Instant::now();
        session.start(t0);
        session.on_frame(t0 + Duration::from_millis(500));

        session.pause();
        assert!(!session.wants_frames());
        assert!(session.on_frame(t0 + Duration::from_millis(800)).is_none());
        assert!((session.position().fraction - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_drag_ignored_while_playing() {
        let (mut session, _) = two_keyframe_session();
        session.start(Instant::now());
        assert_eq!(session.begin_drag(FieldPoint::new(240.0, 250.0)), None);
    }

    #[test]
    fn test_remove_player_stops_playback() {
        let (mut session, p) = two_keyframe_session();
        session.start(Instant::now());

        session.remove_player(p).unwrap();
        assert!(!session.is_playing());
        assert!(!session.wants_frames());
        assert!(session.play().roster().is_empty());
    }

    #[test]
    fn test_add_keyframe_parks_on_new_keyframe() {
        let (mut session, _) = two_keyframe_session();
        session.start(Instant::now());

        session.add_keyframe();
        assert!(!session.is_playing());
        assert_eq!(session.position(), FramePosition { index: 2, fraction: 0.0 });
        assert_eq!(session.play().current_index(), 2);
    }
}
