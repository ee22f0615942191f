//! Position resolver
//!
//! Pure functions from `(play, keyframe index, fraction)` to on-field
//! coordinates. Positions are interpolated linearly between a keyframe and
//! its successor; possession switches discretely at the midpoint.

use playbook_core::{FieldPoint, Play, PlayerId};
use serde::{Deserialize, Serialize};

/// Fraction at which possession passes to the next keyframe's holder
pub const POSSESSION_SWITCH: f32 = 0.5;

/// Where a player is drawn and whether it carries the ball
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPosition {
    pub x: f32,
    pub y: f32,
    pub has_ball: bool,
}

impl ResolvedPosition {
    fn at(point: FieldPoint, has_ball: bool) -> Self {
        Self {
            x: point.x,
            y: point.y,
            has_ball,
        }
    }

    pub fn point(&self) -> FieldPoint {
        FieldPoint::new(self.x, self.y)
    }
}

/// Resolve a player's position `fraction` of the way from keyframe `index`
/// to the next one.
///
/// Missing keyframes or entries fall back to the field center without the
/// ball. At `fraction == 0` or on the last keyframe the stored position is
/// returned as is.
pub fn resolve(play: &Play, player: PlayerId, index: usize, fraction: f32) -> ResolvedPosition {
    let fallback = ResolvedPosition::at(play.field().center(), false);

    let Some(current) = play.keyframe(index).and_then(|kf| kf.position(player)) else {
        return fallback;
    };
    let raw = ResolvedPosition::at(current.point, current.has_ball);

    if fraction <= 0.0 || index >= play.last_index() {
        return raw;
    }

    let Some(next) = play.keyframe(index + 1).and_then(|kf| kf.position(player)) else {
        return raw;
    };

    let has_ball = if fraction < POSSESSION_SWITCH {
        current.has_ball
    } else {
        next.has_ball
    };
    ResolvedPosition::at(current.point.lerp(next.point, fraction), has_ball)
}

/// Resolve where the ball marker is drawn.
///
/// When the holder changes between keyframes the ball travels from the
/// outgoing holder's spot in keyframe `index` to the incoming holder's spot
/// in keyframe `index + 1`, rather than riding along either player's path.
/// Returns `None` when nobody holds the ball in keyframe `index`.
pub fn resolve_ball(play: &Play, index: usize, fraction: f32) -> Option<FieldPoint> {
    let holder = play.keyframe(index)?.ball_holder()?;
    play.player(holder.player)?;

    if fraction <= 0.0 || index >= play.last_index() {
        return Some(holder.point);
    }

    let receiver = play
        .keyframe(index + 1)
        .and_then(|kf| kf.ball_holder())
        .filter(|p| play.player(p.player).is_some());

    match receiver {
        Some(receiver) => Some(holder.point.lerp(receiver.point, fraction)),
        None => Some(resolve(play, holder.player, index, fraction).point()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook_core::Team;

    const EPSILON: f32 = 1e-4;

    /// One attacker moving (0,0) -> (100,0) -> (100,100)
    fn three_keyframe_play() -> (Play, PlayerId) {
        let mut play = Play::default();
        let p = play.add_player(Team::Attack);
        play.add_keyframe();
        play.add_keyframe();
        play.place_player(0, p, FieldPoint::new(0.0, 0.0)).unwrap();
        play.place_player(1, p, FieldPoint::new(100.0, 0.0)).unwrap();
        play.place_player(2, p, FieldPoint::new(100.0, 100.0)).unwrap();
        (play, p)
    }

    #[test]
    fn test_fraction_zero_is_raw() {
        let (play, p) = three_keyframe_play();
        let pos = resolve(&play, p, 1, 0.0);
        assert_eq!(pos.point(), play.keyframe(1).unwrap().position(p).unwrap().point);
    }

    #[test]
    fn test_last_keyframe_ignores_fraction() {
        let (play, p) = three_keyframe_play();
        let raw = play.keyframe(2).unwrap().position(p).unwrap().point;
        for f in [0.0, 0.3, 0.99] {
            assert_eq!(resolve(&play, p, 2, f).point(), raw);
        }
    }

    #[test]
    fn test_linear_between_keyframes() {
        let (play, p) = three_keyframe_play();
        let a = play.keyframe(0).unwrap().position(p).unwrap().point;
        let b = play.keyframe(1).unwrap().position(p).unwrap().point;

        for step in 0..=10 {
            let f = step as f32 / 10.0;
            let pos = resolve(&play, p, 0, f);
            assert!((pos.x - (a.x + f * (b.x - a.x))).abs() < EPSILON);
            assert!((pos.y - (a.y + f * (b.y - a.y))).abs() < EPSILON);
        }
    }

    #[test]
    fn test_missing_keyframe_falls_back_to_center() {
        let (play, p) = three_keyframe_play();
        let pos = resolve(&play, p, 7, 0.5);
        assert_eq!(pos.point(), play.field().center());
        assert!(!pos.has_ball);
    }

    #[test]
    fn test_possession_switches_at_midpoint() {
        let mut play = Play::default();
        let a = play.add_player(Team::Attack);
        let b = play.add_player(Team::Attack);
        play.toggle_ball(a).unwrap();
        play.add_keyframe();
        play.toggle_ball(b).unwrap();

        assert!(resolve(&play, a, 0, 0.49).has_ball);
        assert!(!resolve(&play, b, 0, 0.49).has_ball);
        assert!(!resolve(&play, a, 0, 0.5).has_ball);
        assert!(resolve(&play, b, 0, 0.5).has_ball);
    }

    #[test]
    fn test_ball_without_holder() {
        let (play, _) = three_keyframe_play();
        assert_eq!(resolve_ball(&play, 0, 0.5), None);
    }
}
