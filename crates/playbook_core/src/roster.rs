//! Player roster
//!
//! Players carry identity only. Where a player stands lives in each keyframe.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! {
    /// Stable identifier for a player
    pub struct PlayerId;
}

/// Which side a player is on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Attack,
    Defense,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Attack => f.write_str("attack"),
            Team::Defense => f.write_str("defense"),
        }
    }
}

/// A player token
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub team: Team,
    /// Shirt number, sequential within the team
    pub number: u32,
}

/// Ordered set of players
///
/// Numbers are handed out from a per-team counter, so removing a player
/// never renumbers the others and never causes a number to be reused.
#[derive(Debug, Default)]
pub struct Roster {
    players: SlotMap<PlayerId, Player>,
    order: Vec<PlayerId>,
    issued: FxHashMap<Team, u32>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player to the given team
    pub fn add(&mut self, team: Team) -> PlayerId {
        let issued = self.issued.entry(team).or_insert(0);
        *issued += 1;
        let number = *issued;

        let id = self.players.insert_with_key(|id| Player { id, team, number });
        self.order.push(id);
        id
    }

    /// Remove a player, returning it if it existed
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.players.remove(id)?;
        self.order.retain(|p| *p != id);
        Some(player)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(id)
    }

    /// Iterate players in the order they were added
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.order.iter().filter_map(|id| self.players.get(*id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
