//! Player accounts.
//!
//! Each player carries a credit balance, the set of tiles they own, their
//! token position and any turns they must sit out.

use crate::board::{PlayerId, TileIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player ID (seat order)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Credit balance, negative when in debt
    pub credits: i64,
    /// Tiles this player owns
    pub owned_tiles: BTreeSet<TileIndex>,
    /// Upcoming turns this player forfeits
    pub skip_turns: u8,
    /// Tile the token currently stands on
    pub position: TileIndex,
    /// Out of the game after going broke
    pub bankrupt: bool,
}

impl Player {
    /// Create a new player on the start tile
    pub fn new(id: PlayerId, name: String, credits: i64) -> Self {
        Self {
            id,
            name,
            credits,
            owned_tiles: BTreeSet::new(),
            skip_turns: 0,
            position: 0,
            bankrupt: false,
        }
    }

    /// Whether the next turn of this player is forfeited
    pub fn must_skip_next_turn(&self) -> bool {
        self.skip_turns > 0
    }

    /// Set or clear the forfeit flag for exactly one turn
    pub fn set_skip_next_turn(&mut self, skip: bool) {
        self.skip_turns = if skip { self.skip_turns.max(1) } else { 0 };
    }

    /// Add turns to sit out
    pub fn add_skipped_turns(&mut self, turns: u8) {
        self.skip_turns = self.skip_turns.saturating_add(turns);
    }

    /// Use up one forfeited turn, returning whether there was one
    pub fn consume_skip(&mut self) -> bool {
        if self.skip_turns > 0 {
            self.skip_turns -= 1;
            true
        } else {
            false
        }
    }

    /// Add (or with a negative amount, remove) credits
    pub fn add_credits(&mut self, amount: i64) {
        self.credits += amount;
    }

    /// Whether the balance covers `cost`
    pub fn can_afford(&self, cost: u32) -> bool {
        self.credits >= cost as i64
    }

    /// Number of tiles owned
    pub fn property_count(&self) -> usize {
        self.owned_tiles.len()
    }

    /// Whether this player owns `tile`
    pub fn owns(&self, tile: TileIndex) -> bool {
        self.owned_tiles.contains(&tile)
    }

    /// Whether this player still takes turns
    pub fn is_active(&self) -> bool {
        !self.bankrupt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player() {
        let player = Player::new(2, "Ada".to_string(), 1000);
        assert_eq!(player.credits, 1000);
        assert_eq!(player.position, 0);
        assert_eq!(player.property_count(), 0);
        assert!(!player.must_skip_next_turn());
        assert!(player.is_active());
    }

    #[test]
    fn test_credits_can_go_negative() {
        let mut player = Player::new(0, "Ada".to_string(), 50);
        assert!(player.can_afford(50));
        assert!(!player.can_afford(51));

        player.add_credits(-80);
        assert_eq!(player.credits, -30);
        assert!(!player.can_afford(0));
    }

    #[test]
    fn test_skip_flag() {
        let mut player = Player::new(0, "Ada".to_string(), 0);

        player.set_skip_next_turn(true);
        assert!(player.must_skip_next_turn());
        assert_eq!(player.skip_turns, 1);

        // Setting again does not stack
        player.set_skip_next_turn(true);
        assert_eq!(player.skip_turns, 1);

        player.set_skip_next_turn(false);
        assert!(!player.must_skip_next_turn());
    }

    #[test]
    fn test_multi_turn_skip() {
        let mut player = Player::new(0, "Ada".to_string(), 0);
        player.add_skipped_turns(3);

        assert!(player.consume_skip());
        assert!(player.consume_skip());
        assert!(player.must_skip_next_turn());
        assert!(player.consume_skip());
        assert!(!player.consume_skip());
    }
}
