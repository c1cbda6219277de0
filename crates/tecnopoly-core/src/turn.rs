//! Turn sequencing.

use crate::board::PlayerId;
use serde::{Deserialize, Serialize};

/// Whose turn it is and whether play has stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSequencer {
    current_player: PlayerId,
    player_count: u8,
    game_over: bool,
    /// Turn number (starts at 1)
    turn_number: u32,
}

impl TurnSequencer {
    /// Start with player 0. `player_count` must be at least 1.
    pub fn new(player_count: u8) -> Self {
        debug_assert!(player_count > 0);
        Self {
            current_player: 0,
            player_count,
            game_over: false,
            turn_number: 1,
        }
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn player_count(&self) -> u8 {
        self.player_count
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Freeze the sequencer
    pub fn finish(&mut self) {
        self.game_over = true;
    }

    /// Step to the next seat, whoever sits there
    pub fn advance(&mut self) -> PlayerId {
        if !self.game_over {
            self.current_player = (self.current_player + 1) % self.player_count;
            self.turn_number += 1;
        }
        self.current_player
    }

    /// Step at least once, then keep stepping until `eligible` accepts the
    /// seat. Gives up after one full lap and stays where it stopped.
    pub fn advance_until<F>(&mut self, mut eligible: F) -> PlayerId
    where
        F: FnMut(PlayerId) -> bool,
    {
        for _ in 0..self.player_count {
            let next = self.advance();
            if self.game_over || eligible(next) {
                break;
            }
        }
        self.current_player
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps() {
        let mut turns = TurnSequencer::new(3);
        assert_eq!(turns.advance(), 1);
        assert_eq!(turns.advance(), 2);
        assert_eq!(turns.advance(), 0);
        assert_eq!(turns.turn_number(), 4);
    }

    #[test]
    fn test_full_lap_returns_to_start() {
        for count in 1..=6u8 {
            let mut turns = TurnSequencer::new(count);
            turns.advance();
            let start = turns.current_player();
            for _ in 0..count {
                turns.advance();
            }
            assert_eq!(turns.current_player(), start);
        }
    }

    #[test]
    fn test_game_over_freezes_index() {
        let mut turns = TurnSequencer::new(4);
        turns.advance();
        turns.finish();
        assert_eq!(turns.advance(), 1);
        assert_eq!(turns.advance_until(|_| true), 1);
        assert!(turns.is_game_over());
    }

    #[test]
    fn test_advance_until_skips_ineligible() {
        let mut turns = TurnSequencer::new(4);
        let next = turns.advance_until(|p| p == 3);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_advance_until_gives_up_after_one_lap() {
        let mut turns = TurnSequencer::new(3);
        let mut calls = 0;
        turns.advance_until(|_| {
            calls += 1;
            false
        });
        assert_eq!(calls, 3);
        assert_eq!(turns.current_player(), 0);
    }
}
