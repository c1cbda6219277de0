//! Dice rolls.

use crate::game::GameError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Faces on a die
pub const DIE_FACES: u8 = 6;

/// The faces shown by one roll of all dice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub values: Vec<u8>,
}

impl DiceRoll {
    /// Roll `count` six-sided dice
    pub fn roll<R: Rng>(count: u8, rng: &mut R) -> Self {
        let values = (0..count).map(|_| rng.gen_range(1..=DIE_FACES)).collect();
        Self { values }
    }

    /// Accept faces rolled elsewhere (a physical roll, a replay, a test)
    pub fn from_values(values: Vec<u8>, expected_count: u8) -> Result<Self, GameError> {
        if values.len() != expected_count as usize {
            return Err(GameError::InvalidDice);
        }
        if values.iter().any(|&v| !(1..=DIE_FACES).contains(&v)) {
            return Err(GameError::InvalidDice);
        }
        Ok(Self { values })
    }

    /// Sum of all faces
    pub fn total(&self) -> u32 {
        self.values.iter().map(|&v| v as u32).sum()
    }
}
