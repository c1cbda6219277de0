//! Game configuration.
//!
//! Every field has a default, so a config file only needs to list the values
//! it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fewest players a game can start with
pub const MIN_PLAYERS: usize = 2;

/// Most players a game can start with
pub const MAX_PLAYERS: usize = 6;

/// When a flagged player forfeits their turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkipPolicy {
    /// The flag is checked when the player tries to roll. The turn passes to
    /// the next player without rolling, one flagged player per attempt.
    #[default]
    OnRollAttempt,
    /// The flag is checked while ending a turn. The sequencer keeps stepping
    /// past flagged players until it reaches one who may play.
    OnAdvance,
}

/// What happens when a charge exceeds a player's balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebtPolicy {
    /// Balances may go negative
    #[default]
    AllowDebt,
    /// A charge takes at most what the player has
    ClampAtZero,
    /// A negative balance bankrupts the player and removes them from play
    Eliminate,
}

/// Tunable rules of a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Credits each player starts with
    pub initial_credits: i64,
    /// Paid when landing on the start tile
    pub salary: u32,
    /// Also pay the salary when a token walks past the start tile
    pub salary_on_pass: bool,
    /// Tax charged by tax tiles that don't set their own amount
    pub default_tax: u32,
    /// Lower bound of the random rent for tiles without a fixed rent
    pub random_rent_min: u32,
    /// Upper bound (inclusive) of the random rent
    pub random_rent_max: u32,
    /// Paid by every other player for a "collect from all" card
    pub collect_from_all_amount: u32,
    /// Number of dice rolled per turn
    pub dice_count: u8,
    /// Turns lost when choosing to sit out after meeting the thief
    pub thief_skip_turns: u8,
    pub skip_policy: SkipPolicy,
    pub debt_policy: DebtPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_credits: 1000,
            salary: 200,
            salary_on_pass: false,
            default_tax: 100,
            random_rent_min: 20,
            random_rent_max: 50,
            collect_from_all_amount: 20,
            dice_count: 2,
            thief_skip_turns: 3,
            skip_policy: SkipPolicy::default(),
            debt_policy: DebtPolicy::default(),
        }
    }
}

/// Errors raised while loading a config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a playable game
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dice_count == 0 {
            return Err(ConfigError::Invalid("dice_count must be at least 1".into()));
        }
        if self.random_rent_min > self.random_rent_max {
            return Err(ConfigError::Invalid(format!(
                "random_rent_min ({}) exceeds random_rent_max ({})",
                self.random_rent_min, self.random_rent_max
            )));
        }
        Ok(())
    }
}
