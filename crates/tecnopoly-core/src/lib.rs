//! Tecnopoly - a tech-artefact trading board game engine
//!
//! This crate provides the core game logic for Tecnopoly, including:
//! - The board: a loop of tiles with artefacts, taxes, cards and specials
//! - Player accounts and the artefact ownership registry
//! - Event cards and tech questions
//! - Game state machine with full rule enforcement
//!
//! # Architecture
//!
//! The game engine is platform-agnostic. It can be compiled to:
//! - Native Rust for server-side game hosting
//! - WebAssembly for client-side local multiplayer
//!
//! Presentation layers drive the engine with [`GameAction`]s and render the
//! [`GameEvent`]s it returns. Token animation lives outside the engine: a
//! roll puts the game in [`GamePhase::Moving`] and the caller reports arrival
//! with [`GameAction::CompleteMovement`].
//!
//! # Modules
//!
//! - [`board`]: Tile rule table and movement around the loop
//! - [`player`]: Player accounts
//! - [`ownership`]: Which player owns which artefact
//! - [`cards`]: Event, reward and question decks
//! - [`dice`]: Dice rolls
//! - [`turn`]: Turn order
//! - [`game`]: Game state machine
//! - [`scoring`]: End-of-game ranking
//! - [`config`]: Tunable rules

pub mod actions;
pub mod board;
pub mod cards;
pub mod config;
pub mod dice;
pub mod game;
pub mod ownership;
pub mod player;
pub mod scoring;
pub mod turn;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent, ThiefPenalty};
pub use board::{Board, BoardError, Move, PlayerId, Tile, TileIndex, TileType};
pub use cards::{Card, CardDecks, CardError, CardKind, QuestionCard};
pub use config::{ConfigError, DebtPolicy, GameConfig, SkipPolicy, MAX_PLAYERS, MIN_PLAYERS};
pub use dice::DiceRoll;
pub use game::{GameError, GamePhase, GameState};
pub use ownership::OwnershipRegistry;
pub use player::Player;
pub use scoring::Standing;
pub use turn::TurnSequencer;
