//! Server configuration from the environment.

use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;
use tecnopoly_core::{Board, GameConfig};

use crate::pacing::Pacing;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STEP_DELAY_MS: u64 = 300;
const DEFAULT_TURN_DELAY_MS: u64 = 1500;

/// Everything the server needs to host games.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Rules for every new game
    pub game: GameConfig,
    /// Board for every new game
    pub board: Board,
    pub pacing: Pacing,
}

impl ServerConfig {
    /// Read `SERVER_ADDR`, `TECNOPOLY_CONFIG`, `TECNOPOLY_BOARD`,
    /// `TECNOPOLY_STEP_DELAY_MS` and `TECNOPOLY_TURN_DELAY_MS`.
    pub fn from_env() -> anyhow::Result<Self> {
        let addr = std::env::var("SERVER_ADDR")
            .unwrap_or_else(|_| DEFAULT_ADDR.into())
            .parse()
            .context("SERVER_ADDR is not a socket address")?;

        let game = match std::env::var("TECNOPOLY_CONFIG") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read game config {}", path))?;
                GameConfig::from_json(&json)
                    .with_context(|| format!("Failed to load game config {}", path))?
            }
            Err(_) => GameConfig::default(),
        };

        let board = match std::env::var("TECNOPOLY_BOARD") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read board {}", path))?;
                Board::from_json(&json).with_context(|| format!("Failed to load board {}", path))?
            }
            Err(_) => Board::standard(),
        };

        let pacing = Pacing {
            step_delay: parse_millis(
                std::env::var("TECNOPOLY_STEP_DELAY_MS").ok(),
                DEFAULT_STEP_DELAY_MS,
            )
            .context("TECNOPOLY_STEP_DELAY_MS")?,
            turn_delay: parse_millis(
                std::env::var("TECNOPOLY_TURN_DELAY_MS").ok(),
                DEFAULT_TURN_DELAY_MS,
            )
            .context("TECNOPOLY_TURN_DELAY_MS")?,
        };

        Ok(Self {
            addr,
            game,
            board,
            pacing,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            game: GameConfig::default(),
            board: Board::standard(),
            pacing: Pacing {
                step_delay: Duration::from_millis(DEFAULT_STEP_DELAY_MS),
                turn_delay: Duration::from_millis(DEFAULT_TURN_DELAY_MS),
            },
        }
    }
}

fn parse_millis(value: Option<String>, default: u64) -> anyhow::Result<Duration> {
    match value {
        Some(v) => Ok(Duration::from_millis(
            v.trim().parse().context("expected milliseconds")?,
        )),
        None => Ok(Duration::from_millis(default)),
    }
}
