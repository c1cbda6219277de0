//! Board representation: the loop of tiles and their static rules.
//!
//! This module contains:
//! - Tile types (artefacts, events, questions, tax, thief, treasure, start)
//! - The per-tile rule table (cost, rent, tax)
//! - Movement around the loop, including passing the start tile

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Player identifier (0-5)
pub type PlayerId = u8;

/// Position of a tile on the board loop
pub type TileIndex = u8;

/// Type of a board tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    /// Tech artefact that can be bought and charges rent
    Property,
    /// Random event card
    Chance,
    /// Tech question card
    CommunityChest,
    /// Pay a fixed tax to the bank
    Tax,
    /// Thief: lose an artefact or sit out several turns
    GoToJail,
    /// Repair centre, nothing happens here
    Jail,
    /// Treasure: jump to any unowned artefact
    FreeParking,
    /// Start tile, pays the salary
    Go,
}

impl TileType {
    /// Display name used when a tile is configured without one
    pub fn default_name(&self, index: TileIndex) -> String {
        match self {
            TileType::Property => format!("Artefact {}", index),
            TileType::Chance => "Random Event".to_string(),
            TileType::CommunityChest => "Tech Question".to_string(),
            TileType::Tax => "Tech Tax".to_string(),
            TileType::GoToJail => "Tech Thief".to_string(),
            TileType::Jail => "Repair Centre".to_string(),
            TileType::FreeParking => "Tech Treasure".to_string(),
            TileType::Go => "Start".to_string(),
        }
    }
}

/// A single tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Unique position on the loop
    pub index: TileIndex,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// What happens when a token lands here
    pub tile_type: TileType,
    /// Purchase price (properties only)
    #[serde(default)]
    pub cost: u32,
    /// Rent charged to visitors; 0 means a random amount is rolled
    #[serde(default)]
    pub rent: u32,
    /// Tax charged on landing; 0 means the configured default
    #[serde(default)]
    pub tax_amount: u32,
}

impl Tile {
    /// Create a purchasable artefact tile
    pub fn property(index: TileIndex, name: &str, cost: u32, rent: u32) -> Self {
        Self {
            index,
            name: name.to_string(),
            tile_type: TileType::Property,
            cost,
            rent,
            tax_amount: 0,
        }
    }

    /// Create a tax tile
    pub fn tax(index: TileIndex, tax_amount: u32) -> Self {
        Self {
            index,
            name: TileType::Tax.default_name(index),
            tile_type: TileType::Tax,
            cost: 0,
            rent: 0,
            tax_amount,
        }
    }

    /// Create a tile with no economic parameters
    pub fn special(index: TileIndex, tile_type: TileType) -> Self {
        Self {
            index,
            name: tile_type.default_name(index),
            tile_type,
            cost: 0,
            rent: 0,
            tax_amount: 0,
        }
    }

    /// Whether this tile can be owned
    pub fn is_purchasable(&self) -> bool {
        matches!(self.tile_type, TileType::Property)
    }

    /// Tax to charge, falling back to `default` when none is configured
    pub fn effective_tax(&self, default: u32) -> u32 {
        if self.tax_amount > 0 {
            self.tax_amount
        } else {
            default
        }
    }
}

/// Errors raised while building a board
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Board has no tiles")]
    Empty,

    #[error("Tile index {0} appears more than once")]
    DuplicateIndex(TileIndex),

    #[error("Tile indices must be contiguous: expected {expected}, found {found}")]
    IndexGap { expected: usize, found: TileIndex },

    #[error("Board has too many tiles ({0})")]
    TooLarge(usize),

    #[error("Tile 0 must be the start tile, found {0:?}")]
    StartNotFirst(TileType),

    #[error("Only tile 0 may be a start tile, found another at {0}")]
    ExtraStart(TileIndex),

    #[error("Invalid board file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The result of walking a token around the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: TileIndex,
    pub to: TileIndex,
    /// Signed number of steps taken
    pub steps: i32,
    /// Whether the walk wrapped past the start tile going forward
    pub passed_go: bool,
}

/// The board loop
///
/// Tiles are stored by index, so `tiles[i].index == i` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Board {
    /// Build a board from tiles in any order
    pub fn from_tiles(mut tiles: Vec<Tile>) -> Result<Self, BoardError> {
        if tiles.is_empty() {
            return Err(BoardError::Empty);
        }
        if tiles.len() > TileIndex::MAX as usize + 1 {
            return Err(BoardError::TooLarge(tiles.len()));
        }

        let mut seen = HashSet::new();
        for tile in &tiles {
            if !seen.insert(tile.index) {
                return Err(BoardError::DuplicateIndex(tile.index));
            }
        }

        tiles.sort_by_key(|t| t.index);
        for (expected, tile) in tiles.iter_mut().enumerate() {
            if tile.index as usize != expected {
                return Err(BoardError::IndexGap {
                    expected,
                    found: tile.index,
                });
            }
            if tile.name.trim().is_empty() {
                tile.name = tile.tile_type.default_name(tile.index);
            }
        }

        // Passing and landing on the start tile are both measured from index 0
        if tiles[0].tile_type != TileType::Go {
            return Err(BoardError::StartNotFirst(tiles[0].tile_type));
        }
        if let Some(extra) = tiles[1..].iter().find(|t| t.tile_type == TileType::Go) {
            return Err(BoardError::ExtraStart(extra.index));
        }

        Ok(Self { tiles })
    }

    /// Load a board from a JSON array of tiles
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        let tiles: Vec<Tile> = serde_json::from_str(json)?;
        Self::from_tiles(tiles)
    }

    /// The standard 24-tile board
    pub fn standard() -> Self {
        use TileType::*;

        let tiles = vec![
            Tile::special(0, Go),
            Tile::property(1, "Abacus", 60, 20),
            Tile::special(2, CommunityChest),
            Tile::property(3, "Punch Card", 60, 20),
            Tile::tax(4, 100),
            Tile::property(5, "Vacuum Tube", 100, 25),
            Tile::special(6, Jail),
            Tile::property(7, "Transistor", 120, 25),
            Tile::special(8, Chance),
            Tile::property(9, "Microchip", 140, 30),
            Tile::property(10, "Floppy Disk", 160, 30),
            Tile::special(11, CommunityChest),
            Tile::special(12, FreeParking),
            Tile::property(13, "Personal Computer", 180, 35),
            Tile::special(14, Chance),
            Tile::property(15, "Modem", 200, 35),
            Tile::property(16, "Mobile Phone", 220, 40),
            Tile::tax(17, 0),
            Tile::special(18, GoToJail),
            Tile::property(19, "Smartphone", 260, 45),
            Tile::special(20, CommunityChest),
            Tile::property(21, "Quantum Computer", 300, 0),
            Tile::special(22, Chance),
            Tile::property(23, "Neural Interface", 350, 0),
        ];

        Self { tiles }
    }

    /// Number of tiles on the loop
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// A validated board is never empty
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Look up a tile by index
    pub fn get(&self, index: TileIndex) -> Option<&Tile> {
        self.tiles.get(index as usize)
    }

    /// All tiles in loop order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of tiles that can be bought
    pub fn purchasable_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_purchasable()).count()
    }

    /// Indices of all purchasable tiles
    pub fn property_indices(&self) -> Vec<TileIndex> {
        self.tiles
            .iter()
            .filter(|t| t.is_purchasable())
            .map(|t| t.index)
            .collect()
    }

    /// Walk `steps` tiles from `from`, wrapping around the loop
    pub fn step(&self, from: TileIndex, steps: i32) -> Move {
        let len = self.tiles.len() as i64;
        let raw = from as i64 + steps as i64;
        let to = raw.rem_euclid(len) as TileIndex;

        Move {
            from,
            to,
            steps,
            passed_go: steps > 0 && raw >= len,
        }
    }

    /// Steps needed to walk forward from `from` to `to`
    pub fn distance_forward(&self, from: TileIndex, to: TileIndex) -> i32 {
        let len = self.tiles.len() as i32;
        (to as i32 - from as i32).rem_euclid(len)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<Tile>> for Board {
    type Error = BoardError;

    fn try_from(tiles: Vec<Tile>) -> Result<Self, Self::Error> {
        Self::from_tiles(tiles)
    }
}

impl From<Board> for Vec<Tile> {
    fn from(board: Board) -> Self {
        board.tiles
    }
}
