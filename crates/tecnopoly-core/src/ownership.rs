//! Ownership registry: which player owns which tile.
//!
//! The registry is the lookup side of ownership. Each player's
//! `owned_tiles` set is the other side; `GameState` updates both together.

use crate::board::{PlayerId, TileIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping from tile to owning player. Absent tiles belong to the bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRegistry {
    owners: HashMap<TileIndex, PlayerId>,
}

impl OwnershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner of `tile`, if anyone
    pub fn owner_of(&self, tile: TileIndex) -> Option<PlayerId> {
        self.owners.get(&tile).copied()
    }

    pub fn is_owned(&self, tile: TileIndex) -> bool {
        self.owners.contains_key(&tile)
    }

    /// Record `player` as owner of `tile`, returning the previous owner
    pub fn assign(&mut self, tile: TileIndex, player: PlayerId) -> Option<PlayerId> {
        self.owners.insert(tile, player)
    }

    /// Return `tile` to the bank, returning who owned it
    pub fn release(&mut self, tile: TileIndex) -> Option<PlayerId> {
        self.owners.remove(&tile)
    }

    /// Tiles owned by `player`, sorted
    pub fn tiles_of(&self, player: PlayerId) -> Vec<TileIndex> {
        let mut tiles: Vec<TileIndex> = self
            .owners
            .iter()
            .filter(|(_, &owner)| owner == player)
            .map(|(&tile, _)| tile)
            .collect();
        tiles.sort_unstable();
        tiles
    }

    /// Number of owned tiles
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Iterate over `(tile, owner)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (TileIndex, PlayerId)> + '_ {
        self.owners.iter().map(|(&tile, &owner)| (tile, owner))
    }
}
