//! End-of-game ranking.
//!
//! Players are ranked by the number of artefacts they own, then by credits,
//! then by seat order.

use crate::board::PlayerId;
use crate::player::Player;
use serde::{Deserialize, Serialize};

/// One line of the final table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player: PlayerId,
    pub properties: usize,
    pub credits: i64,
    pub bankrupt: bool,
}

/// Rank all players, best first. Bankrupt players always rank last.
pub fn rank_players(players: &[Player]) -> Vec<Standing> {
    let mut standings: Vec<Standing> = players
        .iter()
        .map(|p| Standing {
            player: p.id,
            properties: p.property_count(),
            credits: p.credits,
            bankrupt: p.bankrupt,
        })
        .collect();

    standings.sort_by(|a, b| {
        a.bankrupt
            .cmp(&b.bankrupt)
            .then(b.properties.cmp(&a.properties))
            .then(b.credits.cmp(&a.credits))
            .then(a.player.cmp(&b.player))
    });

    standings
}

/// The winning player, if there are any players
pub fn determine_winner(players: &[Player]) -> Option<PlayerId> {
    rank_players(players).first().map(|s| s.player)
}
