//! Game room management.

use std::collections::HashMap;
use tecnopoly_core::{
    Board, CardDecks, GameAction, GameConfig, GameError, GameEvent, GameState, MAX_PLAYERS,
    MIN_PLAYERS,
};
use thiserror::Error;
use tokio::task::AbortHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::protocol::{PlayerInfo, RoomInfo, RoomStatus};

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room is full")]
    RoomFull,

    #[error("Player not in room")]
    PlayerNotInRoom,

    #[error("Not the host")]
    NotHost,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Not enough players")]
    NotEnoughPlayers,

    #[error("Game not started")]
    GameNotStarted,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// A player in a game room.
#[derive(Debug, Clone)]
pub struct RoomPlayer {
    pub id: Uuid,
    pub name: String,
    pub ready: bool,
    pub connected: bool,
    /// Seat in the game, assigned when the game starts
    pub game_index: Option<u8>,
}

impl RoomPlayer {
    pub fn new(id: Uuid, name: String) -> Self {
        Self {
            id,
            name,
            ready: false,
            connected: true,
            game_index: None,
        }
    }

    pub fn to_info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            ready: self.ready,
            connected: self.connected,
        }
    }
}

/// Everything clients need to see after an action.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub events: Vec<GameEvent>,
    pub state: serde_json::Value,
    pub valid_actions: Vec<serde_json::Value>,
    pub current_player: usize,
    pub winner: Option<(usize, String)>,
    pub standings: Vec<serde_json::Value>,
}

/// A game room that can hold multiple players.
pub struct GameRoom {
    pub id: Uuid,
    pub name: String,
    pub max_players: u8,
    pub host_id: Uuid,
    pub status: RoomStatus,
    pub players: HashMap<Uuid, RoomPlayer>,
    /// Order of players for turn taking
    pub player_order: Vec<Uuid>,
    /// The game state (once started)
    pub game: Option<GameState>,
    /// The pending pacing timer, if any
    timer: Option<AbortHandle>,
}

impl GameRoom {
    pub fn new(id: Uuid, host_id: Uuid, host_name: String, max_players: u8) -> Self {
        let mut players = HashMap::new();
        players.insert(host_id, RoomPlayer::new(host_id, host_name.clone()));

        Self {
            id,
            name: format!("{}'s Game", host_name),
            max_players: max_players.clamp(MIN_PLAYERS as u8, MAX_PLAYERS as u8),
            host_id,
            status: RoomStatus::Waiting,
            players,
            player_order: vec![host_id],
            game: None,
            timer: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }

    pub fn add_player(&mut self, player_id: Uuid, name: String) -> Result<(), RoomError> {
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.is_full() {
            return Err(RoomError::RoomFull);
        }

        self.players.insert(player_id, RoomPlayer::new(player_id, name));
        self.player_order.push(player_id);
        Ok(())
    }

    pub fn remove_player(&mut self, player_id: Uuid) -> Result<bool, RoomError> {
        if !self.players.contains_key(&player_id) {
            return Err(RoomError::PlayerNotInRoom);
        }

        self.players.remove(&player_id);
        self.player_order.retain(|&id| id != player_id);

        // If host left, assign new host
        if player_id == self.host_id && !self.player_order.is_empty() {
            self.host_id = self.player_order[0];
        }

        // Return true if room is now empty
        Ok(self.players.is_empty())
    }

    pub fn set_player_connected(&mut self, player_id: Uuid, connected: bool) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.connected = connected;
        }
    }

    pub fn start_game(
        &mut self,
        requester_id: Uuid,
        board: Board,
        config: GameConfig,
    ) -> Result<(), RoomError> {
        if requester_id != self.host_id {
            return Err(RoomError::NotHost);
        }
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(RoomError::NotEnoughPlayers);
        }

        // Assign game indices to players
        for (idx, &player_id) in self.player_order.iter().enumerate() {
            if let Some(player) = self.players.get_mut(&player_id) {
                player.game_index = Some(idx as u8);
            }
        }

        // Create player names in order
        let player_names: Vec<String> = self
            .player_order
            .iter()
            .filter_map(|id| self.players.get(id).map(|p| p.name.clone()))
            .collect();

        self.game = Some(GameState::with_config(
            player_names,
            board,
            CardDecks::standard(),
            config,
        )?);
        self.status = RoomStatus::InGame;
        info!(room = %self.id, players = self.players.len(), "Game started");

        Ok(())
    }

    /// Apply an action sent by a player.
    pub fn apply_action(
        &mut self,
        player_id: Uuid,
        action: serde_json::Value,
    ) -> Result<Vec<GameEvent>, RoomError> {
        let game = self.game.as_ref().ok_or(RoomError::GameNotStarted)?;

        let player = self
            .players
            .get(&player_id)
            .ok_or(RoomError::PlayerNotInRoom)?;

        let game_index = player.game_index.ok_or(RoomError::PlayerNotInRoom)?;

        // Check if it's this player's turn
        if game.current_player() != game_index {
            return Err(RoomError::NotYourTurn);
        }

        // Parse and apply action
        let action: GameAction = serde_json::from_value(action)
            .map_err(|e| RoomError::InvalidAction(e.to_string()))?;

        self.apply_for(game_index, action)
    }

    /// Apply an action on behalf of whoever's turn it is. Used by the
    /// pacing timers.
    pub fn apply_system_action(&mut self, action: GameAction) -> Result<Vec<GameEvent>, RoomError> {
        let current = self
            .game
            .as_ref()
            .ok_or(RoomError::GameNotStarted)?
            .current_player();
        self.apply_for(current, action)
    }

    fn apply_for(&mut self, seat: u8, action: GameAction) -> Result<Vec<GameEvent>, RoomError> {
        let game = self.game.as_mut().ok_or(RoomError::GameNotStarted)?;
        let events = game.apply_action(seat, action)?;

        // Check if game is finished
        if game.is_finished() {
            self.status = RoomStatus::Finished;
            self.cancel_timer();
        }

        Ok(events)
    }

    pub fn get_game_state(&self) -> Option<serde_json::Value> {
        self.game
            .as_ref()
            .and_then(|g| serde_json::to_value(g).ok())
    }

    pub fn get_valid_actions(&self) -> Option<Vec<serde_json::Value>> {
        self.game.as_ref().map(|g| {
            g.valid_actions(g.current_player())
                .into_iter()
                .filter_map(|a| serde_json::to_value(a).ok())
                .collect()
        })
    }

    pub fn get_current_player(&self) -> Option<usize> {
        self.game.as_ref().map(|g| g.current_player() as usize)
    }

    pub fn get_winner(&self) -> Option<(usize, String)> {
        let game = self.game.as_ref()?;
        let winner = game.winner()?;
        let name = game.get_player(winner)?.name.clone();
        Some((winner as usize, name))
    }

    /// Snapshot of the game after an action produced `events`.
    pub fn outcome(&self, events: Vec<GameEvent>) -> Option<ActionOutcome> {
        let game = self.game.as_ref()?;
        Some(ActionOutcome {
            events,
            state: self.get_game_state()?,
            valid_actions: self.get_valid_actions()?,
            current_player: game.current_player() as usize,
            winner: self.get_winner(),
            standings: game
                .standings()
                .into_iter()
                .filter_map(|s| serde_json::to_value(s).ok())
                .collect(),
        })
    }

    // ==================== Pacing Timer ====================

    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Replace the pending timer, aborting the old one.
    pub fn set_timer(&mut self, handle: AbortHandle) {
        self.cancel_timer();
        self.timer = Some(handle);
    }

    /// Abort the pending timer.
    pub fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            debug!(room = %self.id, "Pacing timer cancelled");
            handle.abort();
        }
    }

    /// Forget the pending timer without aborting it. Called by the timer
    /// task itself once it fires.
    pub fn clear_timer(&mut self) {
        self.timer = None;
    }

    pub fn to_info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id,
            name: self.name.clone(),
            players: self
                .player_order
                .iter()
                .filter_map(|id| self.players.get(id).map(|p| p.to_info()))
                .collect(),
            max_players: self.max_players,
            host_id: self.host_id,
            status: self.status,
        }
    }
}

impl Drop for GameRoom {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
