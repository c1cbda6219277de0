//! WebAssembly bindings for the Tecnopoly game engine.
//!
//! This module exposes the game engine to JavaScript through wasm-bindgen.
//! The page animates tokens itself and calls `applyAction` with
//! `"CompleteMovement"` once a token has arrived.

use wasm_bindgen::prelude::*;

use crate::actions::GameAction;
use crate::board::Board;
use crate::cards::CardDecks;
use crate::config::GameConfig;
use crate::game::GameState;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game on the standard board
    #[wasm_bindgen(constructor)]
    pub fn new(player_names_json: &str) -> Result<WasmGame, JsValue> {
        let player_names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid player names: {}", e)))?;

        let state = GameState::new(player_names).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmGame { state })
    }

    /// Create a game from JSON board, card and rule definitions.
    /// Empty strings fall back to the standard content.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        player_names_json: &str,
        board_json: &str,
        cards_json: &str,
        config_json: &str,
    ) -> Result<WasmGame, JsValue> {
        let err = |e: String| JsValue::from_str(&e);

        let player_names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| err(format!("Invalid player names: {}", e)))?;
        let board = if board_json.is_empty() {
            Board::standard()
        } else {
            Board::from_json(board_json).map_err(|e| err(e.to_string()))?
        };
        let decks = if cards_json.is_empty() {
            CardDecks::standard()
        } else {
            CardDecks::from_json(cards_json).map_err(|e| err(format!("Invalid cards: {}", e)))?
        };
        let config = if config_json.is_empty() {
            GameConfig::default()
        } else {
            GameConfig::from_json(config_json).map_err(|e| err(e.to_string()))?
        };

        let state = GameState::with_config(player_names, board, decks, config)
            .map_err(|e| err(e.to_string()))?;
        Ok(WasmGame { state })
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current player ID
    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> u8 {
        self.state.current_player()
    }

    /// Get valid actions for the current player as JSON array
    #[wasm_bindgen(js_name = getValidActions)]
    pub fn get_valid_actions(&self) -> String {
        let actions = self.state.valid_actions(self.state.current_player());
        serde_json::to_string(&actions).unwrap_or_else(|_| "[]".to_string())
    }

    /// Apply an action from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, player: u8, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;

        match self.state.apply_action(player, action) {
            Ok(events) => {
                Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
            }
            Err(e) => Err(JsValue::from_str(&format!("Action failed: {}", e))),
        }
    }

    /// Notification lines for a JSON event list, as shown to players
    #[wasm_bindgen(js_name = describeEvents)]
    pub fn describe_events(&self, events_json: &str) -> Result<String, JsValue> {
        let events: Vec<crate::actions::GameEvent> = serde_json::from_str(events_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid events JSON: {}", e)))?;
        let lines: Vec<String> = events.iter().map(|e| e.to_string()).collect();
        Ok(serde_json::to_string(&lines).unwrap_or_else(|_| "[]".to_string()))
    }

    /// Check if the game is finished
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Get the winner (if game is finished)
    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<u8> {
        self.state.winner()
    }

    /// Get a player's credit balance
    #[wasm_bindgen(js_name = getCredits)]
    pub fn get_credits(&self, player: u8) -> Option<i64> {
        self.state.credits(player)
    }

    /// Get the owner of a tile
    #[wasm_bindgen(js_name = getPropertyOwner)]
    pub fn get_property_owner(&self, tile: u8) -> Option<u8> {
        self.state.property_owner(tile)
    }

    /// Get the current standings as JSON
    #[wasm_bindgen(js_name = getStandings)]
    pub fn get_standings(&self) -> String {
        serde_json::to_string(&self.state.standings()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Get the current phase as a string
    #[wasm_bindgen(js_name = getPhase)]
    pub fn get_phase(&self) -> String {
        serde_json::to_string(&self.state.phase).unwrap_or_else(|_| "\"Unknown\"".to_string())
    }

    /// Get the last dice roll (if any)
    #[wasm_bindgen(js_name = getDiceRoll)]
    pub fn get_dice_roll(&self) -> Option<Vec<u8>> {
        self.state.dice_roll.as_ref().map(|roll| roll.values.clone())
    }

    /// Get board state as JSON (for rendering)
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> String {
        serde_json::to_string(&self.state.board).unwrap_or_else(|_| "[]".to_string())
    }

    /// Get a specific player's state as JSON
    #[wasm_bindgen(js_name = getPlayer)]
    pub fn get_player(&self, player: u8) -> String {
        if let Some(p) = self.state.get_player(player) {
            serde_json::to_string(p).unwrap_or_else(|_| "{}".to_string())
        } else {
            "null".to_string()
        }
    }
}
