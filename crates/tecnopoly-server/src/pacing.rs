//! Timed automatic actions.
//!
//! Token walks and the pause between turns happen on the server clock. After
//! every applied action the room is asked what it waits for; a token in
//! motion is completed after `steps × step_delay`, a finished turn is ended
//! after `turn_delay`. Each room holds at most one pending timer.

use std::sync::Arc;
use std::time::Duration;
use tecnopoly_core::{GameAction, GamePhase};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::server::{broadcast_outcome, ServerState};

/// Delays between automatic actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Time per tile walked
    pub step_delay: Duration,
    /// Pause before the next player's turn
    pub turn_delay: Duration,
}

impl Pacing {
    /// The automatic action due in `phase`, and how long to wait for it
    pub fn next_step(&self, phase: &GamePhase) -> Option<(GameAction, Duration)> {
        match phase {
            GamePhase::Moving { steps, .. } => Some((
                GameAction::CompleteMovement,
                self.step_delay * steps.unsigned_abs().max(1),
            )),
            GamePhase::TurnComplete => Some((GameAction::EndTurn, self.turn_delay)),
            _ => None,
        }
    }
}

/// Replace the room's pending timer with whatever its current phase needs.
pub fn schedule(state: &Arc<ServerState>, room_id: Uuid) {
    let Some(mut room) = state.rooms.get_mut(&room_id) else {
        return;
    };
    room.cancel_timer();

    let Some(game) = room.game.as_ref() else {
        return;
    };
    if game.is_finished() {
        return;
    }
    let Some((action, delay)) = state.pacing.next_step(&game.phase) else {
        return;
    };

    let expected_phase = game.phase.clone();
    let expected_turn = game.turn_number();
    debug!(room = %room_id, ?action, ?delay, "Pacing timer scheduled");

    let task_state = Arc::clone(state);
    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        fire(&task_state, room_id, expected_turn, expected_phase, action);
    });
    room.set_timer(handle.abort_handle());
}

/// Apply a timed action unless the game has moved on since it was scheduled.
fn fire(
    state: &Arc<ServerState>,
    room_id: Uuid,
    expected_turn: u32,
    expected_phase: GamePhase,
    action: GameAction,
) {
    let outcome = {
        let Some(mut room) = state.rooms.get_mut(&room_id) else {
            return;
        };
        room.clear_timer();

        let still_due = room
            .game
            .as_ref()
            .is_some_and(|g| g.turn_number() == expected_turn && g.phase == expected_phase);
        if !still_due {
            debug!(room = %room_id, ?action, "Dropping stale pacing timer");
            return;
        }

        info!(room = %room_id, ?action, "Pacing timer fired");
        match room.apply_system_action(action) {
            Ok(events) => room.outcome(events),
            Err(e) => {
                warn!(room = %room_id, error = %e, "Timed action failed");
                None
            }
        }
    };

    if let Some(outcome) = outcome {
        broadcast_outcome(state, room_id, outcome);
        schedule(state, room_id);
    }
}
