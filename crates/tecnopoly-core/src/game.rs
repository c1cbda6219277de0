//! Core game state machine.
//!
//! This module contains the main `GameState` struct: the landing resolver,
//! the purchase and rent flows, card effects, turn hand-over and the end of
//! the game.

use crate::actions::{GameAction, GameEvent, ThiefPenalty};
use crate::board::{Board, Move, PlayerId, Tile, TileIndex, TileType};
use crate::cards::{Card, CardDecks};
use crate::config::{DebtPolicy, GameConfig, SkipPolicy, MAX_PLAYERS, MIN_PLAYERS};
use crate::dice::DiceRoll;
use crate::ownership::OwnershipRegistry;
use crate::player::Player;
use crate::scoring::{self, Standing};
use crate::turn::TurnSequencer;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Game phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Start of turn, the current player must roll
    AwaitingRoll,

    /// A token is walking; no other action starts until it arrives
    Moving {
        from: TileIndex,
        to: TileIndex,
        steps: i32,
    },

    /// Landed on an unowned artefact
    PurchaseOffer { tile: TileIndex, cost: u32 },

    /// Landed on another player's artefact
    RentDue {
        tile: TileIndex,
        owner: PlayerId,
        amount: u32,
    },

    /// A question card is open
    AnsweringQuestion {
        question: crate::cards::QuestionCard,
    },

    /// Met the thief, must pick a penalty
    ThiefChoice,

    /// Found the treasure, may jump to one of `options`
    TreasureChoice { options: Vec<TileIndex> },

    /// Nothing left to resolve, waiting for the turn to end
    TurnComplete,

    /// Game is over
    Finished { winner: PlayerId },
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("A game needs between 2 and 6 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("No player with id {0}")]
    InvalidPlayer(PlayerId),

    #[error("No tile with index {0}")]
    InvalidTile(TileIndex),

    #[error("Invalid dice values")]
    InvalidDice,

    #[error("No answer with index {0}")]
    InvalidAnswer(usize),

    #[error("That choice is not available")]
    InvalidChoice,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Game is over")]
    GameOver,
}

/// The complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// The tile loop
    pub board: Board,
    /// All players, indexed by id
    pub players: Vec<Player>,
    /// Card content
    pub decks: CardDecks,
    /// Rules in effect
    pub config: GameConfig,
    /// Current game phase
    pub phase: GamePhase,
    /// Last dice roll
    pub dice_roll: Option<DiceRoll>,
    ownership: OwnershipRegistry,
    turns: TurnSequencer,
}

impl GameState {
    /// Create a game on the standard board with default rules
    pub fn new(player_names: Vec<String>) -> Result<Self, GameError> {
        Self::with_config(
            player_names,
            Board::standard(),
            CardDecks::standard(),
            GameConfig::default(),
        )
    }

    /// Create a game with custom board, cards and rules
    pub fn with_config(
        player_names: Vec<String>,
        board: Board,
        decks: CardDecks,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_names.len()) {
            return Err(GameError::InvalidPlayerCount(player_names.len()));
        }
        config
            .validate()
            .map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        decks
            .validate()
            .map_err(|e| GameError::InvalidConfig(e.to_string()))?;

        Ok(Self::build(player_names, board, decks, config))
    }

    /// Create a standard 4-player game
    pub fn new_standard_4player() -> Self {
        Self::build(
            vec![
                "Player 1".to_string(),
                "Player 2".to_string(),
                "Player 3".to_string(),
                "Player 4".to_string(),
            ],
            Board::standard(),
            CardDecks::standard(),
            GameConfig::default(),
        )
    }

    fn build(
        player_names: Vec<String>,
        board: Board,
        mut decks: CardDecks,
        config: GameConfig,
    ) -> Self {
        let players: Vec<Player> = player_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name, config.initial_credits))
            .collect();

        decks.shuffle_questions(&mut rand::thread_rng());

        info!(
            players = players.len(),
            artefacts = board.purchasable_count(),
            "Game initialised"
        );

        Self {
            turns: TurnSequencer::new(players.len() as u8),
            board,
            players,
            decks,
            config,
            phase: GamePhase::AwaitingRoll,
            dice_roll: None,
            ownership: OwnershipRegistry::new(),
        }
    }

    // ==================== Read Accessors ====================

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whose turn it is
    pub fn current_player(&self) -> PlayerId {
        self.turns.current_player()
    }

    /// Turn number (starts at 1)
    pub fn turn_number(&self) -> u32 {
        self.turns.turn_number()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Credit balance of a player
    pub fn credits(&self, id: PlayerId) -> Option<i64> {
        self.get_player(id).map(|p| p.credits)
    }

    /// Tiles owned by a player, sorted
    pub fn owned_tiles(&self, id: PlayerId) -> Vec<TileIndex> {
        self.get_player(id)
            .map(|p| p.owned_tiles.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Owner of a tile, `None` when the bank has it
    pub fn property_owner(&self, tile: TileIndex) -> Option<PlayerId> {
        self.ownership.owner_of(tile)
    }

    /// The ownership registry
    pub fn ownership(&self) -> &OwnershipRegistry {
        &self.ownership
    }

    /// Number of artefacts currently owned by players
    pub fn purchased_count(&self) -> usize {
        self.ownership.len()
    }

    /// Number of artefacts on the board
    pub fn total_purchasable(&self) -> usize {
        self.board.purchasable_count()
    }

    /// Players ranked by the end-of-game rules
    pub fn standings(&self) -> Vec<Standing> {
        scoring::rank_players(&self.players)
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Finished { .. })
    }

    /// Get the winner if the game is finished
    pub fn winner(&self) -> Option<PlayerId> {
        if let GamePhase::Finished { winner } = self.phase {
            Some(winner)
        } else {
            None
        }
    }

    /// Whether the registry and every player's owned set agree
    pub fn ownership_consistent(&self) -> bool {
        let registry_matches = self
            .ownership
            .iter()
            .all(|(tile, owner)| self.get_player(owner).is_some_and(|p| p.owns(tile)));

        let players_match = self.players.iter().all(|p| {
            p.owned_tiles
                .iter()
                .all(|&tile| self.ownership.owner_of(tile) == Some(p.id))
        });

        registry_matches && players_match
    }

    /// Get all currently valid actions for a player
    pub fn valid_actions(&self, player: PlayerId) -> Vec<GameAction> {
        let mut actions = Vec::new();

        if self.is_finished() || player != self.current_player() {
            return actions;
        }

        match &self.phase {
            GamePhase::Finished { .. } => {}

            GamePhase::AwaitingRoll => actions.push(GameAction::RollDice),

            GamePhase::Moving { .. } => actions.push(GameAction::CompleteMovement),

            GamePhase::PurchaseOffer { .. } => {
                actions.push(GameAction::BuyProperty);
                actions.push(GameAction::DeclinePurchase);
            }

            GamePhase::RentDue { .. } => actions.push(GameAction::PayRent),

            GamePhase::AnsweringQuestion { question } => {
                for i in 0..question.answers.len() {
                    actions.push(GameAction::AnswerQuestion(i));
                }
            }

            GamePhase::ThiefChoice => {
                if self
                    .get_player(player)
                    .is_some_and(|p| p.property_count() > 0)
                {
                    actions.push(GameAction::ChooseThiefPenalty(
                        ThiefPenalty::SurrenderProperty,
                    ));
                }
                actions.push(GameAction::ChooseThiefPenalty(ThiefPenalty::SkipTurns));
            }

            GamePhase::TreasureChoice { options } => {
                for &tile in options {
                    actions.push(GameAction::ClaimTreasure(tile));
                }
                actions.push(GameAction::DeclineTreasure);
            }

            GamePhase::TurnComplete => actions.push(GameAction::EndTurn),
        }

        actions
    }

    // ==================== Actions ====================

    /// Apply an action to the game state
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.apply_action_with_rng(player, action, &mut rand::thread_rng())
    }

    /// Apply an action using the given random source
    ///
    /// A rejected action leaves the state untouched.
    pub fn apply_action_with_rng<R: Rng>(
        &mut self,
        player: PlayerId,
        action: GameAction,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        // Check game not over
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        if player != self.current_player() {
            warn!(player, current = self.current_player(), "Action out of turn");
            return Err(GameError::NotYourTurn);
        }

        match self.dispatch(player, action.clone(), rng) {
            Ok(mut events) => {
                self.settle_debts(&mut events);
                Ok(events)
            }
            Err(e) => {
                warn!(player, ?action, error = %e, "Action rejected");
                Err(e)
            }
        }
    }

    /// Resolve the current player's token stopping on `tile`
    ///
    /// For engines that move tokens themselves instead of going through
    /// `RollDice` and `CompleteMovement`.
    pub fn resolve_landing(&mut self, tile: TileIndex) -> Result<Vec<GameEvent>, GameError> {
        self.resolve_landing_with_rng(tile, &mut rand::thread_rng())
    }

    /// `resolve_landing` with the given random source
    pub fn resolve_landing_with_rng<R: Rng>(
        &mut self,
        tile: TileIndex,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        if !matches!(self.phase, GamePhase::AwaitingRoll | GamePhase::Moving { .. }) {
            return Err(GameError::InvalidPhase);
        }

        let player = self.current_player();
        let mut events = self.land(player, tile, rng)?;
        self.settle_debts(&mut events);
        Ok(events)
    }

    fn dispatch<R: Rng>(
        &mut self,
        player: PlayerId,
        action: GameAction,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        let mut events = Vec::new();

        match action {
            // ==================== Movement ====================
            GameAction::RollDice => {
                if self.phase != GamePhase::AwaitingRoll {
                    return Err(GameError::InvalidPhase);
                }
                if let Some(skipped) = self.forfeit_on_roll(player) {
                    return Ok(skipped);
                }

                let roll = DiceRoll::roll(self.config.dice_count, rng);
                events.extend(self.start_roll(player, roll));
            }

            GameAction::SubmitRoll(values) => {
                if self.phase != GamePhase::AwaitingRoll {
                    return Err(GameError::InvalidPhase);
                }
                let roll = DiceRoll::from_values(values, self.config.dice_count)?;
                if let Some(skipped) = self.forfeit_on_roll(player) {
                    return Ok(skipped);
                }

                events.extend(self.start_roll(player, roll));
            }

            GameAction::CompleteMovement => {
                let to = match self.phase {
                    GamePhase::Moving { to, .. } => to,
                    _ => return Err(GameError::InvalidPhase),
                };

                events.extend(self.land(player, to, rng)?);
            }

            // ==================== Property ====================
            GameAction::BuyProperty => {
                let (tile, cost) = match self.phase {
                    GamePhase::PurchaseOffer { tile, cost } => (tile, cost),
                    _ => return Err(GameError::InvalidPhase),
                };

                // The offer closes whether or not the purchase goes through
                self.phase = GamePhase::TurnComplete;

                let buyer = &mut self.players[player as usize];
                if !buyer.can_afford(cost) {
                    info!(player, tile, cost, credits = buyer.credits, "Purchase rejected");
                    events.push(GameEvent::PurchaseRejected {
                        player,
                        tile,
                        cost,
                        credits: buyer.credits,
                    });
                    return Ok(events);
                }

                buyer.add_credits(-(cost as i64));
                self.assign_property(player, tile);
                info!(player, tile, cost, "Artefact purchased");

                events.push(GameEvent::PropertyPurchased { player, tile, cost });
                events.extend(self.check_win_condition());
            }

            GameAction::DeclinePurchase => {
                let tile = match self.phase {
                    GamePhase::PurchaseOffer { tile, .. } => tile,
                    _ => return Err(GameError::InvalidPhase),
                };

                self.phase = GamePhase::TurnComplete;
                events.push(GameEvent::PurchaseDeclined { player, tile });
            }

            GameAction::PayRent => {
                let (owner, amount) = match self.phase {
                    GamePhase::RentDue { owner, amount, .. } => (owner, amount),
                    _ => return Err(GameError::InvalidPhase),
                };

                let paid = self.charge(player, amount as i64);
                self.players[owner as usize].add_credits(paid);
                self.phase = GamePhase::TurnComplete;
                debug!(player, owner, paid, "Rent paid");

                events.push(GameEvent::RentPaid {
                    from: player,
                    to: owner,
                    amount: paid as u32,
                });
            }

            // ==================== Cards ====================
            GameAction::AnswerQuestion(answer) => {
                let question = match &self.phase {
                    GamePhase::AnsweringQuestion { question } => question.clone(),
                    _ => return Err(GameError::InvalidPhase),
                };
                if answer >= question.answers.len() {
                    return Err(GameError::InvalidAnswer(answer));
                }

                let correct = question.is_correct(answer);
                let credit_change = if correct {
                    let reward = question.reward_credits as i64;
                    self.players[player as usize].add_credits(reward);
                    reward
                } else {
                    -self.charge(player, question.penalty_credits as i64)
                };

                self.phase = GamePhase::TurnComplete;
                events.push(GameEvent::QuestionAnswered {
                    player,
                    correct,
                    credit_change,
                    explanation: question.explanation(correct),
                });
            }

            GameAction::ChooseThiefPenalty(penalty) => {
                if self.phase != GamePhase::ThiefChoice {
                    return Err(GameError::InvalidPhase);
                }

                match penalty {
                    ThiefPenalty::SurrenderProperty => {
                        let owned: Vec<TileIndex> = self.owned_tiles(player);
                        let tile = *owned.choose(rng).ok_or(GameError::InvalidChoice)?;

                        self.release_property(player, tile);
                        info!(player, tile, "Artefact taken by the thief");
                        events.push(GameEvent::PropertyLost { player, tile });
                    }
                    ThiefPenalty::SkipTurns => {
                        let turns = self.config.thief_skip_turns;
                        self.players[player as usize].add_skipped_turns(turns);
                        events.push(GameEvent::TurnsForfeited { player, turns });
                    }
                }

                self.phase = GamePhase::TurnComplete;
            }

            GameAction::ClaimTreasure(tile) => {
                match &self.phase {
                    GamePhase::TreasureChoice { options } if options.contains(&tile) => {}
                    GamePhase::TreasureChoice { .. } => return Err(GameError::InvalidChoice),
                    _ => return Err(GameError::InvalidPhase),
                }
                if self.ownership.is_owned(tile) {
                    return Err(GameError::InvalidChoice);
                }

                let from = self.players[player as usize].position;
                let jump = Move {
                    from,
                    to: tile,
                    steps: self.board.distance_forward(from, tile),
                    passed_go: false,
                };
                events.extend(self.begin_move(player, jump));
            }

            GameAction::DeclineTreasure => {
                if !matches!(self.phase, GamePhase::TreasureChoice { .. }) {
                    return Err(GameError::InvalidPhase);
                }
                self.phase = GamePhase::TurnComplete;
            }

            // ==================== Turn Management ====================
            GameAction::EndTurn => {
                if self.phase != GamePhase::TurnComplete {
                    return Err(GameError::InvalidPhase);
                }

                let next_player = self.hand_over(&mut events);
                events.push(GameEvent::TurnEnded {
                    player,
                    next_player,
                });
            }
        }

        Ok(events)
    }

    // ==================== Helper Methods ====================

    /// Under `SkipPolicy::OnRollAttempt`, a flagged player's roll passes the
    /// turn instead
    fn forfeit_on_roll(&mut self, player: PlayerId) -> Option<Vec<GameEvent>> {
        if self.config.skip_policy != SkipPolicy::OnRollAttempt {
            return None;
        }
        if !self.players[player as usize].consume_skip() {
            return None;
        }

        info!(player, "Turn forfeited");
        let next_player = self.advance_turn();
        self.phase = GamePhase::AwaitingRoll;

        Some(vec![
            GameEvent::TurnSkipped { player },
            GameEvent::TurnEnded {
                player,
                next_player,
            },
        ])
    }

    /// Pass the turn on, honouring the skip policy
    fn hand_over(&mut self, events: &mut Vec<GameEvent>) -> PlayerId {
        let mut next = self.advance_turn();

        if self.config.skip_policy == SkipPolicy::OnAdvance {
            while self.players[next as usize].consume_skip() {
                info!(player = next, "Turn forfeited");
                events.push(GameEvent::TurnSkipped { player: next });
                next = self.advance_turn();
            }
        }

        self.phase = GamePhase::AwaitingRoll;
        next
    }

    /// Step the sequencer to the next player still in the game
    fn advance_turn(&mut self) -> PlayerId {
        let players = &self.players;
        self.turns
            .advance_until(|id| players.get(id as usize).is_some_and(|p| p.is_active()))
    }

    fn start_roll(&mut self, player: PlayerId, roll: DiceRoll) -> Vec<GameEvent> {
        let total = roll.total();
        let from = self.players[player as usize].position;
        let walk = self.board.step(from, total as i32);

        debug!(player, total, "Dice rolled");
        let mut events = vec![GameEvent::DiceRolled {
            player,
            values: roll.values.clone(),
            total,
        }];
        self.dice_roll = Some(roll);

        events.extend(self.begin_move(player, walk));
        events
    }

    /// Enter the movement phase; the landing waits for `CompleteMovement`
    fn begin_move(&mut self, player: PlayerId, walk: Move) -> Vec<GameEvent> {
        let mut events = vec![GameEvent::TokenMoving {
            player,
            from: walk.from,
            to: walk.to,
            steps: walk.steps,
        }];

        // Landing on the start tile pays through the landing resolver instead
        if walk.passed_go && walk.to != 0 && self.config.salary_on_pass {
            let amount = self.config.salary;
            self.players[player as usize].add_credits(amount as i64);
            events.push(GameEvent::SalaryCollected { player, amount });
        }

        self.phase = GamePhase::Moving {
            from: walk.from,
            to: walk.to,
            steps: walk.steps,
        };
        events
    }

    /// The landing resolver
    fn land<R: Rng>(
        &mut self,
        player: PlayerId,
        tile: TileIndex,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        let tile_info = self
            .board
            .get(tile)
            .cloned()
            .ok_or(GameError::InvalidTile(tile))?;

        self.players[player as usize].position = tile;
        self.phase = GamePhase::TurnComplete;
        debug!(player, tile, tile_type = ?tile_info.tile_type, "Resolving landing");

        let mut events = vec![GameEvent::TokenLanded { player, tile }];

        match tile_info.tile_type {
            TileType::Property => match self.ownership.owner_of(tile) {
                None => {
                    self.phase = GamePhase::PurchaseOffer {
                        tile,
                        cost: tile_info.cost,
                    };
                    events.push(GameEvent::PurchaseOffered {
                        player,
                        tile,
                        cost: tile_info.cost,
                    });
                }
                Some(owner) if owner != player => {
                    let amount = self.rent_for(&tile_info, rng);
                    self.phase = GamePhase::RentDue {
                        tile,
                        owner,
                        amount,
                    };
                    events.push(GameEvent::RentDue {
                        player,
                        owner,
                        tile,
                        amount,
                    });
                }
                Some(_) => events.push(GameEvent::AlreadyOwned { player, tile }),
            },

            TileType::Chance => {
                if let Some(card) = self.decks.draw_event(rng) {
                    events.extend(self.apply_card(player, card));
                }
            }

            TileType::CommunityChest => {
                if let Some(question) = self.decks.draw_question(rng) {
                    events.push(GameEvent::QuestionAsked {
                        player,
                        question: question.question.clone(),
                        answers: question.answers.clone(),
                    });
                    self.phase = GamePhase::AnsweringQuestion { question };
                }
            }

            TileType::Tax => {
                let amount = tile_info.effective_tax(self.config.default_tax);
                let paid = self.charge(player, amount as i64);
                events.push(GameEvent::TaxPaid {
                    player,
                    tile,
                    amount: paid as u32,
                });
            }

            TileType::Go => {
                let amount = self.config.salary;
                self.players[player as usize].add_credits(amount as i64);
                events.push(GameEvent::SalaryCollected { player, amount });
            }

            TileType::GoToJail => {
                self.phase = GamePhase::ThiefChoice;
                events.push(GameEvent::ThiefEncountered { player });
            }

            TileType::FreeParking => {
                let options: Vec<TileIndex> = self
                    .board
                    .property_indices()
                    .into_iter()
                    .filter(|&t| !self.ownership.is_owned(t))
                    .collect();

                if options.is_empty() {
                    if let Some(card) = self.decks.draw_reward(rng) {
                        events.extend(self.apply_card(player, card));
                    }
                } else {
                    events.push(GameEvent::TreasureFound {
                        player,
                        options: options.clone(),
                    });
                    self.phase = GamePhase::TreasureChoice { options };
                }
            }

            TileType::Jail => {}
        }

        Ok(events)
    }

    /// Rent for a visit: the tile's rent, or a random amount when it has none
    fn rent_for<R: Rng>(&self, tile: &Tile, rng: &mut R) -> u32 {
        if tile.rent > 0 {
            tile.rent
        } else {
            rng.gen_range(self.config.random_rent_min..=self.config.random_rent_max)
        }
    }

    /// Apply an event or reward card to the player who drew it
    fn apply_card(&mut self, player: PlayerId, card: Card) -> Vec<GameEvent> {
        debug!(player, title = %card.title, "Card drawn");
        let mut events = vec![GameEvent::CardDrawn {
            player,
            card: card.clone(),
        }];
        self.phase = GamePhase::TurnComplete;

        if card.credit_effect > 0 {
            self.players[player as usize].add_credits(card.credit_effect);
            events.push(GameEvent::CreditsAdjusted {
                player,
                amount: card.credit_effect,
            });
        } else if card.credit_effect < 0 {
            let paid = self.charge(player, -card.credit_effect);
            events.push(GameEvent::CreditsAdjusted {
                player,
                amount: -paid,
            });
        }

        if card.skip_turn {
            self.players[player as usize].set_skip_next_turn(true);
            events.push(GameEvent::TurnsForfeited { player, turns: 1 });
        }

        if card.collect_from_all {
            let amount_each = self.config.collect_from_all_amount;
            let payers: Vec<PlayerId> = self
                .players
                .iter()
                .filter(|p| p.id != player && p.is_active())
                .map(|p| p.id)
                .collect();

            let mut total = 0;
            for payer in payers {
                total += self.charge(payer, amount_each as i64);
            }
            self.players[player as usize].add_credits(total);

            events.push(GameEvent::CollectedFromAll {
                player,
                amount_each,
                total: total as u32,
            });
        }

        let from = self.players[player as usize].position;
        if let Some(target) = card.move_to_tile {
            if self.board.get(target).is_some() {
                let steps = self.board.distance_forward(from, target);
                let walk = self.board.step(from, steps);
                events.extend(self.begin_move(player, walk));
            } else {
                warn!(player, target, "Card points at a tile that does not exist");
            }
        } else if card.move_spaces != 0 {
            let walk = self.board.step(from, card.move_spaces);
            events.extend(self.begin_move(player, walk));
        }

        events
    }

    /// Take up to `amount` credits from a player, per the debt policy.
    /// Returns what was actually taken.
    fn charge(&mut self, player: PlayerId, amount: i64) -> i64 {
        let policy = self.config.debt_policy;
        let account = &mut self.players[player as usize];

        let taken = match policy {
            DebtPolicy::ClampAtZero => amount.min(account.credits.max(0)),
            DebtPolicy::AllowDebt | DebtPolicy::Eliminate => amount,
        };
        account.add_credits(-taken);
        taken
    }

    /// Under `DebtPolicy::Eliminate`, bankrupt everyone in debt and end the
    /// game when a single solvent player remains
    fn settle_debts(&mut self, events: &mut Vec<GameEvent>) {
        if self.config.debt_policy != DebtPolicy::Eliminate || self.is_finished() {
            return;
        }

        let broke: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.is_active() && p.credits < 0)
            .map(|p| p.id)
            .collect();
        if broke.is_empty() {
            return;
        }

        for &id in &broke {
            self.players[id as usize].bankrupt = true;
            for tile in self.owned_tiles(id) {
                self.release_property(id, tile);
                events.push(GameEvent::PropertyLost { player: id, tile });
            }
            info!(player = id, "Player bankrupt");
            events.push(GameEvent::PlayerBankrupt { player: id });
        }

        let solvent: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .collect();

        if solvent.len() <= 1 {
            if let Some(winner) = scoring::determine_winner(&self.players) {
                events.push(self.finish(winner));
            }
        } else if broke.contains(&self.current_player()) {
            // A bankrupt player's pending choices are void
            self.phase = GamePhase::TurnComplete;
        }
    }

    fn check_win_condition(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if self.purchased_count() >= self.total_purchasable() {
            if let Some(winner) = scoring::determine_winner(&self.players) {
                events.push(self.finish(winner));
            }
        }

        events
    }

    fn finish(&mut self, winner: PlayerId) -> GameEvent {
        self.phase = GamePhase::Finished { winner };
        self.turns.finish();

        let (properties, credits) = self
            .get_player(winner)
            .map(|p| (p.property_count(), p.credits))
            .unwrap_or_default();
        info!(winner, properties, credits, "Game over");

        GameEvent::GameWon {
            player: winner,
            properties,
            credits,
        }
    }

    // ==================== Ownership ====================

    fn assign_property(&mut self, player: PlayerId, tile: TileIndex) {
        if let Some(previous) = self.ownership.assign(tile, player) {
            if previous != player {
                self.players[previous as usize].owned_tiles.remove(&tile);
            }
        }
        self.players[player as usize].owned_tiles.insert(tile);
    }

    fn release_property(&mut self, player: PlayerId, tile: TileIndex) -> bool {
        if self.ownership.owner_of(tile) != Some(player) {
            return false;
        }
        self.ownership.release(tile);
        self.players[player as usize].owned_tiles.remove(&tile);
        true
    }

    /// Hand an artefact from one player to another
    pub fn transfer_property(
        &mut self,
        from: PlayerId,
        to: PlayerId,
        tile: TileIndex,
    ) -> Result<(), GameError> {
        if self.get_player(to).is_none() {
            return Err(GameError::InvalidPlayer(to));
        }
        match self.ownership.owner_of(tile) {
            Some(owner) if owner == from => {}
            _ => return Err(GameError::InvalidChoice),
        }

        self.assign_property(to, tile);
        debug!(from, to, tile, "Artefact transferred");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardKind, QuestionCard};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 0 Go, 1 Property(100/30), 2 Tax(default), 3 Property(200/random),
    /// 4 Chance, 5 CommunityChest, 6 GoToJail, 7 FreeParking, 8 Jail,
    /// 9 Property(50/10)
    fn test_board() -> Board {
        Board::from_tiles(vec![
            Tile::special(0, TileType::Go),
            Tile::property(1, "Abacus", 100, 30),
            Tile::tax(2, 0),
            Tile::property(3, "Robot", 200, 0),
            Tile::special(4, TileType::Chance),
            Tile::special(5, TileType::CommunityChest),
            Tile::special(6, TileType::GoToJail),
            Tile::special(7, TileType::FreeParking),
            Tile::special(8, TileType::Jail),
            Tile::property(9, "Laptop", 50, 10),
        ])
        .unwrap()
    }

    fn test_decks(event: Card) -> CardDecks {
        CardDecks::new(
            vec![event],
            vec![QuestionCard::new("2+2?", &["3", "4"], 1)],
            vec![Card::credits(CardKind::Reward, "Cache", "", 200)],
        )
    }

    fn game_with(config: GameConfig, event: Card) -> GameState {
        GameState::with_config(
            vec!["A".into(), "B".into(), "C".into()],
            test_board(),
            test_decks(event),
            config,
        )
        .unwrap()
    }

    fn game() -> GameState {
        game_with(
            GameConfig::default(),
            Card::credits(CardKind::Event, "Refund", "", 40),
        )
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    /// Land the current player on `tile` through the landing callback
    fn land(game: &mut GameState, tile: TileIndex) -> Vec<GameEvent> {
        game.resolve_landing_with_rng(tile, &mut rng()).unwrap()
    }

    fn act(game: &mut GameState, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        let player = game.current_player();
        game.apply_action_with_rng(player, action, &mut rng())
    }

    #[test]
    fn test_new_game() {
        let game = GameState::new_standard_4player();
        assert_eq!(game.player_count(), 4);
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.phase, GamePhase::AwaitingRoll);
        assert!(game.players.iter().all(|p| p.credits == 1000));
        assert_eq!(game.total_purchasable(), 12);
        assert_eq!(game.purchased_count(), 0);
    }

    #[test]
    fn test_player_count_bounds() {
        assert!(matches!(
            GameState::new(vec!["Solo".into()]),
            Err(GameError::InvalidPlayerCount(1))
        ));
        let seven = (0..7).map(|i| format!("P{}", i)).collect();
        assert!(matches!(
            GameState::new(seven),
            Err(GameError::InvalidPlayerCount(7))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            dice_count: 0,
            ..GameConfig::default()
        };
        let result = GameState::with_config(
            vec!["A".into(), "B".into()],
            Board::standard(),
            CardDecks::standard(),
            config,
        );
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_unanswerable_question_deck_rejected() {
        let decks = CardDecks::new(vec![], vec![QuestionCard::new("?", &[], 3)], vec![]);
        let result = GameState::with_config(
            vec!["A".into(), "B".into()],
            test_board(),
            decks,
            GameConfig::default(),
        );
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_roll_then_complete_movement() {
        let mut game = game();
        let events = act(&mut game, GameAction::SubmitRoll(vec![4, 4])).unwrap();

        assert!(matches!(events[0], GameEvent::DiceRolled { total: 8, .. }));
        assert_eq!(
            game.phase,
            GamePhase::Moving {
                from: 0,
                to: 8,
                steps: 8
            }
        );

        // Busy until the token arrives
        assert_eq!(
            act(&mut game, GameAction::RollDice),
            Err(GameError::InvalidPhase)
        );
        assert_eq!(game.valid_actions(0), vec![GameAction::CompleteMovement]);

        let events = act(&mut game, GameAction::CompleteMovement).unwrap();
        assert!(events.contains(&GameEvent::TokenLanded { player: 0, tile: 8 }));
        assert_eq!(game.players[0].position, 8);
        assert_eq!(game.phase, GamePhase::TurnComplete);
    }

    #[test]
    fn test_random_roll_moves_token() {
        let mut game = game();
        act(&mut game, GameAction::RollDice).unwrap();
        let roll = game.dice_roll.clone().unwrap();
        assert_eq!(roll.values.len(), 2);

        let expected = game.board.step(0, roll.total() as i32).to;
        assert!(matches!(game.phase, GamePhase::Moving { to, .. } if to == expected));
    }

    #[test]
    fn test_invalid_dice_leave_state_untouched() {
        let mut game = game();
        assert_eq!(
            act(&mut game, GameAction::SubmitRoll(vec![7, 1])),
            Err(GameError::InvalidDice)
        );
        assert_eq!(
            act(&mut game, GameAction::SubmitRoll(vec![3])),
            Err(GameError::InvalidDice)
        );
        assert_eq!(game.phase, GamePhase::AwaitingRoll);
        assert!(game.dice_roll.is_none());
    }

    #[test]
    fn test_not_your_turn() {
        let mut game = game();
        assert_eq!(
            game.apply_action(1, GameAction::RollDice),
            Err(GameError::NotYourTurn)
        );
        assert!(game.valid_actions(1).is_empty());
    }

    #[test]
    fn test_purchase_updates_both_sides_of_ownership() {
        let mut game = game();
        let events = land(&mut game, 1);
        assert!(events.contains(&GameEvent::PurchaseOffered {
            player: 0,
            tile: 1,
            cost: 100
        }));
        assert_eq!(game.phase, GamePhase::PurchaseOffer { tile: 1, cost: 100 });

        act(&mut game, GameAction::BuyProperty).unwrap();

        assert_eq!(game.credits(0), Some(900));
        assert_eq!(game.property_owner(1), Some(0));
        assert_eq!(game.owned_tiles(0), vec![1]);
        assert_eq!(game.purchased_count(), 1);
        assert!(game.ownership_consistent());
        assert_eq!(game.phase, GamePhase::TurnComplete);
    }

    #[test]
    fn test_unaffordable_purchase_changes_nothing() {
        let mut game = game();
        game.players[0].credits = 150;
        land(&mut game, 3);

        let events = act(&mut game, GameAction::BuyProperty).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::PurchaseRejected {
                player: 0,
                tile: 3,
                cost: 200,
                credits: 150
            }]
        );
        assert_eq!(game.credits(0), Some(150));
        assert_eq!(game.property_owner(3), None);
        assert!(game.owned_tiles(0).is_empty());
        assert_eq!(game.phase, GamePhase::TurnComplete);
    }

    #[test]
    fn test_decline_purchase() {
        let mut game = game();
        land(&mut game, 9);
        let events = act(&mut game, GameAction::DeclinePurchase).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::PurchaseDeclined { player: 0, tile: 9 }]
        );
        assert_eq!(game.property_owner(9), None);
        assert_eq!(game.credits(0), Some(1000));
    }

    #[test]
    fn test_rent_is_zero_sum() {
        let mut game = game();
        game.transfer_property_for_test(1, 1);

        let rounds = 5;
        for _ in 0..rounds {
            land(&mut game, 1);
            assert_eq!(
                game.phase,
                GamePhase::RentDue {
                    tile: 1,
                    owner: 1,
                    amount: 30
                }
            );
            act(&mut game, GameAction::PayRent).unwrap();
            game.phase = GamePhase::AwaitingRoll;
        }

        assert_eq!(game.credits(0), Some(1000 - 30 * rounds));
        assert_eq!(game.credits(1), Some(1000 + 30 * rounds));
        assert_eq!(game.credits(2), Some(1000));
    }

    #[test]
    fn test_random_rent_within_bounds() {
        for seed in 0..20 {
            let mut game = game();
            game.transfer_property_for_test(2, 3);
            game.resolve_landing_with_rng(3, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            match game.phase {
                GamePhase::RentDue { amount, owner, .. } => {
                    assert_eq!(owner, 2);
                    assert!((20..=50).contains(&amount));
                }
                ref other => panic!("unexpected phase {:?}", other),
            }
        }
    }

    #[test]
    fn test_landing_on_own_property() {
        let mut game = game();
        game.transfer_property_for_test(0, 9);
        let events = land(&mut game, 9);
        assert!(events.contains(&GameEvent::AlreadyOwned { player: 0, tile: 9 }));
        assert_eq!(game.phase, GamePhase::TurnComplete);
        assert_eq!(game.credits(0), Some(1000));
    }

    #[test]
    fn test_tax_defaults_to_100() {
        let mut game = game();
        let events = land(&mut game, 2);
        assert!(events.contains(&GameEvent::TaxPaid {
            player: 0,
            tile: 2,
            amount: 100
        }));
        assert_eq!(game.credits(0), Some(900));
    }

    #[test]
    fn test_go_pays_salary() {
        let mut game = game();
        land(&mut game, 0);
        assert_eq!(game.credits(0), Some(1200));
    }

    #[test]
    fn test_passing_go_pays_only_when_configured() {
        let mut game = game();
        game.players[0].position = 8;
        act(&mut game, GameAction::SubmitRoll(vec![2, 1])).unwrap();
        assert_eq!(game.credits(0), Some(1000));

        let config = GameConfig {
            salary_on_pass: true,
            ..GameConfig::default()
        };
        let mut game = game_with(config, Card::credits(CardKind::Event, "x", "", 0));
        game.players[0].position = 8;
        let events = act(&mut game, GameAction::SubmitRoll(vec![2, 1])).unwrap();
        assert!(events.contains(&GameEvent::SalaryCollected {
            player: 0,
            amount: 200
        }));
        assert_eq!(game.credits(0), Some(1200));
    }

    #[test]
    fn test_rolling_onto_start_pays_once() {
        let config = GameConfig {
            salary_on_pass: true,
            ..GameConfig::default()
        };
        let mut game = game_with(config, Card::credits(CardKind::Event, "x", "", 0));
        game.players[0].position = 8;

        let events = act(&mut game, GameAction::SubmitRoll(vec![1, 1])).unwrap();
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::SalaryCollected { .. })));

        act(&mut game, GameAction::CompleteMovement).unwrap();
        assert_eq!(game.players[0].position, 0);
        assert_eq!(game.credits(0), Some(1200));
    }

    #[test]
    fn test_question_answers() {
        let mut game = game();
        let events = land(&mut game, 5);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::QuestionAsked { .. })));
        assert_eq!(
            game.valid_actions(0),
            vec![GameAction::AnswerQuestion(0), GameAction::AnswerQuestion(1)]
        );

        assert_eq!(
            act(&mut game, GameAction::AnswerQuestion(5)),
            Err(GameError::InvalidAnswer(5))
        );

        act(&mut game, GameAction::AnswerQuestion(1)).unwrap();
        assert_eq!(game.credits(0), Some(1100));

        game.phase = GamePhase::AwaitingRoll;
        land(&mut game, 5);
        let events = act(&mut game, GameAction::AnswerQuestion(0)).unwrap();
        assert!(matches!(
            &events[0],
            GameEvent::QuestionAnswered {
                correct: false,
                credit_change: -50,
                ..
            }
        ));
        assert_eq!(game.credits(0), Some(1050));
    }

    #[test]
    fn test_event_card_credits() {
        let mut game = game();
        land(&mut game, 4);
        assert_eq!(game.credits(0), Some(1040));
        assert_eq!(game.phase, GamePhase::TurnComplete);
    }

    #[test]
    fn test_event_card_collects_from_all() {
        let card = Card {
            collect_from_all: true,
            ..Card::credits(CardKind::Event, "Sponsor", "", 0)
        };
        let mut game = game_with(GameConfig::default(), card);
        let events = land(&mut game, 4);

        assert!(events.contains(&GameEvent::CollectedFromAll {
            player: 0,
            amount_each: 20,
            total: 40
        }));
        assert_eq!(game.credits(0), Some(1040));
        assert_eq!(game.credits(1), Some(980));
        assert_eq!(game.credits(2), Some(980));
    }

    #[test]
    fn test_event_card_moves_token() {
        let card = Card {
            move_spaces: -3,
            ..Card::credits(CardKind::Event, "Rollback", "", 0)
        };
        let mut game = game_with(GameConfig::default(), card);
        land(&mut game, 4);
        assert_eq!(
            game.phase,
            GamePhase::Moving {
                from: 4,
                to: 1,
                steps: -3
            }
        );

        act(&mut game, GameAction::CompleteMovement).unwrap();
        assert_eq!(game.phase, GamePhase::PurchaseOffer { tile: 1, cost: 100 });
    }

    #[test]
    fn test_event_card_move_to_start_pays_salary_once() {
        let card = Card {
            move_to_tile: Some(0),
            ..Card::credits(CardKind::Event, "Reboot", "", 0)
        };
        let config = GameConfig {
            salary_on_pass: true,
            ..GameConfig::default()
        };
        let mut game = game_with(config, card);
        land(&mut game, 4);
        act(&mut game, GameAction::CompleteMovement).unwrap();
        assert_eq!(game.players[0].position, 0);
        assert_eq!(game.credits(0), Some(1200));
    }

    #[test]
    fn test_skip_card_forfeits_next_roll() {
        let card = Card {
            skip_turn: true,
            ..Card::credits(CardKind::Event, "Blue Screen", "", 0)
        };
        let mut game = game_with(GameConfig::default(), card);
        land(&mut game, 4);
        assert!(game.players[0].must_skip_next_turn());

        // Play around the table back to player 0
        act(&mut game, GameAction::EndTurn).unwrap();
        for _ in 0..2 {
            game.phase = GamePhase::TurnComplete;
            act(&mut game, GameAction::EndTurn).unwrap();
        }
        assert_eq!(game.current_player(), 0);

        let events = act(&mut game, GameAction::RollDice).unwrap();
        assert_eq!(
            events,
            vec![
                GameEvent::TurnSkipped { player: 0 },
                GameEvent::TurnEnded {
                    player: 0,
                    next_player: 1
                }
            ]
        );
        assert!(!game.players[0].must_skip_next_turn());
        assert_eq!(game.current_player(), 1);
        assert_eq!(game.phase, GamePhase::AwaitingRoll);
        assert!(game.dice_roll.is_none());
    }

    #[test]
    fn test_skip_on_advance_policy() {
        let config = GameConfig {
            skip_policy: SkipPolicy::OnAdvance,
            ..GameConfig::default()
        };
        let mut game = game_with(config, Card::credits(CardKind::Event, "x", "", 0));
        game.players[1].set_skip_next_turn(true);
        game.players[2].set_skip_next_turn(true);
        game.phase = GamePhase::TurnComplete;

        let events = act(&mut game, GameAction::EndTurn).unwrap();
        assert_eq!(
            events,
            vec![
                GameEvent::TurnSkipped { player: 1 },
                GameEvent::TurnSkipped { player: 2 },
                GameEvent::TurnEnded {
                    player: 0,
                    next_player: 0
                }
            ]
        );
        assert_eq!(game.current_player(), 0);
        assert!(game.players.iter().all(|p| !p.must_skip_next_turn()));

        // Rolling is not intercepted under this policy
        game.players[0].set_skip_next_turn(true);
        act(&mut game, GameAction::SubmitRoll(vec![1, 1])).unwrap();
        assert!(matches!(game.phase, GamePhase::Moving { .. }));
    }

    #[test]
    fn test_end_turn_full_lap() {
        let mut game = game();
        for _ in 0..game.player_count() {
            game.phase = GamePhase::TurnComplete;
            act(&mut game, GameAction::EndTurn).unwrap();
        }
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.turn_number(), 4);
    }

    #[test]
    fn test_thief_skip_turns() {
        let mut game = game();
        land(&mut game, 6);
        assert_eq!(game.phase, GamePhase::ThiefChoice);
        assert_eq!(
            game.valid_actions(0),
            vec![GameAction::ChooseThiefPenalty(ThiefPenalty::SkipTurns)]
        );

        assert_eq!(
            act(
                &mut game,
                GameAction::ChooseThiefPenalty(ThiefPenalty::SurrenderProperty)
            ),
            Err(GameError::InvalidChoice)
        );

        act(
            &mut game,
            GameAction::ChooseThiefPenalty(ThiefPenalty::SkipTurns),
        )
        .unwrap();
        assert_eq!(game.players[0].skip_turns, 3);
    }

    #[test]
    fn test_thief_takes_property() {
        let mut game = game();
        game.transfer_property_for_test(0, 1);
        game.transfer_property_for_test(0, 9);
        land(&mut game, 6);

        let events = act(
            &mut game,
            GameAction::ChooseThiefPenalty(ThiefPenalty::SurrenderProperty),
        )
        .unwrap();

        assert!(matches!(events[0], GameEvent::PropertyLost { player: 0, .. }));
        assert_eq!(game.owned_tiles(0).len(), 1);
        assert_eq!(game.purchased_count(), 1);
        assert!(game.ownership_consistent());
    }

    #[test]
    fn test_treasure_claim_leads_to_offer() {
        let mut game = game();
        game.transfer_property_for_test(1, 1);
        let events = land(&mut game, 7);
        assert!(events.contains(&GameEvent::TreasureFound {
            player: 0,
            options: vec![3, 9]
        }));

        assert_eq!(
            act(&mut game, GameAction::ClaimTreasure(1)),
            Err(GameError::InvalidChoice)
        );

        act(&mut game, GameAction::ClaimTreasure(3)).unwrap();
        assert_eq!(
            game.phase,
            GamePhase::Moving {
                from: 7,
                to: 3,
                steps: 6
            }
        );

        act(&mut game, GameAction::CompleteMovement).unwrap();
        assert_eq!(game.phase, GamePhase::PurchaseOffer { tile: 3, cost: 200 });
        // Teleporting never pays the salary
        assert_eq!(game.credits(0), Some(1000));
    }

    #[test]
    fn test_treasure_decline() {
        let mut game = game();
        land(&mut game, 7);
        let events = act(&mut game, GameAction::DeclineTreasure).unwrap();
        assert!(events.is_empty());
        assert_eq!(game.phase, GamePhase::TurnComplete);
    }

    #[test]
    fn test_treasure_without_options_draws_reward() {
        let mut game = game();
        for tile in [1, 3, 9] {
            game.transfer_property_for_test(1, tile);
        }
        land(&mut game, 7);
        assert_eq!(game.credits(0), Some(1200));
        assert_eq!(game.phase, GamePhase::TurnComplete);
    }

    #[test]
    fn test_buying_last_artefact_ends_game() {
        let mut game = game();
        game.transfer_property_for_test(1, 1);
        game.transfer_property_for_test(1, 3);
        land(&mut game, 9);

        let events = act(&mut game, GameAction::BuyProperty).unwrap();
        assert!(events.contains(&GameEvent::GameWon {
            player: 1,
            properties: 2,
            credits: 1000
        }));
        assert!(game.is_finished());
        assert_eq!(game.winner(), Some(1));

        assert_eq!(
            game.apply_action(0, GameAction::EndTurn),
            Err(GameError::GameOver)
        );
        assert!(game.valid_actions(0).is_empty());
    }

    #[test]
    fn test_clamp_at_zero_keeps_transfers_zero_sum() {
        let config = GameConfig {
            debt_policy: DebtPolicy::ClampAtZero,
            ..GameConfig::default()
        };
        let mut game = game_with(config, Card::credits(CardKind::Event, "x", "", 0));
        game.transfer_property_for_test(1, 1);
        game.players[0].credits = 10;

        land(&mut game, 1);
        let events = act(&mut game, GameAction::PayRent).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::RentPaid {
                from: 0,
                to: 1,
                amount: 10
            }]
        );
        assert_eq!(game.credits(0), Some(0));
        assert_eq!(game.credits(1), Some(1010));
    }

    #[test]
    fn test_allow_debt_goes_negative() {
        let mut game = game();
        game.players[0].credits = 50;
        land(&mut game, 2);
        assert_eq!(game.credits(0), Some(-50));
        assert!(!game.players[0].bankrupt);
    }

    #[test]
    fn test_eliminate_bankrupts_and_frees_properties() {
        let config = GameConfig {
            debt_policy: DebtPolicy::Eliminate,
            ..GameConfig::default()
        };
        let mut game = game_with(config, Card::credits(CardKind::Event, "x", "", 0));
        game.transfer_property_for_test(0, 9);
        game.players[0].credits = 50;

        let events = land(&mut game, 2);
        assert!(events.contains(&GameEvent::PlayerBankrupt { player: 0 }));
        assert!(game.players[0].bankrupt);
        assert_eq!(game.property_owner(9), None);
        assert!(game.ownership_consistent());
        assert_eq!(game.phase, GamePhase::TurnComplete);

        // Bankrupt players are passed over
        act(&mut game, GameAction::EndTurn).unwrap();
        game.phase = GamePhase::TurnComplete;
        act(&mut game, GameAction::EndTurn).unwrap();
        game.phase = GamePhase::TurnComplete;
        act(&mut game, GameAction::EndTurn).unwrap();
        assert_eq!(game.current_player(), 1);
    }

    #[test]
    fn test_last_solvent_player_wins() {
        let config = GameConfig {
            debt_policy: DebtPolicy::Eliminate,
            ..GameConfig::default()
        };
        let mut game = game_with(config, Card::credits(CardKind::Event, "x", "", 0));
        game.players[1].bankrupt = true;
        game.players[0].credits = 10;

        let events = land(&mut game, 2);
        assert!(events.contains(&GameEvent::PlayerBankrupt { player: 0 }));
        assert_eq!(game.winner(), Some(2));
    }

    #[test]
    fn test_transfer_property() {
        let mut game = game();
        game.transfer_property_for_test(0, 1);

        assert_eq!(
            game.transfer_property(1, 2, 1),
            Err(GameError::InvalidChoice)
        );
        assert_eq!(
            game.transfer_property(0, 9, 1),
            Err(GameError::InvalidPlayer(9))
        );

        game.transfer_property(0, 2, 1).unwrap();
        assert_eq!(game.property_owner(1), Some(2));
        assert!(game.owned_tiles(0).is_empty());
        assert_eq!(game.owned_tiles(2), vec![1]);
        assert!(game.ownership_consistent());
    }

    #[test]
    fn test_resolve_landing_validates() {
        let mut game = game();
        assert_eq!(
            game.resolve_landing(42),
            Err(GameError::InvalidTile(42))
        );
        assert_eq!(game.players[0].position, 0);

        game.phase = GamePhase::TurnComplete;
        assert_eq!(game.resolve_landing(1), Err(GameError::InvalidPhase));
    }

    #[test]
    fn test_state_serde_round_trip() {
        let mut game = game();
        game.transfer_property_for_test(2, 3);
        land(&mut game, 5);

        let json = serde_json::to_string(&game).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.phase, game.phase);
        assert_eq!(back.property_owner(3), Some(2));
        assert_eq!(back.current_player(), 0);
        assert!(back.ownership_consistent());
    }

    impl GameState {
        /// Give `tile` to `player` without going through a purchase
        fn transfer_property_for_test(&mut self, player: PlayerId, tile: TileIndex) {
            self.assign_property(player, tile);
        }
    }
}
