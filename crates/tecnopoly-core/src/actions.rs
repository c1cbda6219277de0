//! Game actions that players can take.
//!
//! This module defines all possible actions in the game and the events
//! that result from those actions. Events double as the notifications shown
//! to players: their `Display` text is the message.

use crate::board::{PlayerId, TileIndex};
use crate::cards::Card;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    // ==================== Movement ====================
    /// Roll the dice (start of turn)
    RollDice,
    /// Use dice faces rolled outside the engine
    SubmitRoll(Vec<u8>),
    /// The token finished walking to its destination
    CompleteMovement,

    // ==================== Property ====================
    /// Buy the artefact on offer
    BuyProperty,
    /// Turn down the artefact on offer
    DeclinePurchase,
    /// Pay the rent that is due
    PayRent,

    // ==================== Cards ====================
    /// Answer the open question (index into its answers)
    AnswerQuestion(usize),
    /// Pick how to deal with the thief
    ChooseThiefPenalty(ThiefPenalty),
    /// Jump to an unowned artefact from the treasure tile
    ClaimTreasure(TileIndex),
    /// Stay on the treasure tile
    DeclineTreasure,

    // ==================== Turn Management ====================
    /// End your turn
    EndTurn,
}

/// The two ways out of a thief encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThiefPenalty {
    /// A random owned artefact goes back to the bank
    SurrenderProperty,
    /// Sit out several turns
    SkipTurns,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        values: Vec<u8>,
        total: u32,
    },

    /// A token started walking
    TokenMoving {
        player: PlayerId,
        from: TileIndex,
        to: TileIndex,
        steps: i32,
    },

    /// A token stopped on a tile
    TokenLanded { player: PlayerId, tile: TileIndex },

    /// Salary paid for landing on or passing the start tile
    SalaryCollected { player: PlayerId, amount: u32 },

    /// An unowned artefact can be bought
    PurchaseOffered {
        player: PlayerId,
        tile: TileIndex,
        cost: u32,
    },

    /// An artefact was bought
    PropertyPurchased {
        player: PlayerId,
        tile: TileIndex,
        cost: u32,
    },

    /// A purchase failed for lack of credits
    PurchaseRejected {
        player: PlayerId,
        tile: TileIndex,
        cost: u32,
        credits: i64,
    },

    /// The offer was turned down
    PurchaseDeclined { player: PlayerId, tile: TileIndex },

    /// The player landed on their own artefact
    AlreadyOwned { player: PlayerId, tile: TileIndex },

    /// Rent must be paid before the turn can go on
    RentDue {
        player: PlayerId,
        owner: PlayerId,
        tile: TileIndex,
        amount: u32,
    },

    /// Rent changed hands
    RentPaid {
        from: PlayerId,
        to: PlayerId,
        amount: u32,
    },

    /// Tax was paid to the bank
    TaxPaid {
        player: PlayerId,
        tile: TileIndex,
        amount: u32,
    },

    /// An event or reward card was drawn
    CardDrawn { player: PlayerId, card: Card },

    /// A card changed a player's credits
    CreditsAdjusted { player: PlayerId, amount: i64 },

    /// Every other player paid the drawer
    CollectedFromAll {
        player: PlayerId,
        amount_each: u32,
        total: u32,
    },

    /// A question awaits an answer
    QuestionAsked {
        player: PlayerId,
        question: String,
        answers: Vec<String>,
    },

    /// A question was answered
    QuestionAnswered {
        player: PlayerId,
        correct: bool,
        credit_change: i64,
        explanation: String,
    },

    /// The thief demands a choice
    ThiefEncountered { player: PlayerId },

    /// An artefact went back to the bank
    PropertyLost { player: PlayerId, tile: TileIndex },

    /// The player will sit out upcoming turns
    TurnsForfeited { player: PlayerId, turns: u8 },

    /// The treasure lets the player jump to an unowned artefact
    TreasureFound {
        player: PlayerId,
        options: Vec<TileIndex>,
    },

    /// A flagged player lost their turn
    TurnSkipped { player: PlayerId },

    /// A player ran out of credits and left the game
    PlayerBankrupt { player: PlayerId },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// The game is over
    GameWon {
        player: PlayerId,
        properties: usize,
        credits: i64,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::DiceRolled { player, total, .. } => {
                write!(f, "Player {} rolled {}", player + 1, total)
            }
            GameEvent::TokenMoving { player, to, .. } => {
                write!(f, "Player {} moves to tile {}", player + 1, to)
            }
            GameEvent::TokenLanded { player, tile } => {
                write!(f, "Player {} landed on tile {}", player + 1, tile)
            }
            GameEvent::SalaryCollected { amount, .. } => {
                write!(f, "You received {} credits for passing Start", amount)
            }
            GameEvent::PurchaseOffered { cost, .. } => {
                write!(f, "This artefact is for sale for {} credits", cost)
            }
            GameEvent::PropertyPurchased { cost, .. } => {
                write!(f, "Artefact acquired for {} credits!", cost)
            }
            GameEvent::PurchaseRejected { .. } => {
                write!(f, "You don't have enough credits to buy this")
            }
            GameEvent::PurchaseDeclined { .. } => write!(f, "Purchase declined"),
            GameEvent::AlreadyOwned { .. } => write!(f, "You already own this artefact"),
            GameEvent::RentDue { owner, amount, .. } => {
                write!(f, "Usage fee of {} credits owed to Player {}", amount, owner + 1)
            }
            GameEvent::RentPaid { to, amount, .. } => {
                write!(f, "You paid {} credits to Player {}", amount, to + 1)
            }
            GameEvent::TaxPaid { amount, .. } => {
                write!(f, "You paid {} credits in taxes", amount)
            }
            GameEvent::CardDrawn { card, .. } => write!(f, "{}: {}", card.title, card.description),
            GameEvent::CreditsAdjusted { amount, .. } if *amount >= 0 => {
                write!(f, "You receive {} credits", amount)
            }
            GameEvent::CreditsAdjusted { amount, .. } => {
                write!(f, "You lose {} credits", amount.unsigned_abs())
            }
            GameEvent::CollectedFromAll { amount_each, .. } => {
                write!(f, "You collect {} credits from every player", amount_each)
            }
            GameEvent::QuestionAsked { question, .. } => write!(f, "{}", question),
            GameEvent::QuestionAnswered {
                correct: true,
                credit_change,
                explanation,
                ..
            } => write!(
                f,
                "{}You won {} credits",
                as_sentence(explanation),
                credit_change
            ),
            GameEvent::QuestionAnswered {
                credit_change,
                explanation,
                ..
            } => write!(
                f,
                "{}You lost {} credits",
                as_sentence(explanation),
                credit_change.unsigned_abs()
            ),
            GameEvent::ThiefEncountered { .. } => write!(
                f,
                "A thief! Give up an artefact or sit out several turns"
            ),
            GameEvent::PropertyLost { player, tile } => {
                write!(f, "Player {} lost the artefact on tile {}", player + 1, tile)
            }
            GameEvent::TurnsForfeited { player, turns } => {
                write!(f, "Player {} will miss {} turn(s)", player + 1, turns)
            }
            GameEvent::TreasureFound { .. } => {
                write!(f, "Treasure! Jump to any unowned artefact")
            }
            GameEvent::TurnSkipped { player } => {
                write!(f, "Player {} loses this turn", player + 1)
            }
            GameEvent::PlayerBankrupt { player } => {
                write!(f, "Player {} is bankrupt", player + 1)
            }
            GameEvent::TurnEnded { next_player, .. } => {
                write!(f, "Player {}'s turn", next_player + 1)
            }
            GameEvent::GameWon { player, .. } => {
                write!(f, "Game over! Player {} wins", player + 1)
            }
        }
    }
}

/// `text` closed as a sentence and followed by a space, or nothing when empty
fn as_sentence(text: &str) -> String {
    let text = text.trim();
    match text.chars().last() {
        None => String::new(),
        Some('.' | '!' | '?') => format!("{} ", text),
        Some(_) => format!("{}. ", text),
    }
}
