//! Event cards and tech questions.
//!
//! This module contains:
//! - Event and reward cards with their credit/movement/skip effects
//! - Question cards with answers, rewards and penalties
//! - The decks and their draw rules

use crate::board::TileIndex;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Which deck a card belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    /// Drawn on random event tiles
    Event,
    /// Drawn from the treasure when nothing is left to claim
    Reward,
}

/// An event or reward card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: CardKind,
    /// Credits gained (positive) or lost (negative)
    #[serde(default)]
    pub credit_effect: i64,
    /// Tiles to walk, negative to walk backwards
    #[serde(default)]
    pub move_spaces: i32,
    /// Lose the next turn
    #[serde(default)]
    pub skip_turn: bool,
    /// Every other player pays the drawer
    #[serde(default)]
    pub collect_from_all: bool,
    /// Walk forward to this tile (takes precedence over `move_spaces`)
    #[serde(default)]
    pub move_to_tile: Option<TileIndex>,
}

impl Card {
    /// A card that only changes credits
    pub fn credits(kind: CardKind, title: &str, description: &str, amount: i64) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            kind,
            credit_effect: amount,
            move_spaces: 0,
            skip_turn: false,
            collect_from_all: false,
            move_to_tile: None,
        }
    }

    /// Whether the card moves the drawer's token
    pub fn moves_token(&self) -> bool {
        self.move_to_tile.is_some() || self.move_spaces != 0
    }
}

fn default_reward() -> u32 {
    100
}

fn default_penalty() -> u32 {
    50
}

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCard {
    pub question: String,
    pub answers: Vec<String>,
    /// Index into `answers`
    pub correct_answer: usize,
    #[serde(default = "default_reward")]
    pub reward_credits: u32,
    #[serde(default = "default_penalty")]
    pub penalty_credits: u32,
    #[serde(default)]
    pub correct_explanation: Option<String>,
    #[serde(default)]
    pub incorrect_explanation: Option<String>,
}

impl QuestionCard {
    /// Create a question with the default reward (100) and penalty (50)
    pub fn new(question: &str, answers: &[&str], correct_answer: usize) -> Self {
        Self {
            question: question.to_string(),
            answers: answers.iter().map(|a| a.to_string()).collect(),
            correct_answer,
            reward_credits: default_reward(),
            penalty_credits: default_penalty(),
            correct_explanation: None,
            incorrect_explanation: None,
        }
    }

    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer
    }

    /// Text shown after answering
    pub fn explanation(&self, correct: bool) -> String {
        let custom = if correct {
            &self.correct_explanation
        } else {
            &self.incorrect_explanation
        };

        match custom {
            Some(text) if !text.is_empty() => text.clone(),
            _ if correct => "Correct answer!".to_string(),
            _ => format!(
                "Wrong answer. The correct answer was: {}",
                self.answers
                    .get(self.correct_answer)
                    .map(String::as_str)
                    .unwrap_or("?")
            ),
        }
    }
}

/// Errors raised while loading card content
#[derive(Debug, Error)]
pub enum CardError {
    #[error("Invalid card file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Question {index} has no answers")]
    NoAnswers { index: usize },

    #[error("Question {index} marks answer {correct} as correct but has only {answers}")]
    CorrectAnswerOutOfRange {
        index: usize,
        correct: usize,
        answers: usize,
    },
}

/// All card content of a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDecks {
    #[serde(default)]
    pub events: Vec<Card>,
    #[serde(default)]
    pub questions: Vec<QuestionCard>,
    #[serde(default)]
    pub rewards: Vec<Card>,
    /// Position of the next question to deal
    #[serde(default)]
    next_question: usize,
}

impl CardDecks {
    /// Build decks from card lists
    pub fn new(events: Vec<Card>, questions: Vec<QuestionCard>, rewards: Vec<Card>) -> Self {
        Self {
            events,
            questions,
            rewards,
            next_question: 0,
        }
    }

    /// Load and validate decks from JSON
    pub fn from_json(json: &str) -> Result<Self, CardError> {
        let mut decks: CardDecks = serde_json::from_str(json)?;
        decks.next_question = 0;
        decks.validate()?;
        Ok(decks)
    }

    /// Every question must be answerable
    pub fn validate(&self) -> Result<(), CardError> {
        for (index, question) in self.questions.iter().enumerate() {
            if question.answers.is_empty() {
                return Err(CardError::NoAnswers { index });
            }
            if question.correct_answer >= question.answers.len() {
                return Err(CardError::CorrectAnswerOutOfRange {
                    index,
                    correct: question.correct_answer,
                    answers: question.answers.len(),
                });
            }
        }
        Ok(())
    }

    /// The standard card set
    pub fn standard() -> Self {
        let events = vec![
            Card::credits(
                CardKind::Event,
                "Startup Exit",
                "Your side project gets acquired.",
                150,
            ),
            Card::credits(
                CardKind::Event,
                "Server Outage",
                "Pay for emergency repairs.",
                -100,
            ),
            Card::credits(
                CardKind::Event,
                "Bug Bounty",
                "You found a critical vulnerability.",
                75,
            ),
            Card {
                skip_turn: true,
                ..Card::credits(
                    CardKind::Event,
                    "Blue Screen",
                    "Your machine crashed. Lose your next turn.",
                    0,
                )
            },
            Card {
                collect_from_all: true,
                ..Card::credits(
                    CardKind::Event,
                    "Open Source Sponsor",
                    "Every other player sponsors your project.",
                    0,
                )
            },
            Card {
                move_spaces: 3,
                ..Card::credits(
                    CardKind::Event,
                    "Fast Track",
                    "Move forward three tiles.",
                    0,
                )
            },
            Card {
                move_spaces: -2,
                ..Card::credits(
                    CardKind::Event,
                    "Rollback",
                    "Move back two tiles.",
                    0,
                )
            },
            Card {
                move_to_tile: Some(0),
                ..Card::credits(
                    CardKind::Event,
                    "Reboot",
                    "Go back to the start tile.",
                    0,
                )
            },
        ];

        let questions = vec![
            QuestionCard::new(
                "What does CPU stand for?",
                &[
                    "Central Processing Unit",
                    "Computer Personal Unit",
                    "Central Program Utility",
                ],
                0,
            ),
            QuestionCard::new(
                "How many bits are in a byte?",
                &["4", "8", "16", "32"],
                1,
            ),
            QuestionCard::new(
                "Which company made the first commercial microprocessor?",
                &["IBM", "Motorola", "Intel"],
                2,
            ),
            QuestionCard::new(
                "What does HTTP stand for?",
                &[
                    "HyperText Transfer Protocol",
                    "High Transfer Text Process",
                    "Hyperlink Text Transport Program",
                ],
                0,
            ),
            QuestionCard::new(
                "Which of these is volatile memory?",
                &["SSD", "RAM", "ROM"],
                1,
            ),
        ];

        let rewards = vec![
            Card::credits(
                CardKind::Reward,
                "Hidden Cache",
                "You dig up a forgotten hardware stash.",
                200,
            ),
            Card::credits(
                CardKind::Reward,
                "Patent Royalties",
                "Your old patent pays out.",
                120,
            ),
        ];

        Self::new(events, questions, rewards)
    }

    /// Shuffle the question deck and restart dealing
    pub fn shuffle_questions<R: Rng>(&mut self, rng: &mut R) {
        self.questions.shuffle(rng);
        self.next_question = 0;
    }

    /// Draw a random event card (the deck is not depleted)
    pub fn draw_event<R: Rng>(&self, rng: &mut R) -> Option<Card> {
        let card = self.events.choose(rng).cloned();
        if card.is_none() {
            warn!("No event cards available");
        }
        card
    }

    /// Draw a random reward card (the deck is not depleted)
    pub fn draw_reward<R: Rng>(&self, rng: &mut R) -> Option<Card> {
        let card = self.rewards.choose(rng).cloned();
        if card.is_none() {
            warn!("No reward cards available");
        }
        card
    }

    /// Deal the next question, reshuffling once every question was asked
    pub fn draw_question<R: Rng>(&mut self, rng: &mut R) -> Option<QuestionCard> {
        if self.questions.is_empty() {
            warn!("No question cards available");
            return None;
        }

        if self.next_question >= self.questions.len() {
            self.shuffle_questions(rng);
        }

        let question = self.questions[self.next_question].clone();
        self.next_question += 1;
        Some(question)
    }
}

impl Default for CardDecks {
    fn default() -> Self {
        Self::standard()
    }
}
