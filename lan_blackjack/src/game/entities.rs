use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::constants::DECK_SIZE;

/// Card suits, in wire order: the discriminant is the byte sent on the wire.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[repr(u8)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Diamond, Self::Heart, Self::Spade];

    /// The suit's wire byte (0-3).
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Suit::index`]. Returns `None` for bytes outside 0-3.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Club),
            1 => Some(Self::Diamond),
            2 => Some(Self::Heart),
            3 => Some(Self::Spade),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Card ranks run 1-13: ace is 1, jack/queen/king are 11/12/13.
pub type Rank = u8;

/// A card is a tuple of a rank and a suit. Cards are created by deck
/// construction and never mutated afterwards.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Rank, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rank = match self.0 {
            1 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            r => &r.to_string(),
        };
        let repr = format!("{rank}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

/// Errors from deck operations.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DeckError {
    /// A draw was attempted on an empty deck. Unreachable under the normal
    /// round structure; surfacing it keeps an internal-consistency fault
    /// from turning into a panic.
    #[error("no cards left in the deck")]
    Exhausted,
}

/// An ordered deck of cards, built fresh for every round and consumed by
/// drawing from the end.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// A full 52-card deck in canonical order: suits in wire order, ranks
    /// ace through king within each suit.
    #[must_use]
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL {
            for rank in 1..=13 {
                cards.push(Card(rank, suit));
            }
        }
        Self { cards }
    }

    /// Reorder the deck in place using the caller's randomness source.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.cards.shuffle(rng);
    }

    /// Remove and return the top (last) card.
    pub fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::Exhausted)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// A deck with a known draw order, for scripted round tests. Cards are
    /// drawn from the end of the given sequence.
    #[cfg(test)]
    pub(crate) fn stacked(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
