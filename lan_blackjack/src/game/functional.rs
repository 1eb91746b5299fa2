//! Pure scoring rules for the fixed-ace blackjack variant.
//!
//! Aces always count 11 and face cards count 10. There is no soft-ace
//! recount: a hand of two aces totals 22 and is busted on the spot.

use super::constants::BUST_THRESHOLD;
use super::entities::{Card, Rank};

/// Point value of a single rank: 10 for face cards, 11 for the ace,
/// otherwise the rank itself.
#[must_use]
pub fn card_value(rank: Rank) -> u32 {
    if rank >= 11 {
        10
    } else if rank == 1 {
        11
    } else {
        u32::from(rank)
    }
}

/// Total score of a hand.
#[must_use]
pub fn hand_total(hand: &[Card]) -> u32 {
    hand.iter().map(|card| card_value(card.0)).sum()
}

/// Whether a hand's total exceeds the bust threshold.
#[must_use]
pub fn is_busted(hand: &[Card]) -> bool {
    hand_total(hand) > BUST_THRESHOLD
}
