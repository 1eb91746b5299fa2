//! Game-wide constants.

/// Number of cards in a fresh deck.
pub const DECK_SIZE: usize = 52;

/// A hand whose total exceeds this is busted.
pub const BUST_THRESHOLD: u32 = 21;

/// The dealer stands once its total reaches this value.
pub const DEALER_STAND_TOTAL: u32 = 17;
