//! Blackjack game engine - cards, decks, and scoring.
//!
//! This module is pure: it never touches a socket and draws its randomness
//! from an injected [`rand::Rng`]. The rules implemented here are the
//! fixed-ace variant described in the crate docs.

// Submodules
pub mod constants;
pub mod entities;
pub mod functional;
