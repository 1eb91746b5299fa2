//! Error types for protocol and session failures.

use std::io;
use thiserror::Error;

use crate::game::entities::DeckError;

/// A violation of the wire protocol. Fatal to the connection when raised
/// inside a session; the discovery listener instead skips the offending
/// datagram and keeps listening.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProtocolError {
    /// The buffer is not the exact size of the expected message.
    #[error("expected a {expected} byte message, got {got} bytes")]
    BadLength { expected: usize, got: usize },

    /// The magic cookie did not match.
    #[error("bad magic cookie {0:#010x}")]
    BadCookie(u32),

    /// The type tag did not match the expected message kind.
    #[error("expected message type {expected:#04x}, got {got:#04x}")]
    UnexpectedType { expected: u8, got: u8 },

    /// A decision token other than the two allowed ones.
    #[error("invalid decision token {0:?}")]
    InvalidDecision(String),

    /// A card payload whose rank/suit pair is not a real card.
    #[error("invalid card on the wire: rank {rank}, suit {suit}")]
    InvalidCard { rank: u16, suit: u8 },

    /// An outcome byte outside 0-3.
    #[error("invalid outcome byte {0:#04x}")]
    InvalidOutcome(u8),

    /// Encode was called with a value the protocol cannot carry. Rejected
    /// before any bytes are produced.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Errors that abort the match in progress.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The peer closed the stream while more bytes were expected.
    #[error("connection closed while receiving")]
    ConnectionClosed,

    /// Internal consistency fault: the round structure guarantees the deck
    /// outlasts the round.
    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error(transparent)]
    Io(#[from] io::Error),
}
