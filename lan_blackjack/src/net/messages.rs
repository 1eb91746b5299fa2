//! Wire message layouts and their encode/decode routines.
//!
//! Every message starts with the 4-byte magic cookie and a 1-byte type tag.
//! All numeric fields are big-endian; name fields are exactly [`NAME_LEN`]
//! bytes, NUL-padded. Encode and decode are pure transformations: encode
//! produces the exact fixed-size array for the message kind, decode demands
//! a slice of exactly that size and validates the header before touching
//! the payload.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ProtocolError;
use crate::game::entities::{Card, Rank, Suit};

/// Present at the start of every protocol message.
pub const MAGIC_COOKIE: u32 = 0xABCD_DCBA;

/// Fixed size of the name fields in offers and requests.
pub const NAME_LEN: usize = 32;

/// Fixed size of the decision token in client payloads.
pub const DECISION_LEN: usize = 5;

pub const OFFER_LEN: usize = 39;
pub const REQUEST_LEN: usize = 38;
pub const CLIENT_PAYLOAD_LEN: usize = 10;
pub const SERVER_PAYLOAD_LEN: usize = 9;

/// Message type tags.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum MessageType {
    /// Server-to-broadcast discovery offer (UDP).
    Offer = 0x2,
    /// Client-to-server match request (TCP).
    Request = 0x3,
    /// Either side's in-match payload (TCP).
    Payload = 0x4,
}

/// The player's choice each time the dealer waits on them.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Decision {
    Hit,
    Stand,
}

impl Decision {
    /// The 5-byte ASCII token this decision puts on the wire.
    #[must_use]
    pub const fn token(self) -> &'static [u8; DECISION_LEN] {
        match self {
            Self::Hit => b"Hittt",
            Self::Stand => b"Stand",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Hit => "hit",
            Self::Stand => "stand",
        };
        write!(f, "{repr}")
    }
}

/// Round result carried in server payloads. [`Outcome::NotOver`] marks a
/// card delivery; the other three end the round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Outcome {
    NotOver,
    Tie,
    Loss,
    Win,
}

impl Outcome {
    #[must_use]
    pub const fn to_wire(self) -> u8 {
        match self {
            Self::NotOver => 0,
            Self::Tie => 1,
            Self::Loss => 2,
            Self::Win => 3,
        }
    }

    pub fn from_wire(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            0 => Ok(Self::NotOver),
            1 => Ok(Self::Tie),
            2 => Ok(Self::Loss),
            3 => Ok(Self::Win),
            other => Err(ProtocolError::InvalidOutcome(other)),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::NotOver => "not over",
            Self::Tie => "tie",
            Self::Loss => "loss",
            Self::Win => "win",
        };
        write!(f, "{repr}")
    }
}

/// Discovery offer, broadcast by the dealer over UDP.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Offer {
    /// TCP port players should connect to.
    pub tcp_port: u16,
    /// The dealer's display name.
    pub server_name: String,
}

impl Offer {
    #[must_use]
    pub fn encode(&self) -> [u8; OFFER_LEN] {
        let mut buf = [0u8; OFFER_LEN];
        buf[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        buf[4] = MessageType::Offer as u8;
        buf[5..7].copy_from_slice(&self.tcp_port.to_be_bytes());
        buf[7..].copy_from_slice(&pack_name(&self.server_name));
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_header(buf, OFFER_LEN, MessageType::Offer)?;
        Ok(Self {
            tcp_port: u16::from_be_bytes([buf[5], buf[6]]),
            server_name: unpack_name(&buf[7..]),
        })
    }
}

/// Match request, the first message on a fresh TCP connection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    /// Rounds to play. The wire field is one byte, so the type is the
    /// range check.
    pub rounds: u8,
    /// The player's display name.
    pub client_name: String,
}

impl Request {
    #[must_use]
    pub fn encode(&self) -> [u8; REQUEST_LEN] {
        let mut buf = [0u8; REQUEST_LEN];
        buf[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        buf[4] = MessageType::Request as u8;
        buf[5] = self.rounds;
        buf[6..].copy_from_slice(&pack_name(&self.client_name));
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_header(buf, REQUEST_LEN, MessageType::Request)?;
        Ok(Self {
            rounds: buf[5],
            client_name: unpack_name(&buf[6..]),
        })
    }
}

/// Player-to-dealer payload: a 5-byte ASCII decision token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientPayload {
    /// The raw token. [`ClientPayload::decision`] parses it; receivers get
    /// the bytes as sent so they can decide how strict to be.
    pub decision: [u8; DECISION_LEN],
}

impl ClientPayload {
    #[must_use]
    pub fn new(decision: Decision) -> Self {
        Self {
            decision: *decision.token(),
        }
    }

    /// Fails with [`ProtocolError::InvalidArgument`] unless the token is one
    /// of the two allowed ones, before any bytes are produced.
    pub fn encode(&self) -> Result<[u8; CLIENT_PAYLOAD_LEN], ProtocolError> {
        if self.decision != *Decision::Hit.token() && self.decision != *Decision::Stand.token() {
            return Err(ProtocolError::InvalidArgument(
                "decision must be \"Hittt\" or \"Stand\"",
            ));
        }
        let mut buf = [0u8; CLIENT_PAYLOAD_LEN];
        buf[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        buf[4] = MessageType::Payload as u8;
        buf[5..].copy_from_slice(&self.decision);
        Ok(buf)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_header(buf, CLIENT_PAYLOAD_LEN, MessageType::Payload)?;
        let mut decision = [0u8; DECISION_LEN];
        decision.copy_from_slice(&buf[5..]);
        Ok(Self { decision })
    }

    /// Parse the raw token.
    pub fn decision(&self) -> Result<Decision, ProtocolError> {
        match &self.decision {
            b"Hittt" => Ok(Decision::Hit),
            b"Stand" => Ok(Decision::Stand),
            other => Err(ProtocolError::InvalidDecision(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

/// Dealer-to-player payload: a card delivery (outcome [`Outcome::NotOver`])
/// or the round result (any other outcome, with the rank=0/suit=0 sentinel).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ServerPayload {
    pub outcome: Outcome,
    pub rank: u16,
    pub suit: u8,
}

impl ServerPayload {
    /// A card delivery.
    #[must_use]
    pub fn with_card(outcome: Outcome, card: Card) -> Self {
        Self {
            outcome,
            rank: u16::from(card.0),
            suit: card.1.index(),
        }
    }

    /// The round-ending result, carrying the "no card" sentinel.
    #[must_use]
    pub fn round_over(outcome: Outcome) -> Self {
        Self {
            outcome,
            rank: 0,
            suit: 0,
        }
    }

    #[must_use]
    pub fn encode(&self) -> [u8; SERVER_PAYLOAD_LEN] {
        let mut buf = [0u8; SERVER_PAYLOAD_LEN];
        buf[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        buf[4] = MessageType::Payload as u8;
        buf[5] = self.outcome.to_wire();
        buf[6..8].copy_from_slice(&self.rank.to_be_bytes());
        buf[8] = self.suit;
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        check_header(buf, SERVER_PAYLOAD_LEN, MessageType::Payload)?;
        Ok(Self {
            outcome: Outcome::from_wire(buf[5])?,
            rank: u16::from_be_bytes([buf[6], buf[7]]),
            suit: buf[8],
        })
    }

    /// The delivered card. Fails unless the rank/suit pair is a real card,
    /// so result payloads (sentinel rank 0) never masquerade as cards.
    pub fn card(&self) -> Result<Card, ProtocolError> {
        let invalid = ProtocolError::InvalidCard {
            rank: self.rank,
            suit: self.suit,
        };
        let rank = Rank::try_from(self.rank).map_err(|_| invalid.clone())?;
        if !(1..=13).contains(&rank) {
            return Err(invalid);
        }
        let suit = Suit::from_index(self.suit).ok_or(invalid)?;
        Ok(Card(rank, suit))
    }
}

fn check_header(
    buf: &[u8],
    expected_len: usize,
    expected_type: MessageType,
) -> Result<(), ProtocolError> {
    if buf.len() != expected_len {
        return Err(ProtocolError::BadLength {
            expected: expected_len,
            got: buf.len(),
        });
    }
    let cookie = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if cookie != MAGIC_COOKIE {
        return Err(ProtocolError::BadCookie(cookie));
    }
    if buf[4] != expected_type as u8 {
        return Err(ProtocolError::UnexpectedType {
            expected: expected_type as u8,
            got: buf[4],
        });
    }
    Ok(())
}

/// Truncate the name's UTF-8 bytes at [`NAME_LEN`] and NUL-pad the rest.
fn pack_name(name: &str) -> [u8; NAME_LEN] {
    let mut field = [0u8; NAME_LEN];
    let bytes = name.as_bytes();
    let n = bytes.len().min(NAME_LEN);
    field[..n].copy_from_slice(&bytes[..n]);
    field
}

/// Decode the bytes before the first NUL. A multi-byte sequence split by
/// the encode-side truncation degrades to U+FFFD rather than failing.
fn unpack_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
