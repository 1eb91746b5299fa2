//! # LAN Blackjack
//!
//! A discoverable blackjack game for local networks. A dealer server
//! broadcasts UDP offers while waiting for a player; a client picks up an
//! offer, connects over TCP, and the two play an agreed number of rounds
//! using a compact, fixed-layout binary protocol.
//!
//! The scoring is a fixed-ace variant of blackjack: aces always count 11,
//! face cards count 10, and there is no soft-ace recount. A hand of two aces
//! is therefore busted before the player ever gets a turn.
//!
//! ## Architecture
//!
//! One match is a strictly sequential exchange between exactly two parties:
//!
//! - **Offer** (UDP broadcast): the dealer announces its name and TCP port.
//! - **Request** (TCP): the player asks for 0-255 rounds under a given name.
//! - Per round: initial deal, player hit/stand loop, dealer draw-to-17 loop,
//!   and a final result payload (win/loss/tie).
//!
//! ## Core Modules
//!
//! - [`game`]: cards, decks, and the scoring rules
//! - [`net`]: wire codec, framing, session state machines, and the
//!   discovery loops for both roles
//!
//! ## Example
//!
//! ```no_run
//! use lan_blackjack::net::{client, session::BasicStrategy};
//!
//! let (addr, server_name) = client::find_server(13122)?;
//! let mut client = client::Client::connect("player1", 3, addr)?;
//! let summary = client.play(&mut BasicStrategy::default())?;
//! println!("played {server_name}: {summary}");
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Card, deck, and scoring primitives.
pub mod game;
pub use game::{
    constants,
    entities::{self, Card, Deck, DeckError, Rank, Suit},
    functional,
};

/// Networking: codec, framing, sessions, and discovery.
pub mod net;
pub use net::{client::Client, errors, messages, server, session, utils};
