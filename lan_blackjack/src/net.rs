//! Networking layer for dealer-player communication.
//!
//! All messages use a fixed-layout big-endian binary protocol over plain
//! `std::net` sockets: UDP broadcast for discovery, a blocking TCP stream
//! for the match itself. The server's accept loop uses `mio` to wait for
//! connections with a bounded timeout so it can keep advertising.

/// Blocking TCP client and UDP discovery listener.
pub mod client;

/// Error types for protocol and session failures.
pub mod errors;

/// Wire message layouts and their encode/decode routines.
pub mod messages;

/// The dealer's advertise/accept loop.
pub mod server;

/// Match state machines for both roles.
pub mod session;

/// Exact-length framing over `Read`/`Write`.
pub mod utils;

/// Default TCP port the dealer accepts players on.
pub const DEFAULT_TCP_PORT: u16 = 2005;

/// Default UDP port offers are broadcast to.
pub const DEFAULT_DISCOVERY_PORT: u16 = 13122;
