//! Blocking TCP client and UDP discovery listener.
//!
//! The client side is blocking end to end: listen for one valid offer,
//! connect to the advertised port, and drive the match. Stray or malformed
//! datagrams on the discovery port are ignored, not fatal.

use anyhow::{Error, bail};
use log::{debug, info};
use std::net::{Ipv4Addr, SocketAddr, TcpStream, UdpSocket};
use std::thread;
use std::time::Duration;

use super::errors::SessionError;
use super::messages::Offer;
use super::session::{self, DecisionSource, MatchSummary};

/// Default timeout for reading from the dealer.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for writing to the dealer.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Block until a valid offer arrives on the discovery port. Returns the
/// dealer's TCP endpoint (offer source IP plus the advertised port) and its
/// name.
pub fn find_server(discovery_port: u16) -> Result<(SocketAddr, String), Error> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, discovery_port))?;
    info!("listening for offers on udp port {discovery_port}");

    let mut buf = [0u8; 256];
    loop {
        let (n, from) = socket.recv_from(&mut buf)?;
        match Offer::decode(&buf[..n]) {
            Ok(offer) => {
                info!("offer from {:?} at {}", offer.server_name, from.ip());
                return Ok((SocketAddr::new(from.ip(), offer.tcp_port), offer.server_name));
            }
            Err(error) => {
                debug!("ignoring stray datagram from {from}: {error}");
            }
        }
    }
}

/// A blocking TCP player client.
pub struct Client {
    /// The player name sent in the match request.
    pub name: String,
    /// Rounds requested per match.
    pub rounds: u8,
    /// The underlying TCP stream.
    pub stream: TcpStream,
}

impl Client {
    /// Connect to a dealer.
    ///
    /// Connection attempts back off through three decreasing timeouts
    /// before giving up.
    ///
    /// # Errors
    ///
    /// Returns an error if no attempt gets through.
    pub fn connect(name: &str, rounds: u8, addr: SocketAddr) -> Result<Self, Error> {
        let mut connect_timeouts = vec![
            Duration::from_secs(1),
            Duration::from_millis(500),
            Duration::from_millis(100),
        ];
        while let Some(connect_timeout) = connect_timeouts.pop() {
            match TcpStream::connect_timeout(&addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(READ_TIMEOUT))?;
                    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
                    return Ok(Self {
                        name: name.to_string(),
                        rounds,
                        stream,
                    });
                }
                _ => thread::sleep(connect_timeout),
            }
        }
        bail!("couldn't connect to {addr} as {name}")
    }

    /// Play one full match, pulling decisions from `decisions`.
    ///
    /// # Errors
    ///
    /// Any protocol violation or a dealer-side disconnect aborts the match.
    pub fn play<D: DecisionSource>(&mut self, decisions: &mut D) -> Result<MatchSummary, SessionError> {
        session::run_player_match(&mut self.stream, &self.name, self.rounds, decisions)
    }
}
