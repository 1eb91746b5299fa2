//! The dealer's advertise/accept loop.
//!
//! The server alternates between broadcasting a UDP offer and waiting up to
//! one offer interval for a TCP connection, so an idle dealer keeps
//! announcing itself once a second. The listener stays non-blocking and is
//! polled through `mio`; an accepted stream is switched back to blocking
//! before the match runs, because a match is a strictly sequential exchange.
//!
//! Exactly one match runs at a time. A fatal error inside a match tears
//! down that connection, never the server process.

use anyhow::{Context, Error};
use log::{error, info, warn};
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use rand::Rng;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::os::fd::AsRawFd;
use std::time::Duration;

use super::session;
use super::{DEFAULT_DISCOVERY_PORT, DEFAULT_TCP_PORT};
use crate::net::messages::Offer;

/// How often offers go out, and how long each accept wait lasts.
pub const OFFER_INTERVAL: Duration = Duration::from_secs(1);

const ACCEPT: Token = Token(0);

/// Dealer configuration. The TCP port may be 0 to bind an ephemeral port;
/// the advertised port is always read back from the bound listener.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Name announced in offers (truncated to the 32-byte wire field).
    pub server_name: String,
    /// TCP port to accept players on.
    pub tcp_port: u16,
    /// UDP port offers are broadcast to.
    pub discovery_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: "The House".to_string(),
            tcp_port: DEFAULT_TCP_PORT,
            discovery_port: DEFAULT_DISCOVERY_PORT,
        }
    }
}

/// Advertise and serve matches forever. Returns only on setup or polling
/// failures; per-match faults are logged and the loop resumes advertising.
pub fn run<R: Rng>(config: &ServerConfig, rng: &mut R) -> Result<(), Error> {
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.tcp_port))
        .with_context(|| format!("couldn't bind tcp port {}", config.tcp_port))?;
    listener.set_nonblocking(true)?;
    let tcp_port = listener.local_addr()?.port();

    let udp = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).context("couldn't bind udp socket")?;
    udp.set_broadcast(true)?;
    let offer = Offer {
        tcp_port,
        server_name: config.server_name.clone(),
    }
    .encode();

    let mut poll = Poll::new()?;
    let mut events = Events::with_capacity(4);
    let fd = listener.as_raw_fd();
    poll.registry()
        .register(&mut SourceFd(&fd), ACCEPT, Interest::READABLE)?;

    info!(
        "dealer {:?} accepting on tcp port {tcp_port}, offering on udp port {}",
        config.server_name, config.discovery_port
    );

    loop {
        if let Err(error) = udp.send_to(&offer, (Ipv4Addr::BROADCAST, config.discovery_port)) {
            warn!("couldn't broadcast offer: {error}");
        }

        match poll.poll(&mut events, Some(OFFER_INTERVAL)) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error).context("polling the listener failed"),
        }
        if events.is_empty() {
            // Nobody showed up this interval; offer again.
            continue;
        }

        loop {
            match listener.accept() {
                Ok((stream, peer)) => handle_connection(stream, peer, rng),
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => break,
                Err(error) => {
                    warn!("accept failed: {error}");
                    break;
                }
            }
        }
    }
}

/// Play one match on a freshly accepted connection, then let it drop.
fn handle_connection<R: Rng>(mut stream: TcpStream, peer: SocketAddr, rng: &mut R) {
    info!("player connected from {peer}");
    if let Err(error) = stream.set_nonblocking(false) {
        error!("couldn't switch {peer} to blocking: {error}");
        return;
    }
    match session::run_dealer_session(&mut stream, rng) {
        Ok((name, summary)) => info!("match with {name:?} finished: {summary}"),
        Err(error) => error!("match with {peer} aborted: {error}"),
    }
    info!("back to advertising");
}
