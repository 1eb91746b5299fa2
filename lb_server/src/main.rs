//! A discoverable LAN blackjack dealer.
//!
//! The dealer broadcasts UDP offers once a second and serves one player at
//! a time over TCP. A fatal error in a match drops that connection and the
//! dealer goes back to advertising.

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;

use lan_blackjack::net::server::{self, ServerConfig};
use lan_blackjack::net::{DEFAULT_DISCOVERY_PORT, DEFAULT_TCP_PORT};

const HELP: &str = "\
Run a discoverable LAN blackjack dealer

USAGE:
  lb_server [OPTIONS]

OPTIONS:
  --name       NAME        Dealer name announced in offers      [default: env LB_SERVER_NAME or \"The House\"]
  --port       PORT        TCP port to accept players on, 0 for ephemeral
                                                                [default: env LB_SERVER_PORT or 2005]
  --discovery  PORT        UDP port offers are broadcast to     [default: env LB_DISCOVERY_PORT or 13122]

FLAGS:
  -h, --help               Print help information
";

struct Args {
    name: String,
    port: u16,
    discovery: u16,
}

fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        name: pargs.value_from_str("--name").unwrap_or_else(|_| {
            std::env::var("LB_SERVER_NAME").unwrap_or_else(|_| "The House".to_string())
        }),
        port: pargs.value_from_str("--port").unwrap_or_else(|_| {
            std::env::var("LB_SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TCP_PORT)
        }),
        discovery: pargs.value_from_str("--discovery").unwrap_or_else(|_| {
            std::env::var("LB_DISCOVERY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DISCOVERY_PORT)
        }),
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();
    info!("starting dealer {:?}", args.name);

    let config = ServerConfig {
        server_name: args.name,
        tcp_port: args.port,
        discovery_port: args.discovery,
    };
    server::run(&config, &mut rand::rng())
}
