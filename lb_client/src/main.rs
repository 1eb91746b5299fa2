//! An interactive LAN blackjack player.
//!
//! Listens for a dealer's UDP offer, connects over TCP, and plays the
//! requested number of rounds, prompting for hit/stand on stdin (or playing
//! a fixed stand-at-17 strategy with `--auto`). After a match it goes back
//! to listening for offers unless `--once` was given.

use anyhow::{Context, Result};
use log::error;
use pico_args::Arguments;
use std::io::{self, Write};

use lan_blackjack::functional::hand_total;
use lan_blackjack::messages::Decision;
use lan_blackjack::net::DEFAULT_DISCOVERY_PORT;
use lan_blackjack::net::client::{self, Client};
use lan_blackjack::net::session::{BasicStrategy, DecisionSource, MatchSummary};
use lan_blackjack::Card;

const HELP: &str = "\
Find a LAN blackjack dealer and play

USAGE:
  lb_client [OPTIONS]

OPTIONS:
  --name       NAME        Player name sent to the dealer       [default: OS username]
  --rounds     N           Rounds to play per match, 0-255      [default: ask]
  --discovery  PORT        UDP port to listen for offers on     [default: env LB_DISCOVERY_PORT or 13122]

FLAGS:
  --auto                   Stand at 17+ instead of prompting
  --json                   Print match summaries as JSON
  --once                   Play a single match instead of looping
  -h, --help               Print help information
";

struct Args {
    name: String,
    rounds: Option<u8>,
    discovery: u16,
    auto: bool,
    json: bool,
    once: bool,
}

/// Prompts hit/stand on stdin, showing the current hands. Unrecognized
/// input re-prompts.
struct StdinDecisions;

impl DecisionSource for StdinDecisions {
    fn decide(&mut self, player_hand: &[Card], dealer_upcards: &[Card]) -> Decision {
        let player: Vec<String> = player_hand.iter().map(ToString::to_string).collect();
        let dealer: Vec<String> = dealer_upcards.iter().map(ToString::to_string).collect();
        println!(
            "your hand: {} ({}) || dealer: {}",
            player.join(", "),
            hand_total(player_hand),
            dealer.join(", ")
        );

        loop {
            print!("Hit or stand? (h/s): ");
            let _ = io::stdout().flush();
            let mut input = String::new();
            if io::stdin().read_line(&mut input).is_err() {
                return Decision::Stand;
            }
            match input.trim().to_lowercase().as_str() {
                "h" | "hit" => return Decision::Hit,
                "s" | "stand" => return Decision::Stand,
                _ => println!("please type 'h' to hit or 's' to stand"),
            }
        }
    }
}

fn prompt_rounds() -> u8 {
    print!("How many rounds would you like to play? ");
    let _ = io::stdout().flush();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return 3;
    }
    input.trim().parse().unwrap_or(3)
}

fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        name: pargs
            .value_from_str("--name")
            .unwrap_or_else(|_| whoami::username()),
        rounds: pargs.opt_value_from_str("--rounds").ok().flatten(),
        discovery: pargs.value_from_str("--discovery").unwrap_or_else(|_| {
            std::env::var("LB_DISCOVERY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DISCOVERY_PORT)
        }),
        auto: pargs.contains("--auto"),
        json: pargs.contains("--json"),
        once: pargs.contains("--once"),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    loop {
        let result = play_one_match(&args);
        match result {
            Ok(summary) => report(&args, summary)?,
            Err(error) if args.once => return Err(error),
            Err(error) => error!("{error:#}"),
        }
        if args.once {
            return Ok(());
        }
        println!("looking for a new dealer...");
    }
}

fn play_one_match(args: &Args) -> Result<MatchSummary> {
    let (addr, server_name) =
        client::find_server(args.discovery).context("listening for offers failed")?;
    println!("found dealer {server_name:?} at {addr}");

    let rounds = args.rounds.unwrap_or_else(prompt_rounds);
    let mut client = Client::connect(&args.name, rounds, addr)?;
    let summary = if args.auto {
        client.play(&mut BasicStrategy::default())
    } else {
        client.play(&mut StdinDecisions)
    }
    .context("match aborted")?;
    Ok(summary)
}

fn report(args: &Args, summary: MatchSummary) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "match finished: {summary}, win rate {:.2}",
            summary.win_rate()
        );
    }
    Ok(())
}
