//! Play a full match between the dealer and an automated player over a
//! localhost socket pair, without any discovery.
//!
//! Run with: cargo run --example bot_match

use std::net::{TcpListener, TcpStream};
use std::thread;

use rand::{SeedableRng, rngs::StdRng};

use lan_blackjack::net::session::{BasicStrategy, run_dealer_session, run_player_match};

fn main() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let dealer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        run_dealer_session(&mut stream, &mut rng).unwrap()
    });

    let mut stream = TcpStream::connect(addr).unwrap();
    let summary = run_player_match(&mut stream, "bot", 10, &mut BasicStrategy::default()).unwrap();
    println!("player view:  {summary}, win rate {:.2}", summary.win_rate());

    let (name, dealer_summary) = dealer.join().unwrap();
    println!("dealer view:  {name} finished with {dealer_summary}");
}
