//! Match state machines for both roles.
//!
//! One match is a strictly sequential exchange: the dealer reads a
//! [`Request`], then plays the agreed number of rounds, dealing fresh
//! shuffled decks and streaming every visible card as a payload. The player
//! mirrors it, feeding decisions from an injected [`DecisionSource`] so the
//! same state machine drives an interactive prompt, a bot, or a test.
//!
//! Any cookie/type mismatch mid-match is fatal to the connection, as is the
//! peer closing the stream while bytes are expected. Both unwind as
//! [`SessionError`] to the discovery loop, which owns the socket.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

use super::errors::SessionError;
use super::messages::{
    CLIENT_PAYLOAD_LEN, ClientPayload, Decision, Outcome, REQUEST_LEN, Request, SERVER_PAYLOAD_LEN,
    ServerPayload,
};
use super::utils::{read_frame, write_frame};
use crate::game::constants::{BUST_THRESHOLD, DEALER_STAND_TOTAL};
use crate::game::entities::{Card, Deck};
use crate::game::functional::hand_total;

/// Per-match outcome tallies, from the player's point of view.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchSummary {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl MatchSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
            Outcome::NotOver => {}
        }
    }

    #[must_use]
    pub fn rounds_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.rounds_played() == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.rounds_played())
        }
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "wins={} losses={} ties={}",
            self.wins, self.losses, self.ties
        )
    }
}

/// Chooses hit or stand whenever the dealer is waiting on the player.
/// Console prompting lives behind this seam, outside the library core.
pub trait DecisionSource {
    fn decide(&mut self, player_hand: &[Card], dealer_upcards: &[Card]) -> Decision;
}

/// Hit below a fixed total, stand at or above it. The default mirrors the
/// dealer's own draw-to-17 rule.
#[derive(Clone, Copy, Debug)]
pub struct BasicStrategy {
    pub stand_on: u32,
}

impl Default for BasicStrategy {
    fn default() -> Self {
        Self {
            stand_on: DEALER_STAND_TOTAL,
        }
    }
}

impl DecisionSource for BasicStrategy {
    fn decide(&mut self, player_hand: &[Card], _dealer_upcards: &[Card]) -> Decision {
        if hand_total(player_hand) < self.stand_on {
            Decision::Hit
        } else {
            Decision::Stand
        }
    }
}

// === Dealer role ===

/// Run one full match from the dealer's side: read the request, then play
/// every round. Returns the client's name and the final tallies.
pub fn run_dealer_session<S, R>(
    stream: &mut S,
    rng: &mut R,
) -> Result<(String, MatchSummary), SessionError>
where
    S: Read + Write,
    R: Rng,
{
    let frame: [u8; REQUEST_LEN] = read_frame(stream)?;
    let request = Request::decode(&frame)?;
    info!(
        "match requested by {:?} for {} rounds",
        request.client_name, request.rounds
    );

    let mut summary = MatchSummary::default();
    for round in 1..=u32::from(request.rounds) {
        let mut deck = Deck::new();
        deck.shuffle(rng);
        let outcome = play_dealer_round(stream, &mut deck)?;
        info!("round {round}/{}: {outcome}", request.rounds);
        summary.record(outcome);
    }
    Ok((request.client_name, summary))
}

/// One round against a freshly shuffled deck.
fn play_dealer_round<S: Read + Write>(
    stream: &mut S,
    deck: &mut Deck,
) -> Result<Outcome, SessionError> {
    let mut player_hand = Vec::new();
    let mut dealer_hand = Vec::new();

    // Initial deal: two player cards and the dealer upcard go out
    // immediately; the dealer's second card stays hidden.
    deal_to(stream, deck, &mut player_hand)?;
    deal_to(stream, deck, &mut player_hand)?;
    deal_to(stream, deck, &mut dealer_hand)?;
    let hidden = deck.draw()?;

    let player_busted;
    let mut dealer_busted = false;
    if hand_total(&player_hand) > BUST_THRESHOLD {
        // Two aces on the deal. The fixed ace value leaves no way back,
        // so neither side gets a turn.
        player_busted = true;
    } else {
        player_busted = player_turn(stream, deck, &mut player_hand)?;
        if !player_busted {
            dealer_busted = dealer_turn(stream, deck, &mut dealer_hand, hidden)?;
        }
    }

    let outcome = round_outcome(&player_hand, &dealer_hand, player_busted, dealer_busted);
    write_frame(stream, &ServerPayload::round_over(outcome).encode())?;
    Ok(outcome)
}

/// Draw a card, send it as a not-over payload, and append it to the hand.
fn deal_to<S: Read + Write>(
    stream: &mut S,
    deck: &mut Deck,
    hand: &mut Vec<Card>,
) -> Result<(), SessionError> {
    let card = deck.draw()?;
    write_frame(
        stream,
        &ServerPayload::with_card(Outcome::NotOver, card).encode(),
    )?;
    hand.push(card);
    Ok(())
}

/// Feed the player cards until they stand or bust. Returns whether they
/// busted.
fn player_turn<S: Read + Write>(
    stream: &mut S,
    deck: &mut Deck,
    player_hand: &mut Vec<Card>,
) -> Result<bool, SessionError> {
    loop {
        if hand_total(player_hand) > BUST_THRESHOLD {
            return Ok(true);
        }
        let frame: [u8; CLIENT_PAYLOAD_LEN] = read_frame(stream)?;
        let payload = ClientPayload::decode(&frame)?;
        match payload.decision()? {
            Decision::Hit => {
                deal_to(stream, deck, player_hand)?;
                debug!("player hits, total {}", hand_total(player_hand));
            }
            Decision::Stand => {
                debug!("player stands at {}", hand_total(player_hand));
                return Ok(false);
            }
        }
    }
}

/// Reveal the hidden card, then draw to 17. Returns whether the dealer
/// busted.
fn dealer_turn<S: Read + Write>(
    stream: &mut S,
    deck: &mut Deck,
    dealer_hand: &mut Vec<Card>,
    hidden: Card,
) -> Result<bool, SessionError> {
    write_frame(
        stream,
        &ServerPayload::with_card(Outcome::NotOver, hidden).encode(),
    )?;
    dealer_hand.push(hidden);

    loop {
        let total = hand_total(dealer_hand);
        if total > BUST_THRESHOLD {
            return Ok(true);
        }
        if total >= DEALER_STAND_TOTAL {
            return Ok(false);
        }
        deal_to(stream, deck, dealer_hand)?;
    }
}

/// Decide the round from the player's point of view: a busted player loses
/// outright, a busted dealer loses otherwise, and totals settle the rest.
fn round_outcome(
    player_hand: &[Card],
    dealer_hand: &[Card],
    player_busted: bool,
    dealer_busted: bool,
) -> Outcome {
    if player_busted {
        return Outcome::Loss;
    }
    if dealer_busted {
        return Outcome::Win;
    }
    match hand_total(player_hand).cmp(&hand_total(dealer_hand)) {
        std::cmp::Ordering::Greater => Outcome::Win,
        std::cmp::Ordering::Less => Outcome::Loss,
        std::cmp::Ordering::Equal => Outcome::Tie,
    }
}

// === Player role ===

/// Run one full match from the player's side: send the request, then play
/// every round, pulling decisions from `decisions`.
pub fn run_player_match<S, D>(
    stream: &mut S,
    name: &str,
    rounds: u8,
    decisions: &mut D,
) -> Result<MatchSummary, SessionError>
where
    S: Read + Write,
    D: DecisionSource,
{
    let request = Request {
        rounds,
        client_name: name.to_string(),
    };
    write_frame(stream, &request.encode())?;

    let mut summary = MatchSummary::default();
    for round in 1..=u32::from(rounds) {
        let outcome = play_player_round(stream, decisions)?;
        info!("round {round}/{rounds}: {outcome}");
        summary.record(outcome);
    }
    Ok(summary)
}

fn play_player_round<S, D>(stream: &mut S, decisions: &mut D) -> Result<Outcome, SessionError>
where
    S: Read + Write,
    D: DecisionSource,
{
    let mut player_hand = Vec::new();
    let mut dealer_hand = Vec::new();

    // Initial deal: two cards for us, then the dealer upcard.
    for i in 0..3 {
        let payload = read_server_payload(stream)?;
        let card = payload.card()?;
        if i < 2 {
            player_hand.push(card);
        } else {
            dealer_hand.push(card);
        }
    }
    debug!(
        "dealt {:?} against upcard {}",
        player_hand, dealer_hand[0]
    );

    // Decision loop. A busted hand ends our turn without another word to
    // the dealer; it already knows.
    loop {
        if hand_total(&player_hand) > BUST_THRESHOLD {
            info!("busted with {}", hand_total(&player_hand));
            break;
        }
        let decision = decisions.decide(&player_hand, &dealer_hand);
        write_frame(stream, &ClientPayload::new(decision).encode()?)?;
        if decision == Decision::Stand {
            break;
        }
        let payload = read_server_payload(stream)?;
        if payload.outcome != Outcome::NotOver {
            return Ok(payload.outcome);
        }
        player_hand.push(payload.card()?);
    }

    // Dealer reveals, then the result.
    loop {
        let payload = read_server_payload(stream)?;
        match payload.outcome {
            Outcome::NotOver => {
                let card = payload.card()?;
                info!("dealer shows {card}");
                dealer_hand.push(card);
            }
            outcome => return Ok(outcome),
        }
    }
}

fn read_server_payload<S: Read>(stream: &mut S) -> Result<ServerPayload, SessionError> {
    let frame: [u8; SERVER_PAYLOAD_LEN] = read_frame(stream)?;
    Ok(ServerPayload::decode(&frame)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    use super::*;
    use crate::game::entities::Suit::{Club, Diamond, Heart, Spade};
    use crate::net::errors::ProtocolError;
    use crate::net::messages::MAGIC_COOKIE;

    fn setup() -> (TcpStream, TcpStream) {
        let server = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (stream, _) = server.accept().unwrap();
        (client, stream)
    }

    /// Read payloads off the dealer until a round result arrives. Returns
    /// the cards seen (in order) and the final payload.
    fn drain_round(stream: &mut TcpStream) -> (Vec<Card>, ServerPayload) {
        let mut cards = Vec::new();
        loop {
            let payload = read_server_payload(stream).unwrap();
            if payload.outcome == Outcome::NotOver {
                cards.push(payload.card().unwrap());
            } else {
                return (cards, payload);
            }
        }
    }

    /// A player peer that reads its initial cards, plays a fixed decision
    /// script, and then drains to the round result.
    fn scripted_player(
        mut stream: TcpStream,
        script: Vec<Decision>,
    ) -> JoinHandle<(Vec<Card>, ServerPayload)> {
        thread::spawn(move || {
            let mut cards = Vec::new();
            for _ in 0..3 {
                let payload = read_server_payload(&mut stream).unwrap();
                cards.push(payload.card().unwrap());
            }
            for decision in script {
                let frame = ClientPayload::new(decision).encode().unwrap();
                stream.write_all(&frame).unwrap();
                if decision == Decision::Hit {
                    let payload = read_server_payload(&mut stream).unwrap();
                    cards.push(payload.card().unwrap());
                }
            }
            let (more, result) = drain_round(&mut stream);
            cards.extend(more);
            (cards, result)
        })
    }

    // Stacked decks list draws from last to first: the rightmost card is
    // drawn first.

    #[test]
    fn stand_round_player_wins() {
        // Player 10♣+9♦ = 19, upcard 7♥, hidden 6♠ (13 -> draws), 5♣ -> 18.
        let mut deck = Deck::stacked(vec![
            Card(5, Club),
            Card(6, Spade),
            Card(7, Heart),
            Card(9, Diamond),
            Card(10, Club),
        ]);
        let (client, mut server) = setup();
        let peer = scripted_player(client, vec![Decision::Stand]);

        let outcome = play_dealer_round(&mut server, &mut deck).unwrap();
        assert_eq!(outcome, Outcome::Win);

        let (cards, result) = peer.join().unwrap();
        assert_eq!(
            cards,
            vec![
                Card(10, Club),
                Card(9, Diamond),
                Card(7, Heart),
                Card(6, Spade),
                Card(5, Club),
            ]
        );
        assert_eq!(result, ServerPayload::round_over(Outcome::Win));
        assert!(deck.is_empty());
    }

    #[test]
    fn two_aces_bust_before_any_turn() {
        // Player A♣+A♦ = 22: no player turn, no dealer turn, no reveal.
        let mut deck = Deck::stacked(vec![
            Card(6, Spade),
            Card(7, Heart),
            Card(1, Diamond),
            Card(1, Club),
        ]);
        let (mut client, mut server) = setup();

        let outcome = play_dealer_round(&mut server, &mut deck).unwrap();
        assert_eq!(outcome, Outcome::Loss);

        let (cards, result) = drain_round(&mut client);
        assert_eq!(
            cards,
            vec![Card(1, Club), Card(1, Diamond), Card(7, Heart)]
        );
        assert_eq!(result.outcome, Outcome::Loss);
        // The hidden card was drawn but never revealed.
        assert_eq!(deck.len(), 0);
    }

    #[test]
    fn dealer_draws_at_16() {
        // Dealer 9♥+7♠ = 16 must draw; 5♣ takes it to 21 and a win.
        let mut deck = Deck::stacked(vec![
            Card(5, Club),
            Card(7, Spade),
            Card(9, Heart),
            Card(9, Diamond),
            Card(10, Club),
        ]);
        let (client, mut server) = setup();
        let peer = scripted_player(client, vec![Decision::Stand]);

        let outcome = play_dealer_round(&mut server, &mut deck).unwrap();
        assert_eq!(outcome, Outcome::Loss);
        assert!(deck.is_empty());
        peer.join().unwrap();
    }

    #[test]
    fn dealer_stands_at_17() {
        // Dealer 10♥+7♠ = 17 stands on the spot; player's 19 wins.
        let mut deck = Deck::stacked(vec![
            Card(7, Spade),
            Card(10, Heart),
            Card(9, Diamond),
            Card(10, Club),
        ]);
        let (client, mut server) = setup();
        let peer = scripted_player(client, vec![Decision::Stand]);

        let outcome = play_dealer_round(&mut server, &mut deck).unwrap();
        assert_eq!(outcome, Outcome::Win);
        assert!(deck.is_empty());
        peer.join().unwrap();
    }

    #[test]
    fn hit_then_bust_loses() {
        // Player 10♣+9♦ hits into 5♥: 24, busted. Dealer never plays.
        let mut deck = Deck::stacked(vec![
            Card(5, Heart),
            Card(6, Spade),
            Card(7, Heart),
            Card(9, Diamond),
            Card(10, Club),
        ]);
        let (client, mut server) = setup();
        let peer = scripted_player(client, vec![Decision::Hit]);

        let outcome = play_dealer_round(&mut server, &mut deck).unwrap();
        assert_eq!(outcome, Outcome::Loss);

        let (cards, result) = peer.join().unwrap();
        assert_eq!(cards.len(), 4);
        assert_eq!(result.outcome, Outcome::Loss);
    }

    #[test]
    fn equal_totals_tie() {
        // Player stands at 19; dealer 10♥+9♠ = 19.
        let mut deck = Deck::stacked(vec![
            Card(9, Spade),
            Card(10, Heart),
            Card(9, Diamond),
            Card(10, Club),
        ]);
        let (client, mut server) = setup();
        let peer = scripted_player(client, vec![Decision::Stand]);

        let outcome = play_dealer_round(&mut server, &mut deck).unwrap();
        assert_eq!(outcome, Outcome::Tie);
        peer.join().unwrap();
    }

    #[test]
    fn unknown_decision_token_aborts_the_round() {
        let mut deck = Deck::stacked(vec![
            Card(6, Spade),
            Card(7, Heart),
            Card(9, Diamond),
            Card(10, Club),
        ]);
        let (mut client, mut server) = setup();

        let peer = thread::spawn(move || {
            for _ in 0..3 {
                read_server_payload(&mut client).unwrap();
            }
            let mut frame = [0u8; CLIENT_PAYLOAD_LEN];
            frame[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
            frame[4] = 0x4;
            frame[5..].copy_from_slice(b"Nope!");
            client.write_all(&frame).unwrap();
        });

        let result = play_dealer_round(&mut server, &mut deck);
        assert!(matches!(
            result,
            Err(SessionError::Protocol(ProtocolError::InvalidDecision(_)))
        ));
        peer.join().unwrap();
    }

    #[test]
    fn bad_cookie_aborts_the_round() {
        let mut deck = Deck::stacked(vec![
            Card(6, Spade),
            Card(7, Heart),
            Card(9, Diamond),
            Card(10, Club),
        ]);
        let (mut client, mut server) = setup();

        let peer = thread::spawn(move || {
            for _ in 0..3 {
                read_server_payload(&mut client).unwrap();
            }
            let mut frame = ClientPayload::new(Decision::Stand).encode().unwrap();
            frame[0] = 0xFF;
            client.write_all(&frame).unwrap();
        });

        let result = play_dealer_round(&mut server, &mut deck);
        assert!(matches!(
            result,
            Err(SessionError::Protocol(ProtocolError::BadCookie(_)))
        ));
        peer.join().unwrap();
    }

    #[test]
    fn disconnect_mid_turn_is_connection_closed() {
        let mut deck = Deck::stacked(vec![
            Card(6, Spade),
            Card(7, Heart),
            Card(9, Diamond),
            Card(10, Club),
        ]);
        let (mut client, mut server) = setup();

        // The player reads its deal and walks away mid-turn.
        let peer = thread::spawn(move || {
            for _ in 0..3 {
                read_server_payload(&mut client).unwrap();
            }
        });

        let result = play_dealer_round(&mut server, &mut deck);
        assert!(matches!(result, Err(SessionError::ConnectionClosed)));
        peer.join().unwrap();
    }

    #[test]
    fn player_side_records_a_scripted_win() {
        let (mut client, mut server) = setup();

        let dealer = thread::spawn(move || {
            let frame: [u8; REQUEST_LEN] = read_frame(&mut server).unwrap();
            let request = Request::decode(&frame).unwrap();
            assert_eq!(request.rounds, 1);
            assert_eq!(request.client_name, "tester");

            for card in [Card(10, Club), Card(9, Diamond), Card(7, Heart)] {
                server
                    .write_all(&ServerPayload::with_card(Outcome::NotOver, card).encode())
                    .unwrap();
            }
            let frame: [u8; CLIENT_PAYLOAD_LEN] = read_frame(&mut server).unwrap();
            let decision = ClientPayload::decode(&frame).unwrap().decision().unwrap();
            assert_eq!(decision, Decision::Stand);

            for card in [Card(6, Spade), Card(5, Club)] {
                server
                    .write_all(&ServerPayload::with_card(Outcome::NotOver, card).encode())
                    .unwrap();
            }
            server
                .write_all(&ServerPayload::round_over(Outcome::Win).encode())
                .unwrap();
        });

        let summary =
            run_player_match(&mut client, "tester", 1, &mut BasicStrategy::default()).unwrap();
        assert_eq!(
            summary,
            MatchSummary {
                wins: 1,
                losses: 0,
                ties: 0
            }
        );
        dealer.join().unwrap();
    }

    #[test]
    fn player_side_stops_hitting_once_busted() {
        let (mut client, mut server) = setup();

        let dealer = thread::spawn(move || {
            let _request: [u8; REQUEST_LEN] = read_frame(&mut server).unwrap();
            for card in [Card(10, Club), Card(9, Diamond), Card(7, Heart)] {
                server
                    .write_all(&ServerPayload::with_card(Outcome::NotOver, card).encode())
                    .unwrap();
            }
            // One hit comes in, the bust card goes out, and the player goes
            // quiet until the result.
            let frame: [u8; CLIENT_PAYLOAD_LEN] = read_frame(&mut server).unwrap();
            let decision = ClientPayload::decode(&frame).unwrap().decision().unwrap();
            assert_eq!(decision, Decision::Hit);
            server
                .write_all(
                    &ServerPayload::with_card(Outcome::NotOver, Card(5, Heart)).encode(),
                )
                .unwrap();
            server
                .write_all(&ServerPayload::round_over(Outcome::Loss).encode())
                .unwrap();
        });

        let mut always_hit = BasicStrategy { stand_on: 30 };
        let summary = run_player_match(&mut client, "tester", 1, &mut always_hit).unwrap();
        assert_eq!(summary.losses, 1);
        dealer.join().unwrap();
    }

    #[test]
    fn summary_display_and_rates() {
        let mut summary = MatchSummary::default();
        summary.record(Outcome::Win);
        summary.record(Outcome::Loss);
        summary.record(Outcome::Win);
        summary.record(Outcome::Tie);
        assert_eq!(summary.to_string(), "wins=2 losses=1 ties=1");
        assert_eq!(summary.rounds_played(), 4);
        assert!((summary.win_rate() - 0.5).abs() < f64::EPSILON);
    }
}
