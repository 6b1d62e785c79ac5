//! Demo binary: replay a PGN main line from stdin, or run an in-process
//! loopback pairing of two peer sessions to exercise the sync protocol.

use std::io::{self, Read};
use std::thread;

use crossbeam_channel::unbounded;
use tracing::info;

use tandem_chess::game::engine::GameEngine;
use tandem_chess::move_generation::legal::GameStatus;
use tandem_chess::notation::pgn::apply_pgn;
use tandem_chess::sync::message::NetMessage;
use tandem_chess::sync::session::PeerSession;
use tandem_chess::utils::render::render_board;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mode = std::env::args().nth(1);
    match mode.as_deref() {
        Some("loopback") => run_loopback_demo(),
        _ => run_pgn_replay(),
    }
}

/// Read PGN movetext from stdin, replay it, and print the final position.
fn run_pgn_replay() -> io::Result<()> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;

    let mut engine = GameEngine::new();
    match apply_pgn(&mut engine, &text) {
        Ok(moves) => println!("replayed {} moves", moves.len()),
        Err(failure) => println!(
            "replay halted at `{}` after {} moves: {}",
            failure.token,
            failure.applied.len(),
            failure.error
        ),
    }

    println!("{}", render_board(&engine.state().board));
    match engine.status() {
        GameStatus::Checkmate => println!("checkmate — {:?} to move", engine.side_to_move()),
        GameStatus::Stalemate => println!("stalemate"),
        GameStatus::Ongoing => println!("{:?} to move", engine.side_to_move()),
    }

    Ok(())
}

/// Pair two sessions over in-process channels and play a short scripted
/// game, demonstrating pairing, propagation, and resync traffic.
fn run_loopback_demo() -> io::Result<()> {
    let (to_right, from_left) = unbounded::<NetMessage>();
    let (to_left, from_right) = unbounded::<NetMessage>();

    let left = thread::spawn(move || {
        let mut session = PeerSession::new("left-device");
        session.set_device_name("Left");
        for message in session.channel_established("right-device") {
            let _ = to_right.send(message);
        }

        let script = ["e2e4", "g1f3", "f1c4"];
        let mut next = 0usize;

        while let Ok(message) = from_left.recv() {
            let replies = session
                .handle_message(message)
                .expect("loopback messages should be handled");
            for reply in replies {
                let _ = to_right.send(reply);
            }

            while session.is_paired()
                && session.local_color() == Some(session.engine().side_to_move())
                && next < script.len()
            {
                let mv = parse_demo_move(script[next]);
                next += 1;
                for message in session
                    .submit_local_move(mv)
                    .expect("scripted move should be legal")
                {
                    let _ = to_right.send(message);
                }
            }

            if next == script.len() {
                break;
            }
        }
        session
    });

    let mut session = PeerSession::new("right-device");
    session.set_device_name("Right");
    for message in session.channel_established("left-device") {
        let _ = to_left.send(message);
    }

    let script = ["e7e5", "b8c6"];
    let mut next = 0usize;
    let mut handled = 0usize;

    while let Ok(message) = from_right.recv() {
        handled += 1;
        let replies = session
            .handle_message(message)
            .expect("loopback messages should be handled");
        for reply in replies {
            let _ = to_left.send(reply);
        }

        while session.is_paired()
            && session.local_color() == Some(session.engine().side_to_move())
            && next < script.len()
        {
            let mv = parse_demo_move(script[next]);
            next += 1;
            for message in session
                .submit_local_move(mv)
                .expect("scripted move should be legal")
            {
                let _ = to_left.send(message);
            }
        }

        // Pairing plus five scripted moves is all the traffic there is.
        if handled >= 8 {
            break;
        }
    }

    let left_session = left.join().expect("left peer thread should finish");
    info!(
        moves = session.engine().state().moves_made,
        "loopback game finished"
    );
    println!("{}", render_board(&session.engine().state().board));
    assert_eq!(
        left_session.engine().state().board,
        session.engine().state().board
    );
    println!("both peers agree after {} moves", session.engine().state().moves_made);

    Ok(())
}

fn parse_demo_move(text: &str) -> tandem_chess::move_generation::chess_move::Move {
    let from = tandem_chess::board::square::Square::from_algebraic(&text[..2])
        .unwrap_or(tandem_chess::board::square::Square { file: 0, rank: 0 });
    let to = tandem_chess::board::square::Square::from_algebraic(&text[2..])
        .unwrap_or(tandem_chess::board::square::Square { file: 0, rank: 0 });
    tandem_chess::move_generation::chess_move::Move::new(from, to)
}
