use std::net::SocketAddr;

use clap::Parser;
use tictac_core::{HeuristicAi, MoveSelector};
use tictac_netplay::{ClientEvent, ClientHandle, LocalGame, spawn_client};
use tictac_netproto::constants::DEFAULT_PORT;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, debug, warn};
use tracing_subscriber::FmtSubscriber;

/// Tic-tac-toe network client
#[derive(Parser, Debug)]
#[command(name = "tictac")]
#[command(about = "Plays one game of tic-tac-toe, online or against the computer", long_about = None)]
struct Args {
    /// Server address
    #[arg(short, long, default_value_t = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))]
    server: SocketAddr,

    /// Let the computer pick every move
    #[arg(long, conflicts_with = "local")]
    ai: bool,

    /// Play against the computer on this machine instead of a server
    #[arg(long)]
    local: bool,

    /// In a local game, let the computer make the first move
    #[arg(long, requires = "local")]
    computer_first: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: Level,
}

/// What a line of user input asks for.
enum Input {
    Move(u8, u8),
    NewGame,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let first = words.next()?;
    let input = match first {
        "quit" | "q" => Input::Quit,
        "new" => Input::NewGame,
        _ => Input::Move(first.parse().ok()?, words.next()?.parse().ok()?),
    };
    words.next().is_none().then_some(input)
}

async fn play_ai_move(client: &ClientHandle, ai: &mut HeuristicAi) {
    let snapshot = client.snapshot();
    if let Some(role) = snapshot.role()
        && let Some(pos) = ai.select_move(snapshot.board(), role)
    {
        debug!(?pos, "AI move");
        if let Err(e) = client.send_move(pos.row(), pos.col()).await {
            warn!(error = %e, "Could not send AI move");
        }
    }
}

/// Human against [`HeuristicAi`] on a local board, driven by stdin.
async fn play_local(computer_first: bool) -> anyhow::Result<()> {
    let mut game = LocalGame::new(HeuristicAi::new(), !computer_first);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    println!("You are playing '{}'.", game.human());

    loop {
        if let Some(pos) = game.computer_move()? {
            println!("Computer played ({}, {}).", pos.row(), pos.col());
        }
        println!("{}", game.board());
        if game.outcome().is_terminal() {
            println!("Game over: {}", game.outcome().label());
            return Ok(());
        }

        println!("Your move (row col):");
        let Some(line) = stdin.next_line().await? else {
            return Ok(());
        };
        match parse_input(&line) {
            Some(Input::Move(row, col)) => {
                if let Err(e) = game.human_move(row, col) {
                    println!("{e}");
                }
            }
            Some(Input::Quit) => return Ok(()),
            Some(Input::NewGame) => {
                game = LocalGame::new(HeuristicAi::new(), !computer_first);
                println!("New game. You are playing '{}'.", game.human());
            }
            None => println!("Enter `row col`, `new` or `quit`."),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if args.local {
        return play_local(args.computer_first).await;
    }

    let (client, mut events) = spawn_client(args.server);
    let mut ai = args.ai.then(HeuristicAi::new);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = ai.is_none();

    println!("Connecting to {}...", args.server);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    ClientEvent::Connected => println!("Connected. Waiting for opponent..."),
                    ClientEvent::RoleAssigned(symbol) => println!("You are playing '{symbol}'."),
                    ClientEvent::TurnChanged { my_turn: true } => {
                        println!("{}", client.snapshot().board());
                        match ai.as_mut() {
                            Some(ai) => play_ai_move(&client, ai).await,
                            None => println!("Your move (row col):"),
                        }
                    }
                    ClientEvent::TurnChanged { my_turn: false } => println!("Opponent's turn."),
                    ClientEvent::MoveReceived { symbol, row, col } => {
                        println!("'{symbol}' played ({row}, {col}).");
                    }
                    ClientEvent::InvalidMove(reason) => {
                        println!("{reason}");
                        if let Some(ai) = ai.as_mut() {
                            play_ai_move(&client, ai).await;
                        }
                    }
                    ClientEvent::GameOver(outcome) => {
                        println!("{}", client.snapshot().board());
                        println!("Game over: {}", outcome.label());
                    }
                    ClientEvent::Message(text) => println!("{text}"),
                    ClientEvent::Disconnected(reason) => {
                        println!("Disconnected: {reason}");
                        break;
                    }
                    ClientEvent::ConnectionError(reason) => {
                        println!("{reason}");
                        break;
                    }
                }
            }
            line = stdin.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        let sent = match parse_input(&line) {
                            Some(Input::Move(row, col)) => client.send_move(row, col).await,
                            Some(Input::NewGame) => client.request_new_game().await,
                            Some(Input::Quit) => client.disconnect().await,
                            None => {
                                println!("Enter `row col`, `new` or `quit`.");
                                Ok(())
                            }
                        };
                        if let Err(e) = sent {
                            println!("{e}");
                        }
                    }
                    None => {
                        stdin_open = false;
                        let _ = client.disconnect().await;
                    }
                }
            }
        }
    }

    Ok(())
}
