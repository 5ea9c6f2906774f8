//! Term Pong entry point
//!
//! Menus, single-player sessions and the multiplayer invite flow.

use std::io::{self, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;

use clap::Parser;
use rand::Rng;

use term_pong::net::InviteClient;
use term_pong::platform::Terminal;
use term_pong::{GameSession, JsonProfileStore, Settings};

#[derive(Parser, Debug)]
#[command(name = "term-pong", about = "Ping pong in the terminal")]
struct Args {
    /// Settings file (JSON)
    #[arg(long, default_value = "term-pong.json")]
    config: PathBuf,
    /// Play as this name instead of a random PlayerNNNN
    #[arg(long)]
    username: Option<String>,
    /// Relay WebSocket URL
    #[arg(long)]
    relay: Option<String>,
    /// Directory for saved progress
    #[arg(long)]
    saves: Option<PathBuf>,
    /// Fixed RNG seed for reproducible serves
    #[arg(long)]
    seed: Option<u64>,
}

const MAIN_MENU: [&str; 3] = ["Single Player", "Multiplayer", "Quit"];
const SINGLE_MENU: [&str; 3] = ["Start New Game", "Load Saved Game", "Back"];

fn random_username() -> String {
    format!("Player{}", rand::rng().random_range(1000..=9999))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut settings = Settings::load(&args.config);
    if let Some(url) = args.relay {
        settings.relay.url = url;
    }
    if let Some(dir) = args.saves {
        settings.saves_dir = dir;
    }
    let username = args.username.unwrap_or_else(random_username);
    let mut store = JsonProfileStore::new(&settings.saves_dir);
    log::info!("Saving progress under {}", store.dir().display());
    let mut warnings = Vec::new();

    let mut terminal = Terminal::enter()?;
    loop {
        match terminal.menu("Terminal Ping Pong", &MAIN_MENU)? {
            0 => {
                let title = format!("Single Player - {username}");
                let resumed = match terminal.menu(&title, &SINGLE_MENU)? {
                    0 => false,
                    1 => true,
                    _ => continue,
                };
                let seed = args.seed.unwrap_or_else(rand::random);
                let summary =
                    GameSession::start(&username, resumed, seed, &settings, &mut terminal, &mut store)
                        .run()
                        .await?;
                if let Some(e) = summary.save_error {
                    warnings.push(format!("Progress for {username} was not saved: {e}"));
                }
            }
            1 => {
                drop(terminal);
                if let Err(e) = multiplayer(&settings, &username).await {
                    println!("{e}");
                }
                pause()?;
                terminal = Terminal::enter()?;
            }
            _ => break,
        }
    }
    drop(terminal);

    for warning in warnings {
        eprintln!("{warning}");
    }
    Ok(())
}

/// Ask for an opponent and wait on the relay until it closes or Ctrl-C
async fn multiplayer(settings: &Settings, username: &str) -> anyhow::Result<()> {
    print!("Enter opponent username to invite: ");
    io::stdout().flush()?;
    let mut opponent = String::new();
    io::stdin().read_line(&mut opponent)?;
    let opponent = opponent.trim();
    if opponent.is_empty() {
        return Ok(());
    }

    let session = InviteClient::invite(
        &settings.relay.url,
        username,
        opponent,
        || println!("Sent invite to {opponent}... waiting for response."),
        |msg| {
            println!("Server: {msg}");
            ControlFlow::Continue(())
        },
    );

    tokio::select! {
        result = session => {
            result?;
            println!("Relay closed the connection.");
        }
        _ = tokio::signal::ctrl_c() => println!("Stopped waiting."),
    }
    Ok(())
}

fn pause() -> io::Result<()> {
    print!("Press Enter to return to the menu.");
    io::stdout().flush()?;
    io::stdin().read_line(&mut String::new())?;
    Ok(())
}
