//! Invite relay: matches named clients and forwards one invite notice

use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use term_pong::Settings;
use term_pong::net::{Relay, RelayServer};

#[derive(Parser, Debug)]
#[command(name = "pong-relay", about = "Invite relay for term-pong")]
struct Args {
    /// Settings file (JSON)
    #[arg(long, default_value = "term-pong.json")]
    config: PathBuf,
    /// Bind host
    #[arg(long)]
    host: Option<String>,
    /// Bind port
    #[arg(long)]
    port: Option<u16>,
    /// Worker threads
    #[arg(long, default_value_t = 2)]
    workers: usize,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut settings = Settings::load(&args.config);
    if let Some(host) = args.host {
        settings.relay.host = host;
    }
    if let Some(port) = args.port {
        settings.relay.port = port;
    }

    let listener = TcpListener::bind(settings.bind_addr())?;
    RelayServer::new(Arc::new(Relay::new()))
        .workers(args.workers)
        .listen(listener)?
        .await?;
    Ok(())
}
