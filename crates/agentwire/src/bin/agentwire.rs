//! Runs the ingest server with the builtin command set.
//!
//! Usage: `agentwire [CONFIG_PATH]` (defaults to `./agentwire.json`; a missing
//! file means defaults). `AGENTWIRE_*` variables and a `.env` file override it.

use std::path::PathBuf;
use std::sync::Arc;

use agentwire::builtins::register_builtins;
use agentwire::capabilities::Capabilities;
use agentwire::config::{AgentConfig, CONFIG_FILENAME};
use agentwire::server::Server;
use agentwire::{Agent, CommandTable};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let config = AgentConfig::load(&config_path)?;

    let mut table = CommandTable::new();
    register_builtins(&mut table, Capabilities::in_memory(), &config)?;
    let agent = Arc::new(Agent::new(Arc::new(table), &config));

    let mut server = Server::start(agent, config).await?;
    tracing::info!(addr = %server.addr(), "agentwire ready");

    tokio::signal::ctrl_c().await?;
    server.shutdown()?;
    Ok(())
}
