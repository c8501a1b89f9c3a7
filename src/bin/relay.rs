//! Matchmaking relay server.
//!
//! Configured through `TETRIS_RELAY_HOST`, `TETRIS_RELAY_PORT` and
//! `TETRIS_RELAY_LOG_PATH`.

use anyhow::Context;

use tetris_duel::relay::{check_tcp_listen_available, run_server, ServerConfig};

fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    // Report a busy port before spinning up the runtime.
    check_tcp_listen_available(&config.host, config.port)
        .with_context(|| format!("cannot listen on {}:{}", config.host, config.port))?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_server(config, None))
}
