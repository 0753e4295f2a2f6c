//! Tic-tac-toe game server: accept loop, FIFO matchmaking and one task per
//! paired game.
//!
//! The binary wires [`net::tcp::run_tcp_listener_with_listener`] to [`run_server`]; tests
//! do the same against a listener bound to `127.0.0.1:0`.

use std::time::Duration;

use tokio::io::AsyncRead;

use crate::matchmaking::Matchmaker;
use crate::net::inbound::InboundRx;
use crate::net::rate_limit::RateLimitConfig;

pub mod matchmaking;
pub mod net;
pub mod session;

/// Server behavior knobs. The default matches a plain server: no pairing
/// timeout, no turn timeout and no rate limiting.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Close a connection that has waited this long without a partner.
    pub pairing_timeout: Option<Duration>,
    /// Treat a turn owner that stays silent this long as disconnected.
    pub turn_timeout: Option<Duration>,
    /// Per-connection line limit. The per-IP part is applied by the listener.
    pub rate_limit: Option<RateLimitConfig>,
}

/// Run the matchmaker over connections arriving on `rx`.
///
/// Returns once every sender of `rx` is dropped. Sessions already running
/// keep going on their own tasks.
pub async fn run_server<R>(rx: InboundRx<R>, config: ServerConfig) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin + Send + Sync + 'static,
{
    Matchmaker::new(config).run(rx).await;
    Ok(())
}
