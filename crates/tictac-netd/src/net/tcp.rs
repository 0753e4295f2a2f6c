use std::sync::Arc;

use tictac_netproto::codec::encode_message;
use tictac_netproto::messages::server::ServerMsg;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::net::rate_limit::IpRateLimiter;
use crate::session::PeerConnection;

use super::inbound::{ConnIdAllocator, InboundTx};

/// Upper bound on per-IP limiter entries kept between cleanups.
const MAX_TRACKED_IPS: usize = 4096;

pub const RATE_LIMITED_NOTICE: &str = "Too many connections. Please try again later.";

/// Run the accept loop on an existing listener.
///
/// Peers are handed over in accept order. Returns once the receiving side
/// of `tx` is gone.
pub async fn run_tcp_listener_with_listener(
    listener: TcpListener,
    tx: InboundTx,
    ip_rate_limiter: Option<Arc<IpRateLimiter>>,
) -> anyhow::Result<()> {
    let mut conn_ids = ConnIdAllocator::new();

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };

        if let Some(limiter) = &ip_rate_limiter {
            if !limiter.admit(peer.ip()) {
                warn!(%peer, "Connection rejected: IP rate limit exceeded");
                tokio::spawn(reject_with_rate_limit(stream));
                continue;
            }
            if limiter.tracked_ips() > MAX_TRACKED_IPS {
                limiter.evict_down_to(MAX_TRACKED_IPS / 2);
            }
        }

        let conn_id = conn_ids.next_id();
        let _ = stream.set_nodelay(true);
        info!(conn_id, %peer, "Player connected");

        if tx.send(PeerConnection::from_tcp(conn_id, peer, stream)).is_err() {
            info!("Matchmaker stopped; closing TCP listener");
            return Ok(());
        }
    }
}

async fn reject_with_rate_limit(mut stream: TcpStream) {
    if let Ok(line) = encode_message(&ServerMsg::message(RATE_LIMITED_NOTICE))
        && let Err(e) = stream.write_all(&line).await
    {
        debug!(error = %e, "failed to deliver rate limit notice");
    }
    let _ = stream.flush().await;
    let _ = stream.shutdown().await;
}
