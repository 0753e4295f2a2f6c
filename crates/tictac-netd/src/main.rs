use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tictac_netd::net::rate_limit::{IpRateLimiter, RateLimitConfig};
use tictac_netd::net::tcp::run_tcp_listener_with_listener;
use tictac_netd::{ServerConfig, run_server};
use tictac_netproto::constants::DEFAULT_PORT;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Tic-tac-toe server
#[derive(Parser, Debug)]
#[command(name = "tictac-netd")]
#[command(about = "Pairs players two at a time and referees their games", long_about = None)]
struct Args {
    /// TCP bind address
    #[arg(short, long, default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    bind: SocketAddr,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Close a waiting connection after this many seconds without a partner
    #[arg(long)]
    pairing_timeout_secs: Option<u64>,

    /// End a game when the player to move stays silent this many seconds
    #[arg(long)]
    turn_timeout_secs: Option<u64>,

    /// Max new connections per IP per second (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    conn_per_ip_per_sec: u32,

    /// Max lines per connection per second (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    msg_per_conn_per_sec: u32,

    /// Burst allowance as a multiple of the per-second rates
    #[arg(long, default_value_t = 3)]
    burst_multiplier: u32,
}

impl Args {
    fn rate_limit(&self) -> Option<RateLimitConfig> {
        let config = RateLimitConfig {
            conn_per_ip_per_sec: self.conn_per_ip_per_sec,
            msg_per_conn_per_sec: self.msg_per_conn_per_sec,
            burst_multiplier: self.burst_multiplier,
        };
        (config.conn_limit_enabled() || config.msg_limit_enabled()).then_some(config)
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            pairing_timeout: self.pairing_timeout_secs.map(Duration::from_secs),
            turn_timeout: self.turn_timeout_secs.map(Duration::from_secs),
            rate_limit: self.rate_limit(),
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

    let config = args.server_config();
    let ip_rate_limiter = config
        .rate_limit
        .as_ref()
        .filter(|c| c.conn_limit_enabled())
        .map(|c| Arc::new(IpRateLimiter::new(c)));

    // Accept loop -> matchmaker.
    let (tx, rx) = mpsc::unbounded_channel();

    let listener = TcpListener::bind(args.bind).await?;
    let local_addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = run_tcp_listener_with_listener(listener, tx, ip_rate_limiter).await {
            error!(error = %e, "TCP listener stopped");
        }
    });

    info!("Tic-Tac-Toe server is running on {}", local_addr);
    info!("Log level: {}", args.log_level);

    run_server(rx, config).await
}
