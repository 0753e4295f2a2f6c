#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tictac_netd::net::rate_limit::IpRateLimiter;
use tictac_netd::net::tcp::run_tcp_listener_with_listener;
use tictac_netd::{ServerConfig, run_server};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Raw line client speaking the protocol by hand.
pub struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    write: OwnedWriteHalf,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (read, write) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(read).lines(),
            write,
        })
    }

    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.write.write_all(format!("{line}\n").as_bytes()).await?;
        Ok(())
    }

    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        match timeout(RECV_TIMEOUT, self.lines.next_line()).await?? {
            Some(line) => Ok(line),
            None => anyhow::bail!("connection closed while waiting for a line"),
        }
    }

    pub async fn expect(&mut self, want: &str) -> anyhow::Result<()> {
        let got = self.recv_line().await?;
        anyhow::ensure!(got == want, "expected {want:?}, got {got:?}");
        Ok(())
    }

    pub async fn expect_eof(&mut self) -> anyhow::Result<()> {
        let next = timeout(RECV_TIMEOUT, self.lines.next_line()).await??;
        anyhow::ensure!(next.is_none(), "expected EOF, got {next:?}");
        Ok(())
    }

    /// Role assignment plus the first turn notice.
    pub async fn expect_start_as_x(&mut self) -> anyhow::Result<()> {
        self.expect("YOU_ARE_X").await?;
        self.expect("MESSAGE X's Turn. Make your move.").await?;
        self.expect("YOUR_TURN").await
    }

    pub async fn expect_start_as_o(&mut self) -> anyhow::Result<()> {
        self.expect("YOU_ARE_O").await?;
        self.expect("MESSAGE X's Turn. Wait for opponent.").await?;
        self.expect("OPPONENT_TURN").await
    }
}

/// Connect two clients and consume their start-of-game lines.
pub async fn connect_pair(addr: SocketAddr) -> anyhow::Result<(TestClient, TestClient)> {
    let mut x = TestClient::connect(addr).await?;
    let mut o = TestClient::connect(addr).await?;
    x.expect_start_as_x().await?;
    o.expect_start_as_o().await?;
    Ok((x, o))
}

/// `mover` plays `mv`; both see `echo`, then the turn passes.
pub async fn play(
    mover: &mut TestClient,
    other: &mut TestClient,
    mv: &str,
    echo: &str,
) -> anyhow::Result<()> {
    mover.send_line(mv).await?;
    mover.expect(echo).await?;
    other.expect(echo).await?;
    other.expect("YOUR_TURN").await?;
    mover.expect("OPPONENT_TURN").await
}

/// Listener plus matchmaker on an ephemeral localhost port.
pub async fn spawn_test_server(config: ServerConfig) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let ip_rate_limiter = config
        .rate_limit
        .as_ref()
        .filter(|c| c.conn_limit_enabled())
        .map(|c| Arc::new(IpRateLimiter::new(c)));

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        if let Err(e) = run_tcp_listener_with_listener(listener, tx, ip_rate_limiter).await {
            eprintln!("Listener error: {e}");
        }
    });
    tokio::spawn(run_server(rx, config));

    Ok(addr)
}
