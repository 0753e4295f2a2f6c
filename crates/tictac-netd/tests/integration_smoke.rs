//! End-to-end games over real TCP connections.

mod common;

use common::{TestClient, connect_pair, play, spawn_test_server};
use tictac_netd::ServerConfig;

#[tokio::test]
async fn first_connection_plays_x_and_moves_first() -> anyhow::Result<()> {
    let addr = spawn_test_server(ServerConfig::default()).await?;

    let mut first = TestClient::connect(addr).await?;
    let mut second = TestClient::connect(addr).await?;

    first.expect_start_as_x().await?;
    second.expect_start_as_o().await?;
    Ok(())
}

#[tokio::test]
async fn move_is_broadcast_and_turn_flips() -> anyhow::Result<()> {
    let addr = spawn_test_server(ServerConfig::default()).await?;
    let (mut x, mut o) = connect_pair(addr).await?;

    x.send_line("MOVE 0 0").await?;
    x.expect("MOVE X 0 0").await?;
    x.expect("OPPONENT_TURN").await?;
    o.expect("MOVE X 0 0").await?;
    o.expect("YOUR_TURN").await?;
    Ok(())
}

#[tokio::test]
async fn stray_move_from_waiting_player_is_held_until_its_turn() -> anyhow::Result<()> {
    let addr = spawn_test_server(ServerConfig::default()).await?;
    let (mut x, mut o) = connect_pair(addr).await?;

    x.send_line("MOVE 0 0").await?;
    o.send_line("MOVE 1 1").await?;

    x.expect("MOVE X 0 0").await?;
    x.expect("OPPONENT_TURN").await?;
    x.expect("MOVE O 1 1").await?;
    x.expect("YOUR_TURN").await?;

    o.expect("MOVE X 0 0").await?;
    o.expect("YOUR_TURN").await?;
    o.expect("MOVE O 1 1").await?;
    o.expect("OPPONENT_TURN").await?;
    Ok(())
}

#[tokio::test]
async fn full_board_without_line_is_a_draw() -> anyhow::Result<()> {
    let addr = spawn_test_server(ServerConfig::default()).await?;
    let (mut x, mut o) = connect_pair(addr).await?;

    play(&mut x, &mut o, "MOVE 0 0", "MOVE X 0 0").await?;
    play(&mut o, &mut x, "MOVE 0 1", "MOVE O 0 1").await?;
    play(&mut x, &mut o, "MOVE 0 2", "MOVE X 0 2").await?;
    play(&mut o, &mut x, "MOVE 1 1", "MOVE O 1 1").await?;
    play(&mut x, &mut o, "MOVE 1 0", "MOVE X 1 0").await?;
    play(&mut o, &mut x, "MOVE 1 2", "MOVE O 1 2").await?;
    play(&mut x, &mut o, "MOVE 2 1", "MOVE X 2 1").await?;
    play(&mut o, &mut x, "MOVE 2 0", "MOVE O 2 0").await?;

    x.send_line("MOVE 2 2").await?;
    for client in [&mut x, &mut o] {
        client.expect("MOVE X 2 2").await?;
        client.expect("GAME_OVER DRAW").await?;
        client.expect_eof().await?;
    }
    Ok(())
}

#[tokio::test]
async fn diagonal_win_ends_game_once_and_closes_both() -> anyhow::Result<()> {
    let addr = spawn_test_server(ServerConfig::default()).await?;
    let (mut x, mut o) = connect_pair(addr).await?;

    play(&mut x, &mut o, "MOVE 0 0", "MOVE X 0 0").await?;
    play(&mut o, &mut x, "MOVE 0 1", "MOVE O 0 1").await?;
    play(&mut x, &mut o, "MOVE 1 1", "MOVE X 1 1").await?;
    play(&mut o, &mut x, "MOVE 1 0", "MOVE O 1 0").await?;

    x.send_line("MOVE 2 2").await?;
    for client in [&mut x, &mut o] {
        client.expect("MOVE X 2 2").await?;
        client.expect("GAME_OVER CROSS_WON").await?;
        // Exactly one GAME_OVER, then the connection is closed.
        client.expect_eof().await?;
    }
    Ok(())
}

#[tokio::test]
async fn invalid_input_is_reported_to_sender_only() -> anyhow::Result<()> {
    let addr = spawn_test_server(ServerConfig::default()).await?;
    let (mut x, mut o) = connect_pair(addr).await?;

    x.send_line("MOVE 3 0").await?;
    x.expect("INVALID_MOVE Move out of bounds. Try again.").await?;
    x.send_line("MOVE x y").await?;
    x.expect("INVALID_MOVE Malformed move. Try again.").await?;
    x.send_line("HELLO").await?;
    x.expect("INVALID_COMMAND Unknown command. Try again.").await?;

    // O saw none of it; the next thing it gets is X's real move.
    play(&mut x, &mut o, "MOVE 2 2", "MOVE X 2 2").await?;
    o.send_line("MOVE 2 2").await?;
    o.expect("INVALID_MOVE Cell already occupied. Try again.").await?;
    o.send_line("MOVE 0 0").await?;
    o.expect("MOVE O 0 0").await?;
    x.expect("MOVE O 0 0").await?;
    Ok(())
}

#[tokio::test]
async fn disconnect_mid_game_ends_session_without_winner() -> anyhow::Result<()> {
    let addr = spawn_test_server(ServerConfig::default()).await?;
    let (mut x, mut o) = connect_pair(addr).await?;

    play(&mut x, &mut o, "MOVE 1 1", "MOVE X 1 1").await?;
    drop(o);

    x.expect("MESSAGE Opponent disconnected.").await?;
    x.expect_eof().await?;
    Ok(())
}

#[tokio::test]
async fn sessions_do_not_block_each_other() -> anyhow::Result<()> {
    let addr = spawn_test_server(ServerConfig::default()).await?;
    let (_idle_x, _idle_o) = connect_pair(addr).await?;
    let (mut x, mut o) = connect_pair(addr).await?;

    play(&mut x, &mut o, "MOVE 0 0", "MOVE X 0 0").await?;
    play(&mut o, &mut x, "MOVE 2 2", "MOVE O 2 2").await?;
    Ok(())
}
