// Shared helpers for integration tests that talk to a real pool server.
#![allow(dead_code)]

use ball_pool::interface_adapters::clients::PoolConnection;
use ball_pool::interface_adapters::protocol::{ClientMessage, ServerMessage};
use std::time::Duration;

// Upper bound for any single expected message.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);
// How long to wait before concluding that nothing else is coming.
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

// Start a fresh server on an ephemeral port and return its base address.
//
// Each test gets its own server so participant counts never leak between tests.
pub async fn spawn_server() -> String {
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    let public_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("public");
    tokio::spawn(async move {
        ball_pool::run_with_public_dir(listener, public_dir)
            .await
            .expect("server failed");
    });
    addr.to_string()
}

pub fn ws_url(addr: &str) -> String {
    format!("ws://{addr}/ws")
}

pub async fn connect(addr: &str) -> PoolConnection {
    PoolConnection::connect(&ws_url(addr))
        .await
        .expect("websocket connect")
}

// Connect and announce, consuming the `connected` ack.
pub async fn join(addr: &str) -> (PoolConnection, u64) {
    let mut conn = connect(addr).await;
    conn.send(&ClientMessage::Connecting)
        .await
        .expect("send connecting");
    match next(&mut conn).await {
        ServerMessage::Connected(presence) => (conn, presence.num_users),
        other => panic!("expected connected ack, got {other:?}"),
    }
}

pub async fn next(conn: &mut PoolConnection) -> ServerMessage {
    tokio::time::timeout(RECV_TIMEOUT, conn.recv())
        .await
        .expect("timed out waiting for server message")
        .expect("websocket recv")
        .expect("server closed channel")
}

// Assert that no message arrives within the quiet period.
pub async fn assert_silent(conn: &mut PoolConnection) {
    if let Ok(msg) = tokio::time::timeout(QUIET_PERIOD, conn.recv()).await {
        panic!("expected no message, got {msg:?}");
    }
}
