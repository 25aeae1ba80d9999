// Framework bootstrap for the headless pool client.

use crate::domain::{BodyKind, HeadlessWorld};
use crate::frameworks::{config, server::init_runtime};
use crate::interface_adapters::clients::{ClientError, PoolClient, ReconnectPolicy};

pub async fn run_client_with_config() -> Result<(), ClientError> {
    init_runtime();

    let url = config::server_ws_url();
    let policy = ReconnectPolicy {
        attempts: config::reconnect_attempts(),
        delay: config::reconnect_delay(),
    };
    tracing::debug!(
        %url,
        attempts = policy.attempts,
        delay_ms = policy.delay.as_millis(),
        "client configured"
    );

    let mut client = PoolClient::new(url, policy, HeadlessWorld::new());
    match config::admin_command() {
        Some(Ok(action)) => client = client.with_admin_action(action),
        Some(Err(name)) => tracing::warn!(%name, "unknown admin command; not sending"),
        None => {}
    }

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let reconciler = client.run(shutdown).await?;

    let world = reconciler.world();
    tracing::info!(
        balls = world.count(BodyKind::Ball),
        gravity_flipped = reconciler.gravity_flipped(),
        "client stopped"
    );
    Ok(())
}
