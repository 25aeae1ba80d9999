// Headless pool client: the Rust stand-in for a browser tab.

use crate::domain::{AdminAction, Simulation};
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::use_cases::{PresenceReconciler, ServerEvent, admin_request};

use futures::{SinkExt, StreamExt};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug)]
pub enum ClientError {
    Connect(tungstenite::Error),
    Ws(tungstenite::Error),
    Serialization(serde_json::Error),
    ReconnectFailed { attempts: u32 },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "connect failed: {e}"),
            Self::Ws(e) => write!(f, "websocket error: {e}"),
            Self::Serialization(e) => write!(f, "invalid message: {e}"),
            Self::ReconnectFailed { attempts } => {
                write!(f, "reconnect failed after {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for ClientError {}

/// Transport retry policy; the application never retries on its own.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

/// One open channel to the pool server.
pub struct PoolConnection {
    stream: WsStream,
}

impl PoolConnection {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (stream, _response) = connect_async(url).await.map_err(ClientError::Connect)?;
        Ok(Self { stream })
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> Result<(), ClientError> {
        let txt = serde_json::to_string(msg).map_err(ClientError::Serialization)?;
        self.stream
            .send(Message::Text(txt.into()))
            .await
            .map_err(ClientError::Ws)
    }

    /// Next server message, or `None` once the server closed the channel.
    /// Frames that do not parse are logged and skipped.
    pub async fn recv(&mut self) -> Result<Option<ServerMessage>, ClientError> {
        while let Some(frame) = self.stream.next().await {
            match frame.map_err(ClientError::Ws)? {
                Message::Text(text) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(msg) => return Ok(Some(msg)),
                    Err(e) => warn!(error = %e, "ignoring unparseable server message"),
                },
                Message::Close(frame) => {
                    debug!(?frame, "server closed channel");
                    return Ok(None);
                }
                _ => {}
            }
        }
        Ok(None)
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.close(None).await.map_err(ClientError::Ws)
    }
}

/// Connects, retrying per `policy` after the first failure.
pub async fn connect_with_retry(
    url: &str,
    policy: ReconnectPolicy,
) -> Result<PoolConnection, ClientError> {
    let mut last_error = None;
    for attempt in 0..=policy.attempts {
        if attempt > 0 {
            tokio::time::sleep(policy.delay).await;
        }
        match PoolConnection::connect(url).await {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                debug!(attempt, error = %e, "connect attempt failed");
                last_error = Some(e);
            }
        }
    }
    match last_error {
        Some(e) if policy.attempts == 0 => Err(e),
        _ => Err(ClientError::ReconnectFailed {
            attempts: policy.attempts,
        }),
    }
}

/// Drives a reconciler from one server until shutdown or a failed reconnect.
pub struct PoolClient<S> {
    url: String,
    policy: ReconnectPolicy,
    admin_action: Option<AdminAction>,
    reconciler: PresenceReconciler<S>,
}

impl<S: Simulation> PoolClient<S> {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy, world: S) -> Self {
        Self {
            url: url.into(),
            policy,
            admin_action: None,
            reconciler: PresenceReconciler::new(world),
        }
    }

    /// Sends `action` as an admin request once, right after announcing.
    pub fn with_admin_action(mut self, action: AdminAction) -> Self {
        self.admin_action = Some(action);
        self
    }

    pub async fn run(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<PresenceReconciler<S>, ClientError> {
        tokio::pin!(shutdown);

        // Shutdown wins over any pending connect or retry delay.
        let mut conn = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("shutdown before first connect");
                return Ok(self.reconciler);
            }
            connected = connect_with_retry(&self.url, self.policy) => connected?,
        };
        conn.send(&ClientMessage::Connecting).await?;
        info!(url = %self.url, "connecting");

        if let Some(action) = self.admin_action {
            let command = admin_request(action, Vec::new());
            conn.send(&ClientMessage::Admin(command.into())).await?;
            info!(name = action.name(), "admin command sent");
        }

        loop {
            let incoming = tokio::select! {
                _ = &mut shutdown => break,
                incoming = conn.recv() => incoming,
            };

            match incoming {
                Ok(Some(msg)) => self.apply(msg.into()),
                Ok(None) | Err(_) => {
                    warn!("channel lost; reconnecting");
                    let reconnected = tokio::select! {
                        biased;
                        _ = &mut shutdown => {
                            info!("shutdown while reconnecting");
                            return Ok(self.reconciler);
                        }
                        reconnected = connect_with_retry(&self.url, self.policy) => reconnected,
                    };
                    conn = match reconnected {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "attempt to reconnect has failed");
                            return Err(e);
                        }
                    };
                    // No resync: the world keeps whatever balls it had.
                    info!(
                        balls = self.reconciler.ball_count(),
                        "reconnected; local world not resynchronized"
                    );
                }
            }
        }

        let _ = conn.close().await;
        Ok(self.reconciler)
    }

    fn apply(&mut self, event: ServerEvent) {
        debug!(?event, "server event");
        match self.reconciler.apply(event) {
            Ok(()) => info!(balls = self.reconciler.ball_count(), "world reconciled"),
            Err(e) => warn!(error = %e, "event not applied"),
        }
    }
}
