use crate::domain::ChannelId;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_channel_id;
use crate::use_cases::{PresenceEvent, ServerEvent};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    PresenceClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let channel_id = next_channel_id();
        let span = info_span!("conn", channel_id = channel_id.0);
        handle_socket(socket, channel_id, state).instrument(span)
    })
}

struct ConnCtx {
    channel_id: ChannelId,
    presence_tx: mpsc::Sender<PresenceEvent>,
    outbox_rx: mpsc::Receiver<ServerEvent>,

    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,

    invalid_json: u32,
    last_invalid_log: Instant,

    close_frame: Option<CloseFrame>,
}

async fn handle_socket(mut socket: WebSocket, channel_id: ChannelId, state: Arc<AppState>) {
    // Register the outbox before reading anything so no fan-out is missed.
    let (outbox, outbox_rx) = mpsc::channel::<ServerEvent>(state.outbox_capacity);
    if state
        .presence_tx
        .send(PresenceEvent::Open { channel_id, outbox })
        .await
        .is_err()
    {
        warn!("presence task unavailable; refusing connection");
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::ERROR,
                reason: "presence unavailable".into(),
            })))
            .await;
        let _ = socket.close().await;
        return;
    }
    info!("channel opened");

    let mut ctx = ConnCtx {
        channel_id,
        presence_tx: state.presence_tx.clone(),
        outbox_rx,
        msgs_in: 0,
        msgs_out: 0,
        bytes_in: 0,
        bytes_out: 0,
        invalid_json: 0,
        last_invalid_log: Instant::now() - LOG_THROTTLE,
        close_frame: None,
    };

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    // Close is the only path that decrements presence, so it must always be sent.
    if ctx
        .presence_tx
        .send(PresenceEvent::Close { channel_id })
        .await
        .is_err()
    {
        warn!("presence task unavailable during disconnect");
    }

    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        "connection stats"
    );
    info!("channel closed");
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx).await {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing presence / admin event for this channel
            outgoing = ctx.outbox_rx.recv() => {
                match outgoing {
                    Some(event) => match forward_event(event, socket, ctx).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    None => {
                        // The hub dropped our outbox because we fell behind.
                        ctx.close_frame = Some(CloseFrame {
                            code: close_code::AGAIN,
                            reason: "presence lagged".into(),
                        });
                        warn!("outbox dropped by presence task; disconnecting");
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let channel_id = ctx.channel_id;
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                ctx.bytes_in += text.len() as u64;

                let event = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Connecting) => PresenceEvent::Connecting { channel_id },
                    Ok(ClientMessage::Admin(command)) => PresenceEvent::Admin {
                        channel_id,
                        command: command.into(),
                    },
                    Err(parse_err) => {
                        ctx.invalid_json += 1;
                        if should_log(&mut ctx.last_invalid_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if ctx.invalid_json > MAX_INVALID_JSON {
                            ctx.close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        return Ok(LoopControl::Continue);
                    }
                };

                ctx.presence_tx
                    .send(event)
                    .await
                    .map_err(|_| NetError::PresenceClosed)?;
                Ok(LoopControl::Continue)
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_event(event: ServerEvent, socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    let msg = ServerMessage::from(event);
    match send_message(socket, &msg).await {
        Ok(bytes) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send presence event");
            LoopControl::Disconnect
        }
    }
}
