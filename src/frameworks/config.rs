use crate::domain::AdminAction;
use std::{env, path::PathBuf, time::Duration};

// Runtime constants and environment-driven settings.

pub fn http_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000)
}

pub fn public_dir() -> PathBuf {
    env::var("PUBLIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("public"))
}

pub fn server_ws_url() -> String {
    env::var("POOL_SERVER_URL").unwrap_or_else(|_| "ws://127.0.0.1:3000/ws".to_string())
}

pub fn reconnect_attempts() -> u32 {
    env::var("POOL_RECONNECT_ATTEMPTS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(10)
}

pub fn reconnect_delay() -> Duration {
    let millis = env::var("POOL_RECONNECT_DELAY_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1000);
    Duration::from_millis(millis)
}

/// Admin action the client issues once after announcing, if any.
/// Unknown names are returned as `Err` so the caller can report them.
pub fn admin_command() -> Option<Result<AdminAction, String>> {
    let name = env::var("POOL_ADMIN_COMMAND").ok()?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(AdminAction::from_name(name).map_err(|e| e.0))
}

pub const PRESENCE_CHANNEL_CAPACITY: usize = 1024;
pub const OUTBOX_CAPACITY: usize = 256;
