use crate::domain::ChannelId;
use std::{
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Returns a process-unique channel id.
///
/// Seeded from the clock so ids from a restarted process do not read like
/// continuations of the previous run in logs.
pub fn next_channel_id() -> ChannelId {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU64::new(now_millis() << 16));
    ChannelId(counter.fetch_add(1, Ordering::Relaxed))
}
