use crate::use_cases::PresenceEvent;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppState {
    // Lifecycle and admin events flowing from every connection into the presence task.
    pub presence_tx: mpsc::Sender<PresenceEvent>,
    // Per-connection outbox capacity before the channel counts as lagging.
    pub outbox_capacity: usize,
}
