// Use cases layer: presence workflows on both ends of the socket.

pub mod presence;
pub mod reconciler;
pub mod types;

pub use presence::{PresenceHub, presence_task};
pub use reconciler::{PresenceReconciler, ReconcileError, admin_request};
pub use types::{PresenceEvent, ServerEvent};
