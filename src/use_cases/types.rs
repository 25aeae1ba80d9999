// Use-case level inputs/outputs for the presence task and reconciler.

use crate::domain::{AdminCommand, ChannelId};
use tokio::sync::mpsc;

/// Everything a connection reports to the presence task, in arrival order.
#[derive(Debug)]
pub enum PresenceEvent {
    /// A channel opened; `outbox` delivers events back to it.
    Open {
        channel_id: ChannelId,
        outbox: mpsc::Sender<ServerEvent>,
    },
    /// The channel asked to join the session.
    Connecting { channel_id: ChannelId },
    /// The channel asked for an action to be applied everywhere.
    Admin {
        channel_id: ChannelId,
        command: AdminCommand,
    },
    /// The channel closed.
    Close { channel_id: ChannelId },
}

/// Events delivered to a single channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Ack for this channel's own `connecting`.
    Connected { num_users: u64 },
    /// Another channel joined.
    Joined { num_users: u64 },
    /// Another channel left.
    Disconnected { num_users: u64 },
    /// Echo of this channel's own admin command.
    AdminEmit(AdminCommand),
    /// Admin command issued by another channel.
    AdminBroadcast(AdminCommand),
}
