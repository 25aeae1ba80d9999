// Session registry: who is connected, and who has announced themselves.

use std::collections::HashMap;
use std::fmt;

/// Identifier for one open transport channel (one browser tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-channel presence record, created on open and dropped on close.
#[derive(Debug, Clone, Default)]
pub struct ChannelSession {
    pub announced: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AnnounceError {
    /// The channel was never opened or has already closed.
    UnknownChannel,
    /// The channel already sent `connecting`.
    AlreadyAnnounced,
}

/// Process-wide participant count plus one session record per open channel.
///
/// The count only moves on `Unannounced -> Announced` (increment) and on
/// closing an announced channel (decrement), so it can never go negative.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    participants: u64,
    sessions: HashMap<ChannelId, ChannelSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of announced participants.
    pub fn participant_count(&self) -> u64 {
        self.participants
    }

    /// Registers a freshly opened channel. Returns false if it was already open.
    pub fn open(&mut self, channel_id: ChannelId) -> bool {
        if self.sessions.contains_key(&channel_id) {
            return false;
        }
        self.sessions.insert(channel_id, ChannelSession::default());
        true
    }

    /// Marks the channel as announced and returns the new participant count.
    pub fn announce(&mut self, channel_id: ChannelId) -> Result<u64, AnnounceError> {
        let session = self
            .sessions
            .get_mut(&channel_id)
            .ok_or(AnnounceError::UnknownChannel)?;
        if session.announced {
            return Err(AnnounceError::AlreadyAnnounced);
        }
        session.announced = true;
        self.participants += 1;
        Ok(self.participants)
    }

    /// Drops the channel's session. Returns the new participant count only
    /// when the channel had announced itself; closing an unannounced or
    /// unknown channel changes nothing.
    pub fn close(&mut self, channel_id: ChannelId) -> Option<u64> {
        let session = self.sessions.remove(&channel_id)?;
        if !session.announced {
            return None;
        }
        self.participants = self.participants.saturating_sub(1);
        Some(self.participants)
    }

    pub fn is_open(&self, channel_id: ChannelId) -> bool {
        self.sessions.contains_key(&channel_id)
    }

    pub fn is_announced(&self, channel_id: ChannelId) -> bool {
        self.sessions
            .get(&channel_id)
            .is_some_and(|session| session.announced)
    }

    /// Ids of every open channel, announced or not.
    pub fn open_channels(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.sessions.keys().copied()
    }
}
