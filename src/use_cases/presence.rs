// Presence protocol handler and admin relay.
//
// A single task owns the registry and every outbox, so each event runs to
// completion before the next one is looked at. Count changes and the
// fan-out they trigger are therefore observed in the same order by everyone.

use super::types::{PresenceEvent, ServerEvent};
use crate::domain::{AdminCommand, AnnounceError, ChannelId, SessionRegistry};
use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct PresenceHub {
    registry: SessionRegistry,
    outboxes: HashMap<ChannelId, mpsc::Sender<ServerEvent>>,
}

impl PresenceHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn participant_count(&self) -> u64 {
        self.registry.participant_count()
    }

    pub fn handle(&mut self, event: PresenceEvent) {
        match event {
            PresenceEvent::Open { channel_id, outbox } => self.open(channel_id, outbox),
            PresenceEvent::Connecting { channel_id } => self.connecting(channel_id),
            PresenceEvent::Admin {
                channel_id,
                command,
            } => self.admin(channel_id, command),
            PresenceEvent::Close { channel_id } => self.close(channel_id),
        }
    }

    fn open(&mut self, channel_id: ChannelId, outbox: mpsc::Sender<ServerEvent>) {
        if !self.registry.open(channel_id) {
            warn!(%channel_id, "channel opened twice; keeping first session");
            return;
        }
        self.outboxes.insert(channel_id, outbox);
        debug!(%channel_id, "channel opened");
    }

    fn connecting(&mut self, channel_id: ChannelId) {
        let num_users = match self.registry.announce(channel_id) {
            Ok(num_users) => num_users,
            Err(AnnounceError::AlreadyAnnounced) => {
                debug!(%channel_id, "duplicate connecting ignored");
                return;
            }
            Err(AnnounceError::UnknownChannel) => {
                debug!(%channel_id, "connecting from unknown channel ignored");
                return;
            }
        };

        info!(%channel_id, participants = num_users, "participant announced");
        self.send_to(channel_id, ServerEvent::Connected { num_users });
        self.broadcast_except(channel_id, ServerEvent::Joined { num_users });
    }

    fn admin(&mut self, channel_id: ChannelId, command: AdminCommand) {
        if !self.registry.is_open(channel_id) {
            debug!(%channel_id, "admin command from closed channel ignored");
            return;
        }

        info!(
            %channel_id,
            name = %command.name,
            params = command.params.len(),
            "admin command relayed"
        );
        self.send_to(channel_id, ServerEvent::AdminEmit(command.clone()));
        self.broadcast_except(channel_id, ServerEvent::AdminBroadcast(command));
    }

    fn close(&mut self, channel_id: ChannelId) {
        self.outboxes.remove(&channel_id);
        let Some(num_users) = self.registry.close(channel_id) else {
            debug!(%channel_id, "unannounced channel closed");
            return;
        };

        info!(%channel_id, participants = num_users, "participant left");
        self.broadcast_except(channel_id, ServerEvent::Disconnected { num_users });
    }

    fn send_to(&mut self, channel_id: ChannelId, event: ServerEvent) {
        let Some(outbox) = self.outboxes.get(&channel_id) else {
            return;
        };
        if !Self::deliver(channel_id, outbox, event) {
            self.outboxes.remove(&channel_id);
        }
    }

    fn broadcast_except(&mut self, origin: ChannelId, event: ServerEvent) {
        let mut dropped = Vec::new();
        for (channel_id, outbox) in &self.outboxes {
            if *channel_id == origin {
                continue;
            }
            if !Self::deliver(*channel_id, outbox, event.clone()) {
                dropped.push(*channel_id);
            }
        }
        for channel_id in dropped {
            self.outboxes.remove(&channel_id);
        }
    }

    // Returns false when the outbox should be dropped. Dropping it closes the
    // connection, whose `Close` then flows through the normal path.
    fn deliver(channel_id: ChannelId, outbox: &mpsc::Sender<ServerEvent>, event: ServerEvent) -> bool {
        match outbox.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(%channel_id, "outbox full; dropping lagging channel");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%channel_id, "outbox closed before channel close");
                false
            }
        }
    }
}

pub async fn presence_task(mut events_rx: mpsc::Receiver<PresenceEvent>) {
    let mut hub = PresenceHub::new();
    while let Some(event) = events_rx.recv().await {
        hub.handle(event);
    }
    info!(
        participants = hub.participant_count(),
        "presence channel closed; presence task exiting"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct TestChannel {
        id: ChannelId,
        rx: mpsc::Receiver<ServerEvent>,
    }

    impl TestChannel {
        fn drain(&mut self) -> Vec<ServerEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                events.push(event);
            }
            events
        }
    }

    fn open(hub: &mut PresenceHub, id: u64) -> TestChannel {
        let (outbox, rx) = mpsc::channel(16);
        let channel_id = ChannelId(id);
        hub.handle(PresenceEvent::Open { channel_id, outbox });
        TestChannel { id: channel_id, rx }
    }

    fn connecting(hub: &mut PresenceHub, channel: &TestChannel) {
        hub.handle(PresenceEvent::Connecting {
            channel_id: channel.id,
        });
    }

    fn flip_gravity() -> AdminCommand {
        AdminCommand {
            name: "flipGravity".to_string(),
            params: vec![json!(1)],
        }
    }

    #[test]
    fn when_channel_connects_then_it_gets_ack_and_others_get_joined() {
        let mut hub = PresenceHub::new();
        let mut a = open(&mut hub, 1);
        let mut b = open(&mut hub, 2);

        connecting(&mut hub, &a);

        assert_eq!(a.drain(), vec![ServerEvent::Connected { num_users: 1 }]);
        assert_eq!(b.drain(), vec![ServerEvent::Joined { num_users: 1 }]);
    }

    #[test]
    fn when_connecting_is_repeated_then_only_one_ack_and_one_increment() {
        let mut hub = PresenceHub::new();
        let mut a = open(&mut hub, 1);
        let mut b = open(&mut hub, 2);

        connecting(&mut hub, &a);
        connecting(&mut hub, &a);

        assert_eq!(hub.participant_count(), 1);
        assert_eq!(a.drain(), vec![ServerEvent::Connected { num_users: 1 }]);
        assert_eq!(b.drain(), vec![ServerEvent::Joined { num_users: 1 }]);
    }

    #[test]
    fn when_announced_channel_closes_then_others_get_disconnected_but_not_origin() {
        let mut hub = PresenceHub::new();
        let mut a = open(&mut hub, 1);
        let mut b = open(&mut hub, 2);
        connecting(&mut hub, &a);
        connecting(&mut hub, &b);
        a.drain();
        b.drain();

        hub.handle(PresenceEvent::Close { channel_id: b.id });

        assert_eq!(hub.participant_count(), 1);
        assert_eq!(a.drain(), vec![ServerEvent::Disconnected { num_users: 1 }]);
        assert!(b.drain().is_empty());
    }

    #[test]
    fn when_unannounced_channel_closes_then_nobody_hears_about_it() {
        let mut hub = PresenceHub::new();
        let mut a = open(&mut hub, 1);
        let b = open(&mut hub, 2);
        connecting(&mut hub, &a);
        a.drain();

        hub.handle(PresenceEvent::Close { channel_id: b.id });

        assert_eq!(hub.participant_count(), 1);
        assert!(a.drain().is_empty());
    }

    #[test]
    fn when_admin_command_arrives_then_sender_gets_emit_and_everyone_else_broadcast() {
        let mut hub = PresenceHub::new();
        let mut a = open(&mut hub, 1);
        let mut b = open(&mut hub, 2);
        let mut c = open(&mut hub, 3);

        hub.handle(PresenceEvent::Admin {
            channel_id: a.id,
            command: flip_gravity(),
        });

        assert_eq!(a.drain(), vec![ServerEvent::AdminEmit(flip_gravity())]);
        assert_eq!(b.drain(), vec![ServerEvent::AdminBroadcast(flip_gravity())]);
        assert_eq!(c.drain(), vec![ServerEvent::AdminBroadcast(flip_gravity())]);
        assert_eq!(hub.participant_count(), 0);
    }

    #[test]
    fn when_admin_command_names_closed_channel_then_it_is_dropped() {
        let mut hub = PresenceHub::new();
        let mut a = open(&mut hub, 1);

        hub.handle(PresenceEvent::Admin {
            channel_id: ChannelId(42),
            command: flip_gravity(),
        });

        assert!(a.drain().is_empty());
    }

    #[test]
    fn when_outbox_is_full_then_channel_is_dropped_and_count_survives_until_close() {
        let mut hub = PresenceHub::new();
        let (outbox, _rx) = mpsc::channel(1);
        let slow = ChannelId(7);
        hub.handle(PresenceEvent::Open {
            channel_id: slow,
            outbox,
        });
        hub.handle(PresenceEvent::Connecting { channel_id: slow });
        let mut a = open(&mut hub, 1);

        // The ack filled the slow outbox; the joined broadcast overflows it.
        connecting(&mut hub, &a);
        assert_eq!(hub.participant_count(), 2);

        hub.handle(PresenceEvent::Close { channel_id: slow });

        assert_eq!(hub.participant_count(), 1);
        assert_eq!(
            a.drain(),
            vec![
                ServerEvent::Connected { num_users: 2 },
                ServerEvent::Disconnected { num_users: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn when_events_flow_through_task_then_fanout_follows_arrival_order() {
        let (events_tx, events_rx) = mpsc::channel(16);
        let task = tokio::spawn(presence_task(events_rx));

        let (a_tx, mut a_rx) = mpsc::channel(16);
        let (b_tx, mut b_rx) = mpsc::channel(16);
        let a = ChannelId(1);
        let b = ChannelId(2);
        for event in [
            PresenceEvent::Open {
                channel_id: a,
                outbox: a_tx,
            },
            PresenceEvent::Connecting { channel_id: a },
            PresenceEvent::Open {
                channel_id: b,
                outbox: b_tx,
            },
            PresenceEvent::Connecting { channel_id: b },
            PresenceEvent::Close { channel_id: b },
        ] {
            events_tx.send(event).await.expect("presence task alive");
        }
        drop(events_tx);
        task.await.expect("presence task");

        assert_eq!(a_rx.recv().await, Some(ServerEvent::Connected { num_users: 1 }));
        assert_eq!(a_rx.recv().await, Some(ServerEvent::Joined { num_users: 2 }));
        assert_eq!(
            a_rx.recv().await,
            Some(ServerEvent::Disconnected { num_users: 1 })
        );
        assert_eq!(b_rx.recv().await, Some(ServerEvent::Connected { num_users: 2 }));
        assert_eq!(b_rx.recv().await, None);
    }
}
