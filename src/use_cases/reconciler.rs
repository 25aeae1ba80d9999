// Client-side reconciler: turns presence and admin events into world mutations.

use super::types::ServerEvent;
use crate::domain::{
    AdminAction, AdminCommand, BodyId, BodyKind, EmptyWorld, Gravity, HIGHLIGHT_FILL,
    OrientationReading, Simulation, UnknownCommand, gravity_from_orientation, remove_any,
};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Largest participant count a `connected` ack may populate the world with.
pub const MAX_PARTICIPANTS: u64 = 1000;

/// Non-fatal failures while applying an event. The world is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// A participant left but no ball was left to remove.
    EmptyRemoval,
    /// An admin command named an action this client does not know.
    UnknownCommand(String),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRemoval => write!(f, "no ball left to remove"),
            Self::UnknownCommand(name) => write!(f, "unknown admin command `{name}`"),
        }
    }
}

impl std::error::Error for ReconcileError {}

impl From<EmptyWorld> for ReconcileError {
    fn from(_: EmptyWorld) -> Self {
        Self::EmptyRemoval
    }
}

impl From<UnknownCommand> for ReconcileError {
    fn from(err: UnknownCommand) -> Self {
        Self::UnknownCommand(err.0)
    }
}

/// Keeps one ball per participant in the local world.
///
/// No count is stored; the world's ball set is the only state, which is why
/// it can drift from the server's count after missed events.
#[derive(Debug)]
pub struct PresenceReconciler<S> {
    world: S,
    // Consulted by tilt updates so a flip survives them.
    gravity_flipped: bool,
}

impl<S: Simulation> PresenceReconciler<S> {
    pub fn new(world: S) -> Self {
        Self {
            world,
            gravity_flipped: false,
        }
    }

    pub fn world(&self) -> &S {
        &self.world
    }

    pub fn gravity_flipped(&self) -> bool {
        self.gravity_flipped
    }

    pub fn ball_count(&self) -> usize {
        self.world.body_ids(BodyKind::Ball).len()
    }

    pub fn apply(&mut self, event: ServerEvent) -> Result<(), ReconcileError> {
        match event {
            ServerEvent::Connected { num_users } => {
                let present = if num_users > MAX_PARTICIPANTS {
                    warn!(num_users, cap = MAX_PARTICIPANTS, "implausible participant count; capping");
                    MAX_PARTICIPANTS
                } else {
                    num_users
                };
                // One for ourselves, one for everyone already here.
                self.add_balls(1);
                self.add_balls(present.saturating_sub(1));
            }
            ServerEvent::Joined { .. } => self.add_balls(1),
            ServerEvent::Disconnected { .. } => {
                self.remove_ball()?;
            }
            ServerEvent::AdminEmit(command) | ServerEvent::AdminBroadcast(command) => {
                self.run_command(&command)?;
            }
        }
        Ok(())
    }

    pub fn add_balls(&mut self, count: u64) {
        for _ in 0..count {
            self.world.add_body(BodyKind::Ball);
        }
    }

    pub fn remove_ball(&mut self) -> Result<BodyId, ReconcileError> {
        Ok(remove_any(&mut self.world, BodyKind::Ball)?)
    }

    /// Applies a relayed command locally.
    pub fn run_command(&mut self, command: &AdminCommand) -> Result<(), ReconcileError> {
        match command.action()? {
            AdminAction::FlipGravity => self.flip_gravity(),
            AdminAction::ChangeColor => self.change_color(&command.params),
        }
        Ok(())
    }

    pub fn flip_gravity(&mut self) {
        let gravity = self.world.gravity();
        self.world.set_gravity(Gravity {
            x: gravity.x,
            y: -gravity.y,
        });
        self.gravity_flipped = !self.gravity_flipped;
        debug!(flipped = self.gravity_flipped, "gravity flipped");
    }

    pub fn change_color(&mut self, _params: &[Value]) {
        for id in self.world.body_ids(BodyKind::Ball) {
            self.world.set_fill(id, HIGHLIGHT_FILL);
        }
    }

    /// Tilt handler; unsupported screen rotations leave gravity as is.
    pub fn update_gravity(&mut self, reading: OrientationReading) {
        if let Some(gravity) = gravity_from_orientation(reading, self.gravity_flipped) {
            self.world.set_gravity(gravity);
        }
    }
}

/// Admin side of an action: nothing changes locally, the command goes to the
/// server and comes back to every client, this one included.
pub fn admin_request(action: AdminAction, params: Vec<Value>) -> AdminCommand {
    action.request(params)
}
