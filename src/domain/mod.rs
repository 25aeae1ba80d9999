// Domain layer: presence bookkeeping, admin actions, and the world port.

pub mod command;
pub mod orientation;
pub mod presence;
pub mod world;

pub use command::{AdminAction, AdminCommand, UnknownCommand};
pub use orientation::{OrientationReading, gravity_from_orientation};
pub use presence::{AnnounceError, ChannelId, ChannelSession, SessionRegistry};
pub use world::{
    BodyId, BodyKind, EmptyWorld, Gravity, HIGHLIGHT_FILL, HeadlessWorld, Simulation, remove_any,
};
