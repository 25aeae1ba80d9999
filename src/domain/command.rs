// Admin commands: a free-form request on the wire, a closed set of actions locally.

use serde_json::Value;
use std::fmt;

/// A named action plus arguments, relayed verbatim by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminCommand {
    pub name: String,
    pub params: Vec<Value>,
}

/// Actions a client knows how to apply to its local world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    FlipGravity,
    ChangeColor,
}

/// The command name did not match any local action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown admin command `{}`", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

impl AdminAction {
    pub fn from_name(name: &str) -> Result<Self, UnknownCommand> {
        match name {
            "flipGravity" => Ok(Self::FlipGravity),
            "changeColor" => Ok(Self::ChangeColor),
            other => Err(UnknownCommand(other.to_string())),
        }
    }

    /// Wire name of the action.
    pub fn name(self) -> &'static str {
        match self {
            Self::FlipGravity => "flipGravity",
            Self::ChangeColor => "changeColor",
        }
    }

    /// Builds the command an admin sends to the server to apply this action everywhere.
    pub fn request(self, params: Vec<Value>) -> AdminCommand {
        AdminCommand {
            name: self.name().to_string(),
            params,
        }
    }
}

impl AdminCommand {
    pub fn action(&self) -> Result<AdminAction, UnknownCommand> {
        AdminAction::from_name(&self.name)
    }
}
