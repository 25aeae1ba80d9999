// Wire protocol DTOs and conversions for the presence channel.
// Every frame is a JSON object `{"type": <event>, "data": <payload>}`.

use crate::domain::AdminCommand;
use crate::use_cases::ServerEvent;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Messages the client sends to the server over the WebSocket.
///
/// Parsing is lenient: `user:connecting` ignores any payload, since the
/// relay validates nothing beyond the event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", try_from = "ClientFrame")]
pub enum ClientMessage {
    // Request to join the session; carries no payload.
    #[serde(rename = "user:connecting")]
    Connecting,
    // Request for a named action to be applied on every client.
    #[serde(rename = "admin")]
    Admin(AdminCommandDto),
}

// Raw client frame before the event name is matched.
#[derive(Deserialize)]
struct ClientFrame {
    #[serde(rename = "type")]
    event: String,
    #[serde(default)]
    data: Value,
}

impl TryFrom<ClientFrame> for ClientMessage {
    type Error = String;

    fn try_from(frame: ClientFrame) -> Result<Self, Self::Error> {
        match frame.event.as_str() {
            "user:connecting" => Ok(Self::Connecting),
            "admin" => serde_json::from_value(frame.data)
                .map(Self::Admin)
                .map_err(|e| format!("invalid admin payload: {e}")),
            other => Err(format!("unknown client event `{other}`")),
        }
    }
}

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "user:connected")]
    Connected(PresenceDto),
    #[serde(rename = "user:joined")]
    Joined(PresenceDto),
    #[serde(rename = "user:disconnected")]
    Disconnected(PresenceDto),
    #[serde(rename = "admin:command:emit")]
    AdminEmit(AdminCommandDto),
    #[serde(rename = "admin:command:broadcast")]
    AdminBroadcast(AdminCommandDto),
}

/// Global participant count attached to every presence event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceDto {
    #[serde(rename = "numUsers")]
    pub num_users: u64,
}

/// Admin command as relayed; params are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCommandDto {
    pub name: String,
    #[serde(default, deserialize_with = "params_or_empty")]
    pub params: Vec<Value>,
}

// `null` params mean no params.
fn params_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<AdminCommandDto> for AdminCommand {
    fn from(dto: AdminCommandDto) -> Self {
        Self {
            name: dto.name,
            params: dto.params,
        }
    }
}

impl From<AdminCommand> for AdminCommandDto {
    fn from(command: AdminCommand) -> Self {
        Self {
            name: command.name,
            params: command.params,
        }
    }
}

impl From<ServerEvent> for ServerMessage {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::Connected { num_users } => Self::Connected(PresenceDto { num_users }),
            ServerEvent::Joined { num_users } => Self::Joined(PresenceDto { num_users }),
            ServerEvent::Disconnected { num_users } => {
                Self::Disconnected(PresenceDto { num_users })
            }
            ServerEvent::AdminEmit(command) => Self::AdminEmit(command.into()),
            ServerEvent::AdminBroadcast(command) => Self::AdminBroadcast(command.into()),
        }
    }
}

impl From<ServerMessage> for ServerEvent {
    fn from(msg: ServerMessage) -> Self {
        match msg {
            ServerMessage::Connected(PresenceDto { num_users }) => Self::Connected { num_users },
            ServerMessage::Joined(PresenceDto { num_users }) => Self::Joined { num_users },
            ServerMessage::Disconnected(PresenceDto { num_users }) => {
                Self::Disconnected { num_users }
            }
            ServerMessage::AdminEmit(dto) => Self::AdminEmit(dto.into()),
            ServerMessage::AdminBroadcast(dto) => Self::AdminBroadcast(dto.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn when_connecting_is_serialized_then_only_type_is_sent() {
        let value = serde_json::to_value(ClientMessage::Connecting).expect("serialize");

        assert_eq!(value, json!({ "type": "user:connecting" }));
    }

    #[test]
    fn when_connecting_arrives_without_data_then_it_parses() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"user:connecting"}"#).expect("parse");

        assert_eq!(msg, ClientMessage::Connecting);
    }

    #[test]
    fn when_connecting_carries_a_payload_then_payload_is_ignored() {
        for raw in [
            r#"{"type":"user:connecting","data":{}}"#,
            r#"{"type":"user:connecting","data":null}"#,
            r#"{"type":"user:connecting","data":[1,2]}"#,
        ] {
            let msg: ClientMessage = serde_json::from_str(raw).expect("parse");
            assert_eq!(msg, ClientMessage::Connecting, "{raw}");
        }
    }

    #[test]
    fn when_admin_params_are_null_then_params_are_empty() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"admin","data":{"name":"flipGravity","params":null}}"#,
        )
        .expect("parse");

        assert_eq!(
            msg,
            ClientMessage::Admin(AdminCommandDto {
                name: "flipGravity".to_string(),
                params: Vec::new(),
            })
        );
    }

    #[test]
    fn when_admin_payload_has_no_name_then_parse_fails() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"admin","data":{}}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"admin"}"#).is_err());
    }

    #[test]
    fn when_admin_arrives_without_params_then_params_default_to_empty() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"admin","data":{"name":"flipGravity"}}"#)
                .expect("parse");

        assert_eq!(
            msg,
            ClientMessage::Admin(AdminCommandDto {
                name: "flipGravity".to_string(),
                params: Vec::new(),
            })
        );
    }

    #[test]
    fn when_admin_is_serialized_then_frame_parses_back_to_the_same_command() {
        let msg = ClientMessage::Admin(AdminCommandDto {
            name: "changeColor".to_string(),
            params: vec![json!("red")],
        });

        let text = serde_json::to_string(&msg).expect("serialize");

        assert_eq!(serde_json::from_str::<ClientMessage>(&text).expect("parse"), msg);
    }

    #[test]
    fn when_presence_event_is_serialized_then_count_uses_num_users_field() {
        let msg = ServerMessage::from(ServerEvent::Joined { num_users: 3 });

        assert_eq!(
            serde_json::to_value(msg).expect("serialize"),
            json!({ "type": "user:joined", "data": { "numUsers": 3 } })
        );
    }

    #[test]
    fn when_admin_broadcast_is_serialized_then_params_pass_through() {
        let msg = ServerMessage::from(ServerEvent::AdminBroadcast(AdminCommand {
            name: "changeColor".to_string(),
            params: vec![json!({ "hue": 20 }), json!(null)],
        }));

        assert_eq!(
            serde_json::to_value(msg).expect("serialize"),
            json!({
                "type": "admin:command:broadcast",
                "data": { "name": "changeColor", "params": [{ "hue": 20 }, null] }
            })
        );
    }

    #[test]
    fn when_event_name_is_unknown_then_parse_fails() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"user:joined"}"#).is_err());
    }
}
