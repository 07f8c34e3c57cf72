use actix::Message as ActixMessage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message types exchanged with clients and between handlers
pub mod types {
    pub const QUEUE_UP: &str = "queue_up";
    pub const DEQUEUE: &str = "dequeue";
    pub const WAIT_FOR_MATCH: &str = "wait_for_match";
    pub const MATCH_FOUND: &str = "match_found";
    pub const MATCH_CONFIRMED: &str = "match_confirmed";
    pub const MATCH_DECLINED: &str = "match_declined";
    pub const WAIT_FOR_PLAYERS: &str = "wait_for_players";
    pub const MATCH_CANCELED: &str = "match_canceled";
    pub const GAME_START: &str = "game_start";
    pub const GUESS: &str = "guess";
    pub const FEEDBACK: &str = "feedback";
    pub const VICTORY: &str = "victory";
    pub const LOSS: &str = "loss";
    pub const DISCONNECTED: &str = "disconnected";
    pub const ERROR: &str = "error";
}

/// Frame exchanged over the WebSocket in both directions
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    #[serde(rename = "type", alias = "Type")]
    pub message_type: String,
    #[serde(default, alias = "Payload", skip_serializing_if = "Map::is_empty")]
    pub payload: Map<String, Value>,
}

impl Message {
    pub fn new(message_type: &str) -> Self {
        Self {
            message_type: message_type.to_string(),
            payload: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    pub fn wait_for_match() -> Self {
        Self::new(types::WAIT_FOR_MATCH)
    }

    pub fn match_found(match_id: u64) -> Self {
        Self::new(types::MATCH_FOUND).with("matchId", match_id)
    }

    pub fn wait_for_players() -> Self {
        Self::new(types::WAIT_FOR_PLAYERS)
    }

    pub fn match_canceled(match_id: u64) -> Self {
        Self::new(types::MATCH_CANCELED).with("matchId", match_id)
    }

    pub fn guess_prompt(game_id: u32) -> Self {
        Self::new(types::GUESS).with("gameId", game_id)
    }

    pub fn feedback(message: &str) -> Self {
        Self::new(types::FEEDBACK).with("message", message)
    }

    pub fn victory(message: &str) -> Self {
        Self::new(types::VICTORY).with("message", message)
    }

    pub fn loss(message: String) -> Self {
        Self::new(types::LOSS).with("message", message)
    }

    pub fn error(message: String) -> Self {
        Self::new(types::ERROR).with("message", message)
    }
}

/// Serialized frame handed to a connection actor for writing
#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct OutboundText(pub String);

/// Asks a connection actor to close its WebSocket
#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct CloseConnection;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_frame_without_payload() {
        let msg: Message = serde_json::from_str(r#"{"type":"queue_up"}"#).unwrap();
        assert_eq!(msg.message_type, types::QUEUE_UP);
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn accepts_capitalized_keys() {
        let msg: Message =
            serde_json::from_str(r#"{"Type":"match_confirmed","Payload":{"matchId":1}}"#).unwrap();
        assert_eq!(msg.message_type, types::MATCH_CONFIRMED);
        assert_eq!(msg.payload.get("matchId"), Some(&json!(1)));
    }

    #[test]
    fn encodes_payload_under_lowercase_keys() {
        let encoded = serde_json::to_value(Message::match_canceled(7)).unwrap();
        assert_eq!(encoded, json!({"type": "match_canceled", "payload": {"matchId": 7}}));

        let bare = serde_json::to_value(Message::wait_for_match()).unwrap();
        assert_eq!(bare, json!({"type": "wait_for_match"}));
    }
}
