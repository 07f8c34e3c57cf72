use serde_json::Value;
use std::collections::HashMap;

use crate::models::{types, Message, Socket};

/// Loosely typed payload entry. Decoded client frames only ever carry JSON;
/// internal events also carry socket lists.
#[derive(Debug, Clone)]
pub enum PayloadValue {
    Json(Value),
    Players(Vec<Socket>),
}

/// Unit of work fanned out to every handler by the dispatcher.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub payload: HashMap<String, PayloadValue>,
    pub origin: Option<Socket>,
}

impl Event {
    pub fn new(event_type: &str, origin: Option<Socket>) -> Self {
        Self {
            event_type: event_type.to_string(),
            payload: HashMap::new(),
            origin,
        }
    }

    /// Wraps a decoded client frame.
    pub fn from_message(message: Message, origin: Socket) -> Self {
        Self {
            event_type: message.message_type,
            payload: message
                .payload
                .into_iter()
                .map(|(key, value)| (key, PayloadValue::Json(value)))
                .collect(),
            origin: Some(origin),
        }
    }

    pub fn queue_up(socket: Socket) -> Self {
        Self::new(types::QUEUE_UP, Some(socket))
    }

    pub fn disconnected(socket: Socket) -> Self {
        Self::new(types::DISCONNECTED, Some(socket))
    }

    pub fn match_found(players: Vec<Socket>) -> Self {
        Self::new(types::MATCH_FOUND, None).with_players(players)
    }

    pub fn game_start(players: Vec<Socket>) -> Self {
        Self::new(types::GAME_START, None).with_players(players)
    }

    pub fn with_json(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload
            .insert(key.to_string(), PayloadValue::Json(value.into()));
        self
    }

    pub fn with_players(mut self, players: Vec<Socket>) -> Self {
        self.payload
            .insert("players".to_string(), PayloadValue::Players(players));
        self
    }

    pub fn is(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }

    pub fn json(&self, key: &str) -> Option<&Value> {
        match self.payload.get(key) {
            Some(PayloadValue::Json(value)) => Some(value),
            _ => None,
        }
    }

    /// Reads an unsigned id sent either as a JSON number or a numeric string.
    pub fn id(&self, key: &str) -> Option<u64> {
        match self.json(key)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn players(&self) -> &[Socket] {
        match self.payload.get("players") {
            Some(PayloadValue::Players(players)) => players,
            _ => &[],
        }
    }
}
