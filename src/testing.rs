//! In-memory transport for exercising handlers without a network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::SocketError;
use crate::models::{Connection, Message, Socket};

/// Connection that decodes and stores every frame written to it.
pub struct RecordingConnection {
    inbox: Inbox,
}

/// Read side of a [`RecordingConnection`].
#[derive(Clone, Default)]
pub struct Inbox {
    messages: Arc<Mutex<Vec<Message>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingConnection {
    pub fn socket() -> (Socket, Inbox) {
        let inbox = Inbox::default();
        let socket = Socket::new(RecordingConnection {
            inbox: inbox.clone(),
        });
        (socket, inbox)
    }
}

impl Connection for RecordingConnection {
    fn send_text(&self, id: Uuid, text: String) -> Result<(), SocketError> {
        if self.inbox.closed.load(Ordering::Acquire) {
            return Err(SocketError::Closed(id));
        }
        let message: Message = serde_json::from_str(&text)?;
        self.inbox.messages.lock().unwrap().push(message);
        Ok(())
    }

    fn close(&self) {
        self.inbox.closed.store(true, Ordering::Release);
    }
}

impl Inbox {
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn types(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .map(|m| m.message_type)
            .collect()
    }

    pub fn last(&self) -> Option<Message> {
        self.messages.lock().unwrap().last().cloned()
    }

    /// Last received message of the given type.
    pub fn last_of(&self, message_type: &str) -> Option<Message> {
        self.messages()
            .into_iter()
            .rev()
            .find(|m| m.message_type == message_type)
    }

    pub fn count_of(&self, message_type: &str) -> usize {
        self.messages()
            .iter()
            .filter(|m| m.message_type == message_type)
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
