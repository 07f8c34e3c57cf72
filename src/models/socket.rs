use log::{debug, warn};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::SocketError;
use crate::models::Message;

/// Transport behind a [`Socket`]. The WebSocket actor implements this in
/// production; tests plug in an in-memory recorder.
pub trait Connection: Send + Sync {
    fn send_text(&self, id: Uuid, text: String) -> Result<(), SocketError>;
    fn close(&self);
}

/// Shared handle to one client connection.
///
/// Clones refer to the same connection. Two sockets are equal only when they
/// wrap the same connection, so a `Socket` works as a map key everywhere.
#[derive(Clone)]
pub struct Socket {
    inner: Arc<SocketInner>,
}

struct SocketInner {
    id: Uuid,
    connection: Mutex<Box<dyn Connection>>,
    disconnected: AtomicBool,
}

impl Socket {
    pub fn new(connection: impl Connection + 'static) -> Self {
        Self::with_id(Uuid::new_v4(), connection)
    }

    pub fn with_id(id: Uuid, connection: impl Connection + 'static) -> Self {
        Self {
            inner: Arc::new(SocketInner {
                id,
                connection: Mutex::new(Box::new(connection)),
                disconnected: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Encodes and writes one message. Writes on the same socket never
    /// interleave.
    pub fn send(&self, message: &Message) -> Result<(), SocketError> {
        let text = serde_json::to_string(message)?;
        let connection = self
            .inner
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        connection.send_text(self.inner.id, text)
    }

    /// Sends and logs a failure instead of returning it. A dead connection
    /// reports itself through its own `disconnected` event.
    pub fn notify(&self, message: &Message) {
        match self.send(message) {
            Ok(()) => debug!("Sent {} to {}", message.message_type, self.inner.id),
            Err(e) => warn!("Failed to send {} to {}: {}", message.message_type, self.inner.id, e),
        }
    }

    pub fn close(&self) {
        let connection = self
            .inner
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        connection.close();
    }

    /// Flags the socket as gone. Returns `true` only for the first call.
    pub fn mark_disconnected(&self) -> bool {
        !self.inner.disconnected.swap(true, Ordering::AcqRel)
    }

    pub fn is_disconnected(&self) -> bool {
        self.inner.disconnected.load(Ordering::Acquire)
    }
}

impl PartialEq for Socket {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Socket {}

impl Hash for Socket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Socket").field(&self.inner.id).finish()
    }
}

/// Sends the same message to every socket in order.
pub fn broadcast(sockets: &[Socket], message: &Message) {
    for socket in sockets {
        socket.notify(message);
    }
}
