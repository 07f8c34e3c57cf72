use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::Socket;
use crate::server::Dispatcher;

/// Application state shared between connections
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub sessions: Mutex<HashMap<Uuid, Socket>>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Records a live connection and returns the active session count.
    pub fn register(&self, socket: Socket) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(|p| p.into_inner());
        sessions.insert(socket.id(), socket);
        sessions.len()
    }

    /// Forgets a connection and returns the active session count.
    pub fn unregister(&self, id: &Uuid) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(|p| p.into_inner());
        sessions.remove(id);
        sessions.len()
    }
}
