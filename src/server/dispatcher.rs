use log::{debug, info};
use std::sync::Arc;

use crate::models::{Event, Socket};

/// A component that reacts to dispatched events.
///
/// Handlers must ignore event types they do not recognise, and must not
/// hold their own locks while calling back into the dispatcher.
pub trait EventHandler: Send + Sync {
    fn process(&self, event: &Event, dispatcher: &Dispatcher);
}

/// Fans each event out to a fixed, ordered list of handlers.
///
/// Dispatch runs synchronously on the caller. A handler may dispatch
/// follow-up events from inside `process`; those complete before the
/// original dispatch moves on to the next handler.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl Dispatcher {
    pub fn new(handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        Self {
            handlers: Arc::new(handlers),
        }
    }

    pub fn dispatch(&self, event: Event) {
        debug!(
            "Dispatching {} from {:?}",
            event.event_type,
            event.origin.as_ref().map(Socket::id)
        );
        for handler in self.handlers.iter() {
            handler.process(&event, self);
        }
    }

    /// Emits `disconnected` for a socket the first time it is reported.
    pub fn disconnect(&self, socket: &Socket) {
        if socket.mark_disconnected() {
            info!("Connection {} lost", socket.id());
            self.dispatch(Event::disconnected(socket.clone()));
        }
    }

    #[cfg(test)]
    pub(crate) fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}
