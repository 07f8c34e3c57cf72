use log::info;

use crate::matchmaking::Queue;
use crate::models::{types, Event, Message, Socket};
use crate::server::{Dispatcher, EventHandler};

/// Keeps the waiting pool and emits `match_found` once enough players wait.
pub struct QueueManager {
    queue: Queue,
    players_per_match: usize,
}

impl QueueManager {
    pub fn new(players_per_match: usize) -> Self {
        Self {
            queue: Queue::new(),
            players_per_match,
        }
    }

    #[cfg(test)]
    pub(crate) fn queue(&self) -> &Queue {
        &self.queue
    }

    fn enqueue(&self, socket: &Socket, dispatcher: &Dispatcher) {
        // Acked before the push: once queued, another thread may pair it.
        socket.notify(&Message::wait_for_match());
        self.queue.push(socket.clone());
        info!("Player {} queued ({} waiting)", socket.id(), self.queue.count());

        if let Some(players) = self.queue.pop_many(self.players_per_match) {
            info!("Pairing {} players", players.len());
            dispatcher.dispatch(Event::match_found(players));
        }
    }
}

impl EventHandler for QueueManager {
    fn process(&self, event: &Event, dispatcher: &Dispatcher) {
        let Some(socket) = event.origin.as_ref() else {
            return;
        };
        match event.event_type.as_str() {
            types::QUEUE_UP => self.enqueue(socket, dispatcher),
            types::DEQUEUE | types::DISCONNECTED => {
                if self.queue.remove(socket) {
                    info!("Player {} left the queue", socket.id());
                }
            }
            _ => {}
        }
    }
}
