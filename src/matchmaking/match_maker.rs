use futures::channel::oneshot;
use futures::future::{self, Either};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::models::{broadcast, types, Event, Message, Socket};
use crate::server::{Dispatcher, EventHandler};

/// Outcome delivered once to a match's confirmation watcher.
#[derive(Debug)]
enum Readiness {
    Ready(Vec<Socket>),
    Canceled,
}

/// A proposed pairing waiting for every player to confirm.
struct Match {
    id: u64,
    players: Vec<Socket>,
    confirmed: Vec<Socket>,
    ready: Option<oneshot::Sender<Readiness>>,
}

impl Match {
    fn has_player(&self, socket: &Socket) -> bool {
        self.players.contains(socket)
    }

    fn is_full(&self) -> bool {
        self.confirmed.len() == self.players.len()
    }
}

#[derive(Default)]
struct MatchRegistry {
    next_id: u64,
    matches: HashMap<u64, Match>,
}

impl MatchRegistry {
    /// Deregisters a match and signals its watcher in the same critical
    /// section, so whichever path removes the match is the only one that
    /// acts on it.
    fn resolve(&mut self, id: u64, readiness: Readiness) -> Option<Match> {
        let mut resolved = self.matches.remove(&id)?;
        if let Some(ready) = resolved.ready.take() {
            // The watcher may already be gone after a timeout.
            let _ = ready.send(readiness);
        }
        Some(resolved)
    }
}

/// Runs the confirmation phase of every proposed match.
///
/// A match ends the moment it leaves the registry: all players confirmed,
/// one declined, one disconnected, or the timeout elapsed. Players who had
/// confirmed a match that fell through go back into the queue.
pub struct MatchMaker {
    registry: Arc<Mutex<MatchRegistry>>,
    timeout: Duration,
}

fn lock(registry: &Mutex<MatchRegistry>) -> MutexGuard<'_, MatchRegistry> {
    registry.lock().unwrap_or_else(|p| p.into_inner())
}

impl MatchMaker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            registry: Arc::new(Mutex::new(MatchRegistry::default())),
            timeout,
        }
    }

    #[cfg(test)]
    pub(crate) fn active_matches(&self) -> usize {
        lock(&self.registry).matches.len()
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self, match_id: u64) -> bool {
        lock(&self.registry).matches.contains_key(&match_id)
    }

    #[cfg(test)]
    pub(crate) fn confirmed_count(&self, match_id: u64) -> Option<usize> {
        lock(&self.registry)
            .matches
            .get(&match_id)
            .map(|m| m.confirmed.len())
    }

    fn create(&self, players: Vec<Socket>, dispatcher: &Dispatcher) {
        if players.is_empty() {
            return;
        }
        let (ready, readiness) = oneshot::channel();
        let id = {
            let mut registry = lock(&self.registry);
            registry.next_id += 1;
            let id = registry.next_id;
            registry.matches.insert(
                id,
                Match {
                    id,
                    players: players.clone(),
                    confirmed: Vec::with_capacity(players.len()),
                    ready: Some(ready),
                },
            );
            id
        };

        info!("Match {} proposed to {} players", id, players.len());
        broadcast(&players, &Message::match_found(id));
        self.watch(id, readiness, dispatcher.clone());
    }

    /// Waits for either the readiness signal or the timeout, whichever
    /// comes first.
    fn watch(&self, id: u64, readiness: oneshot::Receiver<Readiness>, dispatcher: Dispatcher) {
        let registry = self.registry.clone();
        let timer = Box::pin(actix_rt::time::sleep(self.timeout));

        actix_rt::spawn(async move {
            let outcome = match future::select(readiness, timer).await {
                Either::Left((outcome, _)) => outcome.ok(),
                Either::Right(((), readiness)) => {
                    let expired = lock(&registry).matches.remove(&id);
                    match expired {
                        Some(expired) => {
                            info!("Match {} timed out", id);
                            cancel(expired, None, &dispatcher);
                            return;
                        }
                        // Another path resolved the match as the timer fired;
                        // its signal is already queued.
                        None => readiness.await.ok(),
                    }
                }
            };

            match outcome {
                Some(Readiness::Ready(players)) => {
                    info!("Match {} confirmed by all players", id);
                    dispatcher.dispatch(Event::game_start(players));
                }
                Some(Readiness::Canceled) | None => debug!("Match {} watcher done", id),
            }
        });
    }

    fn confirm(&self, id: u64, socket: &Socket) {
        let full = {
            let mut registry = lock(&self.registry);
            let Some(pending) = registry.matches.get_mut(&id) else {
                return;
            };
            if !pending.has_player(socket) || pending.confirmed.contains(socket) {
                return;
            }
            pending.confirmed.push(socket.clone());
            pending.is_full()
        };

        info!("Player {} confirmed match {}", socket.id(), id);
        socket.notify(&Message::wait_for_players());

        if full {
            let mut registry = lock(&self.registry);
            let ready = registry
                .matches
                .get(&id)
                .map(|m| Readiness::Ready(m.confirmed.clone()));
            if let Some(ready) = ready {
                registry.resolve(id, ready);
            }
        }
    }

    fn decline(&self, id: u64, socket: &Socket, dispatcher: &Dispatcher) {
        let declined = {
            let mut registry = lock(&self.registry);
            let is_player = registry
                .matches
                .get(&id)
                .is_some_and(|m| m.has_player(socket));
            if is_player {
                registry.resolve(id, Readiness::Canceled)
            } else {
                None
            }
        };

        if let Some(declined) = declined {
            info!("Player {} declined match {}", socket.id(), id);
            cancel(declined, Some(socket), dispatcher);
        }
    }

    fn drop_player(&self, socket: &Socket, dispatcher: &Dispatcher) {
        let abandoned: Vec<Match> = {
            let mut registry = lock(&self.registry);
            let ids: Vec<u64> = registry
                .matches
                .values()
                .filter(|m| m.has_player(socket))
                .map(|m| m.id)
                .collect();
            ids.into_iter()
                .filter_map(|id| registry.resolve(id, Readiness::Canceled))
                .collect()
        };

        for abandoned in abandoned {
            info!("Player {} disconnected from match {}", socket.id(), abandoned.id);
            cancel(abandoned, Some(socket), dispatcher);
        }
    }
}

/// Tells every remaining player the match is off and puts those who had
/// confirmed back into the queue. `leaver` is never requeued.
fn cancel(canceled: Match, leaver: Option<&Socket>, dispatcher: &Dispatcher) {
    let reachable: Vec<Socket> = canceled
        .players
        .iter()
        .filter(|p| !p.is_disconnected())
        .cloned()
        .collect();
    broadcast(&reachable, &Message::match_canceled(canceled.id));

    for player in canceled.confirmed {
        if Some(&player) == leaver || player.is_disconnected() {
            continue;
        }
        info!("Requeueing player {} after match {}", player.id(), canceled.id);
        dispatcher.dispatch(Event::queue_up(player));
    }
}

impl EventHandler for MatchMaker {
    fn process(&self, event: &Event, dispatcher: &Dispatcher) {
        match event.event_type.as_str() {
            types::MATCH_FOUND => self.create(event.players().to_vec(), dispatcher),
            types::MATCH_CONFIRMED => {
                if let (Some(socket), Some(id)) = (event.origin.as_ref(), event.id("matchId")) {
                    self.confirm(id, socket);
                }
            }
            types::MATCH_DECLINED => {
                if let (Some(socket), Some(id)) = (event.origin.as_ref(), event.id("matchId")) {
                    self.decline(id, socket, dispatcher);
                }
            }
            types::DISCONNECTED => {
                if let Some(socket) = event.origin.as_ref() {
                    self.drop_player(socket, dispatcher);
                }
            }
            _ => {}
        }
    }
}
