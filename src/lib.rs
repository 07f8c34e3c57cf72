//! Matchmaking and guessing-game session server.
//!
//! Clients connect over WebSocket, queue up, get paired into matches, confirm
//! under a deadline, and then play a short number-guessing game. Every
//! decoded frame becomes an [`Event`](models::Event) that the
//! [`Dispatcher`](server::Dispatcher) hands, in order, to the queue manager,
//! the match maker and the game manager. Handlers talk to each other only by
//! dispatching further events.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod game;
pub mod matchmaking;
pub mod models;
pub mod routes;
pub mod server;
pub mod websocket;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use config::ServerConfig;
pub use error::{ConfigError, ServerError, SocketError};

use game::GameManager;
use matchmaking::{MatchMaker, QueueManager};
use server::{Dispatcher, EventHandler};

/// Wires the handlers in their fixed order: queue, matches, games.
pub fn build_dispatcher(config: &ServerConfig) -> Result<Dispatcher, ConfigError> {
    config.validate()?;
    let handlers: Vec<Arc<dyn EventHandler>> = vec![
        Arc::new(QueueManager::new(config.players_per_match)),
        Arc::new(MatchMaker::new(config.match_timeout())),
        Arc::new(GameManager::new(config.answer_range())),
    ];
    Ok(Dispatcher::new(handlers))
}
