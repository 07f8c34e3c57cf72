//! Error types for the matchmaking server.
//!
//! Nothing in the event pipeline is fatal: send failures are logged and the
//! broken connection reports itself through a `disconnected` event. These
//! types only cross the boundaries where something can actually fail.

/// Failure to deliver a message to one connection.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// The connection is gone or its mailbox no longer accepts messages
    #[error("connection {0} is closed")]
    Closed(uuid::Uuid),

    /// The outbound message could not be encoded as JSON
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Invalid startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("answer range {min}..={max} is empty")]
    EmptyAnswerRange { min: i64, max: i64 },

    #[error("a match needs at least 2 players, got {0}")]
    TooFewPlayers(usize),
}

/// Errors returned from the server entry point.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("network error: {0}")]
    Io(#[from] std::io::Error),
}
