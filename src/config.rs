//! Startup configuration parsed from the command line and environment.

use clap::Parser;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::ConfigError;

/// Runtime settings for the matchmaking server.
#[derive(Parser, Debug, Clone)]
#[command(name = "guess_match_server", about = "Matchmaking and guessing-game session server")]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to
    #[arg(short, long, env = "GUESS_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// How long players have to confirm a match, in milliseconds
    #[arg(long, env = "GUESS_MATCH_TIMEOUT_MS", default_value_t = 10_000)]
    pub match_timeout_ms: u64,

    /// Number of queued players paired into one match
    #[arg(long, env = "GUESS_PLAYERS_PER_MATCH", default_value_t = 2)]
    pub players_per_match: usize,

    /// Smallest possible answer of a guessing game
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub answer_min: i64,

    /// Largest possible answer of a guessing game
    #[arg(long, default_value_t = 99, allow_negative_numbers = true)]
    pub answer_max: i64,

    /// Default log filter when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            match_timeout_ms: 10_000,
            players_per_match: 2,
            answer_min: 0,
            answer_max: 99,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players_per_match < 2 {
            return Err(ConfigError::TooFewPlayers(self.players_per_match));
        }
        if self.answer_min > self.answer_max {
            return Err(ConfigError::EmptyAnswerRange {
                min: self.answer_min,
                max: self.answer_max,
            });
        }
        Ok(())
    }

    pub fn match_timeout(&self) -> Duration {
        Duration::from_millis(self.match_timeout_ms)
    }

    pub fn answer_range(&self) -> RangeInclusive<i64> {
        self.answer_min..=self.answer_max
    }
}
