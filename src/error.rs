//! Error types for the match engine, players and configuration.

use derive_more::{Display, Error};
use tracing::instrument;

use crate::{MatchId, PlayerId};

/// Errors raised by the match engine.
///
/// Every variant describes a protocol violation. They are returned before
/// any state is mutated, and the engine never retries them internally.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MatchError {
    /// An accessor was used before `init()`.
    #[display("{} used before it was initialized", _0)]
    NotInitialized(&'static str),

    /// `init()` was called a second time.
    #[display("{} is already initialized", _0)]
    AlreadyInitialized(&'static str),

    /// A move was submitted by the player who is not currently active.
    #[display("It's not {}'s turn", player)]
    NotPlayerTurn {
        /// The player who tried to move.
        player: PlayerId,
    },

    /// A move was submitted after the match reached its Stop state.
    #[display("Match {} has already ended", match_id)]
    MatchEnded {
        /// The finished match.
        match_id: MatchId,
    },

    /// The submitted action was not one of -1, 0 or +1.
    #[display("Invalid action {}: expected -1, 0 or +1", _0)]
    InvalidAction(String),

    /// A committed state does not follow the ledger's turn numbering.
    #[display("State out of sequence: expected turn {}, found {}", expected, found)]
    OutOfSequence {
        /// Turn number the ledger expects next.
        expected: u32,
        /// Turn number carried by the rejected state.
        found: u32,
    },

    /// An AI participant was requested outside of an async runtime.
    #[display("AI players require a running tokio runtime")]
    MissingRuntime,
}

impl std::error::Error for MatchError {}

/// Errors raised when mutating a player.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PlayerError {
    /// Only human players may change their display name.
    #[display("Player {} is not human; its name is fixed", _0)]
    NameLocked(PlayerId),
}

impl std::error::Error for PlayerError {}

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("Failed to read config file: {}", err))
    }
}

impl From<toml::de::Error> for ConfigError {
    #[track_caller]
    fn from(err: toml::de::Error) -> Self {
        Self::new(format!("Failed to parse config: {}", err))
    }
}
