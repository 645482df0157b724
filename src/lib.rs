//! Game of Three - a two-player divide-by-three match engine
//!
//! A match starts from a random whole number. Players alternate adding -1, 0
//! or +1 so that the sum divides by three; the quotient becomes the next
//! number. Whoever reaches 1 wins, and a move whose sum is not a positive
//! multiple of three loses on the spot.
//!
//! # Architecture
//!
//! - **Match**: append-only ledger of states plus a turn tracker, broadcasting
//!   every committed state to its observers
//! - **Service**: the rules engine that validates moves and computes states
//! - **AI**: an observer that answers after a random thinking delay
//! - **Lobby / Directory**: players waiting for a match, and all live players
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use game_of_three::{Action, MatchOptions, MatchService, Player};
//!
//! # fn example() -> Result<(), game_of_three::MatchError> {
//! let alice = Arc::new(Player::human("alice", "Alice"));
//! let bob = Arc::new(Player::human("bob", "Bob"));
//! let service = MatchService::new([alice.clone(), bob], MatchOptions::new().with_seed(100))?;
//!
//! let state = service.make_move(&alice, Action::Decrement)?;
//! assert_eq!(state.output_number(), 33);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod action;
mod ai;
mod config;
mod error;
mod game_match;
mod generators;
mod lobby;
mod observer;
mod player;
mod registry;
mod service;
mod state;
mod tap;
mod turn;

// Crate-level exports - Errors
pub use error::{ConfigError, MatchError, PlayerError};

// Crate-level exports - Players
pub use player::{Player, PlayerId, PlayerKind, PlayerRecord};
pub use registry::PlayerDirectory;

// Crate-level exports - Match model
pub use action::Action;
pub use game_match::{Match, MatchId};
pub use state::{MatchState, MatchStateRecord, MatchStatus};
pub use turn::{Seat, Turn};

// Crate-level exports - Rules engine and AI
pub use ai::{AiActor, AiMove, DEFAULT_THINKING_MAX, DEFAULT_THINKING_MIN, ThinkingDelay, choose_action};
pub use service::{MatchOptions, MatchService, Outcome, evaluate};

// Crate-level exports - Observation
pub use observer::{Observer, Subject, SubscriptionId};
pub use tap::TracingTap;

// Crate-level exports - Generators
pub use generators::{
    DEFAULT_SEED_MAX, DEFAULT_SEED_MIN, IdGenerator, NumberGenerator, UniformSeed, UuidGenerator,
};

// Crate-level exports - Lobby
pub use lobby::{Lobby, Queue};

// Crate-level exports - Configuration
pub use config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE, EngineConfig};
