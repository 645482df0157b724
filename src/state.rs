//! Match states: immutable snapshots of a match's history.
//!
//! [`MatchState`] is the in-engine form and refers to live players.
//! [`MatchStateRecord`] is the wire form, where every player is replaced by
//! its ID. Observers only ever see records.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Action, Player, PlayerId};

/// Phase a state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchStatus {
    /// The seed, before any move.
    Start,
    /// A legal move that did not end the match.
    Playing,
    /// The move that ended the match.
    Stop,
}

/// One entry in a match's history.
///
/// Each variant carries only the fields meaningful to its phase, so an
/// incomplete state cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchState {
    /// The seed value before any move. Its turn number is always 0.
    Start {
        /// The seed.
        output_number: i64,
        /// Player who makes the first move.
        next_turn: Arc<Player>,
    },
    /// A completed move after which the match continues.
    Playing {
        /// The move applied.
        action: Action,
        /// The player who made the move.
        current_turn: Arc<Player>,
        /// Number before the move.
        input_number: i64,
        /// `(input_number + action) / 3`.
        output_number: i64,
        /// The player now due to act.
        next_turn: Arc<Player>,
        /// Turn in which the move was made.
        turn_number: u32,
    },
    /// The terminal move.
    Stop {
        /// The move applied.
        action: Action,
        /// The player who made the move.
        current_turn: Arc<Player>,
        /// Number before the move.
        input_number: i64,
        /// Quotient when the move reached 1, otherwise the invalid sum.
        output_number: i64,
        /// Turn in which the move was made.
        turn_number: u32,
        /// Winner of the match.
        winning_player: Arc<Player>,
    },
}

impl MatchState {
    /// Returns the phase of this state.
    pub fn status(&self) -> MatchStatus {
        match self {
            MatchState::Start { .. } => MatchStatus::Start,
            MatchState::Playing { .. } => MatchStatus::Playing,
            MatchState::Stop { .. } => MatchStatus::Stop,
        }
    }

    /// `true` for the seed state.
    pub fn is_starting(&self) -> bool {
        matches!(self, MatchState::Start { .. })
    }

    /// `true` for a non-terminal move.
    pub fn is_playing(&self) -> bool {
        matches!(self, MatchState::Playing { .. })
    }

    /// `true` for the terminal move.
    pub fn is_stopped(&self) -> bool {
        matches!(self, MatchState::Stop { .. })
    }

    /// Number produced by this state; the next move starts from it.
    pub fn output_number(&self) -> i64 {
        match self {
            MatchState::Start { output_number, .. }
            | MatchState::Playing { output_number, .. }
            | MatchState::Stop { output_number, .. } => *output_number,
        }
    }

    /// Turn in which this state was produced (0 for the seed).
    pub fn turn_number(&self) -> u32 {
        match self {
            MatchState::Start { .. } => 0,
            MatchState::Playing { turn_number, .. } | MatchState::Stop { turn_number, .. } => {
                *turn_number
            }
        }
    }

    /// The player who moved, if this state records a move.
    pub fn mover(&self) -> Option<&Arc<Player>> {
        match self {
            MatchState::Start { .. } => None,
            MatchState::Playing { current_turn, .. } | MatchState::Stop { current_turn, .. } => {
                Some(current_turn)
            }
        }
    }

    /// The winner, if this state ended the match.
    pub fn winner(&self) -> Option<&Arc<Player>> {
        match self {
            MatchState::Stop { winning_player, .. } => Some(winning_player),
            MatchState::Start { .. } | MatchState::Playing { .. } => None,
        }
    }

    /// Returns the wire form, with players replaced by their IDs.
    pub fn serialize(&self) -> MatchStateRecord {
        match self {
            MatchState::Start {
                output_number,
                next_turn,
            } => MatchStateRecord::Start {
                output_number: *output_number,
                next_turn: next_turn.id().clone(),
                turn_number: 0,
            },
            MatchState::Playing {
                action,
                current_turn,
                input_number,
                output_number,
                next_turn,
                turn_number,
            } => MatchStateRecord::Playing {
                action: *action,
                current_turn: current_turn.id().clone(),
                input_number: *input_number,
                output_number: *output_number,
                next_turn: next_turn.id().clone(),
                turn_number: *turn_number,
            },
            MatchState::Stop {
                action,
                current_turn,
                input_number,
                output_number,
                turn_number,
                winning_player,
            } => MatchStateRecord::Stop {
                action: *action,
                current_turn: current_turn.id().clone(),
                input_number: *input_number,
                output_number: *output_number,
                turn_number: *turn_number,
                winning_player: winning_player.id().clone(),
            },
        }
    }
}

/// Serialized match state, keyed by `status`.
///
/// ```json
/// {"status":"playing","action":-1,"currentTurn":"a","inputNumber":100,
///  "outputNumber":33,"nextTurn":"b","turnNumber":1}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum MatchStateRecord {
    /// See [`MatchState::Start`].
    Start {
        /// The seed.
        output_number: i64,
        /// Player who makes the first move.
        next_turn: PlayerId,
        /// Always 0.
        turn_number: u32,
    },
    /// See [`MatchState::Playing`].
    Playing {
        /// The move applied.
        action: Action,
        /// The player who made the move.
        current_turn: PlayerId,
        /// Number before the move.
        input_number: i64,
        /// Number after the move.
        output_number: i64,
        /// The player now due to act.
        next_turn: PlayerId,
        /// Turn in which the move was made.
        turn_number: u32,
    },
    /// See [`MatchState::Stop`].
    Stop {
        /// The move applied.
        action: Action,
        /// The player who made the move.
        current_turn: PlayerId,
        /// Number before the move.
        input_number: i64,
        /// Number after the move.
        output_number: i64,
        /// Turn in which the move was made.
        turn_number: u32,
        /// Winner of the match.
        winning_player: PlayerId,
    },
}

impl MatchStateRecord {
    /// Returns the phase of this record.
    pub fn status(&self) -> MatchStatus {
        match self {
            MatchStateRecord::Start { .. } => MatchStatus::Start,
            MatchStateRecord::Playing { .. } => MatchStatus::Playing,
            MatchStateRecord::Stop { .. } => MatchStatus::Stop,
        }
    }

    /// `true` for the seed state.
    pub fn is_starting(&self) -> bool {
        matches!(self, MatchStateRecord::Start { .. })
    }

    /// `true` for a non-terminal move.
    pub fn is_playing(&self) -> bool {
        matches!(self, MatchStateRecord::Playing { .. })
    }

    /// `true` for the terminal move.
    pub fn is_stopped(&self) -> bool {
        matches!(self, MatchStateRecord::Stop { .. })
    }

    /// Number produced by this state.
    pub fn output_number(&self) -> i64 {
        match self {
            MatchStateRecord::Start { output_number, .. }
            | MatchStateRecord::Playing { output_number, .. }
            | MatchStateRecord::Stop { output_number, .. } => *output_number,
        }
    }

    /// Turn in which this state was produced.
    pub fn turn_number(&self) -> u32 {
        match self {
            MatchStateRecord::Start { turn_number, .. }
            | MatchStateRecord::Playing { turn_number, .. }
            | MatchStateRecord::Stop { turn_number, .. } => *turn_number,
        }
    }

    /// The player due to act next, if the match is still running.
    pub fn next_turn(&self) -> Option<&PlayerId> {
        match self {
            MatchStateRecord::Start { next_turn, .. }
            | MatchStateRecord::Playing { next_turn, .. } => Some(next_turn),
            MatchStateRecord::Stop { .. } => None,
        }
    }

    /// The winner, if the match has ended.
    pub fn winning_player(&self) -> Option<&PlayerId> {
        match self {
            MatchStateRecord::Stop { winning_player, .. } => Some(winning_player),
            MatchStateRecord::Start { .. } | MatchStateRecord::Playing { .. } => None,
        }
    }
}
