//! The move a player submits: add -1, 0 or +1 before dividing by three.

use serde::{Deserialize, Serialize};

use crate::MatchError;

/// A player's move.
///
/// Serializes as the bare integer `-1`, `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Action {
    /// Subtract one.
    Decrement,
    /// Leave the number as it is.
    Keep,
    /// Add one.
    Increment,
}

impl Action {
    /// All actions in ascending order.
    pub const ALL: [Action; 3] = [Action::Decrement, Action::Keep, Action::Increment];

    /// Returns the signed offset this action applies.
    pub const fn value(self) -> i64 {
        match self {
            Action::Decrement => -1,
            Action::Keep => 0,
            Action::Increment => 1,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Decrement => f.write_str("-1"),
            Action::Keep => f.write_str("0"),
            Action::Increment => f.write_str("+1"),
        }
    }
}

impl TryFrom<i64> for Action {
    type Error = MatchError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Action::Decrement),
            0 => Ok(Action::Keep),
            1 => Ok(Action::Increment),
            other => Err(MatchError::InvalidAction(other.to_string())),
        }
    }
}

impl From<Action> for i64 {
    fn from(action: Action) -> Self {
        action.value()
    }
}

impl std::str::FromStr for Action {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let value = digits
            .parse::<i64>()
            .map_err(|_| MatchError::InvalidAction(trimmed.to_string()))?;
        Action::try_from(value)
    }
}
