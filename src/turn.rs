//! Turn tracking: whose move it is and how many turns have been played.

use tracing::{debug, instrument};

use crate::MatchError;

/// One of the two positions in a match. `First` always opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    /// The opening player (position 0).
    First,
    /// The responding player (position 1).
    Second,
}

impl Seat {
    /// Returns the other seat.
    pub fn other(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    /// Returns the position index (0 or 1).
    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TurnState {
    current: Seat,
    number: u32,
}

/// Alternating turn tracker.
///
/// Starts uninitialized; every accessor fails with
/// [`MatchError::NotInitialized`] until [`Turn::init`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Turn {
    state: Option<TurnState>,
}

impl Turn {
    /// Creates an uninitialized tracker.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<&TurnState, MatchError> {
        self.state.as_ref().ok_or(MatchError::NotInitialized("Turn"))
    }

    /// Sets turn 1 with the first seat to move.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::AlreadyInitialized`] on a second call.
    #[instrument(skip(self))]
    pub fn init(&mut self) -> Result<(), MatchError> {
        if self.state.is_some() {
            return Err(MatchError::AlreadyInitialized("Turn"));
        }
        self.state = Some(TurnState {
            current: Seat::First,
            number: 1,
        });
        debug!("Turn tracker initialized");
        Ok(())
    }

    /// Returns `true` once [`Turn::init`] has run.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// The seat that moves now.
    pub fn current(&self) -> Result<Seat, MatchError> {
        Ok(self.state()?.current)
    }

    /// The current turn number, starting at 1.
    pub fn number(&self) -> Result<u32, MatchError> {
        Ok(self.state()?.number)
    }

    /// The seat that moves after the current one.
    pub fn peek_next(&self) -> Result<Seat, MatchError> {
        Ok(self.state()?.current.other())
    }

    /// Moves to the next turn and returns the seat now on the move.
    #[instrument(skip(self))]
    pub fn advance(&mut self) -> Result<Seat, MatchError> {
        let state = self
            .state
            .as_mut()
            .ok_or(MatchError::NotInitialized("Turn"))?;
        state.number += 1;
        state.current = state.current.other();
        debug!(turn_number = state.number, seat = ?state.current, "Turn advanced");
        Ok(state.current)
    }
}
