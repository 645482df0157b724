//! The match ledger.
//!
//! A [`Match`] owns the two seats, the turn tracker and the append-only
//! history of [`MatchState`]s, and broadcasts every committed state to its
//! observers. It knows nothing about the rules; legality, arithmetic and
//! outcomes live in [`MatchService`](crate::MatchService).

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    MatchError, MatchState, MatchStateRecord, NumberGenerator, Observer, Player, Seat, Subject,
    SubscriptionId, Turn,
};

/// Unique identifier for a match.
pub type MatchId = String;

/// One game between two players, from seed to outcome.
pub struct Match {
    id: MatchId,
    players: [Arc<Player>; 2],
    history: Vec<MatchState>,
    turn: Turn,
    observers: Subject<MatchStateRecord>,
    seed_generator: Arc<dyn NumberGenerator>,
}

impl Match {
    /// Creates an uninitialized match. `players[0]` moves first.
    #[instrument(skip(players, seed_generator), fields(first = %players[0].id(), second = %players[1].id()))]
    pub fn new(
        id: MatchId,
        players: [Arc<Player>; 2],
        seed_generator: Arc<dyn NumberGenerator>,
    ) -> Self {
        debug!("Creating match");
        Self {
            id,
            players,
            history: Vec::new(),
            turn: Turn::new(),
            observers: Subject::new(),
            seed_generator,
        }
    }

    /// Generates the seed, pushes the Start state and notifies observers.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::AlreadyInitialized`] on a second call.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn init(&mut self) -> Result<(), MatchError> {
        if self.turn.is_initialized() {
            warn!("Match initialized twice");
            return Err(MatchError::AlreadyInitialized("Match"));
        }

        let seed = self.seed_generator.generate();
        self.turn.init()?;
        let start = MatchState::Start {
            output_number: seed,
            next_turn: Arc::clone(&self.players[Seat::First.index()]),
        };
        info!(seed, "Match started");

        self.history.push(start);
        self.broadcast();
        Ok(())
    }

    /// Returns `true` once [`Match::init`] has run.
    pub fn is_initialized(&self) -> bool {
        self.turn.is_initialized()
    }

    fn ensure_initialized(&self) -> Result<(), MatchError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(MatchError::NotInitialized("Match"))
        }
    }

    /// Match ID.
    pub fn id(&self) -> &MatchId {
        &self.id
    }

    /// Both players in seat order.
    pub fn players(&self) -> &[Arc<Player>; 2] {
        &self.players
    }

    /// The player sitting in `seat`.
    pub fn player(&self, seat: Seat) -> &Arc<Player> {
        &self.players[seat.index()]
    }

    /// The player whose turn it is.
    pub fn turn(&self) -> Result<&Arc<Player>, MatchError> {
        self.ensure_initialized()?;
        Ok(self.player(self.turn.current()?))
    }

    /// The current turn number.
    pub fn turn_number(&self) -> Result<u32, MatchError> {
        self.ensure_initialized()?;
        self.turn.number()
    }

    /// The player who moves after the current one.
    pub fn next_turn(&self) -> Result<&Arc<Player>, MatchError> {
        self.ensure_initialized()?;
        Ok(self.player(self.turn.peek_next()?))
    }

    /// The latest committed state.
    pub fn state(&self) -> Result<&MatchState, MatchError> {
        self.history.last().ok_or(MatchError::NotInitialized("Match"))
    }

    /// The full history, oldest first.
    pub fn state_history(&self) -> Result<&[MatchState], MatchError> {
        self.ensure_initialized()?;
        Ok(&self.history)
    }

    /// `true` once a Stop state has been committed.
    pub fn is_over(&self) -> bool {
        self.history.last().is_some_and(MatchState::is_stopped)
    }

    /// Appends `state` to the history and notifies observers.
    ///
    /// A Playing state also advances the turn; a Stop state freezes the match.
    /// Observers run synchronously on the caller's thread, in registration
    /// order, and receive the serialized form of `state`.
    ///
    /// # Errors
    ///
    /// - [`MatchError::NotInitialized`] before [`Match::init`].
    /// - [`MatchError::MatchEnded`] once a Stop state has been committed.
    /// - [`MatchError::OutOfSequence`] if `state` is not numbered one past
    ///   the latest entry (this also rejects a second Start state).
    #[instrument(skip(self, state), fields(match_id = %self.id, status = %state.status()))]
    pub fn commit(&mut self, state: MatchState) -> Result<(), MatchError> {
        let latest = self.state()?;
        if latest.is_stopped() {
            warn!("Commit attempted on a finished match");
            return Err(MatchError::MatchEnded {
                match_id: self.id.clone(),
            });
        }

        let expected = latest.turn_number() + 1;
        if state.turn_number() != expected || state.is_starting() {
            warn!(expected, found = state.turn_number(), "State out of sequence");
            return Err(MatchError::OutOfSequence {
                expected,
                found: state.turn_number(),
            });
        }

        let advances = state.is_playing();
        self.history.push(state);
        if advances {
            self.turn.advance()?;
        }

        debug!(history_len = self.history.len(), "State committed");
        self.broadcast();
        Ok(())
    }

    fn broadcast(&self) {
        if let Some(latest) = self.history.last() {
            let record = latest.serialize();
            let delivered = self.observers.notify(&record);
            debug!(delivered, "Broadcast state");
        }
    }

    /// Registers an observer for committed states.
    pub fn register_observer(&self, observer: Arc<dyn Observer<MatchStateRecord>>) -> SubscriptionId {
        self.observers.register(observer)
    }

    /// Removes a registration. Unknown IDs are ignored.
    pub fn remove_observer(&self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    /// Removes the first registration of this exact observer instance.
    pub fn remove_observer_instance(&self, observer: &Arc<dyn Observer<MatchStateRecord>>) -> bool {
        self.observers.remove_observer(observer)
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match")
            .field("id", &self.id)
            .field("players", &self.players)
            .field("history", &self.history)
            .field("turn", &self.turn)
            .field("observers", &self.observers)
            .finish()
    }
}
