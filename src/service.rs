//! The rules engine.
//!
//! [`MatchService`] owns a [`Match`], validates moves against it, computes
//! the next state and commits it. When the second seat is an AI player the
//! service also wires an [`AiActor`] into the match so its moves come back
//! through [`MatchService::make_move`] like any other caller's.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, info, instrument, warn};

use crate::{
    Action, AiActor, AiMove, IdGenerator, Match, MatchError, MatchId, MatchState,
    MatchStateRecord, NumberGenerator, Observer, Player, PlayerId, Seat, SubscriptionId,
    ThinkingDelay, UniformSeed, UuidGenerator,
};

/// Construction-time configuration for a [`MatchService`].
///
/// Observers added here are registered before the match starts, so they see
/// the Start state.
#[derive(Clone)]
pub struct MatchOptions {
    seed_generator: Arc<dyn NumberGenerator>,
    id_generator: Arc<dyn IdGenerator>,
    thinking_delay: ThinkingDelay,
    observers: Vec<Arc<dyn Observer<MatchStateRecord>>>,
}

impl MatchOptions {
    /// Default options: random seed in `3..=100`, UUID ids, 1-5s thinking.
    pub fn new() -> Self {
        Self {
            seed_generator: Arc::new(UniformSeed::default()),
            id_generator: Arc::new(UuidGenerator),
            thinking_delay: ThinkingDelay::default(),
            observers: Vec::new(),
        }
    }

    /// Replaces the seed generator.
    pub fn with_seed_generator(mut self, generator: impl NumberGenerator + 'static) -> Self {
        self.seed_generator = Arc::new(generator);
        self
    }

    /// Uses a fixed seed.
    pub fn with_seed(self, seed: i64) -> Self {
        self.with_seed_generator(move || seed)
    }

    /// Replaces the match ID generator.
    pub fn with_id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Arc::new(generator);
        self
    }

    /// Sets the AI's thinking delay.
    pub fn with_thinking_delay(mut self, delay: ThinkingDelay) -> Self {
        self.thinking_delay = delay;
        self
    }

    /// Adds an observer that is registered before the match starts.
    pub fn with_observer(mut self, observer: Arc<dyn Observer<MatchStateRecord>>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MatchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchOptions")
            .field("thinking_delay", &self.thinking_delay)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

/// Result of applying an action to a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The quotient is above 1; the match continues from it.
    Continue(i64),
    /// The quotient is exactly 1; the mover wins.
    Reached,
    /// The sum is not a positive multiple of 3; the mover loses.
    Invalid(Option<i64>),
}

/// Applies `action` to `input` using exact integer arithmetic.
pub fn evaluate(input: i64, action: Action) -> Outcome {
    let Some(candidate) = input.checked_add(action.value()) else {
        return Outcome::Invalid(None);
    };

    if candidate % 3 != 0 || candidate / 3 <= 0 {
        return Outcome::Invalid(Some(candidate));
    }

    match candidate / 3 {
        1 => Outcome::Reached,
        quotient => Outcome::Continue(quotient),
    }
}

/// Runs one match under the game's rules.
pub struct MatchService {
    id: MatchId,
    game: Mutex<Match>,
    ai: Option<Arc<AiActor>>,
}

impl MatchService {
    /// Creates the service and starts the match.
    ///
    /// If `players[1]` is an AI, an [`AiActor`] is created on the current
    /// tokio runtime and wired both ways: it observes the match, and its
    /// moves are fed back into [`MatchService::make_move`].
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MissingRuntime`] if an AI is requested outside
    /// a tokio runtime.
    #[instrument(skip(players, options), fields(first = %players[0].id(), second = %players[1].id()))]
    pub fn new(players: [Arc<Player>; 2], options: MatchOptions) -> Result<Arc<Self>, MatchError> {
        let id = options.id_generator.generate();
        let ai_player = Arc::clone(&players[Seat::Second.index()]);
        let game = Match::new(id.clone(), players, Arc::clone(&options.seed_generator));

        let ai = if ai_player.is_ai() {
            let actor = AiActor::on_current_runtime(ai_player, options.thinking_delay)?;
            Some(Arc::new(actor))
        } else {
            None
        };

        let service = Arc::new(Self {
            id,
            game: Mutex::new(game),
            ai,
        });

        if let Some(actor) = &service.ai {
            service.lock().register_observer(Arc::clone(actor) as Arc<dyn Observer<MatchStateRecord>>);
            actor.register_observer(Arc::new(AiMoveForwarder {
                service: Arc::downgrade(&service),
                player: Arc::clone(actor.player()),
            }));
            debug!("AI actor wired into match");
        }

        {
            let mut game = service.lock();
            for observer in options.observers {
                game.register_observer(observer);
            }
            game.init()?;
        }

        info!(match_id = %service.id, "Match service ready");
        Ok(service)
    }

    fn lock(&self) -> MutexGuard<'_, Match> {
        self.game
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Submits a move for `player`.
    ///
    /// Returns the state that was committed. The move is validated before
    /// anything changes: a finished match or a player moving out of turn is
    /// rejected and the match is left untouched. A move whose result is not a
    /// positive multiple of three is not rejected; it ends the match as a
    /// loss for its author.
    ///
    /// Observers run before this returns. They must not call `make_move`
    /// synchronously from their `update`.
    ///
    /// # Errors
    ///
    /// - [`MatchError::MatchEnded`] after the Stop state.
    /// - [`MatchError::NotPlayerTurn`] if `player` is not on the move.
    #[instrument(skip(self, player, action), fields(match_id = %self.id, player_id = %player.id(), %action))]
    pub fn make_move(&self, player: &Player, action: Action) -> Result<MatchStateRecord, MatchError> {
        let mut game = self.lock();

        let latest = game.state()?;
        if latest.is_stopped() {
            warn!("Move submitted after the match ended");
            return Err(MatchError::MatchEnded {
                match_id: self.id.clone(),
            });
        }

        let mover = Arc::clone(game.turn()?);
        if mover.id() != player.id() {
            warn!(expected = %mover.id(), "Player tried to move out of turn");
            return Err(MatchError::NotPlayerTurn {
                player: player.id().clone(),
            });
        }

        let input_number = latest.output_number();
        let opponent = Arc::clone(game.next_turn()?);
        let turn_number = game.turn_number()?;

        let next = match evaluate(input_number, action) {
            Outcome::Continue(output_number) => MatchState::Playing {
                action,
                current_turn: mover,
                input_number,
                output_number,
                next_turn: opponent,
                turn_number,
            },
            Outcome::Reached => MatchState::Stop {
                action,
                current_turn: Arc::clone(&mover),
                input_number,
                output_number: 1,
                turn_number,
                winning_player: mover,
            },
            Outcome::Invalid(candidate) => MatchState::Stop {
                action,
                current_turn: mover,
                input_number,
                output_number: candidate.unwrap_or(input_number),
                turn_number,
                winning_player: opponent,
            },
        };

        let record = next.serialize();
        game.commit(next)?;
        info!(
            status = %record.status(),
            input_number,
            output_number = record.output_number(),
            "Move applied"
        );
        Ok(record)
    }

    /// Submits a move for the player with `player_id`.
    ///
    /// # Errors
    ///
    /// As [`MatchService::make_move`]; an ID that is not in this match is
    /// reported as [`MatchError::NotPlayerTurn`].
    pub fn make_move_by_id(&self, player_id: &PlayerId, action: Action) -> Result<MatchStateRecord, MatchError> {
        let player = self
            .player_by_id(player_id)
            .ok_or_else(|| MatchError::NotPlayerTurn {
                player: player_id.clone(),
            })?;
        self.make_move(&player, action)
    }

    /// Match ID.
    pub fn id(&self) -> &MatchId {
        &self.id
    }

    /// Both players in seat order.
    pub fn players(&self) -> [Arc<Player>; 2] {
        self.lock().players().clone()
    }

    /// Looks up a participant by ID.
    pub fn player_by_id(&self, player_id: &PlayerId) -> Option<Arc<Player>> {
        self.lock()
            .players()
            .iter()
            .find(|p| p.id() == player_id)
            .cloned()
    }

    /// The AI actor, if the second seat is an AI.
    pub fn ai(&self) -> Option<&Arc<AiActor>> {
        self.ai.as_ref()
    }

    /// The latest state in wire form.
    pub fn state(&self) -> Result<MatchStateRecord, MatchError> {
        Ok(self.lock().state()?.serialize())
    }

    /// The full history in wire form, oldest first.
    pub fn history(&self) -> Result<Vec<MatchStateRecord>, MatchError> {
        Ok(self
            .lock()
            .state_history()?
            .iter()
            .map(MatchState::serialize)
            .collect())
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> Result<Arc<Player>, MatchError> {
        Ok(Arc::clone(self.lock().turn()?))
    }

    /// `true` once the match has ended.
    pub fn is_over(&self) -> bool {
        self.lock().is_over()
    }

    /// The winner, once the match has ended.
    pub fn winner(&self) -> Option<Arc<Player>> {
        self.lock().state().ok()?.winner().cloned()
    }

    /// Registers an observer for states committed from now on.
    pub fn register_observer(&self, observer: Arc<dyn Observer<MatchStateRecord>>) -> SubscriptionId {
        self.lock().register_observer(observer)
    }

    /// Removes a registration. Unknown IDs are ignored.
    pub fn remove_observer(&self, id: SubscriptionId) -> bool {
        self.lock().remove_observer(id)
    }
}

impl std::fmt::Debug for MatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchService")
            .field("id", &self.id)
            .field("ai", &self.ai)
            .finish_non_exhaustive()
    }
}

/// Feeds the AI's chosen moves back into the service.
struct AiMoveForwarder {
    service: Weak<MatchService>,
    player: Arc<Player>,
}

impl Observer<AiMove> for AiMoveForwarder {
    fn update(&self, ai_move: &AiMove) {
        let Some(service) = self.service.upgrade() else {
            debug!("Match service dropped; discarding AI move");
            return;
        };

        // A late move racing the end of the match is expected, not fatal.
        if let Err(e) = service.make_move(&self.player, ai_move.action) {
            warn!(
                match_id = %service.id(),
                turn_number = ai_move.turn_number,
                error = %e,
                "AI move rejected"
            );
        }
    }
}
