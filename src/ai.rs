//! Autonomous opponent.
//!
//! The [`AiActor`] observes match states. When a Playing state names it as
//! the next player, it "thinks" for a random delay on the tokio runtime and
//! then publishes the one action that keeps the number divisible by three.
//!
//! A pending move is keyed to the turn it was scheduled for. It is aborted
//! when the match stops or a newer turn supersedes it, and it is dropped
//! without error if it fires after its turn has passed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use derive_new::new;
use rand::Rng;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace};

use crate::{Action, MatchError, MatchStateRecord, Observer, Player, Subject, SubscriptionId};

/// Default lower bound of the thinking delay.
pub const DEFAULT_THINKING_MIN: Duration = Duration::from_secs(1);

/// Default upper bound of the thinking delay.
pub const DEFAULT_THINKING_MAX: Duration = Duration::from_secs(5);

/// Returns the action that makes `previous_output + action` divisible by 3.
///
/// Uses the mathematical remainder (`0 <= r < 3`), so negative numbers map
/// the same way as positive ones.
pub fn choose_action(previous_output: i64) -> Action {
    match previous_output.rem_euclid(3) {
        0 => Action::Keep,
        1 => Action::Decrement,
        _ => Action::Increment,
    }
}

/// Inclusive range the AI's thinking time is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkingDelay {
    min: Duration,
    max: Duration,
}

impl ThinkingDelay {
    /// Creates a delay range. Bounds given in the wrong order are swapped.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// A delay of exactly `duration`.
    pub fn fixed(duration: Duration) -> Self {
        Self::new(duration, duration)
    }

    /// Lower bound.
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws a duration uniformly from the range.
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

impl Default for ThinkingDelay {
    fn default() -> Self {
        Self::new(DEFAULT_THINKING_MIN, DEFAULT_THINKING_MAX)
    }
}

/// A move chosen by the AI.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct AiMove {
    /// The chosen action.
    pub action: Action,
    /// Turn the move was computed for.
    pub turn_number: u32,
    /// Number the move applies to.
    pub input_number: i64,
}

/// What the actor is doing.
#[derive(Debug)]
enum Phase {
    Idle,
    Thinking {
        turn_number: u32,
        task: JoinHandle<()>,
    },
}

#[derive(Debug)]
struct Shared {
    phase: Mutex<Phase>,
    moves: Subject<AiMove>,
}

impl Shared {
    fn phase(&self) -> std::sync::MutexGuard<'_, Phase> {
        self.phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Match observer that plays for one AI player.
#[derive(Debug)]
pub struct AiActor {
    player: Arc<Player>,
    delay: ThinkingDelay,
    runtime: Handle,
    shared: Arc<Shared>,
}

impl AiActor {
    /// Creates an actor that spawns its thinking tasks on `runtime`.
    #[instrument(skip(player, runtime), fields(player_id = %player.id()))]
    pub fn new(player: Arc<Player>, delay: ThinkingDelay, runtime: Handle) -> Self {
        info!(?delay, "Creating AI actor");
        Self {
            player,
            delay,
            runtime,
            shared: Arc::new(Shared {
                phase: Mutex::new(Phase::Idle),
                moves: Subject::new(),
            }),
        }
    }

    /// Creates an actor on the runtime of the calling context.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MissingRuntime`] outside a tokio runtime.
    pub fn on_current_runtime(player: Arc<Player>, delay: ThinkingDelay) -> Result<Self, MatchError> {
        let runtime = Handle::try_current().map_err(|_| MatchError::MissingRuntime)?;
        Ok(Self::new(player, delay, runtime))
    }

    /// The player this actor moves for.
    pub fn player(&self) -> &Arc<Player> {
        &self.player
    }

    /// The configured thinking delay.
    pub fn delay(&self) -> ThinkingDelay {
        self.delay
    }

    /// `true` while a move is pending.
    pub fn is_thinking(&self) -> bool {
        matches!(*self.shared.phase(), Phase::Thinking { .. })
    }

    /// Registers an observer for the moves this actor makes.
    pub fn register_observer(&self, observer: Arc<dyn Observer<AiMove>>) -> SubscriptionId {
        self.shared.moves.register(observer)
    }

    /// Removes a move observer. Unknown IDs are ignored.
    pub fn remove_observer(&self, id: SubscriptionId) -> bool {
        self.shared.moves.remove(id)
    }

    /// Aborts a pending move, if any.
    #[instrument(skip(self), fields(player_id = %self.player.id()))]
    pub fn cancel(&self) {
        let previous = std::mem::replace(&mut *self.shared.phase(), Phase::Idle);
        if let Phase::Thinking { turn_number, task } = previous {
            task.abort();
            debug!(turn_number, "Pending move cancelled");
        }
    }

    fn is_my_turn(&self, state: &MatchStateRecord) -> bool {
        state.is_playing() && state.next_turn() == Some(self.player.id())
    }

    #[instrument(skip(self), fields(player_id = %self.player.id()))]
    fn schedule(&self, turn_number: u32, input_number: i64) {
        let delay = self.delay.sample();
        let shared = Arc::clone(&self.shared);
        let player_id = self.player.id().clone();

        let mut phase = self.shared.phase();
        if let Phase::Thinking { task, .. } = &*phase {
            task.abort();
        }

        debug!(?delay, "Thinking");
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut phase = shared.phase();
                let still_pending = matches!(
                    &*phase,
                    Phase::Thinking { turn_number: pending, .. } if *pending == turn_number
                );
                if !still_pending {
                    debug!(%player_id, turn_number, "Turn already passed; dropping move");
                    return;
                }
                *phase = Phase::Idle;
            }

            let action = choose_action(input_number);
            info!(%player_id, turn_number, input_number, %action, "AI moves");
            shared
                .moves
                .notify(&AiMove::new(action, turn_number, input_number));
        });

        *phase = Phase::Thinking { turn_number, task };
    }
}

impl Observer<MatchStateRecord> for AiActor {
    fn update(&self, state: &MatchStateRecord) {
        if state.is_stopped() {
            self.cancel();
            return;
        }

        if !self.is_my_turn(state) {
            trace!(status = %state.status(), "Not my turn");
            return;
        }

        // The turn tracker has already advanced; the AI moves in the next turn.
        self.schedule(state.turn_number() + 1, state.output_number());
    }
}

impl Drop for AiActor {
    fn drop(&mut self) {
        if let Phase::Thinking { task, .. } = &*self.shared.phase() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder_table() {
        assert_eq!(choose_action(99), Action::Keep);
        assert_eq!(choose_action(100), Action::Decrement);
        assert_eq!(choose_action(101), Action::Increment);
    }

    #[test]
    fn test_remainder_table_for_negatives() {
        assert_eq!(choose_action(-3), Action::Keep);
        assert_eq!(choose_action(-2), Action::Decrement);
        assert_eq!(choose_action(-1), Action::Increment);
    }

    #[test]
    fn test_chosen_action_always_divides() {
        for n in -50..=500 {
            let action = choose_action(n);
            assert_eq!((n + action.value()).rem_euclid(3), 0, "n = {n}");
        }
    }

    #[test]
    fn test_thinking_delay_bounds() {
        let delay = ThinkingDelay::new(Duration::from_millis(20), Duration::from_millis(10));
        assert_eq!(delay.min(), Duration::from_millis(10));
        assert_eq!(delay.max(), Duration::from_millis(20));
        for _ in 0..100 {
            let sample = delay.sample();
            assert!(sample >= delay.min() && sample <= delay.max());
        }
        assert_eq!(
            ThinkingDelay::fixed(Duration::from_millis(3)).sample(),
            Duration::from_millis(3)
        );
    }
}
