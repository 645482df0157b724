//! Waiting room for players without a match.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, instrument, warn};

use crate::PlayerId;

/// First-in, first-out queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Queue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Adds an item at the back.
    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Removes and returns the front item.
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Returns the front item without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: PartialEq> Queue<T> {
    /// Removes the first item equal to `item`. Returns `true` if one was found.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.items.iter().position(|queued| queued == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if an equal item is queued.
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Players waiting for an opponent, in arrival order.
///
/// Cloning yields another handle to the same lobby.
#[derive(Debug, Clone, Default)]
pub struct Lobby {
    waiting: Arc<Mutex<Queue<PlayerId>>>,
}

impl Lobby {
    /// Creates an empty lobby.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating lobby");
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Queue<PlayerId>> {
        self.waiting
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a player to the back of the queue.
    ///
    /// A player already waiting is left where they are; returns `false` in
    /// that case.
    #[instrument(skip(self))]
    pub fn add(&self, player_id: PlayerId) -> bool {
        let mut waiting = self.lock();
        if waiting.contains(&player_id) {
            warn!(%player_id, "Player is already in the lobby");
            return false;
        }
        waiting.enqueue(player_id);
        debug!(waiting = waiting.len(), "Player joined the lobby");
        true
    }

    /// Removes a waiting player. Returns `true` if they were waiting.
    #[instrument(skip(self))]
    pub fn remove(&self, player_id: &PlayerId) -> bool {
        let removed = self.lock().remove(player_id);
        debug!(removed, "Lobby removal requested");
        removed
    }

    /// Returns `true` if the player is waiting.
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.lock().contains(player_id)
    }

    /// Takes the longest-waiting player out of the lobby.
    #[instrument(skip(self))]
    pub fn next(&self) -> Option<PlayerId> {
        let next = self.lock().dequeue();
        debug!(player_id = ?next, "Dequeued from lobby");
        next
    }

    /// The longest-waiting player, without removing them.
    pub fn peek(&self) -> Option<PlayerId> {
        self.lock().peek().cloned()
    }

    /// Snapshot of the waiting players, front first.
    pub fn waiting(&self) -> Vec<PlayerId> {
        self.lock().iter().cloned().collect()
    }

    /// Number of waiting players.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Empties the lobby.
    #[instrument(skip(self))]
    pub fn reset(&self) {
        self.lock().clear();
        info!("Lobby reset");
    }
}
