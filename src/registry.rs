//! Directory of connected players.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, instrument, warn};

use crate::{Player, PlayerId, PlayerRecord};

/// All live players, keyed by ID.
///
/// Cloning yields another handle to the same directory.
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    players: Arc<Mutex<HashMap<PlayerId, Arc<Player>>>>,
}

impl PlayerDirectory {
    /// Creates an empty directory.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating player directory");
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PlayerId, Arc<Player>>> {
        self.players
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a player.
    ///
    /// If a player with the same ID is already present it is kept and
    /// `false` is returned.
    #[instrument(skip(self, player), fields(player_id = %player.id()))]
    pub fn insert(&self, player: Arc<Player>) -> bool {
        let mut players = self.lock();
        if players.contains_key(player.id()) {
            warn!("Player already registered");
            return false;
        }
        players.insert(player.id().clone(), player);
        debug!(count = players.len(), "Player registered");
        true
    }

    /// Looks up a player.
    pub fn get(&self, player_id: &PlayerId) -> Option<Arc<Player>> {
        let player = self.lock().get(player_id).cloned();
        if player.is_none() {
            debug!(%player_id, "Player not found");
        }
        player
    }

    /// Removes a player and returns it.
    #[instrument(skip(self))]
    pub fn remove(&self, player_id: &PlayerId) -> Option<Arc<Player>> {
        let removed = self.lock().remove(player_id);
        debug!(removed = removed.is_some(), "Player removal requested");
        removed
    }

    /// Returns `true` if the player is registered.
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.lock().contains_key(player_id)
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no player is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Wire form of every player, sorted by name then ID.
    #[instrument(skip(self))]
    pub fn serialize_all(&self) -> Vec<PlayerRecord> {
        let mut records: Vec<PlayerRecord> = self.lock().values().map(|p| p.record()).collect();
        records.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        debug!(count = records.len(), "Serialized players");
        records
    }

    /// Removes every player.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        self.lock().clear();
        info!("Player directory cleared");
    }
}
