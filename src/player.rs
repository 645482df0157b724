//! Players: identity, display name and kind.

use std::sync::RwLock;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::PlayerError;

/// Unique identifier for a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a player ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Type of player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum PlayerKind {
    /// A person connected through a transport.
    Human,
    /// The built-in autonomous opponent.
    Ai,
}

/// A participant in a match.
///
/// Equality and hashing use the player's ID only. Two `Player` values with
/// the same ID are the same player regardless of their names.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: RwLock<String>,
    kind: PlayerKind,
}

impl Player {
    /// Creates a player.
    #[instrument(skip(id, name), fields(player_id = %id, name = %name))]
    pub fn new(id: PlayerId, name: String, kind: PlayerKind) -> Self {
        debug!(?kind, "Creating player");
        Self {
            id,
            name: RwLock::new(name),
            kind,
        }
    }

    /// Creates a human player.
    pub fn human(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self::new(id.into(), name.into(), PlayerKind::Human)
    }

    /// Creates an AI player.
    pub fn ai(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self::new(id.into(), name.into(), PlayerKind::Ai)
    }

    /// Returns the player's ID.
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Returns a copy of the player's current display name.
    pub fn name(&self) -> String {
        self.name
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns the type of player.
    pub fn kind(&self) -> PlayerKind {
        self.kind
    }

    /// Returns `true` for AI players.
    pub fn is_ai(&self) -> bool {
        self.kind == PlayerKind::Ai
    }

    /// Changes the display name of a human player.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::NameLocked`] for AI players.
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub fn set_name(&self, name: impl Into<String> + std::fmt::Debug) -> Result<(), PlayerError> {
        if self.is_ai() {
            warn!("Attempted to rename an AI player");
            return Err(PlayerError::NameLocked(self.id.clone()));
        }

        let name = name.into();
        debug!(%name, "Renaming player");
        *self
            .name
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = name;
        Ok(())
    }

    /// Returns the wire form of this player.
    pub fn record(&self) -> PlayerRecord {
        PlayerRecord {
            id: self.id.clone(),
            name: self.name(),
            kind: self.kind,
        }
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}

impl std::hash::Hash for Player {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Serialized form of a player: `{id, name, type}`.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player's unique ID.
    id: PlayerId,
    /// Player's display name.
    name: String,
    /// Type of player.
    #[serde(rename = "type")]
    kind: PlayerKind,
}
