//! Engine configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::generators::{DEFAULT_SEED_MAX, DEFAULT_SEED_MIN};
use crate::{ConfigError, ThinkingDelay, UniformSeed};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "GAME_OF_THREE_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "game_of_three.toml";

/// Tunables for seeding matches and pacing the AI.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Smallest starting number.
    #[serde(default = "default_seed_min")]
    seed_min: i64,

    /// Largest starting number.
    #[serde(default = "default_seed_max")]
    seed_max: i64,

    /// Shortest AI thinking time, in milliseconds.
    #[serde(default = "default_thinking_min_ms")]
    thinking_min_ms: u64,

    /// Longest AI thinking time, in milliseconds.
    #[serde(default = "default_thinking_max_ms")]
    thinking_max_ms: u64,

    /// Display name given to AI players.
    #[serde(default = "default_ai_name")]
    ai_name: String,
}

fn default_seed_min() -> i64 {
    DEFAULT_SEED_MIN
}

fn default_seed_max() -> i64 {
    DEFAULT_SEED_MAX
}

fn default_thinking_min_ms() -> u64 {
    1_000
}

fn default_thinking_max_ms() -> u64 {
    5_000
}

fn default_ai_name() -> String {
    "Computer".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed_min: default_seed_min(),
            seed_max: default_seed_max(),
            thinking_min_ms: default_thinking_min_ms(),
            thinking_max_ms: default_thinking_max_ms(),
            ai_name: default_ai_name(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Fails if the values do not pass [`EngineConfig::validate`].
    #[instrument(skip(ai_name))]
    pub fn new(
        seed_min: i64,
        seed_max: i64,
        thinking_min_ms: u64,
        thinking_max_ms: u64,
        ai_name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            seed_min,
            seed_max,
            thinking_min_ms,
            thinking_max_ms,
            ai_name: ai_name.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates TOML.
    ///
    /// Missing keys take their defaults; unknown keys are rejected.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        info!(?config, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file; using defaults");
            Ok(Self::default())
        }
    }

    /// Path from `GAME_OF_THREE_CONFIG`, or `game_of_three.toml`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Checks the ranges are usable.
    ///
    /// # Errors
    ///
    /// Fails if a lower bound exceeds its upper bound, if the seed range
    /// admits numbers below 2, or if the AI name is blank.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed_min > self.seed_max {
            warn!(seed_min = self.seed_min, seed_max = self.seed_max, "Seed range is inverted");
            return Err(ConfigError::new(format!(
                "seed_min ({}) exceeds seed_max ({})",
                self.seed_min, self.seed_max
            )));
        }
        if self.seed_min < 2 {
            warn!(seed_min = self.seed_min, "Seed range too low");
            return Err(ConfigError::new(format!(
                "seed_min must be at least 2, got {}",
                self.seed_min
            )));
        }
        if self.thinking_min_ms > self.thinking_max_ms {
            warn!(
                thinking_min_ms = self.thinking_min_ms,
                thinking_max_ms = self.thinking_max_ms,
                "Thinking range is inverted"
            );
            return Err(ConfigError::new(format!(
                "thinking_min_ms ({}) exceeds thinking_max_ms ({})",
                self.thinking_min_ms, self.thinking_max_ms
            )));
        }
        if self.ai_name.trim().is_empty() {
            return Err(ConfigError::new("ai_name must not be empty"));
        }
        Ok(())
    }

    /// The AI thinking range as durations.
    pub fn thinking_delay(&self) -> ThinkingDelay {
        ThinkingDelay::new(
            Duration::from_millis(self.thinking_min_ms),
            Duration::from_millis(self.thinking_max_ms),
        )
    }

    /// A seed generator over the configured range.
    pub fn seed_generator(&self) -> UniformSeed {
        UniformSeed::new(self.seed_min, self.seed_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(*config.seed_min(), 3);
        assert_eq!(*config.seed_max(), 100);
        assert_eq!(config.thinking_delay(), ThinkingDelay::default());
        assert_eq!(config.ai_name(), "Computer");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = EngineConfig::from_toml_str("seed_max = 10\n").expect("valid config");
        assert_eq!(*config.seed_min(), 3);
        assert_eq!(*config.seed_max(), 10);
        assert_eq!(*config.thinking_max_ms(), 5_000);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(EngineConfig::from_toml_str("seeds = 4\n").is_err());
    }
}
