//! Debug tap: logs every committed match state.

use tracing::{debug, warn};

use crate::{MatchId, MatchStateRecord, Observer};

/// Match observer that writes each state to the `debug` log as JSON.
#[derive(Debug, Clone)]
pub struct TracingTap {
    label: MatchId,
}

impl TracingTap {
    /// Creates a tap whose log lines carry `label`, usually the match ID.
    pub fn labeled(label: impl Into<MatchId>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Observer<MatchStateRecord> for TracingTap {
    fn update(&self, state: &MatchStateRecord) {
        let label = self.label.as_str();
        match serde_json::to_string(state) {
            Ok(json) => debug!(target: "game_of_three::tap", label, state = %json, "State committed"),
            Err(e) => warn!(target: "game_of_three::tap", label, error = %e, "Unserializable state"),
        }
    }
}
