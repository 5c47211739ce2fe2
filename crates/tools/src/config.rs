use std::env;

use foundation::time::parse_period;
use scene::{DEFAULT_STEP, HistoryConfig};

pub const HISTORY_LIMIT_VAR: &str = "ATLAS_HISTORY_LIMIT";
pub const STEP_VAR: &str = "ATLAS_STEP";

/// Editor settings read from the environment; command-line flags override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub history_limit: Option<usize>,
    pub step: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            step: DEFAULT_STEP.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let history_limit = match lookup(HISTORY_LIMIT_VAR) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<usize>()
                    .map_err(|e| format!("{HISTORY_LIMIT_VAR}={raw:?}: {e}"))?,
            ),
            None => None,
        };
        let step = lookup(STEP_VAR).unwrap_or_else(|| DEFAULT_STEP.to_string());
        parse_period(&step).map_err(|e| format!("{STEP_VAR}={step:?}: {e}"))?;

        Ok(Self {
            history_limit,
            step,
        })
    }

    pub fn with_overrides(mut self, history_limit: Option<usize>, step: Option<String>) -> Self {
        if history_limit.is_some() {
            self.history_limit = history_limit;
        }
        if let Some(step) = step {
            self.step = step;
        }
        self
    }

    pub fn history(&self) -> HistoryConfig {
        HistoryConfig {
            limit: self.history_limit,
        }
    }
}
