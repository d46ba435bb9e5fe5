//! Settings for the interactive loop

use std::env;
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "user> ";

/// Overrides the history file location when set
pub const HISTORY_ENV: &str = "TRAMP_HISTORY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    pub prompt: String,
    /// `None` disables persistent history
    pub history_path: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            prompt: DEFAULT_PROMPT.to_string(),
            history_path: default_history_path(),
        }
    }
}

impl ReplConfig {
    /// Defaults, with the history path taken from `TRAMP_HISTORY` if set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = env::var_os(HISTORY_ENV) {
            config.history_path = Some(PathBuf::from(path));
        }
        config
    }
}

/// `<data dir>/tramp/history.txt`, when the platform has a data directory
fn default_history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("tramp").join("history.txt"))
}
