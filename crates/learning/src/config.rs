//! Learner configuration and environment loader.
use std::env;
use std::time::Duration;

use crate::vote::VoteKey;

/// Tunables shared by a [`SubjectStore`](crate::SubjectStore) and the
/// predictors it creates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LearningConfig {
    /// How long a player's predictor survives without being looked up.
    pub idle_timeout: Duration,
    /// Bucketing used by the per-position vote.
    pub vote_key: VoteKey,
}

impl LearningConfig {
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

    pub const fn new() -> Self {
        Self {
            idle_timeout: Self::DEFAULT_IDLE_TIMEOUT,
            vote_key: VoteKey::Event,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_vote_key(mut self, vote_key: VoteKey) -> Self {
        self.vote_key = vote_key;
        self
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `LEARNING_IDLE_TIMEOUT_SECS` - Seconds before an idle predictor is dropped (default: 1800)
    /// - `LEARNING_VOTE_KEY` - `event` or `kind` (default: event)
    ///
    /// Missing values keep their defaults; unparsable ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with variables supplied by `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(secs) = read_var::<u64>(&lookup, IDLE_TIMEOUT_VAR) {
            config.idle_timeout = Duration::from_secs(secs);
        }

        if let Some(key) = read_var::<VoteKey>(&lookup, VOTE_KEY_VAR) {
            config.vote_key = key;
        }

        config
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self::new()
    }
}

const IDLE_TIMEOUT_VAR: &str = "LEARNING_IDLE_TIMEOUT_SECS";
const VOTE_KEY_VAR: &str = "LEARNING_VOTE_KEY";

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring {}: cannot parse {:?}", key, raw);
            None
        }
    }
}
