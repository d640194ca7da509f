//! Runtime configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default upper bound on rationale re-request rounds
pub const DEFAULT_MAX_RATIONALE_ROUNDS: u32 = 3;

/// Timeouts for the HTTP client profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// TCP connect timeout, both profiles
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Overall request timeout for plain API calls
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Read timeout for file transfers, which may stream for a while
    #[serde(with = "humantime_serde")]
    pub file_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            file_timeout: Duration::from_secs(60),
        }
    }
}

/// Tunables for the permission coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Upper bound on rationale re-request rounds before a refused flow
    /// stops re-prompting and terminates as denied
    pub max_rationale_rounds: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_rationale_rounds: DEFAULT_MAX_RATIONALE_ROUNDS,
        }
    }
}
