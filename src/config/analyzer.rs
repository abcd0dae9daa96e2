//! Path analyzer configuration.

use std::collections::BTreeSet;
use std::env;

/// Threshold used when none is configured
pub const DEFAULT_THRESHOLD: usize = 100;

/// Configuration for the endpoint and open-call analyzers
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Distinct literals allowed per endpoint path position
    pub endpoint_threshold: usize,
    /// Distinct literals allowed per open-call path position
    pub open_threshold: usize,
    /// Open-call paths that are never generalized
    pub excluded_opens: BTreeSet<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            endpoint_threshold: DEFAULT_THRESHOLD,
            open_threshold: DEFAULT_THRESHOLD,
            excluded_opens: BTreeSet::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let excluded_opens = env::var("GENERALIZER_EXCLUDED_OPENS")
            .map(|v| parse_path_list(&v))
            .unwrap_or_default();

        Self {
            endpoint_threshold: threshold_from_env("GENERALIZER_ENDPOINT_THRESHOLD"),
            open_threshold: threshold_from_env("GENERALIZER_OPEN_THRESHOLD"),
            excluded_opens,
        }
    }
}

/// Thresholds must be positive; zero or garbage falls back to the default
fn threshold_from_env(name: &str) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_THRESHOLD)
}

/// Parse a comma-separated list of paths, ignoring blanks
pub fn parse_path_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
