//! Configuration types for the search

use crate::error::{ConfigError, Result};
use std::time::Duration;

/// Default bound on program length.
pub const DEFAULT_MAX_LENGTH: usize = 5;

/// Search driver selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Single-threaded enumeration in lexicographic order
    #[default]
    Sequential,
    /// Slot-0 subtrees spread across worker threads
    Parallel,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Sequential => write!(f, "sequential"),
            Algorithm::Parallel => write!(f, "parallel"),
        }
    }
}

/// When the search stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Stop at the first solution (the first in enumeration order at the
    /// shortest length).
    ShortestOnly,
    /// Report every solution of the shortest length that has any, then stop.
    #[default]
    AllShortest,
    /// Report every solution of every length up to the bound.
    EnumerateAll,
}

impl SearchMode {
    /// True if the search ends once a length has produced a solution.
    pub fn stops_after_first_length(&self) -> bool {
        !matches!(self, SearchMode::EnumerateAll)
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::ShortestOnly => write!(f, "shortest-only"),
            SearchMode::AllShortest => write!(f, "all-shortest"),
            SearchMode::EnumerateAll => write!(f, "enumerate-all"),
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "shortest-only" | "first" | "shortest" => Ok(SearchMode::ShortestOnly),
            "all-shortest" => Ok(SearchMode::AllShortest),
            "enumerate-all" | "all" | "exhaustive" => Ok(SearchMode::EnumerateAll),
            _ => Err(format!(
                "Unknown search mode: '{}'. Valid options: shortest-only, all-shortest, enumerate-all",
                s
            )),
        }
    }
}

/// Main search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Longest program to try
    pub max_length: usize,
    /// Stopping rule
    pub mode: SearchMode,
    /// Overall timeout for the search
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            mode: SearchMode::default(),
            timeout: None,
        }
    }
}

impl SearchConfig {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(ConfigError::ZeroMaxLength);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!(
            "shortest-only".parse::<SearchMode>().unwrap(),
            SearchMode::ShortestOnly
        );
        assert_eq!(
            "all_shortest".parse::<SearchMode>().unwrap(),
            SearchMode::AllShortest
        );
        assert_eq!("all".parse::<SearchMode>().unwrap(), SearchMode::EnumerateAll);
        assert!("random".parse::<SearchMode>().is_err());
    }

    #[test]
    fn test_mode_display_round_trips() {
        for mode in [
            SearchMode::ShortestOnly,
            SearchMode::AllShortest,
            SearchMode::EnumerateAll,
        ] {
            assert_eq!(mode.to_string().parse::<SearchMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_search_config_builder() {
        let config = SearchConfig::default()
            .with_max_length(3)
            .with_mode(SearchMode::EnumerateAll)
            .with_timeout(Duration::from_secs(10));

        assert_eq!(config.max_length, 3);
        assert_eq!(config.mode, SearchMode::EnumerateAll);
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_zero_length_rejected() {
        let config = SearchConfig::default().with_max_length(0);
        assert_eq!(config.validate().unwrap_err(), ConfigError::ZeroMaxLength);
    }
}
