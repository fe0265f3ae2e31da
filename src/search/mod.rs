//! Exhaustive search for the shortest matching program
//!
//! - Candidate: odometer enumeration of slot assignments with operand floors
//!   and commutative canonicalization
//! - Enumerative: single-threaded search, also available as a lazy iterator
//! - Parallel: the same search split on slot 0 across worker threads

pub mod candidate;
pub mod config;
pub mod enumerative;
pub mod parallel;
pub mod problem;
pub mod result;

pub use config::{Algorithm, SearchConfig, SearchMode, DEFAULT_MAX_LENGTH};
pub use enumerative::{EnumerativeSearch, Solutions};
pub use parallel::{ParallelConfig, ParallelSearch};
pub use problem::Problem;
pub use result::{SearchResult, SearchStatistics, SlotCounters, Solution};

use crate::error::{Result, SearchError};
use crate::report::Reporter;

/// Trait for drivers that search a problem for matching programs
pub trait SearchAlgorithm {
    /// Run the search, handing each solution to `reporter` as it is accepted.
    ///
    /// # Returns
    /// Every solution reported, in order, plus statistics. An empty solution
    /// list means nothing matched within `config.max_length`.
    fn search(
        &mut self,
        problem: &Problem,
        config: &SearchConfig,
        reporter: &mut dyn Reporter,
    ) -> std::result::Result<SearchResult, SearchError>;

    /// Get statistics from the most recent search
    fn statistics(&self) -> SearchStatistics;

    /// Reset the search state for a new search
    fn reset(&mut self);
}

/// Pick the driver for `algorithm`.
pub fn create_search(algorithm: Algorithm, parallel: ParallelConfig) -> Box<dyn SearchAlgorithm> {
    match algorithm {
        Algorithm::Sequential => Box::new(EnumerativeSearch::new()),
        Algorithm::Parallel => Box::new(ParallelSearch::new(parallel)),
    }
}

/// Lazily search `problem` on the calling thread.
pub fn solutions<'p>(problem: &'p Problem, config: &SearchConfig) -> Result<Solutions<'p>> {
    Solutions::new(problem, config)
}
