//! Sequential exhaustive search
//!
//! Programs are tried length by length, each length in enumeration order.
//! [`Solutions`] is the lazy form: it does only as much work as is needed to
//! produce the next solution. [`EnumerativeSearch`] drains it into a reporter.

use crate::error::{Result, SearchError};
use crate::report::{Reporter, SolutionView};
use crate::search::candidate::{search_space, ProgramEnumerator};
use crate::search::config::{Algorithm, SearchConfig, SearchMode};
use crate::search::problem::Problem;
use crate::search::result::{SearchResult, SearchStatistics, SlotCounters, Solution};
use crate::search::SearchAlgorithm;
use crate::semantics::{check_against_oracle, RegisterFile, Verdict};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Candidates between timeout checks.
const TIMEOUT_CHECK_INTERVAL: u64 = 4096;

enum State<'p> {
    Idle,
    Searching {
        length: usize,
        enumerator: ProgramEnumerator<'p>,
    },
    Done,
}

/// Lazy sequence of solutions, in the order the search finds them.
///
/// Restarting means building a new one; a finished sequence stays finished.
pub struct Solutions<'p> {
    problem: &'p Problem,
    config: SearchConfig,
    state: State<'p>,
    file: RegisterFile,
    statistics: SearchStatistics,
    first_hit: Option<usize>,
    start: Instant,
}

impl<'p> Solutions<'p> {
    pub fn new(problem: &'p Problem, config: &SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            problem,
            config: config.clone(),
            state: State::Idle,
            file: RegisterFile::new(problem.layout(), 1),
            statistics: SearchStatistics {
                slot_counters: SlotCounters::new(config.max_length),
                ..SearchStatistics::new(Algorithm::Sequential)
            },
            first_hit: None,
            start: Instant::now(),
        })
    }

    /// Statistics so far, with elapsed time measured now.
    pub fn statistics(&self) -> SearchStatistics {
        let mut statistics = self.statistics.clone();
        statistics.elapsed_time = self.start.elapsed();
        statistics
    }

    pub fn counters(&self) -> &SlotCounters {
        &self.statistics.slot_counters
    }

    fn enter_length(&mut self, length: usize) {
        let problem = self.problem;
        info!(
            length,
            candidates = search_space(problem.layout(), problem.catalogue(), length),
            "searching programs"
        );
        self.statistics.max_length_reached = length;
        self.file.ensure_capacity(length);
        self.state = State::Searching {
            length,
            enumerator: ProgramEnumerator::new(problem.layout(), problem.catalogue(), length),
        };
    }

    fn finish_length(&mut self, length: usize) {
        debug!(length, solutions = self.statistics.solutions_found, "length exhausted");
        let stop = self.first_hit.is_some() && self.config.mode.stops_after_first_length();
        if stop || length >= self.config.max_length {
            self.state = State::Done;
        } else {
            self.enter_length(length + 1);
        }
    }

    fn timed_out(&self) -> bool {
        self.config
            .timeout
            .is_some_and(|limit| self.start.elapsed() >= limit)
    }
}

impl Iterator for Solutions<'_> {
    type Item = Solution;

    fn next(&mut self) -> Option<Solution> {
        loop {
            let length = match &self.state {
                State::Done => return None,
                State::Idle => {
                    self.enter_length(1);
                    continue;
                }
                State::Searching { length, .. } => *length,
            };

            let advanced = match &mut self.state {
                State::Searching { enumerator, .. } => {
                    enumerator.advance(&mut self.statistics.slot_counters)
                }
                _ => false,
            };
            if !advanced {
                self.finish_length(length);
                continue;
            }

            self.statistics.candidates_evaluated += 1;
            if self.statistics.candidates_evaluated % TIMEOUT_CHECK_INTERVAL == 0 && self.timed_out() {
                warn!(length, "search timed out");
                self.statistics.timed_out = true;
                self.state = State::Done;
                return None;
            }

            let problem = self.problem;
            let State::Searching { enumerator, .. } = &self.state else {
                continue;
            };
            let program = enumerator.program();
            match check_against_oracle(&mut self.file, problem.catalogue(), program, problem.oracle()) {
                Verdict::Invalid { .. } => self.statistics.rejected_invalid += 1,
                Verdict::Mismatch { .. } => self.statistics.rejected_mismatch += 1,
                Verdict::Match => {
                    let solution = Solution {
                        program: program.clone(),
                        counters: self.statistics.slot_counters.clone(),
                    };
                    self.statistics.solutions_found += 1;
                    self.first_hit = self.first_hit.or(Some(length));
                    debug!(length, program = %solution.program, "solution found");
                    if self.config.mode == SearchMode::ShortestOnly {
                        self.state = State::Done;
                    }
                    return Some(solution);
                }
            }
        }
    }
}

/// Single-threaded driver over [`Solutions`]
pub struct EnumerativeSearch {
    statistics: SearchStatistics,
}

impl EnumerativeSearch {
    pub fn new() -> Self {
        Self {
            statistics: SearchStatistics::new(Algorithm::Sequential),
        }
    }
}

impl Default for EnumerativeSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchAlgorithm for EnumerativeSearch {
    fn search(
        &mut self,
        problem: &Problem,
        config: &SearchConfig,
        reporter: &mut dyn Reporter,
    ) -> std::result::Result<SearchResult, SearchError> {
        self.reset();
        let mut solutions = Solutions::new(problem, config)?;
        let mut found = Vec::new();
        for solution in solutions.by_ref() {
            let view = SolutionView::new(&solution.program, problem.layout(), problem.catalogue());
            reporter.report(&solution, &view);
            found.push(solution);
        }
        self.statistics = solutions.statistics();
        info!(
            solutions = found.len(),
            candidates = self.statistics.candidates_evaluated,
            elapsed = ?self.statistics.elapsed_time,
            "search finished"
        );
        Ok(SearchResult {
            solutions: found,
            statistics: self.statistics.clone(),
        })
    }

    fn statistics(&self) -> SearchStatistics {
        self.statistics.clone()
    }

    fn reset(&mut self) {
        self.statistics = SearchStatistics::new(Algorithm::Sequential);
    }
}
