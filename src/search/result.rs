//! Search result types, solutions and instrumentation

use crate::ir::Program;
use crate::search::config::Algorithm;
use std::time::Duration;

/// Per-slot evaluation counters.
///
/// `counts[i]` is the number of assignments tried for slot `i`, summed over
/// every program length searched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotCounters {
    counts: Vec<u64>,
}

impl SlotCounters {
    pub fn new(max_length: usize) -> Self {
        Self {
            counts: vec![0; max_length],
        }
    }

    #[inline]
    pub fn record(&mut self, slot: usize) {
        if slot >= self.counts.len() {
            self.counts.resize(slot + 1, 0);
        }
        self.counts[slot] += 1;
    }

    pub fn get(&self, slot: usize) -> u64 {
        self.counts.get(slot).copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Add another set of counters into this one.
    pub fn merge(&mut self, other: &SlotCounters) {
        if other.counts.len() > self.counts.len() {
            self.counts.resize(other.counts.len(), 0);
        }
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *mine += theirs;
        }
    }
}

/// A program that matched the oracle on every edge-case input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub program: Program,
    /// Counters as they stood when the solution was found.
    pub counters: SlotCounters,
}

impl Solution {
    pub fn length(&self) -> usize {
        self.program.len()
    }
}

/// Statistics from a search operation
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Driver used for the search
    pub algorithm: Algorithm,
    /// Total time spent searching
    pub elapsed_time: Duration,
    /// Complete candidate programs checked against the oracle
    pub candidates_evaluated: u64,
    /// Candidates rejected because an operation was undefined
    pub rejected_invalid: u64,
    /// Candidates rejected because a value was wrong
    pub rejected_mismatch: u64,
    /// Solutions reported
    pub solutions_found: u64,
    /// Longest program length the search started on
    pub max_length_reached: usize,
    /// Per-slot assignment counters
    pub slot_counters: SlotCounters,
    /// The search was cut short by the timeout
    pub timed_out: bool,
}

impl SearchStatistics {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    /// Get candidates evaluated per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.candidates_evaluated as f64 / secs
        }
    }

    /// Fold a worker's statistics into the totals. Elapsed time is left to
    /// the caller.
    pub fn merge(&mut self, other: &SearchStatistics) {
        self.candidates_evaluated += other.candidates_evaluated;
        self.rejected_invalid += other.rejected_invalid;
        self.rejected_mismatch += other.rejected_mismatch;
        self.solutions_found += other.solutions_found;
        self.max_length_reached = self.max_length_reached.max(other.max_length_reached);
        self.slot_counters.merge(&other.slot_counters);
        self.timed_out |= other.timed_out;
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Algorithm: {}\n", self.algorithm));
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!(
            "Candidates evaluated: {}\n",
            self.candidates_evaluated
        ));
        s.push_str(&format!(
            "Throughput: {:.0} candidates/sec\n",
            self.throughput()
        ));
        s.push_str(&format!(
            "Rejected (undefined operation): {}\n",
            self.rejected_invalid
        ));
        s.push_str(&format!("Rejected (wrong value): {}\n", self.rejected_mismatch));
        s.push_str(&format!("Solutions found: {}\n", self.solutions_found));
        s.push_str(&format!("Longest length searched: {}\n", self.max_length_reached));
        for (slot, count) in self.slot_counters.as_slice().iter().enumerate() {
            s.push_str(&format!("  slot {}: {} assignments\n", slot, count));
        }
        if self.timed_out {
            s.push_str("Stopped early: timeout\n");
        }
        s
    }
}

/// Result of a complete search
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Solutions in discovery order (length-major, then enumeration order)
    pub solutions: Vec<Solution>,
    /// Statistics from the search
    pub statistics: SearchStatistics,
}

impl SearchResult {
    pub fn found_solution(&self) -> bool {
        !self.solutions.is_empty()
    }

    /// Length of the shortest solution, if any.
    pub fn shortest_length(&self) -> Option<usize> {
        self.solutions.iter().map(Solution::length).min()
    }
}
