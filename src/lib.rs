//! Brute-force superoptimizer
//!
//! Given a target function of one or two 32-bit words, find the shortest
//! programs over a small instruction set that agree with it on a battery of
//! edge-case inputs.
//!
//! ```ignore
//! use aha::report::PrintReporter;
//! use aha::search::{EnumerativeSearch, Problem, SearchAlgorithm, SearchConfig};
//! use aha::validation::builtin_target;
//!
//! let problem = Problem::with_defaults(builtin_target("clear-lowest-bit")?)?;
//! let mut reporter = PrintReporter::new(Default::default());
//! let result = EnumerativeSearch::new().search(&problem, &SearchConfig::default(), &mut reporter)?;
//! ```
//!
//! Agreement on the edge cases is evidence, not proof; callers that need
//! certainty must verify solutions independently.

pub mod error;
pub mod ir;
pub mod isa;
pub mod report;
pub mod search;
pub mod semantics;
pub mod validation;
