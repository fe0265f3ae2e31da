//! Parallel exhaustive search.
//!
//! Each program length is split on the assignment of slot 0: every slot-0
//! assignment is a job covering one subtree. Jobs go out over a shared queue
//! and any idle worker takes the next one.
//!
//! # Architecture
//!
//! - A **coordinator** dispatches the jobs of one length, waits for all their
//!   reports, and reassembles the results in job order
//! - **Workers** enumerate a job's subtree with their own register file and
//!   counters
//! - **Shared state** carries the lowest job index known to hold a solution
//!   and a stop flag, so workers can drop work that cannot matter
//!
//! Solutions are reported in the same order, with the same counter snapshots,
//! as the sequential search would produce them.
//!
//! # Example
//!
//! ```ignore
//! use aha::search::parallel::{ParallelConfig, ParallelSearch};
//!
//! let mut search = ParallelSearch::new(ParallelConfig::default().with_workers(4));
//! let result = search.search(&problem, &SearchConfig::default(), &mut reporter)?;
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;

pub use config::ParallelConfig;
pub use coordinator::ParallelSearch;
