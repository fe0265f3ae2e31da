//! Bit-exact evaluation of candidate programs

pub mod concrete;
pub mod state;

// Re-export main functionality
pub use concrete::{check_against_oracle, evaluate, run_program, Outcome, Verdict};
pub use state::RegisterFile;
