//! Error types for configuration and rendering
//!
//! Domain-invalid operations (divide by zero and friends) are not errors:
//! they are reported through [`crate::semantics::Outcome::invalid`] and never
//! leave the evaluator. Everything here is surfaced to the caller before the
//! search starts, or by the renderers afterwards.

use crate::ir::Word;
use thiserror::Error;

/// Fatal configuration problems detected while assembling a search problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("the first three immediates must be 0, -1, 1 (got {found:?})")]
    ImmediatePrefix { found: Vec<Word> },

    #[error("argument count must be 1 or 2 (got {0})")]
    ArgumentCount(usize),

    #[error("maximum program length must be at least 1")]
    ZeroMaxLength,

    #[error("instruction catalogue is empty")]
    EmptyCatalogue,

    #[error("catalogue entry {index} ({name}): {floors} operand floors supplied for arity {arity}")]
    FloorCountMismatch {
        index: usize,
        name: &'static str,
        arity: usize,
        floors: usize,
    },

    #[error("catalogue entry {index} ({name}): operand {operand} floor r{floor} is outside the constant and argument banks (r0..r{registers})")]
    FloorOutOfBounds {
        index: usize,
        name: &'static str,
        operand: usize,
        floor: usize,
        registers: usize,
    },

    #[error("catalogue entry {index} ({name}): marked commutative but takes {arity} operand(s)")]
    CommutativeUnary {
        index: usize,
        name: &'static str,
        arity: usize,
    },

    #[error("target '{target}' takes {expected} argument(s) but the register file has {found}")]
    TargetArity {
        target: String,
        expected: usize,
        found: usize,
    },

    #[error("target '{target}' has no value for input {args:?}")]
    OracleUndefined { target: String, args: Vec<Word> },

    #[error("trial input set for argument {0} is empty")]
    EmptyTrials(char),

    #[error("unknown target '{0}'")]
    UnknownTarget(String),
}

/// Problems turning a solution into text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("program needs {needed} result registers but only {available} are available")]
    OutOfRegisters { needed: usize, available: usize },

    #[error("asm output supports single-argument programs only")]
    TooManyArguments,

    #[error("'{0}' has no x86 equivalent")]
    Unsupported(&'static str),

    #[error("'{0}' by 32 or more yields 0 under shift mask 63, but x86 reduces the count mod 32")]
    ShiftCount(&'static str),
}

/// Failures of a running search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("worker {worker_id} panicked during job {job}; the search is incomplete")]
    WorkerPanicked { worker_id: usize, job: usize },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_out_of_bounds_display() {
        let err = ConfigError::FloorOutOfBounds {
            index: 3,
            name: "sub",
            operand: 1,
            floor: 40,
            registers: 18,
        };
        assert_eq!(
            err.to_string(),
            "catalogue entry 3 (sub): operand 1 floor r40 is outside the constant and argument banks (r0..r18)"
        );
    }

    #[test]
    fn test_immediate_prefix_display() {
        let err = ConfigError::ImmediatePrefix {
            found: vec![1, 0, -1],
        };
        assert!(err.to_string().contains("[1, 0, -1]"));
    }

    #[test]
    fn test_oracle_undefined_names_input() {
        let err = ConfigError::OracleUndefined {
            target: "recip".to_string(),
            args: vec![0],
        };
        assert_eq!(err.to_string(), "target 'recip' has no value for input [0]");
    }

    #[test]
    fn test_render_error_display() {
        let err = RenderError::OutOfRegisters {
            needed: 6,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "program needs 6 result registers but only 4 are available"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConfigError>();
        assert_send_sync::<RenderError>();
    }
}
