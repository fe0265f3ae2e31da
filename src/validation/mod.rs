//! Target functions, the edge-case oracle, and post-search spot checks

pub mod oracle;
pub mod random;
pub mod targets;

pub use oracle::{Oracle, OracleCase, Target, TrialInputs, DEFAULT_TRIAL_X, DEFAULT_TRIAL_Y};
pub use random::{spot_check, Counterexample, RandomInputConfig, SpotCheck};
pub use targets::{builtin_target, BuiltinTarget, BUILTIN_TARGETS};
