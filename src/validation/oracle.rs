//! Target functions, edge-case inputs, and the precomputed oracle

use crate::error::{ConfigError, Result};
use crate::ir::{RegisterLayout, Word, MAXNEG, MAXPOS};
use std::fmt;
use std::sync::Arc;

/// Default trial values for x: zero, ±1, the sign extremes and their
/// neighbours, alternating-ish bit patterns and small integers.
pub const DEFAULT_TRIAL_X: [Word; 17] = [
    1,
    0,
    -1,
    MAXNEG,
    MAXPOS,
    MAXNEG + 1,
    MAXPOS - 1,
    0x0123_4567,
    0x89AB_CDEFu32 as Word,
    -2,
    2,
    -3,
    3,
    -64,
    64,
    -5,
    -31415,
];

/// Default trial values for y. Covers shift-count boundaries around 32 and 64.
pub const DEFAULT_TRIAL_Y: [Word; 16] = [
    0, 1, 2, 3, 5, 16, 30, 31, 32, 33, 63, 64, -1, -2, MAXNEG, MAXPOS,
];

type TargetFn = dyn Fn(&[Word]) -> Option<Word> + Send + Sync;

/// The function being superoptimized
#[derive(Clone)]
pub struct Target {
    name: String,
    arity: usize,
    func: Arc<TargetFn>,
}

impl Target {
    pub fn unary(name: impl Into<String>, f: impl Fn(Word) -> Word + Send + Sync + 'static) -> Self {
        Self::partial(name, 1, move |args| Some(f(args[0])))
    }

    pub fn binary(
        name: impl Into<String>,
        f: impl Fn(Word, Word) -> Word + Send + Sync + 'static,
    ) -> Self {
        Self::partial(name, 2, move |args| Some(f(args[0], args[1])))
    }

    /// A target that may be undefined on some inputs. Listing such an input in
    /// the trial set is a configuration error.
    pub fn partial(
        name: impl Into<String>,
        arity: usize,
        f: impl Fn(&[Word]) -> Option<Word> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, args: &[Word]) -> Option<Word> {
        (self.func)(args)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Edge-case values for each argument position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialInputs {
    pub x: Vec<Word>,
    pub y: Vec<Word>,
}

impl Default for TrialInputs {
    fn default() -> Self {
        Self {
            x: DEFAULT_TRIAL_X.to_vec(),
            y: DEFAULT_TRIAL_Y.to_vec(),
        }
    }
}

impl TrialInputs {
    pub fn with_x(mut self, x: Vec<Word>) -> Self {
        self.x = x;
        self
    }

    pub fn with_y(mut self, y: Vec<Word>) -> Self {
        self.y = y;
        self
    }

    /// Input tuples for a target of `num_args` arguments: the x list, or the
    /// x-major cross product of x and y.
    pub fn tuples(&self, num_args: usize) -> Vec<[Word; 2]> {
        if num_args == 1 {
            self.x.iter().map(|&x| [x, 0]).collect()
        } else {
            self.x
                .iter()
                .flat_map(|&x| self.y.iter().map(move |&y| [x, y]))
                .collect()
        }
    }
}

/// One input tuple and the target's value on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleCase {
    args: [Word; 2],
    num_args: usize,
    pub expected: Word,
}

impl OracleCase {
    pub fn args(&self) -> &[Word] {
        &self.args[..self.num_args]
    }
}

/// Expected outputs for every edge-case input, computed once before search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oracle {
    cases: Vec<OracleCase>,
    num_args: usize,
}

impl Oracle {
    pub fn build(target: &Target, trials: &TrialInputs, layout: &RegisterLayout) -> Result<Self> {
        let num_args = layout.num_args();
        if target.arity() != num_args {
            return Err(ConfigError::TargetArity {
                target: target.name().to_string(),
                expected: target.arity(),
                found: num_args,
            });
        }
        if trials.x.is_empty() {
            return Err(ConfigError::EmptyTrials('x'));
        }
        if num_args == 2 && trials.y.is_empty() {
            return Err(ConfigError::EmptyTrials('y'));
        }

        let cases = trials
            .tuples(num_args)
            .into_iter()
            .map(|args| {
                let expected = target.call(&args[..num_args]).ok_or_else(|| {
                    ConfigError::OracleUndefined {
                        target: target.name().to_string(),
                        args: args[..num_args].to_vec(),
                    }
                })?;
                Ok(OracleCase {
                    args,
                    num_args,
                    expected,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { cases, num_args })
    }

    pub fn cases(&self) -> &[OracleCase] {
        &self.cases
    }

    pub fn num_args(&self) -> usize {
        self.num_args
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
