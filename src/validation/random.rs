//! Random spot checks of reported solutions
//!
//! The oracle only covers the edge-case inputs. Re-running a solution on
//! random inputs is a cheap way to catch solutions that merely happen to
//! agree on the edge cases. Passing is not a proof.

use crate::ir::{Program, RegisterLayout, Word};
use crate::isa::Catalogue;
use crate::semantics::{run_program, RegisterFile};
use crate::validation::oracle::Target;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration for random spot checks
#[derive(Debug, Clone)]
pub struct RandomInputConfig {
    /// Number of random inputs to try
    pub count: usize,
    /// Seed for reproducibility (None = random seed)
    pub seed: Option<u64>,
}

impl Default for RandomInputConfig {
    fn default() -> Self {
        RandomInputConfig {
            count: 10_000,
            seed: None,
        }
    }
}

impl RandomInputConfig {
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_seed_option(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// An input on which a solution and the target disagree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    pub args: Vec<Word>,
    /// Target value, or None where the target is undefined.
    pub expected: Option<Word>,
    pub actual: Word,
    pub invalid: bool,
}

/// Result of a spot check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotCheck {
    /// Inputs tried before stopping.
    pub tested: usize,
    pub counterexample: Option<Counterexample>,
}

impl SpotCheck {
    pub fn passed(&self) -> bool {
        self.counterexample.is_none()
    }
}

/// Random word biased towards small magnitudes and bit-pattern extremes, where
/// bit tricks tend to break.
fn random_word<R: Rng>(rng: &mut R) -> Word {
    match rng.random_range(0..4) {
        0 => rng.random_range(-256..=256),
        1 => {
            let bit = rng.random_range(0..32);
            let v = 1u32 << bit;
            let v = if rng.random_bool(0.5) { v } else { v.wrapping_sub(1) };
            (if rng.random_bool(0.5) { !v } else { v }) as Word
        }
        _ => rng.random::<u32>() as Word,
    }
}

/// Generate `count` random argument tuples.
pub fn generate_random_inputs(config: &RandomInputConfig, num_args: usize) -> Vec<Vec<Word>> {
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..config.count)
        .map(|_| (0..num_args).map(|_| random_word(&mut rng)).collect())
        .collect()
}

/// Run `program` and `target` side by side on random inputs.
pub fn spot_check(
    layout: &RegisterLayout,
    catalogue: &Catalogue,
    target: &Target,
    program: &Program,
    config: &RandomInputConfig,
) -> SpotCheck {
    let mut file = RegisterFile::new(layout, program.len());
    let inputs = generate_random_inputs(config, layout.num_args());

    for (tested, args) in inputs.into_iter().enumerate() {
        let expected = target.call(&args);
        let outcome = run_program(&mut file, catalogue, program, &args);
        // Inputs outside the target's domain say nothing about the program
        let Some(want) = expected else { continue };
        if outcome.invalid || outcome.value != want {
            return SpotCheck {
                tested: tested + 1,
                counterexample: Some(Counterexample {
                    args,
                    expected,
                    actual: outcome.value,
                    invalid: outcome.invalid,
                }),
            };
        }
    }

    SpotCheck {
        tested: config.count,
        counterexample: None,
    }
}
