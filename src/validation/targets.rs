//! Built-in target functions, selectable by name from the command line

use crate::error::{ConfigError, Result};
use crate::ir::Word;
use crate::validation::oracle::Target;

#[derive(Debug, Clone, Copy)]
enum BuiltinFn {
    Unary(fn(Word) -> Word),
    Binary(fn(Word, Word) -> Word),
}

/// A named target with a one-line description
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTarget {
    pub name: &'static str,
    pub arity: usize,
    pub description: &'static str,
    func: BuiltinFn,
}

impl BuiltinTarget {
    const fn unary(name: &'static str, description: &'static str, f: fn(Word) -> Word) -> Self {
        Self {
            name,
            arity: 1,
            description,
            func: BuiltinFn::Unary(f),
        }
    }

    const fn binary(
        name: &'static str,
        description: &'static str,
        f: fn(Word, Word) -> Word,
    ) -> Self {
        Self {
            name,
            arity: 2,
            description,
            func: BuiltinFn::Binary(f),
        }
    }

    pub fn target(&self) -> Target {
        match self.func {
            BuiltinFn::Unary(f) => Target::unary(self.name, f),
            BuiltinFn::Binary(f) => Target::binary(self.name, f),
        }
    }
}

fn sign(x: Word) -> Word {
    (x >> 31) | ((x.wrapping_neg() as u32) >> 31) as Word
}

fn nabs(x: Word) -> Word {
    if x > 0 {
        x.wrapping_neg()
    } else {
        x
    }
}

pub const BUILTIN_TARGETS: [BuiltinTarget; 15] = [
    BuiltinTarget::unary("not", "bitwise complement ~x", |x| !x),
    BuiltinTarget::unary("neg", "two's-complement negation -x", |x| x.wrapping_neg()),
    BuiltinTarget::unary("dec", "x - 1 (wrapping)", |x| x.wrapping_sub(1)),
    BuiltinTarget::unary("clear-lowest-bit", "x & (x - 1)", |x| x & x.wrapping_sub(1)),
    BuiltinTarget::unary("isolate-lowest-bit", "x & -x", |x| x & x.wrapping_neg()),
    BuiltinTarget::unary("set-lowest-clear-bit", "x | (x + 1)", |x| x | x.wrapping_add(1)),
    BuiltinTarget::unary("trailing-zeros-mask", "~x & (x - 1)", |x| !x & x.wrapping_sub(1)),
    BuiltinTarget::unary("sign", "-1, 0 or 1 according to the sign of x", sign),
    BuiltinTarget::unary("nabs", "negative absolute value", nabs),
    BuiltinTarget::unary("abs", "absolute value (wrapping at MAXNEG)", |x| x.wrapping_abs()),
    BuiltinTarget::unary("rotl-1", "rotate left by one bit", |x| {
        (x as u32).rotate_left(1) as Word
    }),
    BuiltinTarget::unary("square", "x * x (needs a multiplier)", |x| x.wrapping_mul(x)),
    BuiltinTarget::binary("rotl", "x rotated left by y mod 32", |x, y| {
        (x as u32).rotate_left(y as u32) as Word
    }),
    BuiltinTarget::binary("and-not", "x & ~y", |x, y| x & !y),
    BuiltinTarget::binary("xor-or", "(x ^ y) | y", |x, y| (x ^ y) | y),
];

/// Look up a built-in target by name.
pub fn builtin_target(name: &str) -> Result<Target> {
    BUILTIN_TARGETS
        .iter()
        .find(|t| t.name == name)
        .map(BuiltinTarget::target)
        .ok_or_else(|| ConfigError::UnknownTarget(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{MAXNEG, MAXPOS};

    #[test]
    fn test_names_are_unique() {
        for (i, a) in BUILTIN_TARGETS.iter().enumerate() {
            for b in &BUILTIN_TARGETS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_lookup() {
        let target = builtin_target("clear-lowest-bit").unwrap();
        assert_eq!(target.arity(), 1);
        assert_eq!(target.call(&[12]), Some(8));

        let rotl = builtin_target("rotl").unwrap();
        assert_eq!(rotl.arity(), 2);
        assert_eq!(rotl.call(&[MAXNEG, 33]), Some(1));
    }

    #[test]
    fn test_unknown_target() {
        assert_eq!(
            builtin_target("popcount").unwrap_err(),
            ConfigError::UnknownTarget("popcount".to_string())
        );
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(0), 0);
        assert_eq!(sign(17), 1);
        assert_eq!(sign(MAXPOS), 1);
        assert_eq!(sign(-17), -1);
        assert_eq!(sign(MAXNEG), -1);
    }

    #[test]
    fn test_nabs() {
        assert_eq!(nabs(5), -5);
        assert_eq!(nabs(-5), -5);
        assert_eq!(nabs(MAXNEG), MAXNEG);
    }
}
