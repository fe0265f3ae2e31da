//! Core types for the register file layout
//!
//! The register file is a flat array split into four contiguous banks:
//!
//! ```text
//! 0             ordinary immediates (first three are 0, -1, 1)
//! shift_start   shift immediates
//! arg_start     x (and y for two-argument targets)
//! result_start  result of instruction 0, then 1, 2, ...
//! ```

use crate::error::{ConfigError, Result};
use std::fmt;

/// A machine word. All arithmetic wraps at 32 bits.
pub type Word = i32;

/// Index into the register file.
pub type RegisterIndex = usize;

pub const MAXNEG: Word = i32::MIN;
pub const MAXPOS: Word = i32::MAX;

/// Default ordinary immediates.
pub const DEFAULT_IMMEDIATES: [Word; 7] = [0, -1, 1, MAXNEG, -2, 2, 3];

/// Default shift immediates.
pub const DEFAULT_SHIFT_IMMEDIATES: [Word; 4] = [1, 2, 30, 31];

/// Registers 0, 1 and 2 hold these values in every layout.
pub const REQUIRED_IMMEDIATE_PREFIX: [Word; 3] = [0, -1, 1];

/// The bank a register belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    Immediate,
    ShiftImmediate,
    Argument,
    Result,
}

/// A register index resolved to what it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Immediate(Word),
    ShiftImmediate(Word),
    /// Function argument by position (0 = x, 1 = y).
    Argument(usize),
    /// Result of the instruction at this slot.
    Result(usize),
}

/// Name used for argument `position` when printing.
pub fn argument_name(position: usize) -> char {
    match position {
        0 => 'x',
        1 => 'y',
        _ => '?',
    }
}

/// Format an immediate the way a reader expects to see it.
pub fn format_immediate(value: Word) -> String {
    if value == MAXNEG {
        "0x80000000".to_string()
    } else {
        value.to_string()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Immediate(v) | Operand::ShiftImmediate(v) => {
                write!(f, "{}", format_immediate(*v))
            }
            Operand::Argument(pos) => write!(f, "{}", argument_name(*pos)),
            Operand::Result(slot) => write!(f, "r{}", slot),
        }
    }
}

/// Bank sizes and offsets, computed once per search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterLayout {
    immediates: Vec<Word>,
    shift_immediates: Vec<Word>,
    num_args: usize,
}

impl Default for RegisterLayout {
    fn default() -> Self {
        Self {
            immediates: DEFAULT_IMMEDIATES.to_vec(),
            shift_immediates: DEFAULT_SHIFT_IMMEDIATES.to_vec(),
            num_args: 1,
        }
    }
}

impl RegisterLayout {
    /// Build a layout, checking the invariants the pruning rules rely on.
    pub fn new(immediates: Vec<Word>, shift_immediates: Vec<Word>, num_args: usize) -> Result<Self> {
        if immediates.len() < REQUIRED_IMMEDIATE_PREFIX.len()
            || immediates[..REQUIRED_IMMEDIATE_PREFIX.len()] != REQUIRED_IMMEDIATE_PREFIX
        {
            return Err(ConfigError::ImmediatePrefix { found: immediates });
        }
        if !(1..=2).contains(&num_args) {
            return Err(ConfigError::ArgumentCount(num_args));
        }
        Ok(Self {
            immediates,
            shift_immediates,
            num_args,
        })
    }

    pub fn with_num_args(mut self, num_args: usize) -> Result<Self> {
        if !(1..=2).contains(&num_args) {
            return Err(ConfigError::ArgumentCount(num_args));
        }
        self.num_args = num_args;
        Ok(self)
    }

    pub fn immediates(&self) -> &[Word] {
        &self.immediates
    }

    pub fn shift_immediates(&self) -> &[Word] {
        &self.shift_immediates
    }

    pub fn num_args(&self) -> usize {
        self.num_args
    }

    /// First shift immediate register (`NIM`).
    pub fn shift_start(&self) -> RegisterIndex {
        self.immediates.len()
    }

    /// First argument register (`RX`).
    pub fn arg_start(&self) -> RegisterIndex {
        self.shift_start() + self.shift_immediates.len()
    }

    /// Register holding the result of instruction 0 (`RI0`).
    pub fn result_start(&self) -> RegisterIndex {
        self.arg_start() + self.num_args
    }

    /// Register written by the instruction at `slot`.
    pub fn result_register(&self, slot: usize) -> RegisterIndex {
        self.result_start() + slot
    }

    /// Highest register an operand of `slot` may read. Every register up to
    /// and including this one is already defined when `slot` executes.
    pub fn highest_live(&self, slot: usize) -> RegisterIndex {
        self.result_start() + slot - 1
    }

    /// Size of the register file for programs of `length` instructions.
    pub fn register_count(&self, length: usize) -> usize {
        self.result_start() + length
    }

    pub fn bank_of(&self, index: RegisterIndex) -> Bank {
        if index < self.shift_start() {
            Bank::Immediate
        } else if index < self.arg_start() {
            Bank::ShiftImmediate
        } else if index < self.result_start() {
            Bank::Argument
        } else {
            Bank::Result
        }
    }

    /// Resolve a register index to its identity.
    pub fn resolve(&self, index: RegisterIndex) -> Operand {
        match self.bank_of(index) {
            Bank::Immediate => Operand::Immediate(self.immediates[index]),
            Bank::ShiftImmediate => {
                Operand::ShiftImmediate(self.shift_immediates[index - self.shift_start()])
            }
            Bank::Argument => Operand::Argument(index - self.arg_start()),
            Bank::Result => Operand::Result(index - self.result_start()),
        }
    }

    /// The constant banks, in register order.
    pub fn constants(&self) -> impl Iterator<Item = Word> + '_ {
        self.immediates
            .iter()
            .chain(self.shift_immediates.iter())
            .copied()
    }
}

impl fmt::Display for RegisterLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let imms: Vec<String> = self.immediates.iter().map(|v| format_immediate(*v)).collect();
        let shims: Vec<String> = self.shift_immediates.iter().map(|v| v.to_string()).collect();
        writeln!(f, "r0..r{}: immediates {}", self.shift_start().saturating_sub(1), imms.join(", "))?;
        if !self.shift_immediates.is_empty() {
            writeln!(
                f,
                "r{}..r{}: shift immediates {}",
                self.shift_start(),
                self.arg_start() - 1,
                shims.join(", ")
            )?;
        }
        for pos in 0..self.num_args {
            writeln!(f, "r{}: argument {}", self.arg_start() + pos, argument_name(pos))?;
        }
        write!(f, "r{}..: instruction results", self.result_start())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_offsets() {
        let layout = RegisterLayout::default();
        assert_eq!(layout.shift_start(), 7);
        assert_eq!(layout.arg_start(), 11);
        assert_eq!(layout.result_start(), 12);
        assert_eq!(layout.register_count(5), 17);
    }

    #[test]
    fn test_two_argument_offsets() {
        let layout = RegisterLayout::default().with_num_args(2).unwrap();
        assert_eq!(layout.arg_start(), 11);
        assert_eq!(layout.result_start(), 13);
        assert_eq!(layout.resolve(12), Operand::Argument(1));
    }

    #[test]
    fn test_highest_live() {
        let layout = RegisterLayout::default();
        // Slot 0 may only read up to the last argument
        assert_eq!(layout.highest_live(0), layout.arg_start());
        assert_eq!(layout.highest_live(3), layout.result_register(2));
    }

    #[test]
    fn test_resolve_banks() {
        let layout = RegisterLayout::default();
        assert_eq!(layout.resolve(0), Operand::Immediate(0));
        assert_eq!(layout.resolve(1), Operand::Immediate(-1));
        assert_eq!(layout.resolve(3), Operand::Immediate(MAXNEG));
        assert_eq!(layout.resolve(8), Operand::ShiftImmediate(2));
        assert_eq!(layout.resolve(11), Operand::Argument(0));
        assert_eq!(layout.resolve(14), Operand::Result(2));
        assert_eq!(layout.bank_of(10), Bank::ShiftImmediate);
    }

    #[test]
    fn test_rejects_bad_prefix() {
        let err = RegisterLayout::new(vec![0, 1, -1], vec![1], 1).unwrap_err();
        assert!(matches!(err, ConfigError::ImmediatePrefix { .. }));

        let err = RegisterLayout::new(vec![0, -1], vec![1], 1).unwrap_err();
        assert!(matches!(err, ConfigError::ImmediatePrefix { .. }));
    }

    #[test]
    fn test_rejects_bad_argument_count() {
        assert_eq!(
            RegisterLayout::new(vec![0, -1, 1], vec![], 3).unwrap_err(),
            ConfigError::ArgumentCount(3)
        );
        assert!(RegisterLayout::default().with_num_args(0).is_err());
    }

    #[test]
    fn test_operand_display() {
        assert_eq!(Operand::Immediate(MAXNEG).to_string(), "0x80000000");
        assert_eq!(Operand::Immediate(-2).to_string(), "-2");
        assert_eq!(Operand::Argument(1).to_string(), "y");
        assert_eq!(Operand::Result(3).to_string(), "r3");
    }

    #[test]
    fn test_constants_in_register_order() {
        let layout = RegisterLayout::new(vec![0, -1, 1, 5], vec![4], 1).unwrap();
        let values: Vec<Word> = layout.constants().collect();
        assert_eq!(values, vec![0, -1, 1, 5, 4]);
    }
}
