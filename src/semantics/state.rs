//! Register file state for concrete evaluation

use crate::ir::{RegisterIndex, RegisterLayout, Word};
use std::fmt;

/// Values of every register for one evaluation.
///
/// The constant banks are written once at construction; arguments and results
/// are rewritten for each input tuple. Each evaluation owns its file, so
/// independent evaluations can run on separate threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    regs: Vec<Word>,
    arg_start: RegisterIndex,
    result_start: RegisterIndex,
}

impl RegisterFile {
    /// A file large enough for programs of up to `capacity` instructions.
    pub fn new(layout: &RegisterLayout, capacity: usize) -> Self {
        let mut regs = Vec::with_capacity(layout.register_count(capacity));
        regs.extend(layout.constants());
        regs.resize(layout.register_count(capacity), 0);
        Self {
            regs,
            arg_start: layout.arg_start(),
            result_start: layout.result_start(),
        }
    }

    /// Number of result registers available.
    pub fn capacity(&self) -> usize {
        self.regs.len() - self.result_start
    }

    /// Number of argument registers.
    pub fn num_args(&self) -> usize {
        self.result_start - self.arg_start
    }

    /// Store the argument values and clear the result bank.
    ///
    /// # Panics
    /// If `args.len()` differs from [`num_args`](Self::num_args).
    pub fn reset(&mut self, args: &[Word]) {
        self.regs[self.arg_start..self.result_start].copy_from_slice(args);
        self.regs[self.result_start..].fill(0);
    }

    /// Grow the result bank to hold at least `capacity` results.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if self.capacity() < capacity {
            self.regs.resize(self.result_start + capacity, 0);
        }
    }

    #[inline]
    pub fn get(&self, index: RegisterIndex) -> Word {
        self.regs[index]
    }

    #[inline]
    pub fn set_result(&mut self, slot: usize, value: Word) {
        self.regs[self.result_start + slot] = value;
    }

    #[inline]
    pub fn result(&self, slot: usize) -> Word {
        self.regs[self.result_start + slot]
    }

    pub fn values(&self) -> &[Word] {
        &self.regs
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.regs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "r{}={}", i, v)?;
        }
        Ok(())
    }
}
