//! Solution reporting
//!
//! The engine hands every solution to a [`Reporter`] together with a
//! [`SolutionView`]: the program with opcodes replaced by their operations
//! and register indices replaced by what they hold. Reporters decide what to
//! do with it; the engine never formats anything itself.

pub mod emit;
pub mod render;

use crate::ir::{Operand, Program, RegisterLayout};
use crate::isa::{Catalogue, Operation, ShiftMask};
use crate::search::result::Solution;
use std::fmt;

pub use render::OutputFormat;

/// One resolved instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub operation: Operation,
    pub operands: Vec<Operand>,
}

impl SlotView {
    pub fn name(&self) -> &'static str {
        self.operation.mnemonic()
    }
}

/// A program described in terms of operations and operand identities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionView {
    pub slots: Vec<SlotView>,
    pub num_args: usize,
    /// Shift amount mask the program was verified under.
    pub shift_mask: ShiftMask,
}

impl SolutionView {
    pub fn new(program: &Program, layout: &RegisterLayout, catalogue: &Catalogue) -> Self {
        let slots = program
            .slots()
            .iter()
            .map(|slot| {
                let desc = &catalogue.descriptors()[slot.opcode];
                SlotView {
                    operation: desc.operation,
                    operands: slot.operands[..desc.arity()]
                        .iter()
                        .map(|&reg| layout.resolve(reg))
                        .collect(),
                }
            })
            .collect();
        Self {
            slots,
            num_args: layout.num_args(),
            shift_mask: catalogue.shift_mask(),
        }
    }

    pub fn length(&self) -> usize {
        self.slots.len()
    }
}

impl fmt::Display for SolutionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render::mnemonic(self))
    }
}

/// Receives solutions as the search finds them
pub trait Reporter {
    fn report(&mut self, solution: &Solution, view: &SolutionView);
}

/// Keeps every view it is given, in order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub views: Vec<SolutionView>,
}

impl Reporter for CollectingReporter {
    fn report(&mut self, _solution: &Solution, view: &SolutionView) {
        self.views.push(view.clone());
    }
}

/// Prints each solution to stdout in the chosen format.
#[derive(Debug)]
pub struct PrintReporter {
    format: OutputFormat,
    show_counters: bool,
}

impl PrintReporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_counters: false,
        }
    }

    pub fn with_counters(mut self, show: bool) -> Self {
        self.show_counters = show;
        self
    }
}

impl Reporter for PrintReporter {
    fn report(&mut self, solution: &Solution, view: &SolutionView) {
        println!("\nFound a {}-operation program:", view.length());
        print!("{}", render::render(view, self.format));
        if self.show_counters {
            let counts: Vec<String> = solution
                .counters
                .as_slice()
                .iter()
                .map(|c| c.to_string())
                .collect();
            println!("   Counters: {}", counts.join(", "));
        }
    }
}
