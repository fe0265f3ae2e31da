//! Intermediate Representation (IR) for candidate programs and the register file layout

pub mod instructions;
pub mod types;

// Re-export commonly used types
pub use instructions::{Program, Slot, MAX_OPERANDS};
pub use types::{
    argument_name, format_immediate, Bank, Operand, RegisterIndex, RegisterLayout, Word, MAXNEG,
    MAXPOS,
};
