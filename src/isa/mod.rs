//! Instruction set abstraction
//!
//! The catalogue is configuration: the search engine walks it generically and
//! never refers to a particular operation.

pub mod catalogue;
pub mod operation;

pub use catalogue::{Catalogue, InstructionDescriptor, OperandFloor, DEFAULT_OPERATIONS};
pub use operation::{Notation, Operation, ShiftMask};
