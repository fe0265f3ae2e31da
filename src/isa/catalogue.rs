//! The instruction catalogue: which operations a program may use, in what
//! order they are tried, and which operand registers are worth trying

use crate::error::{ConfigError, Result};
use crate::ir::{RegisterIndex, RegisterLayout, Word};
use crate::isa::operation::{Operation, ShiftMask};
use std::fmt;

/// Lowest register an operand may take.
///
/// Floors skip assignments that are known to be dominated by another
/// program, e.g. `and x, 0` is just the constant 0, so the second operand of
/// `and` starts at register 2 (the immediate 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandFloor {
    /// A fixed register index.
    Absolute(RegisterIndex),
    /// The first shift immediate.
    ShiftImmediates,
    /// The first function argument.
    FirstArgument,
}

impl OperandFloor {
    pub fn resolve(&self, layout: &RegisterLayout) -> RegisterIndex {
        match self {
            OperandFloor::Absolute(index) => *index,
            OperandFloor::ShiftImmediates => layout.shift_start(),
            OperandFloor::FirstArgument => layout.arg_start(),
        }
    }
}

impl fmt::Display for OperandFloor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandFloor::Absolute(index) => write!(f, "r{}", index),
            OperandFloor::ShiftImmediates => write!(f, "NIM"),
            OperandFloor::FirstArgument => write!(f, "RX"),
        }
    }
}

/// One catalogue entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionDescriptor {
    pub operation: Operation,
    /// Operands 0 and 1 may be swapped. Enables operand-order canonicalization.
    pub commutative: bool,
    /// One floor per operand.
    pub floors: Vec<OperandFloor>,
}

impl InstructionDescriptor {
    pub fn new(operation: Operation, floors: Vec<OperandFloor>) -> Self {
        Self {
            operation,
            commutative: operation.is_commutative(),
            floors,
        }
    }

    /// The entry with the floors of the classic configuration.
    pub fn standard(operation: Operation) -> Self {
        use OperandFloor::{Absolute, FirstArgument, ShiftImmediates};
        let floors = match operation {
            Operation::Neg | Operation::Not => vec![FirstArgument],
            Operation::Add | Operation::And | Operation::Or | Operation::Xor => {
                vec![FirstArgument, Absolute(2)]
            }
            Operation::Sub => vec![Absolute(2), Absolute(2)],
            Operation::Mul => vec![FirstArgument, Absolute(3)],
            Operation::DivS => vec![Absolute(1), Absolute(3)],
            Operation::DivU => vec![Absolute(1), Absolute(1)],
            Operation::Ror | Operation::Rol => vec![FirstArgument, ShiftImmediates],
            Operation::Shl | Operation::Shr => vec![Absolute(1), ShiftImmediates],
            Operation::Select => vec![FirstArgument, Absolute(0), Absolute(2)],
        };
        Self::new(operation, floors)
    }

    pub fn with_commutative(mut self, commutative: bool) -> Self {
        self.commutative = commutative;
        self
    }

    pub fn arity(&self) -> usize {
        self.operation.arity()
    }

    pub fn name(&self) -> &'static str {
        self.operation.mnemonic()
    }

    /// Resolved floor of operand `j`.
    pub fn floor(&self, j: usize, layout: &RegisterLayout) -> RegisterIndex {
        self.floors[j].resolve(layout)
    }
}

/// Operations of the default catalogue, in search order.
pub const DEFAULT_OPERATIONS: [Operation; 11] = [
    Operation::Neg,
    Operation::Not,
    Operation::Add,
    Operation::Sub,
    Operation::And,
    Operation::Or,
    Operation::Xor,
    Operation::Ror,
    Operation::Rol,
    Operation::Shl,
    Operation::Shr,
];

/// Ordered table of instructions plus the shift semantics they run under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    descriptors: Vec<InstructionDescriptor>,
    shift_mask: ShiftMask,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::standard(&DEFAULT_OPERATIONS)
    }
}

impl Catalogue {
    pub fn new(descriptors: Vec<InstructionDescriptor>) -> Self {
        Self {
            descriptors,
            shift_mask: ShiftMask::default(),
        }
    }

    /// Catalogue of `operations` with their standard floors.
    pub fn standard(operations: &[Operation]) -> Self {
        Self::new(
            operations
                .iter()
                .map(|op| InstructionDescriptor::standard(*op))
                .collect(),
        )
    }

    pub fn with_shift_mask(mut self, shift_mask: ShiftMask) -> Self {
        self.shift_mask = shift_mask;
        self
    }

    pub fn shift_mask(&self) -> ShiftMask {
        self.shift_mask
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, opcode: usize) -> Option<&InstructionDescriptor> {
        self.descriptors.get(opcode)
    }

    pub fn descriptors(&self) -> &[InstructionDescriptor] {
        &self.descriptors
    }

    /// Opcode of the first entry named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.name() == name)
    }

    /// Run opcode `opcode` on operand values.
    #[inline]
    pub fn simulate(&self, opcode: usize, ops: [Word; 3]) -> Option<Word> {
        self.descriptors[opcode]
            .operation
            .simulate(ops, self.shift_mask)
    }

    /// Check the table against a register layout.
    ///
    /// Floors must point into the constant or argument banks, so every opcode
    /// is usable from slot 0 on.
    pub fn validate(&self, layout: &RegisterLayout) -> Result<()> {
        if self.descriptors.is_empty() {
            return Err(ConfigError::EmptyCatalogue);
        }
        let registers = layout.result_start();
        for (index, desc) in self.descriptors.iter().enumerate() {
            if desc.floors.len() != desc.arity() {
                return Err(ConfigError::FloorCountMismatch {
                    index,
                    name: desc.name(),
                    arity: desc.arity(),
                    floors: desc.floors.len(),
                });
            }
            if desc.commutative && desc.arity() < 2 {
                return Err(ConfigError::CommutativeUnary {
                    index,
                    name: desc.name(),
                    arity: desc.arity(),
                });
            }
            for (operand, floor) in desc.floors.iter().enumerate() {
                let floor = floor.resolve(layout);
                if floor >= registers {
                    return Err(ConfigError::FloorOutOfBounds {
                        index,
                        name: desc.name(),
                        operand,
                        floor,
                        registers,
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Catalogue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, desc) in self.descriptors.iter().enumerate() {
            let floors: Vec<String> = desc.floors.iter().map(|fl| fl.to_string()).collect();
            writeln!(
                f,
                "{:2}  {:<5} arity {}  {}  floors [{}]",
                i,
                desc.name(),
                desc.arity(),
                if desc.commutative { "commutative" } else { "           " },
                floors.join(", ")
            )?;
        }
        write!(f, "shift mask: {}", self.shift_mask.bits())
    }
}
