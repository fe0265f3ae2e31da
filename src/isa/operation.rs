//! Operations the superoptimizer can place in a program, with bit-exact
//! 32-bit simulation routines

use crate::ir::Word;
use std::fmt;

/// How many bits of a shift or rotate amount are honoured.
///
/// `Mod64` masks the amount with 63: logical shifts by 32..=63 produce 0,
/// rotates reduce modulo 32. `Mod32` masks with 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShiftMask {
    Mod32,
    #[default]
    Mod64,
}

impl ShiftMask {
    pub fn bits(self) -> u32 {
        match self {
            ShiftMask::Mod32 => 31,
            ShiftMask::Mod64 => 63,
        }
    }

    pub fn apply(self, amount: Word) -> u32 {
        (amount as u32) & self.bits()
    }
}

impl std::str::FromStr for ShiftMask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "31" | "32" | "mod32" => Ok(ShiftMask::Mod32),
            "63" | "64" | "mod64" => Ok(ShiftMask::Mod64),
            _ => Err(format!(
                "Unknown shift mask: '{}'. Valid options: 31, 63",
                s
            )),
        }
    }
}

/// How an operation is written in an infix expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// `-(a)`
    Prefix(&'static str),
    /// `(a + b)`
    Infix(&'static str),
    /// `name(a, b, c)`
    Call(&'static str),
}

/// Operations available to instruction catalogues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Unary
    Neg,
    Not,

    // Arithmetic
    Add,
    Sub,
    Mul,
    DivS,
    DivU,

    // Logical
    And,
    Or,
    Xor,

    // Rotates and logical shifts
    Ror,
    Rol,
    Shl,
    Shr,

    /// Bitwise select: bits of `a` where the mask `c` is set, else bits of `b`.
    Select,
}

impl Operation {
    pub const ALL: [Operation; 15] = [
        Operation::Neg,
        Operation::Not,
        Operation::Add,
        Operation::Sub,
        Operation::Mul,
        Operation::DivS,
        Operation::DivU,
        Operation::And,
        Operation::Or,
        Operation::Xor,
        Operation::Ror,
        Operation::Rol,
        Operation::Shl,
        Operation::Shr,
        Operation::Select,
    ];

    pub fn arity(&self) -> usize {
        match self {
            Operation::Neg | Operation::Not => 1,
            Operation::Select => 3,
            _ => 2,
        }
    }

    /// True if operands 0 and 1 may be swapped without changing the result.
    pub fn is_commutative(&self) -> bool {
        matches!(
            self,
            Operation::Add | Operation::Mul | Operation::And | Operation::Or | Operation::Xor
        )
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Operation::Neg => "neg",
            Operation::Not => "not",
            Operation::Add => "add",
            Operation::Sub => "sub",
            Operation::Mul => "mul",
            Operation::DivS => "divs",
            Operation::DivU => "divu",
            Operation::And => "and",
            Operation::Or => "or",
            Operation::Xor => "xor",
            Operation::Ror => "ror",
            Operation::Rol => "rol",
            Operation::Shl => "shl",
            Operation::Shr => "shr",
            Operation::Select => "sel",
        }
    }

    pub fn notation(&self) -> Notation {
        match self {
            Operation::Neg => Notation::Prefix("-"),
            Operation::Not => Notation::Prefix("~"),
            Operation::Add => Notation::Infix(" + "),
            Operation::Sub => Notation::Infix(" - "),
            Operation::Mul => Notation::Infix("*"),
            Operation::DivS => Notation::Infix("/"),
            Operation::DivU => Notation::Infix(" /u "),
            Operation::And => Notation::Infix(" & "),
            Operation::Or => Notation::Infix(" | "),
            Operation::Xor => Notation::Infix(" ^ "),
            Operation::Ror => Notation::Infix(" >>r "),
            Operation::Rol => Notation::Infix(" <<r "),
            Operation::Shl => Notation::Infix(" <<u "),
            Operation::Shr => Notation::Infix(" >>u "),
            Operation::Select => Notation::Call("sel"),
        }
    }

    /// x86 (AT&T) mnemonic, for operations with a direct two-address form.
    pub fn x86_mnemonic(&self) -> Option<&'static str> {
        match self {
            Operation::Neg => Some("negl"),
            Operation::Not => Some("notl"),
            Operation::Add => Some("addl"),
            Operation::Sub => Some("subl"),
            Operation::Mul => Some("imull"),
            Operation::And => Some("andl"),
            Operation::Or => Some("orl"),
            Operation::Xor => Some("xorl"),
            Operation::Ror => Some("rorl"),
            Operation::Rol => Some("roll"),
            Operation::Shl => Some("shll"),
            Operation::Shr => Some("shrl"),
            Operation::DivS | Operation::DivU | Operation::Select => None,
        }
    }

    /// True for operations whose second operand is a shift count.
    pub fn is_shift(&self) -> bool {
        matches!(
            self,
            Operation::Ror | Operation::Rol | Operation::Shl | Operation::Shr
        )
    }

    /// Simulate the operation. `None` means the result is undefined for these
    /// inputs (divide by zero, signed divide overflow).
    ///
    /// Operands beyond the arity are ignored.
    pub fn simulate(&self, ops: [Word; 3], mask: ShiftMask) -> Option<Word> {
        let [x, y, z] = ops;
        let value = match self {
            Operation::Neg => x.wrapping_neg(),
            Operation::Not => !x,
            Operation::Add => x.wrapping_add(y),
            Operation::Sub => x.wrapping_sub(y),
            Operation::Mul => x.wrapping_mul(y),
            Operation::DivS => {
                if y == 0 || (x == Word::MIN && y == -1) {
                    return None;
                }
                x / y
            }
            Operation::DivU => {
                if y == 0 {
                    return None;
                }
                ((x as u32) / (y as u32)) as Word
            }
            Operation::And => x & y,
            Operation::Or => x | y,
            Operation::Xor => x ^ y,
            // u32 rotates reduce the amount modulo 32
            Operation::Ror => (x as u32).rotate_right(mask.apply(y)) as Word,
            Operation::Rol => (x as u32).rotate_left(mask.apply(y)) as Word,
            Operation::Shl => {
                let s = mask.apply(y);
                if s >= 32 {
                    0
                } else {
                    ((x as u32) << s) as Word
                }
            }
            Operation::Shr => {
                let s = mask.apply(y);
                if s >= 32 {
                    0
                } else {
                    ((x as u32) >> s) as Word
                }
            }
            Operation::Select => (x & z) | (y & !z),
        };
        Some(value)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic() == lower)
            .ok_or_else(|| format!("Unknown operation: '{}'", s))
    }
}
