//! Candidate programs: ordered slots of (opcode, operand registers)

use crate::ir::types::{RegisterIndex, RegisterLayout};
use crate::isa::Catalogue;
use std::fmt;

/// Most operands any instruction takes.
pub const MAX_OPERANDS: usize = 3;

/// One instruction position in a candidate program.
///
/// Only the first `arity` operands of the opcode are meaningful; the rest are
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Index into the instruction catalogue.
    pub opcode: usize,
    /// Operand register indices.
    pub operands: [RegisterIndex; MAX_OPERANDS],
}

impl Slot {
    pub fn new(opcode: usize, operands: &[RegisterIndex]) -> Self {
        let mut regs = [0; MAX_OPERANDS];
        regs[..operands.len()].copy_from_slice(operands);
        Self {
            opcode,
            operands: regs,
        }
    }
}

/// An ordered instruction sequence. Instruction `i` writes result register
/// `result_start + i`; the last instruction's result is the program's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Program {
    slots: Vec<Slot>,
}

impl Program {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// In-place access for the enumerator, which rewrites slots between
    /// candidates instead of allocating.
    pub(crate) fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }

    /// Check that every opcode exists and every operand reads only constants,
    /// arguments, or results of earlier slots.
    pub fn is_well_formed(&self, layout: &RegisterLayout, catalogue: &Catalogue) -> bool {
        self.slots.iter().enumerate().all(|(i, slot)| {
            catalogue.get(slot.opcode).is_some_and(|desc| {
                slot.operands[..desc.arity()]
                    .iter()
                    .all(|&reg| reg <= layout.highest_live(i))
            })
        })
    }
}

impl From<Vec<Slot>> for Program {
    fn from(slots: Vec<Slot>) -> Self {
        Self::new(slots)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .slots
            .iter()
            .map(|s| {
                format!(
                    "#{}(r{}, r{}, r{})",
                    s.opcode, s.operands[0], s.operands[1], s.operands[2]
                )
            })
            .collect();
        write!(f, "[{}]", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_pads_operands() {
        let slot = Slot::new(4, &[11]);
        assert_eq!(slot.operands, [11, 0, 0]);
    }

    #[test]
    fn test_well_formed_accepts_prior_results() {
        let layout = RegisterLayout::default();
        let catalogue = Catalogue::default();
        let sub = catalogue.position("sub").unwrap();
        let and = catalogue.position("and").unwrap();
        // r0 = x - 1; r1 = x & r0
        let program = Program::new(vec![
            Slot::new(sub, &[layout.arg_start(), 2]),
            Slot::new(and, &[layout.arg_start(), layout.result_register(0)]),
        ]);
        assert!(program.is_well_formed(&layout, &catalogue));
    }

    #[test]
    fn test_well_formed_rejects_self_reference() {
        let layout = RegisterLayout::default();
        let catalogue = Catalogue::default();
        let not = catalogue.position("not").unwrap();
        let program = Program::new(vec![Slot::new(not, &[layout.result_register(0)])]);
        assert!(!program.is_well_formed(&layout, &catalogue));
    }

    #[test]
    fn test_well_formed_rejects_unknown_opcode() {
        let layout = RegisterLayout::default();
        let catalogue = Catalogue::default();
        let program = Program::new(vec![Slot::new(catalogue.len(), &[layout.arg_start()])]);
        assert!(!program.is_well_formed(&layout, &catalogue));
    }
}
