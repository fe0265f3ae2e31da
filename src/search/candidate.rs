//! Candidate generation: odometer-style enumeration of slot assignments
//!
//! Slot `i` of a program tries every catalogue opcode in order. For each
//! opcode the operands run from their floor up to the highest register that
//! is already defined when slot `i` executes, with the last operand varying
//! fastest. A commutative pair `(a, b)` with `a > b` is skipped when its swap
//! `(b, a)` also satisfies the floors, since that swap is enumerated instead.
//! The enumeration order is therefore lexicographic over
//! `(opcode, operand0, operand1, operand2)` per slot, slot 0 most significant.

use crate::ir::{Program, RegisterIndex, RegisterLayout, Slot};
use crate::isa::{Catalogue, InstructionDescriptor};
use crate::search::result::SlotCounters;

/// Whether the operands of a commutative descriptor are in the order the
/// enumerator generates.
///
/// `(a, b)` is dropped only when `a > b` and `(b, a)` is itself floor-valid,
/// so every program has exactly one enumerated representative.
pub fn is_canonical(
    desc: &InstructionDescriptor,
    layout: &RegisterLayout,
    operands: &[RegisterIndex],
) -> bool {
    if !desc.commutative || desc.arity() < 2 {
        return true;
    }
    let (a, b) = (operands[0], operands[1]);
    a <= b || b < desc.floor(0, layout) || a < desc.floor(1, layout)
}

/// Smallest legal value of operand `j` that is at least `from`, given the
/// operands before it. Never exceeds `operands[0]` for the second operand of
/// a commutative descriptor, so it stays within the live range.
fn operand_from(
    desc: &InstructionDescriptor,
    layout: &RegisterLayout,
    operands: &[RegisterIndex],
    j: usize,
    from: RegisterIndex,
) -> RegisterIndex {
    if j == 1 && desc.commutative {
        let a = operands[0];
        let swappable = desc.floor(0, layout).max(desc.floor(1, layout));
        if a >= desc.floor(1, layout) && from >= swappable && from < a {
            return a;
        }
    }
    from
}

/// Lowest legal value of operand `j` given the operands before it.
fn operand_min(
    desc: &InstructionDescriptor,
    layout: &RegisterLayout,
    operands: &[RegisterIndex],
    j: usize,
) -> RegisterIndex {
    operand_from(desc, layout, operands, j, desc.floor(j, layout))
}

/// First assignment of `slot` using an opcode at or after `from_opcode`.
///
/// Opcodes with a floor above the slot's highest live register have no
/// assignment there and are skipped.
pub fn first_assignment(
    layout: &RegisterLayout,
    catalogue: &Catalogue,
    slot: usize,
    from_opcode: usize,
) -> Option<Slot> {
    let top = layout.highest_live(slot);
    for opcode in from_opcode..catalogue.len() {
        let desc = &catalogue.descriptors()[opcode];
        let arity = desc.arity();
        if (0..arity).any(|j| desc.floor(j, layout) > top) {
            continue;
        }
        let mut operands = [0; 3];
        for j in 0..arity {
            operands[j] = operand_min(desc, layout, &operands, j);
        }
        return Some(Slot { opcode, operands });
    }
    None
}

/// Assignment of `slot` that follows `current` in enumeration order.
pub fn next_assignment(
    layout: &RegisterLayout,
    catalogue: &Catalogue,
    slot: usize,
    current: &Slot,
) -> Option<Slot> {
    let top = layout.highest_live(slot);
    let desc = &catalogue.descriptors()[current.opcode];
    let arity = desc.arity();
    let mut operands = current.operands;

    for j in (0..arity).rev() {
        if operands[j] < top {
            operands[j] = operand_from(desc, layout, &operands, j, operands[j] + 1);
            for k in j + 1..arity {
                operands[k] = operand_min(desc, layout, &operands, k);
            }
            return Some(Slot {
                opcode: current.opcode,
                operands,
            });
        }
    }
    first_assignment(layout, catalogue, slot, current.opcode + 1)
}

/// Every assignment of `slot`, in enumeration order.
pub fn slot_assignments(layout: &RegisterLayout, catalogue: &Catalogue, slot: usize) -> Vec<Slot> {
    let mut assignments = Vec::new();
    let mut current = first_assignment(layout, catalogue, slot, 0);
    while let Some(assignment) = current {
        assignments.push(assignment);
        current = next_assignment(layout, catalogue, slot, &assignment);
    }
    assignments
}

/// Number of assignments of `slot`, computed without enumerating.
pub fn slot_choices(layout: &RegisterLayout, catalogue: &Catalogue, slot: usize) -> u64 {
    let top = layout.highest_live(slot) as u64;
    catalogue
        .descriptors()
        .iter()
        .map(|desc| {
            let floors: Vec<u64> = (0..desc.arity())
                .map(|j| desc.floor(j, layout) as u64)
                .collect();
            if floors.iter().any(|&f| f > top) {
                return 0;
            }
            let width = |f: u64| top - f + 1;
            let leading: u64 = if desc.commutative && floors.len() >= 2 {
                // Second operands in [max(f0, f1), a) are covered by the swap
                let swappable = floors[0].max(floors[1]);
                (floors[0]..=top)
                    .map(|a| {
                        if a >= floors[1] {
                            width(floors[1]) - (a - swappable)
                        } else {
                            width(floors[1])
                        }
                    })
                    .sum()
            } else {
                floors.iter().take(2).map(|&f| width(f)).product()
            };
            floors.iter().skip(2).map(|&f| width(f)).fold(leading, |acc, w| acc * w)
        })
        .sum()
}

/// Size of the search space for programs of `length` instructions.
pub fn search_space(layout: &RegisterLayout, catalogue: &Catalogue, length: usize) -> u64 {
    (0..length)
        .map(|slot| slot_choices(layout, catalogue, slot))
        .fold(1u64, |acc, c| acc.saturating_mul(c))
}

/// Walks every well-formed program of one length.
///
/// The enumerator owns the candidate it is positioned on and rewrites it in
/// place on each [`advance`](Self::advance), so checking a candidate never
/// allocates.
#[derive(Debug, Clone)]
pub struct ProgramEnumerator<'a> {
    layout: &'a RegisterLayout,
    catalogue: &'a Catalogue,
    program: Program,
    /// Leading slots that never change.
    pinned: usize,
    started: bool,
    done: bool,
}

impl<'a> ProgramEnumerator<'a> {
    pub fn new(layout: &'a RegisterLayout, catalogue: &'a Catalogue, length: usize) -> Self {
        Self {
            layout,
            catalogue,
            program: Program::new(vec![Slot::new(0, &[]); length]),
            pinned: 0,
            started: false,
            done: length == 0,
        }
    }

    /// Enumerate only the subtree whose slot 0 is `root`.
    pub fn rooted(
        layout: &'a RegisterLayout,
        catalogue: &'a Catalogue,
        length: usize,
        root: Slot,
    ) -> Self {
        let mut enumerator = Self::new(layout, catalogue, length);
        if length > 0 {
            enumerator.program.slots_mut()[0] = root;
            enumerator.pinned = 1;
        }
        enumerator
    }

    pub fn length(&self) -> usize {
        self.program.len()
    }

    /// The candidate the enumerator is positioned on.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Fill slots `from..` with their first assignments.
    fn fill_from(&mut self, from: usize, counters: &mut SlotCounters) -> bool {
        for slot in from..self.program.len() {
            match first_assignment(self.layout, self.catalogue, slot, 0) {
                Some(assignment) => {
                    self.program.slots_mut()[slot] = assignment;
                    counters.record(slot);
                }
                None => return false,
            }
        }
        true
    }

    /// Move to the next candidate. Returns false once the space is exhausted.
    ///
    /// Every assignment made at slot `i` bumps `counters[i]`; a pinned root
    /// is counted once, on the first call.
    pub fn advance(&mut self, counters: &mut SlotCounters) -> bool {
        if self.done {
            return false;
        }

        if !self.started {
            self.started = true;
            if self.pinned > 0 {
                counters.record(0);
            }
            if !self.fill_from(self.pinned, counters) {
                self.done = true;
            }
            return !self.done;
        }

        let mut slot = self.program.len();
        while slot > self.pinned {
            slot -= 1;
            let current = self.program.slots()[slot];
            if let Some(next) = next_assignment(self.layout, self.catalogue, slot, &current) {
                self.program.slots_mut()[slot] = next;
                counters.record(slot);
                if self.fill_from(slot + 1, counters) {
                    return true;
                }
                break;
            }
        }

        self.done = true;
        false
    }
}
