//! Concrete interpreter for candidate programs

use crate::ir::{Program, RegisterLayout, Word};
use crate::isa::Catalogue;
use crate::semantics::state::RegisterFile;
use crate::validation::Oracle;

/// Result of running a program on one input tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Result of the last instruction.
    pub value: Word,
    /// Some instruction hit an undefined case (e.g. divide by zero).
    pub invalid: bool,
}

/// How a candidate fared against the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Correct on every case.
    Match,
    /// Wrong value on oracle case `case`.
    Mismatch { case: usize },
    /// Undefined operation on oracle case `case`.
    Invalid { case: usize },
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Match)
    }
}

/// Run `program` on `args` in a fresh register file.
pub fn evaluate(
    layout: &RegisterLayout,
    catalogue: &Catalogue,
    program: &Program,
    args: &[Word],
) -> Outcome {
    let mut file = RegisterFile::new(layout, program.len());
    run_program(&mut file, catalogue, program, args)
}

/// Run `program` on `args` using an existing register file.
///
/// Arguments are loaded and results cleared first. An undefined operation
/// writes 0 and marks the outcome invalid; execution continues so the result
/// does not depend on where the first undefined operation occurred. An empty
/// program returns its last argument. An argument count that does not match
/// the layout gives an invalid outcome of 0.
///
/// `program` must be well formed for the file's layout and `catalogue`.
pub fn run_program(
    file: &mut RegisterFile,
    catalogue: &Catalogue,
    program: &Program,
    args: &[Word],
) -> Outcome {
    if args.len() != file.num_args() {
        return Outcome {
            value: 0,
            invalid: true,
        };
    }
    file.ensure_capacity(program.len());
    file.reset(args);

    let mut invalid = false;
    for (i, slot) in program.slots().iter().enumerate() {
        let arity = catalogue.descriptors()[slot.opcode].arity();
        let mut ops = [0; 3];
        for (value, &reg) in ops.iter_mut().zip(&slot.operands[..arity]) {
            *value = file.get(reg);
        }
        let value = match catalogue.simulate(slot.opcode, ops) {
            Some(value) => value,
            None => {
                invalid = true;
                0
            }
        };
        file.set_result(i, value);
    }

    let value = if program.is_empty() {
        args[args.len() - 1]
    } else {
        file.result(program.len() - 1)
    };
    Outcome { value, invalid }
}

/// Check `program` against every oracle case in order, stopping at the first
/// case that is invalid or wrong.
pub fn check_against_oracle(
    file: &mut RegisterFile,
    catalogue: &Catalogue,
    program: &Program,
    oracle: &Oracle,
) -> Verdict {
    for (case, expected) in oracle.cases().iter().enumerate() {
        let outcome = run_program(file, catalogue, program, expected.args());
        if outcome.invalid {
            return Verdict::Invalid { case };
        }
        if outcome.value != expected.expected {
            return Verdict::Mismatch { case };
        }
    }
    Verdict::Match
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Slot, MAXNEG, MAXPOS};
    use crate::isa::{InstructionDescriptor, OperandFloor, Operation};
    use crate::validation::{Target, TrialInputs};

    fn layout() -> RegisterLayout {
        RegisterLayout::default()
    }

    fn op(catalogue: &Catalogue, name: &str) -> usize {
        catalogue.position(name).unwrap()
    }

    #[test]
    fn test_single_not() {
        let layout = layout();
        let catalogue = Catalogue::default();
        let program = Program::new(vec![Slot::new(op(&catalogue, "not"), &[layout.arg_start()])]);
        let outcome = evaluate(&layout, &catalogue, &program, &[0]);
        assert_eq!(outcome, Outcome { value: -1, invalid: false });
    }

    #[test]
    fn test_clear_lowest_set_bit() {
        let layout = layout();
        let catalogue = Catalogue::default();
        let x = layout.arg_start();
        // r0 = x - 1; r1 = x & r0
        let program = Program::new(vec![
            Slot::new(op(&catalogue, "sub"), &[x, 2]),
            Slot::new(op(&catalogue, "and"), &[x, layout.result_register(0)]),
        ]);
        for (input, expected) in [(12, 8), (0, 0), (MAXNEG, 0), (-1, -2), (MAXPOS, MAXPOS - 1)] {
            let outcome = evaluate(&layout, &catalogue, &program, &[input]);
            assert_eq!(outcome.value, expected, "input {}", input);
            assert!(!outcome.invalid);
        }
    }

    #[test]
    fn test_invalid_flag_is_sticky() {
        let layout = layout();
        let catalogue = Catalogue::new(vec![
            InstructionDescriptor::new(
                Operation::DivU,
                vec![OperandFloor::FirstArgument, OperandFloor::Absolute(0)],
            ),
            InstructionDescriptor::standard(Operation::Not),
        ]);
        let x = layout.arg_start();
        // r0 = x /u 0; r1 = ~x (does not read r0)
        let program = Program::new(vec![Slot::new(0, &[x, 0]), Slot::new(1, &[x])]);
        let outcome = evaluate(&layout, &catalogue, &program, &[5]);
        assert!(outcome.invalid);
        assert_eq!(outcome.value, !5);
    }

    #[test]
    fn test_reused_file_is_reset() {
        let layout = layout();
        let catalogue = Catalogue::default();
        let x = layout.arg_start();
        let mut file = RegisterFile::new(&layout, 2);
        let program = Program::new(vec![Slot::new(op(&catalogue, "neg"), &[x])]);
        let first = run_program(&mut file, &catalogue, &program, &[3]);
        let second = run_program(&mut file, &catalogue, &program, &[-4]);
        assert_eq!(first.value, -3);
        assert_eq!(second.value, 4);
    }

    #[test]
    fn test_two_argument_program() {
        let layout = layout().with_num_args(2).unwrap();
        let catalogue = Catalogue::default();
        let (x, y) = (layout.arg_start(), layout.arg_start() + 1);
        let program = Program::new(vec![Slot::new(op(&catalogue, "rol"), &[x, y])]);
        let outcome = evaluate(&layout, &catalogue, &program, &[0x0123_4567, 4]);
        assert_eq!(outcome.value, 0x1234_5670);
    }

    #[test]
    fn test_empty_program_returns_argument() {
        let layout = layout();
        let outcome = evaluate(&layout, &Catalogue::default(), &Program::default(), &[42]);
        assert_eq!(outcome.value, 42);
    }

    #[test]
    fn test_wrong_argument_count_is_invalid() {
        let layout = layout();
        let catalogue = Catalogue::default();
        let program = Program::new(vec![Slot::new(op(&catalogue, "not"), &[layout.arg_start()])]);
        let invalid = Outcome { value: 0, invalid: true };
        assert_eq!(evaluate(&layout, &catalogue, &program, &[1, 2]), invalid);
        assert_eq!(evaluate(&layout, &catalogue, &Program::default(), &[]), invalid);
    }

    #[test]
    fn test_check_against_oracle_reports_first_failure() {
        let layout = layout();
        let catalogue = Catalogue::default();
        let target = Target::unary("not", |x| !x);
        let oracle = Oracle::build(&target, &TrialInputs::default(), &layout).unwrap();
        let mut file = RegisterFile::new(&layout, 1);

        let not = Program::new(vec![Slot::new(op(&catalogue, "not"), &[layout.arg_start()])]);
        assert_eq!(
            check_against_oracle(&mut file, &catalogue, &not, &oracle),
            Verdict::Match
        );

        // neg(1) == -1 != ~1, and 1 is the first trial value
        let neg = Program::new(vec![Slot::new(op(&catalogue, "neg"), &[layout.arg_start()])]);
        assert_eq!(
            check_against_oracle(&mut file, &catalogue, &neg, &oracle),
            Verdict::Mismatch { case: 0 }
        );
    }
}
