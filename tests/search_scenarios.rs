//! End-to-end searches over small problems

use aha::ir::{RegisterLayout, Slot, Word, MAXNEG};
use aha::isa::{Catalogue, InstructionDescriptor, OperandFloor, Operation};
use aha::report::CollectingReporter;
use aha::search::candidate::{is_canonical, search_space, slot_assignments, slot_choices};
use aha::search::{
    solutions, EnumerativeSearch, ParallelConfig, ParallelSearch, Problem, SearchAlgorithm,
    SearchConfig, SearchMode, Solution,
};
use aha::semantics::{check_against_oracle, evaluate, RegisterFile};
use aha::validation::{builtin_target, Target, TrialInputs};
use proptest::prelude::*;

fn shortest_only() -> SearchConfig {
    SearchConfig::default().with_mode(SearchMode::ShortestOnly)
}

fn run(problem: &Problem, config: &SearchConfig) -> Vec<Solution> {
    solutions(problem, config).unwrap().collect()
}

#[test]
fn test_not_is_one_instruction() {
    let problem = Problem::with_defaults(builtin_target("not").unwrap()).unwrap();
    let found = run(&problem, &SearchConfig::default());

    assert!(!found.is_empty());
    assert!(found.iter().all(|s| s.length() == 1));
    let not = problem.catalogue().position("not").unwrap();
    assert_eq!(
        found[0].program.slots(),
        &[Slot::new(not, &[problem.layout().arg_start()])]
    );
}

#[test]
fn test_decrement_within_two_instructions() {
    let problem = Problem::with_defaults(builtin_target("dec").unwrap()).unwrap();
    let found = run(&problem, &shortest_only().with_max_length(2));

    assert_eq!(found.len(), 1);
    assert!(found[0].length() <= 2);
    for x in [0, 1, -1, 12345, Word::MIN, Word::MAX] {
        let outcome = evaluate(problem.layout(), problem.catalogue(), &found[0].program, &[x]);
        assert!(!outcome.invalid);
        assert_eq!(outcome.value, x.wrapping_sub(1));
    }
}

#[test]
fn test_square_needs_a_multiplier() {
    let problem = Problem::with_defaults(builtin_target("square").unwrap()).unwrap();
    let config = SearchConfig::default().with_max_length(2);
    assert!(run(&problem, &config).is_empty());

    // With mul in the catalogue it is a single instruction
    let layout = RegisterLayout::default();
    let catalogue = Catalogue::new(vec![InstructionDescriptor::new(
        Operation::Mul,
        vec![OperandFloor::FirstArgument, OperandFloor::FirstArgument],
    )]);
    let problem = Problem::new(
        layout,
        catalogue,
        builtin_target("square").unwrap(),
        &TrialInputs::default(),
    )
    .unwrap();
    let found = run(&problem, &config);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].length(), 1);
}

#[test]
fn test_divide_by_immediate_zero_is_never_reported() {
    let layout = RegisterLayout::default();
    // divu x, 0 comes first in enumeration order and would store 0
    let catalogue = Catalogue::new(vec![
        InstructionDescriptor::new(
            Operation::DivU,
            vec![OperandFloor::FirstArgument, OperandFloor::Absolute(0)],
        ),
        InstructionDescriptor::new(
            Operation::And,
            vec![OperandFloor::FirstArgument, OperandFloor::Absolute(0)],
        )
        .with_commutative(false),
    ]);
    let problem = Problem::new(
        layout.clone(),
        catalogue,
        Target::unary("zero", |_| 0),
        &TrialInputs::default(),
    )
    .unwrap();

    let mut search = EnumerativeSearch::new();
    let result = search
        .search(
            &problem,
            &SearchConfig::default().with_max_length(1),
            &mut CollectingReporter::default(),
        )
        .unwrap();

    let and = problem.catalogue().position("and").unwrap();
    let programs: Vec<_> = result.solutions.iter().map(|s| s.program.clone()).collect();
    assert_eq!(programs.len(), 1);
    assert_eq!(
        programs[0].slots(),
        &[Slot::new(and, &[layout.arg_start(), 0])]
    );
    assert!(result.statistics.rejected_invalid >= 1);
}

#[test]
fn test_two_argument_rotate() {
    let problem = Problem::with_defaults(builtin_target("rotl").unwrap()).unwrap();
    let trials = TrialInputs::default();
    assert_eq!(problem.oracle().len(), trials.x.len() * trials.y.len());

    let found = run(&problem, &shortest_only());
    assert_eq!(found.len(), 1);

    let layout = problem.layout();
    let rol = problem.catalogue().position("rol").unwrap();
    assert_eq!(
        found[0].program.slots(),
        &[Slot::new(rol, &[layout.arg_start(), layout.arg_start() + 1])]
    );
}

#[test]
fn test_register_with_immediate_is_one_instruction() {
    let cases: [(&str, fn(Word) -> Word, &str, usize); 3] = [
        ("and-sign-bit", |x| x & MAXNEG, "and", 3),
        ("or-three", |x| x | 3, "or", 6),
        ("inc", |x| x.wrapping_add(1), "add", 2),
    ];
    for (name, f, op, imm) in cases {
        let problem = Problem::with_defaults(Target::unary(name, f)).unwrap();
        let found = run(&problem, &shortest_only().with_max_length(3));

        assert_eq!(found.len(), 1, "{}", name);
        assert_eq!(found[0].length(), 1, "{}", name);
        let opcode = problem.catalogue().position(op).unwrap();
        let all = run(&problem, &SearchConfig::default().with_max_length(1));
        assert!(
            all.iter()
                .any(|s| s.program.slots() == [Slot::new(opcode, &[problem.layout().arg_start(), imm])]),
            "{} missing {} x, r{}",
            name,
            op,
            imm
        );
    }
}

#[test]
fn test_commutative_pruning_loses_no_operand_pair() {
    let layout = RegisterLayout::default();
    let catalogue = Catalogue::default();
    for slot in 0..3 {
        let top = layout.highest_live(slot);
        let assignments = slot_assignments(&layout, &catalogue, slot);
        for (opcode, desc) in catalogue.descriptors().iter().enumerate() {
            if !desc.commutative {
                continue;
            }
            for a in desc.floor(0, &layout)..=top {
                for b in desc.floor(1, &layout)..=top {
                    let direct = Slot::new(opcode, &[a, b]);
                    let swapped = Slot::new(opcode, &[b, a]);
                    assert!(
                        assignments.contains(&direct) || assignments.contains(&swapped),
                        "slot {}: neither {}({}, {}) nor its swap",
                        slot,
                        desc.name(),
                        a,
                        b
                    );
                }
            }
        }
    }
}

#[test]
fn test_reported_solutions_reproduce_oracle() {
    for name in ["clear-lowest-bit", "isolate-lowest-bit", "set-lowest-clear-bit", "and-not"] {
        let problem = Problem::with_defaults(builtin_target(name).unwrap()).unwrap();
        let found = run(&problem, &SearchConfig::default().with_max_length(2));
        assert!(!found.is_empty(), "{} not found", name);

        let mut file = RegisterFile::new(problem.layout(), 2);
        for solution in &found {
            assert!(solution.program.is_well_formed(problem.layout(), problem.catalogue()));
            assert!(check_against_oracle(
                &mut file,
                problem.catalogue(),
                &solution.program,
                problem.oracle()
            )
            .is_match());
            for case in problem.oracle().cases() {
                let outcome = evaluate(
                    problem.layout(),
                    problem.catalogue(),
                    &solution.program,
                    case.args(),
                );
                assert_eq!(Some(outcome.value), problem.target().call(case.args()));
            }
        }
    }
}

#[test]
fn test_exhaustive_counters_match_closed_form() {
    let problem = Problem::with_defaults(builtin_target("square").unwrap()).unwrap();
    let config = SearchConfig::default()
        .with_max_length(2)
        .with_mode(SearchMode::EnumerateAll);
    let mut search = EnumerativeSearch::new();
    let result = search
        .search(&problem, &config, &mut CollectingReporter::default())
        .unwrap();

    let layout = problem.layout();
    let catalogue = problem.catalogue();
    let c0 = slot_choices(layout, catalogue, 0);
    let c1 = slot_choices(layout, catalogue, 1);
    let counters = &result.statistics.slot_counters;
    assert_eq!(counters.get(0), 2 * c0);
    assert_eq!(counters.get(1), c0 * c1);
    assert_eq!(
        result.statistics.candidates_evaluated,
        search_space(layout, catalogue, 1) + search_space(layout, catalogue, 2)
    );
    assert_eq!(
        result.statistics.candidates_evaluated,
        result.statistics.rejected_invalid + result.statistics.rejected_mismatch
    );
}

#[test]
fn test_parallel_agrees_with_sequential() {
    let problem = Problem::with_defaults(builtin_target("clear-lowest-bit").unwrap()).unwrap();
    let config = SearchConfig::default().with_max_length(3);

    let sequential = run(&problem, &config);
    let parallel = ParallelSearch::new(ParallelConfig::default().with_workers(4))
        .search(&problem, &config, &mut CollectingReporter::default())
        .unwrap();

    assert!(!sequential.is_empty());
    assert_eq!(parallel.solutions, sequential);
}

#[test]
fn test_search_is_deterministic() {
    let problem = Problem::with_defaults(builtin_target("isolate-lowest-bit").unwrap()).unwrap();
    let config = SearchConfig::default().with_max_length(2);
    assert_eq!(run(&problem, &config), run(&problem, &config));
}

fn any_word() -> impl Strategy<Value = Word> {
    prop_oneof![
        any::<Word>(),
        Just(0),
        Just(-1),
        Just(Word::MIN),
        Just(Word::MAX),
        -64..64,
    ]
}

proptest! {
    /// Property: swapping the operands of a commutative instruction never
    /// changes its value, so canonicalization loses no programs.
    #[test]
    fn prop_commutative_swap_is_equivalent(
        op in prop::sample::select(vec![Operation::Add, Operation::Mul, Operation::And, Operation::Or, Operation::Xor]),
        a in 0usize..12,
        b in 0usize..12,
        x in any_word(),
    ) {
        let layout = RegisterLayout::default();
        let catalogue = Catalogue::standard(&[op]);
        let forward = aha::ir::Program::new(vec![Slot::new(0, &[a, b])]);
        let swapped = aha::ir::Program::new(vec![Slot::new(0, &[b, a])]);
        prop_assert_eq!(
            evaluate(&layout, &catalogue, &forward, &[x]),
            evaluate(&layout, &catalogue, &swapped, &[x])
        );
    }

    /// Property: evaluation depends only on the program and its arguments.
    #[test]
    fn prop_evaluation_is_deterministic(
        first in 0usize..262,
        second in 0usize..377,
        x in any_word(),
    ) {
        let layout = RegisterLayout::default();
        let catalogue = Catalogue::default();
        let program = aha::ir::Program::new(vec![
            slot_assignments(&layout, &catalogue, 0)[first],
            slot_assignments(&layout, &catalogue, 1)[second],
        ]);
        let mut file = RegisterFile::new(&layout, 2);
        let once = aha::semantics::run_program(&mut file, &catalogue, &program, &[x]);
        let twice = aha::semantics::run_program(&mut file, &catalogue, &program, &[x]);
        prop_assert_eq!(once, twice);
        prop_assert_eq!(once, evaluate(&layout, &catalogue, &program, &[x]));
    }

    /// Property: every generated assignment reads only registers defined
    /// before its slot, and commutative ones are in canonical order.
    #[test]
    fn prop_assignments_are_acyclic(slot in 0usize..4, pick in any::<prop::sample::Index>()) {
        let layout = RegisterLayout::default();
        let catalogue = Catalogue::standard(&Operation::ALL);
        let assignments = slot_assignments(&layout, &catalogue, slot);
        let assignment = assignments[pick.index(assignments.len())];
        let desc = &catalogue.descriptors()[assignment.opcode];
        for j in 0..desc.arity() {
            prop_assert!(assignment.operands[j] < layout.result_start() + slot);
            prop_assert!(assignment.operands[j] >= desc.floor(j, &layout));
        }
        prop_assert!(is_canonical(desc, &layout, &assignment.operands));
    }
}
