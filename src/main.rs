use aha::error::ConfigError;
use aha::ir::types::{DEFAULT_IMMEDIATES, DEFAULT_SHIFT_IMMEDIATES};
use aha::ir::{RegisterLayout, Word};
use aha::isa::{Catalogue, Operation, ShiftMask, DEFAULT_OPERATIONS};
use aha::report::emit::emit_tests;
use aha::report::{OutputFormat, PrintReporter, SolutionView};
use aha::search::{
    create_search, Algorithm, ParallelConfig, Problem, SearchConfig, SearchMode, SearchResult,
    DEFAULT_MAX_LENGTH,
};
use aha::validation::{
    builtin_target, spot_check, RandomInputConfig, TrialInputs, BUILTIN_TARGETS,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit status when no program was found.
const EXIT_NO_SOLUTION: i32 = 1;
/// Exit status for configuration and I/O errors.
const EXIT_CONFIG_ERROR: i32 = 2;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "aha")]
#[command(about = "aha - brute-force superoptimizer for 32-bit expressions")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Log search progress (debug level)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// CLI algorithm selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliAlgorithm {
    /// One thread, lexicographic order
    Sequential,
    /// Slot-0 subtrees spread over worker threads
    Parallel,
}

impl From<CliAlgorithm> for Algorithm {
    fn from(cli: CliAlgorithm) -> Self {
        match cli {
            CliAlgorithm::Sequential => Algorithm::Sequential,
            CliAlgorithm::Parallel => Algorithm::Parallel,
        }
    }
}

/// CLI stopping rule selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMode {
    /// Stop at the first program found
    ShortestOnly,
    /// Report every program of the shortest length found
    AllShortest,
    /// Report every program of every length up to the bound
    EnumerateAll,
}

impl From<CliMode> for SearchMode {
    fn from(cli: CliMode) -> Self {
        match cli {
            CliMode::ShortestOnly => SearchMode::ShortestOnly,
            CliMode::AllShortest => SearchMode::AllShortest,
            CliMode::EnumerateAll => SearchMode::EnumerateAll,
        }
    }
}

/// CLI output format selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliFormat {
    /// Instruction listing plus expression
    Mnemonic,
    /// Expression only
    Infix,
    /// GCC inline asm for x86
    Asm,
}

impl From<CliFormat> for OutputFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Mnemonic => OutputFormat::Mnemonic,
            CliFormat::Infix => OutputFormat::Infix,
            CliFormat::Asm => OutputFormat::Asm,
        }
    }
}

/// Instruction set options shared by `search` and `catalogue`
#[derive(clap::Args)]
struct IsaArgs {
    /// Operations to search with, in search order (default: neg,not,add,sub,and,or,xor,ror,rol,shl,shr)
    #[arg(long, value_delimiter = ',')]
    ops: Option<Vec<Operation>>,
    /// Shift amount mask: 63 (shifts by 32..63 give 0) or 31
    #[arg(long, default_value = "63")]
    shift_mask: ShiftMask,
    /// Immediate constants; must start with 0,-1,1
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_parser = parse_word)]
    immediates: Option<Vec<Word>>,
    /// Constants used as shift and rotate amounts
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_parser = parse_word)]
    shift_immediates: Option<Vec<Word>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for the shortest programs computing a target function
    Search {
        /// Built-in target to synthesize (see `aha targets`)
        #[arg(long, short)]
        target: String,
        /// Longest program to try
        #[arg(long, short = 'n', default_value_t = DEFAULT_MAX_LENGTH)]
        max_length: usize,
        /// When to stop
        #[arg(long, value_enum, default_value = "all-shortest")]
        mode: CliMode,

        #[command(flatten)]
        isa: IsaArgs,

        /// Edge-case values for the first argument
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_parser = parse_word)]
        trial_x: Option<Vec<Word>>,
        /// Edge-case values for the second argument
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_parser = parse_word)]
        trial_y: Option<Vec<Word>>,

        // --- Driver selection ---
        /// Search driver
        #[arg(long, value_enum, default_value = "sequential")]
        algorithm: CliAlgorithm,
        /// Number of worker threads (implies --algorithm parallel)
        #[arg(long, short = 'j')]
        jobs: Option<usize>,
        /// Timeout in seconds for the search
        #[arg(long)]
        timeout: Option<u64>,

        // --- Output ---
        /// How to print solutions
        #[arg(long, value_enum, default_value = "mnemonic")]
        format: CliFormat,
        /// Print the per-slot counters with each solution
        #[arg(long)]
        counters: bool,
        /// Print search statistics at the end
        #[arg(long)]
        stats: bool,
        /// Re-check each solution on this many random inputs
        #[arg(long)]
        verify_random: Option<usize>,
        /// Random seed for --verify-random
        #[arg(long)]
        seed: Option<u64>,
        /// Write a C test program per solution into this directory
        #[arg(long)]
        emit_tests: Option<PathBuf>,
    },
    /// List the built-in targets
    Targets,
    /// Show the instruction catalogue and register layout
    Catalogue {
        #[command(flatten)]
        isa: IsaArgs,
        /// Number of function arguments
        #[arg(long, default_value_t = 1)]
        args: usize,
    },
}

/// Parse a word in decimal or as a `0x` bit pattern.
fn parse_word(s: &str) -> Result<Word, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
            .map(|v| v as Word)
            .map_err(|e| format!("invalid hex word '{}': {}", s, e))
    } else {
        s.parse::<Word>()
            .map_err(|e| format!("invalid word '{}': {}", s, e))
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_layout(isa: &IsaArgs, num_args: usize) -> Result<RegisterLayout, ConfigError> {
    RegisterLayout::new(
        isa.immediates
            .clone()
            .unwrap_or_else(|| DEFAULT_IMMEDIATES.to_vec()),
        isa.shift_immediates
            .clone()
            .unwrap_or_else(|| DEFAULT_SHIFT_IMMEDIATES.to_vec()),
        num_args,
    )
}

fn build_catalogue(isa: &IsaArgs) -> Catalogue {
    let ops: &[Operation] = isa.ops.as_deref().unwrap_or(&DEFAULT_OPERATIONS);
    Catalogue::standard(ops).with_shift_mask(isa.shift_mask)
}

/// Options for the search command
struct SearchOptions {
    target: String,
    config: SearchConfig,
    isa: IsaArgs,
    trial_x: Option<Vec<Word>>,
    trial_y: Option<Vec<Word>>,
    algorithm: Algorithm,
    jobs: Option<usize>,
    format: OutputFormat,
    counters: bool,
    stats: bool,
    verify_random: Option<usize>,
    seed: Option<u64>,
    emit_tests: Option<PathBuf>,
}

// --- Commands ---

/// Returns whether any program was found.
fn run_search(options: SearchOptions) -> Result<bool, Box<dyn std::error::Error>> {
    let target = builtin_target(&options.target)?;
    let layout = build_layout(&options.isa, target.arity())?;
    let catalogue = build_catalogue(&options.isa);

    let mut trials = TrialInputs::default();
    if let Some(x) = options.trial_x {
        trials = trials.with_x(x);
    }
    if let Some(y) = options.trial_y {
        trials = trials.with_y(y);
    }

    let problem = Problem::new(layout, catalogue, target, &trials)?;
    options.config.validate()?;

    println!(
        "Searching for '{}' with at most {} instructions ({} test cases, mode {})",
        problem.target().name(),
        options.config.max_length,
        problem.oracle().len(),
        options.config.mode
    );

    let parallel = ParallelConfig::default().with_workers_option(options.jobs);
    let mut search = create_search(options.algorithm, parallel);
    let mut reporter = PrintReporter::new(options.format).with_counters(options.counters);
    let result = search.search(&problem, &options.config, &mut reporter)?;

    if options.stats {
        println!("\nSearch Statistics:");
        for line in result.statistics.format_summary().lines() {
            println!("  {}", line);
        }
    }

    if !result.found_solution() {
        if result.statistics.timed_out {
            println!("\nSearch timed out before finding a program.");
        } else {
            println!(
                "\nNo program of at most {} instructions found; try a larger --max-length.",
                options.config.max_length
            );
        }
        return Ok(false);
    }

    println!(
        "\nFound {} program(s) of length {}.",
        result.solutions.len(),
        result.shortest_length().unwrap_or(0)
    );

    if let Some(count) = options.verify_random {
        verify_solutions(&problem, &result, count, options.seed);
    }

    if let Some(dir) = options.emit_tests {
        let views: Vec<SolutionView> = result
            .solutions
            .iter()
            .map(|s| SolutionView::new(&s.program, problem.layout(), problem.catalogue()))
            .collect();
        let written = emit_tests(&dir, &views)?;
        println!("Wrote {} test program(s) to {}", written.len(), dir.display());
    }

    Ok(true)
}

fn verify_solutions(problem: &Problem, result: &SearchResult, count: usize, seed: Option<u64>) {
    let config = RandomInputConfig::default()
        .with_count(count)
        .with_seed_option(seed);
    println!("\nRandom spot check ({} inputs per program):", count);
    for (i, solution) in result.solutions.iter().enumerate() {
        let check = spot_check(
            problem.layout(),
            problem.catalogue(),
            problem.target(),
            &solution.program,
            &config,
        );
        match &check.counterexample {
            None => println!("  program {}: ok", i + 1),
            Some(cex) => {
                let expected = cex
                    .expected
                    .map_or_else(|| "undefined".to_string(), |v| v.to_string());
                println!(
                    "  program {}: differs at {:?}: expected {}, got {}{}",
                    i + 1,
                    cex.args,
                    expected,
                    cex.actual,
                    if cex.invalid { " (undefined operation)" } else { "" }
                );
            }
        }
    }
}

fn list_targets() {
    println!("Built-in targets:");
    for target in BUILTIN_TARGETS.iter() {
        println!(
            "  {:<22} {} arg{}  {}",
            target.name,
            target.arity,
            if target.arity == 1 { " " } else { "s" },
            target.description
        );
    }
}

fn show_catalogue(isa: &IsaArgs, num_args: usize) -> Result<(), ConfigError> {
    let layout = build_layout(isa, num_args)?;
    let catalogue = build_catalogue(isa);
    catalogue.validate(&layout)?;
    println!("Register layout:\n{}\n", layout);
    println!("Instruction catalogue:\n{}", catalogue);
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Search {
            target,
            max_length,
            mode,
            isa,
            trial_x,
            trial_y,
            algorithm,
            jobs,
            timeout,
            format,
            counters,
            stats,
            verify_random,
            seed,
            emit_tests,
        } => {
            let algorithm = if jobs.is_some() {
                Algorithm::Parallel
            } else {
                algorithm.into()
            };
            let config = SearchConfig::default()
                .with_max_length(max_length)
                .with_mode(mode.into())
                .with_timeout_option(timeout.map(Duration::from_secs));
            let options = SearchOptions {
                target,
                config,
                isa,
                trial_x,
                trial_y,
                algorithm,
                jobs,
                format: format.into(),
                counters,
                stats,
                verify_random,
                seed,
                emit_tests,
            };
            match run_search(options) {
                Ok(true) => {}
                Ok(false) => process::exit(EXIT_NO_SOLUTION),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(EXIT_CONFIG_ERROR);
                }
            }
        }
        Commands::Targets => list_targets(),
        Commands::Catalogue { isa, args } => {
            if let Err(e) = show_catalogue(&isa, args) {
                eprintln!("Error: {}", e);
                process::exit(EXIT_CONFIG_ERROR);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word() {
        assert_eq!(parse_word("-2"), Ok(-2));
        assert_eq!(parse_word("0x80000000"), Ok(i32::MIN));
        assert_eq!(parse_word("0xffffffff"), Ok(-1));
        assert!(parse_word("seven").is_err());
    }

    #[test]
    fn test_cli_parses_lists() {
        let args = Args::try_parse_from([
            "aha",
            "search",
            "--target",
            "dec",
            "--immediates",
            "0,-1,1,5",
            "--trial-x",
            "-3,0x10",
            "--ops",
            "neg,sub",
        ])
        .unwrap();
        match args.command {
            Commands::Search {
                isa,
                trial_x,
                ..
            } => {
                assert_eq!(isa.immediates, Some(vec![0, -1, 1, 5]));
                assert_eq!(trial_x, Some(vec![-3, 16]));
                assert_eq!(isa.ops, Some(vec![Operation::Neg, Operation::Sub]));
                assert_eq!(isa.shift_mask, ShiftMask::Mod64);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_cli_verify_command() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
