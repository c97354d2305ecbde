use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgEnum, Parser};
use mimalloc::MiMalloc;
use tracing::{info, Level};

use wordle_tree_builder::heuristic::Heuristic as LibHeuristic;
use wordle_tree_builder::{matrix::PatternMatrix, tree, Builder, WordList};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Precompute a complete decision tree that solves every admissible secret
/// within six guesses.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the SECRETS list (admissible answers). Ignored if
    /// `--single-list` is given.
    #[clap(long)]
    solutions: Option<PathBuf>,

    /// Path to the GUESSES list (admissible inputs, a superset of
    /// SECRETS). Ignored if `--single-list` is given.
    #[clap(long)]
    guesses: Option<PathBuf>,

    /// Use one file as both SECRETS and GUESSES.
    #[clap(long)]
    single_list: Option<PathBuf>,

    /// Where to write the serialized tree. If omitted, the tree is built
    /// and (optionally) verified, but nothing is written.
    #[clap(long)]
    output: Option<PathBuf>,

    /// Root guess forced at depth 0.
    #[clap(long, default_value = "trace")]
    start_word: String,

    /// Scoring mode used to rank candidate guesses below depth 0.
    #[clap(long, arg_enum, default_value = "entropy")]
    heuristic: Heuristic,

    /// Replay the built tree against every secret before writing output.
    #[clap(long)]
    verify: bool,

    /// Increase log verbosity (repeatable).
    #[clap(short = 'v', long, parse(from_occurrences))]
    verbose: u8,

    /// Decrease log verbosity (repeatable).
    #[clap(short = 'q', long, parse(from_occurrences))]
    quiet: u8,
}

#[derive(ArgEnum, Debug, Clone, Copy)]
enum Heuristic {
    Entropy,
    MinExpected,
}

impl From<Heuristic> for LibHeuristic {
    fn from(h: Heuristic) -> Self {
        match h {
            Heuristic::Entropy => LibHeuristic::Entropy,
            Heuristic::MinExpected => LibHeuristic::MinExpected,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = match (verbose as i16) - (quiet as i16) {
        i16::MIN..=-1 => Level::ERROR,
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let words = load_words(args)?;
    info!(
        solutions = words.num_secrets(),
        guesses = words.num_guesses(),
        "loaded word lists"
    );

    info!("generating pattern matrix");
    let start = Instant::now();
    let matrix = PatternMatrix::generate(&words);
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "pattern matrix generated");

    info!(start_word = %args.start_word, heuristic = ?args.heuristic, "building tree");
    let start = Instant::now();
    let mut builder = Builder::new(&words, &matrix, args.heuristic.into(), &args.start_word)?;
    let root = builder.build()?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "tree built");

    if args.verify || args.output.is_some() {
        info!("verifying tree against every secret");
        let report = tree::verify_in_memory(&root, &words)?;
        info!(
            max_depth = report.max_depth,
            average_depth = report.average_depth,
            "verification passed"
        );
    }

    if let Some(output) = &args.output {
        let bytes = tree::serialize(&root, words.checksum());
        std::fs::write(output, &bytes).map_err(|source| wordle_tree_builder::Error::SerializationIo {
            path: output.clone(),
            source,
        })?;
        info!(path = %output.display(), nodes = bytes.len(), "wrote serialized tree");
    }

    Ok(())
}

fn load_words(args: &Args) -> anyhow::Result<WordList> {
    if let Some(path) = &args.single_list {
        return Ok(WordList::load_single(path)?);
    }
    let solutions = args
        .solutions
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("--solutions is required unless --single-list is given"))?;
    let guesses = args
        .guesses
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("--guesses is required unless --single-list is given"))?;
    Ok(WordList::load(solutions, guesses)?)
}
