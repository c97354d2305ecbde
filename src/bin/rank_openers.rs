use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgEnum, Parser};
use tracing::{info, Level};

use wordle_tree_builder::candidates::CandidateSet;
use wordle_tree_builder::heuristic::{self, Heuristic as LibHeuristic};
use wordle_tree_builder::{matrix::PatternMatrix, WordList};

/// Rank every admissible guess by its C4 score over the full candidate set
/// (no search). A direct, minimal reuse of the heuristic evaluator used to
/// sanity-check candidate opening words before a full build.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(long)]
    solutions: Option<PathBuf>,

    #[clap(long)]
    guesses: Option<PathBuf>,

    #[clap(long)]
    single_list: Option<PathBuf>,

    #[clap(long, arg_enum, default_value = "entropy")]
    heuristic: Heuristic,

    #[clap(long, default_value = "100")]
    top: usize,
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
    tracing_subscriber::fmt().with_max_level(Level::INFO).with_target(false).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let words = load_words(args)?;
    info!(guesses = words.num_guesses(), "ranking openers by heuristic score");

    let matrix = PatternMatrix::generate(&words);
    let candidates = CandidateSet::full(words.num_secrets());
    let heuristic: LibHeuristic = args.heuristic.into();

    let start = Instant::now();
    let mut scored: Vec<(String, f64)> = (0..words.num_guesses())
        .map(|guess_idx| {
            let result = heuristic::evaluate(&candidates, guess_idx, &matrix, heuristic);
            (words.guesses[guess_idx].clone(), result.score)
        })
        .collect();
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "ranking calculated");

    if heuristic.higher_is_better() {
        scored.sort_unstable_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    } else {
        scored.sort_unstable_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    }

    for (word, score) in scored.iter().take(args.top) {
        println!("{word} {score:.5}");
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
