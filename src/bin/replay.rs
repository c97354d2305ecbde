use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn, Level};

use wordle_tree_builder::{pattern, tree::SerializedTree, WordList};

/// Load a serialized decision tree and replay it: either against one
/// supplied target word, or against every secret (printing a depth
/// histogram). This is a thin consumer of the on-disk format documented by
/// the builder, not a full interactive runtime — it exists to exercise the
/// boundary, not to reimplement play.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to a tree written by wordle-tree-builder.
    tree: PathBuf,

    #[clap(long)]
    solutions: Option<PathBuf>,

    #[clap(long)]
    guesses: Option<PathBuf>,

    #[clap(long)]
    single_list: Option<PathBuf>,

    /// Replay against this one secret and print the guess sequence.
    #[clap(long, conflicts_with = "all")]
    target: Option<String>,

    /// Replay against every secret and print a depth histogram.
    #[clap(long)]
    all: bool,

    #[clap(short = 'v', long, parse(from_occurrences))]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose > 0 { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

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
    let bytes = std::fs::read(&args.tree)?;
    let tree = SerializedTree::deserialize(&bytes)?;

    if tree.checksum != words.checksum() {
        warn!(
            tree_checksum = tree.checksum,
            word_list_checksum = words.checksum(),
            "checksum mismatch: tree was built against a different word list"
        );
    }

    if let Some(target) = &args.target {
        replay_one(&tree, &words, target)?;
    } else if args.all {
        replay_all(&tree, &words)?;
    } else {
        anyhow::bail!("pass either --target <word> or --all");
    }

    Ok(())
}

fn replay_one(tree: &SerializedTree, words: &WordList, secret: &str) -> anyhow::Result<()> {
    let mut node_index = tree.root_index;
    for turn in 1..=6 {
        let guess = &words.guesses[tree.guess(node_index) as usize];
        let p = pattern::compute(guess, secret);
        println!("{turn}: {guess}");
        if p == pattern::SOLVED {
            info!(turns = turn, "solved");
            return Ok(());
        }
        node_index = tree
            .step(node_index, p)
            .ok_or_else(|| anyhow::anyhow!("tree has no transition for pattern {p} at guess '{guess}'"))?;
    }
    anyhow::bail!("did not solve '{secret}' within six guesses");
}

fn replay_all(tree: &SerializedTree, words: &WordList) -> anyhow::Result<()> {
    let mut histogram = [0usize; 7];
    for secret in &words.secrets {
        let mut node_index = tree.root_index;
        let mut depth = 0;
        loop {
            depth += 1;
            let guess = &words.guesses[tree.guess(node_index) as usize];
            let p = pattern::compute(guess, secret);
            if p == pattern::SOLVED {
                break;
            }
            if depth >= 6 {
                anyhow::bail!("did not solve '{secret}' within six guesses");
            }
            node_index = tree
                .step(node_index, p)
                .ok_or_else(|| anyhow::anyhow!("tree has no transition for pattern {p} at guess '{guess}'"))?;
        }
        histogram[depth] += 1;
    }

    let total: usize = words.secrets.len();
    let average: f64 = histogram.iter().enumerate().map(|(d, &c)| (d * c) as f64).sum::<f64>() / total as f64;
    for (depth, count) in histogram.iter().enumerate().skip(1) {
        println!("{depth}: {count}");
    }
    println!("average: {average:.4}");
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
