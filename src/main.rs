// main.rs: trains a model from a plain-text corpus and saves it.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::{info, LevelFilter};

use hindi_bpe::tokenizer::{pretokenize, BpeTrainerBuilder, ModelPaths, TrainerConfig};

#[derive(Parser, Debug)]
#[command(name = "hindi-bpe", version, about = "Train a character-level BPE tokenizer")]
struct Cli {
    /// Plain-text corpus to train on
    corpus: PathBuf,

    /// Directory that receives models/hindi_bpe/model.json and stats/hindi_bpe/metrics.json
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// JSON file with trainer settings; flags below override it
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Target vocabulary size
    #[arg(long, value_name = "SIZE")]
    vocab_size: Option<usize>,

    /// Minimum pair frequency worth a merge
    #[arg(long, value_name = "COUNT")]
    min_frequency: Option<u64>,

    /// Log progress every N merges
    #[arg(long, value_name = "N")]
    log_every: Option<usize>,

    /// Strip markup and non-Devanagari characters before training
    #[arg(long, default_value_t = false)]
    clean: bool,

    /// Disable the progress bar
    #[arg(long, default_value_t = false)]
    no_progress: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, action = ArgAction::Count)]
    quiet: u8,
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = match (quiet, verbose) {
        (0, 0) => LevelFilter::Info,
        (0, 1) => LevelFilter::Debug,
        (0, _) => LevelFilter::Trace,
        (1, _) => LevelFilter::Warn,
        _ => LevelFilter::Error,
    };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // --- Configuration ---
    let mut config = match &cli.config {
        Some(path) => TrainerConfig::from_file(path)
            .with_context(|| format!("failed to read trainer config {}", path.display()))?,
        None => TrainerConfig::default(),
    };
    if let Some(size) = cli.vocab_size {
        config.vocab_size = size;
    }
    if let Some(freq) = cli.min_frequency {
        config.min_frequency = freq;
    }
    if let Some(every) = cli.log_every {
        config.log_every = every;
    }
    if cli.no_progress {
        config.show_progress = false;
    }
    let trainer = BpeTrainerBuilder::from_config(config).build()?;

    // --- 1. Load corpus ---
    let text = fs::read_to_string(&cli.corpus)
        .with_context(|| format!("failed to read corpus {}", cli.corpus.display()))?;
    info!(
        "loaded {} characters ({} distinct) from {}",
        text.chars().count(),
        text.chars().collect::<std::collections::HashSet<_>>().len(),
        cli.corpus.display()
    );

    // --- 2. Train ---
    let words = pretokenize(&text, cli.clean)?;
    let output = trainer.train_words(words)?;
    info!(
        "{} words end as {} tokens, compression {:.2}",
        output.words.len(),
        output.words.iter().map(|w| w.len()).sum::<usize>(),
        output.model.metrics().last_compression_ratio().unwrap_or(1.0)
    );
    let bpe = output.model;

    // --- 3. Save ---
    let paths = ModelPaths::in_dir(&cli.output_dir);
    bpe.save_to(&paths)?;

    // --- 4. Smoke test ---
    let sample = "आप कैसे हैं?";
    let encoded = bpe.encode(sample);
    info!("sample {:?} -> {:?} -> {:?}", sample, encoded, bpe.decode(&encoded));
    Ok(())
}
