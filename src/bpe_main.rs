// src/bpe_main.rs: encodes text with a saved model and reports what happened.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::{info, LevelFilter};

use hindi_bpe::tokenizer::{EncodingStats, Error, ModelPaths, BPE};

#[derive(Parser, Debug)]
#[command(name = "bpe_main", version, about = "Encode and decode text with a trained BPE model")]
struct Cli {
    /// Text to encode; "-" reads stdin
    #[arg(short, long, conflicts_with = "file")]
    text: Option<String>,

    /// File to encode line by line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Directory holding models/hindi_bpe/model.json
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
    model_dir: PathBuf,

    /// Write encoded lines (JSON arrays) here instead of stdout
    #[arg(long, value_name = "PATH")]
    encoded_out: Option<PathBuf>,

    /// Write decoded lines here instead of stdout
    #[arg(long, value_name = "PATH")]
    decoded_out: Option<PathBuf>,

    /// Keep word boundaries when decoding
    #[arg(long, default_value_t = false)]
    words: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn load_model(dir: &Path) -> Result<BPE> {
    let paths = ModelPaths::in_dir(dir);
    match BPE::load_from(&paths) {
        Ok(bpe) if !bpe.is_trained() => bail!(
            "model not trained: {} has an empty vocabulary",
            paths.model.display()
        ),
        Ok(bpe) => Ok(bpe),
        Err(Error::ModelNotFound(path)) => bail!(
            "model not trained: nothing at {}. Train one with `hindi-bpe <corpus>` first",
            path.display()
        ),
        Err(e) => Err(e).context("failed to load model"),
    }
}

fn open_sink(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let sink: Box<dyn Write> = match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("failed to create {}", p.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    Ok(sink)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let bpe = load_model(&cli.model_dir)?;

    let lines: Vec<String> = match (&cli.text, &cli.file) {
        (Some(t), _) if t == "-" => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer.lines().map(str::to_string).collect()
        }
        (Some(t), _) => vec![t.clone()],
        (None, Some(path)) => {
            let reader = BufReader::new(
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
            );
            reader.lines().collect::<io::Result<Vec<_>>>()?
        }
        (None, None) => bail!("nothing to encode: pass --text or --file"),
    };

    let mut enc_w = open_sink(cli.encoded_out.as_deref())?;
    let mut dec_w = open_sink(cli.decoded_out.as_deref())?;

    let mut total_tokens = 0usize;
    for line in &lines {
        if line.trim().is_empty() {
            continue;
        }
        let (tokens, decoded) = if cli.words {
            let words = bpe.encode_words(line);
            let decoded = bpe.decode_words(&words);
            (words.into_iter().flatten().collect::<Vec<_>>(), decoded)
        } else {
            let tokens = bpe.encode(line);
            let decoded = bpe.decode(&tokens);
            (tokens, decoded)
        };
        total_tokens += tokens.len();

        writeln!(enc_w, "{}", serde_json::to_string(&tokens)?)?;
        writeln!(dec_w, "{}", decoded)?;

        let stats = EncodingStats::new(line, &tokens);
        info!(
            "chars {} | tokens {} | unique {} | ratio {:.2} | avg len {:.2}",
            stats.original_chars,
            stats.encoded_tokens,
            stats.unique_tokens,
            stats.compression_ratio,
            stats.average_token_length
        );
    }

    enc_w.flush()?;
    dec_w.flush()?;

    info!("total tokens: {}", total_tokens);
    Ok(())
}
