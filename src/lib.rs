//! Character-level byte-pair encoding for Hindi (and any whitespace-delimited
//! script): learn an ordered merge table from a corpus, then replay it to
//! encode new text.

pub mod tokenizer;

pub use tokenizer::{BpeTrainer, Error, Model, ModelPaths, Result, BPE};
