// src/tokenizer/mod.rs

pub mod bpe;
pub mod bpe_trainer;
pub mod io;
pub mod merges;
pub mod metrics;
pub mod pair;
pub mod pre_tokenizer;
pub mod progress;
pub mod result;
pub mod vocab;
pub mod word;

pub use bpe::{EncodingStats, BPE};
pub use bpe_trainer::{BpeTrainer, BpeTrainerBuilder, TrainerConfig, TrainingOutput};
pub use io::ModelPaths;
pub use merges::{MergeRule, MergeTable};
pub use metrics::{CompressionLog, MetricsLogger, StopReason, TokenLog, TrainingMetrics};
pub use pair::{count_pairs, Pair, PairCounts};
pub use pre_tokenizer::{
    clean_text, pretokenize, words_from_text, DevanagariCleaner, PreTokenizedString, PreTokenizer,
    WhitespaceSplit,
};
pub use result::{Error, Result};
pub use vocab::Vocabulary;
pub use word::{merge_words, Symbol, Word};

/// What a trained tokenizer offers its consumers.
pub trait Model {
    /// Splits `text` into vocabulary symbols.
    fn tokenize(&self, text: &str) -> Vec<Symbol>;

    /// Turns symbols back into (approximate) text.
    fn detokenize(&self, tokens: &[Symbol]) -> String;

    fn id_to_token(&self, id: u32) -> Option<String>;

    fn token_to_id(&self, token: &str) -> Option<u32>;

    fn get_vocab_size(&self) -> usize;

    fn get_vocab(&self) -> &rustc_hash::FxHashMap<String, u32>;
}
