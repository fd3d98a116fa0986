// src/tokenizer/bpe.rs

use std::path::Path;

use log::{debug, info};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::{Deserialize, Serialize};

use crate::tokenizer::io::{read_json, write_json, ModelPaths};
use crate::tokenizer::merges::MergeTable;
use crate::tokenizer::metrics::MetricsLogger;
use crate::tokenizer::pre_tokenizer::words_from_text;
use crate::tokenizer::vocab::Vocabulary;
use crate::tokenizer::word::{Symbol, Word};
use crate::tokenizer::{Error, Model, Result};

/// On-disk shape of a model: both fields are required.
#[derive(Serialize, Deserialize)]
struct ModelFile {
    merges: MergeTable,
    vocab: Vocabulary,
}

/// A trained (or loaded) tokenizer: the vocabulary, the ordered merge table
/// and the metrics of the run that produced them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BPE {
    vocab: Vocabulary,
    merges: MergeTable,
    metrics: MetricsLogger,
}

impl BPE {
    /// An untrained model. Encoding with it yields single characters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(vocab: Vocabulary, merges: MergeTable, metrics: MetricsLogger) -> Self {
        Self { vocab, merges, metrics }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    pub fn metrics(&self) -> &MetricsLogger {
        &self.metrics
    }

    pub fn is_trained(&self) -> bool {
        !self.vocab.is_empty()
    }

    /// Replays the merge table, in training order, over `words`.
    pub fn apply_merges(&self, words: &[Word]) -> Vec<Word> {
        self.merges.apply(words)
    }

    /// Encodes `text` keeping one symbol list per whitespace-separated word.
    pub fn encode_words(&self, text: &str) -> Vec<Vec<Symbol>> {
        self.apply_merges(&words_from_text(text))
            .into_iter()
            .map(Word::into_symbols)
            .collect()
    }

    /// Encodes `text` into a flat symbol sequence. Word boundaries are not
    /// kept; use [`BPE::encode_words`] when they matter.
    pub fn encode(&self, text: &str) -> Vec<Symbol> {
        self.encode_words(text).into_iter().flatten().collect()
    }

    /// Encodes `text` into vocabulary ids. Fails with `InvalidInput` when the
    /// text contains a character the model never saw.
    pub fn encode_ids(&self, text: &str) -> Result<Vec<u32>> {
        self.encode(text)
            .iter()
            .map(|symbol| {
                self.vocab
                    .token_to_id(symbol)
                    .ok_or_else(|| Error::invalid_input(format!("symbol {symbol:?} is not in the vocabulary")))
            })
            .collect()
    }

    /// Best-effort inverse of [`BPE::encode`].
    ///
    /// The flat sequence carries no word boundaries, so symbols are joined
    /// with single spaces. Character content and order survive; the original
    /// whitespace does not. `decode(encode(t))` equals `t` only after removing
    /// all whitespace from both sides.
    pub fn decode(&self, tokens: &[Symbol]) -> String {
        tokens.join(" ")
    }

    /// Exact inverse of [`BPE::encode_words`] up to whitespace normalization:
    /// words are rejoined with single spaces.
    pub fn decode_words(&self, words: &[Vec<Symbol>]) -> String {
        words
            .iter()
            .map(|w| w.concat())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Writes the model to `model_path` and, if given, the metrics to `stats_path`.
    pub fn save(&self, model_path: &Path, stats_path: Option<&Path>) -> Result<()> {
        let file = ModelFile {
            merges: self.merges.clone(),
            vocab: self.vocab.clone(),
        };
        write_json(model_path, &file)?;
        info!(
            "saved model with {} merges and {} symbols to {}",
            self.merges.len(),
            self.vocab.len(),
            model_path.display()
        );

        if let Some(stats_path) = stats_path {
            self.metrics.save(stats_path)?;
            debug!("saved {} metric records to {}", self.metrics.len(), stats_path.display());
        }
        Ok(())
    }

    /// Loads a model. A missing model file is `ModelNotFound`; a missing
    /// metrics file is skipped and leaves the metrics empty.
    pub fn load(model_path: &Path, stats_path: Option<&Path>) -> Result<Self> {
        let file: ModelFile = read_json(model_path)?;

        let metrics = match stats_path {
            Some(path) if path.exists() => MetricsLogger::load(path)?,
            Some(path) => {
                debug!("no metrics at {}, skipping", path.display());
                MetricsLogger::default()
            }
            None => MetricsLogger::default(),
        };

        info!(
            "loaded model with {} merges and {} symbols from {}",
            file.merges.len(),
            file.vocab.len(),
            model_path.display()
        );
        Ok(Self {
            vocab: file.vocab,
            merges: file.merges,
            metrics,
        })
    }

    pub fn save_to(&self, paths: &ModelPaths) -> Result<()> {
        self.save(&paths.model, paths.stats.as_deref())
    }

    pub fn load_from(paths: &ModelPaths) -> Result<Self> {
        Self::load(&paths.model, paths.stats.as_deref())
    }
}

impl Model for BPE {
    fn tokenize(&self, text: &str) -> Vec<Symbol> {
        self.encode(text)
    }

    fn detokenize(&self, tokens: &[Symbol]) -> String {
        self.decode(tokens)
    }

    fn id_to_token(&self, id: u32) -> Option<String> {
        self.vocab.id_to_token(id).map(str::to_string)
    }

    fn token_to_id(&self, token: &str) -> Option<u32> {
        self.vocab.token_to_id(token)
    }

    fn get_vocab_size(&self) -> usize {
        self.vocab.len()
    }

    fn get_vocab(&self) -> &HashMap<String, u32> {
        self.vocab.get_vocab()
    }
}

/// Summary of one encoding, as shown to someone inspecting a tokenization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingStats {
    pub original_chars: usize,
    pub encoded_tokens: usize,
    pub unique_tokens: usize,
    /// Characters of input per produced token; 0 when nothing was produced.
    pub compression_ratio: f64,
    /// Mean token length in characters; 0 when nothing was produced.
    pub average_token_length: f64,
}

impl EncodingStats {
    pub fn new(text: &str, tokens: &[Symbol]) -> Self {
        let original_chars = text.chars().count();
        let encoded_tokens = tokens.len();
        let unique_tokens = tokens.iter().collect::<HashSet<_>>().len();
        let token_chars: usize = tokens.iter().map(|t| t.chars().count()).sum();
        let (compression_ratio, average_token_length) = if encoded_tokens == 0 {
            (0.0, 0.0)
        } else {
            (
                original_chars as f64 / encoded_tokens as f64,
                token_chars as f64 / encoded_tokens as f64,
            )
        };
        Self {
            original_chars,
            encoded_tokens,
            unique_tokens,
            compression_ratio,
            average_token_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::bpe_trainer::BpeTrainer;

    const TEXT: &str = "
        नमस्ते भारत। यह एक परीक्षण वाक्य है।
        हिंदी भाषा बहुत सुंदर है।
        मैं हिंदी सीख रहा हूं।
        ";

    fn trained() -> BPE {
        BpeTrainer::builder()
            .vocab_size(100)
            .min_frequency(1)
            .show_progress(false)
            .build()
            .unwrap()
            .fit(TEXT)
            .unwrap()
    }

    fn strip_ws(s: &str) -> String {
        s.split_whitespace().collect()
    }

    #[test]
    fn encoded_symbols_are_in_vocab() {
        let bpe = trained();
        let encoded = bpe.encode("नमस्ते");
        assert!(!encoded.is_empty());
        for token in &encoded {
            assert!(bpe.vocab().contains(token), "{token:?} missing");
        }
        assert!(bpe.encode(TEXT).iter().all(|t| bpe.vocab().contains(t)));
    }

    #[test]
    fn decode_preserves_characters() {
        let bpe = trained();
        let decoded = bpe.decode(&bpe.encode("नमस्ते"));
        assert_eq!(strip_ws(&decoded), "नमस्ते");
        assert_eq!(strip_ws(&bpe.decode(&bpe.encode(TEXT))), strip_ws(TEXT));
    }

    #[test]
    fn word_side_channel_restores_segmentation() {
        let bpe = trained();
        let text = "हिंदी   भाषा\nबहुत सुंदर";
        let words = bpe.encode_words(text);
        assert_eq!(words.len(), 4);
        assert_eq!(bpe.decode_words(&words), "हिंदी भाषा बहुत सुंदर");
    }

    #[test]
    fn replaying_merges_twice_changes_nothing() {
        let bpe = trained();
        let once = bpe.apply_merges(&words_from_text("नमस्ते भारत"));
        let twice = bpe.apply_merges(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn untrained_model_encodes_characters() {
        let bpe = BPE::new();
        assert!(!bpe.is_trained());
        assert_eq!(bpe.encode("अब क"), vec!["अ", "ब", "क"]);
        assert!(bpe.encode_ids("अ").is_err());
    }

    #[test]
    fn ids_follow_vocabulary() {
        let bpe = trained();
        let ids = bpe.encode_ids("हिंदी").unwrap();
        let tokens: Vec<String> = ids.iter().map(|&id| bpe.id_to_token(id).unwrap()).collect();
        assert_eq!(tokens, bpe.encode("हिंदी"));
        assert!(matches!(bpe.encode_ids("xyz"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn encoding_stats_count_characters_not_bytes() {
        let tokens: Vec<Symbol> = vec!["नम".into(), "स्".into(), "ते".into(), "नम".into()];
        let stats = EncodingStats::new("नमस्तेनम", &tokens);
        assert_eq!(stats.original_chars, 8);
        assert_eq!(stats.encoded_tokens, 4);
        assert_eq!(stats.unique_tokens, 3);
        assert_eq!(stats.compression_ratio, 2.0);
        assert_eq!(stats.average_token_length, 2.0);

        let empty = EncodingStats::new("", &[]);
        assert_eq!(empty.compression_ratio, 0.0);
    }
}
