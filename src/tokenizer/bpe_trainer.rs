// src/tokenizer/bpe_trainer.rs

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::tokenizer::bpe::BPE;
use crate::tokenizer::io::read_json;
use crate::tokenizer::merges::MergeTable;
use crate::tokenizer::metrics::{
    compression_ratio, MetricsLogger, StopReason, TrainingMetrics, DEFAULT_LOG_EVERY,
};
use crate::tokenizer::pair::count_pairs;
use crate::tokenizer::pre_tokenizer::words_from_text;
use crate::tokenizer::progress::{ProgressBar, ProgressStyle};
use crate::tokenizer::vocab::Vocabulary;
use crate::tokenizer::word::{merge_words, token_count, Word};
use crate::tokenizer::{Error, Result};

fn default_vocab_size() -> usize {
    5000
}

fn default_min_frequency() -> u64 {
    2
}

fn default_show_progress() -> bool {
    true
}

fn default_log_every() -> usize {
    DEFAULT_LOG_EVERY
}

/// Training settings. Every field has a default, so a config file only needs
/// the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Training stops once the vocabulary holds this many symbols.
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,
    /// The most frequent pair must occur at least this often to be merged.
    #[serde(default = "default_min_frequency")]
    pub min_frequency: u64,
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
    /// Progress is logged every this many merges.
    #[serde(default = "default_log_every")]
    pub log_every: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            vocab_size: default_vocab_size(),
            min_frequency: default_min_frequency(),
            show_progress: default_show_progress(),
            log_every: default_log_every(),
        }
    }
}

impl TrainerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        read_json(path)
    }

    fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 {
            return Err(Error::invalid_input("vocabulary size must be positive"));
        }
        if self.log_every == 0 {
            return Err(Error::invalid_input("log_every must be positive"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct BpeTrainerBuilder {
    config: TrainerConfig,
}

impl BpeTrainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: TrainerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn min_frequency(mut self, frequency: u64) -> Self {
        self.config.min_frequency = frequency;
        self
    }

    #[must_use]
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    #[must_use]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    #[must_use]
    pub fn log_every(mut self, every: usize) -> Self {
        self.config.log_every = every;
        self
    }

    pub fn build(self) -> Result<BpeTrainer> {
        self.config.validate()?;
        Ok(BpeTrainer { config: self.config })
    }
}

/// A trained model together with the words it was trained on, split the way
/// the last merge left them.
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    pub model: BPE,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpeTrainer {
    config: TrainerConfig,
}

impl BpeTrainer {
    pub fn new(vocab_size: usize, min_frequency: u64) -> Result<Self> {
        Self::builder()
            .vocab_size(vocab_size)
            .min_frequency(min_frequency)
            .build()
    }

    pub fn builder() -> BpeTrainerBuilder {
        BpeTrainerBuilder::new()
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Whether a progress bar is drawn while training.
    pub fn should_show_progress(&self) -> bool {
        self.config.show_progress
    }

    fn setup_progress(&self) -> Option<ProgressBar> {
        if self.should_show_progress() {
            let p = ProgressBar::new(self.config.vocab_size as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {msg:<20!} {wide_bar} {pos:>7}/{len:<7}")
            {
                p.set_style(style);
            }
            p.set_message("Compute merges");
            Some(p)
        } else {
            None
        }
    }

    fn finalize_progress(&self, p: &Option<ProgressBar>, final_len: usize) {
        if let Some(p) = p {
            p.set_length(final_len as u64);
            p.set_position(final_len as u64);
            p.finish();
        }
    }

    /// Learns merges from `text`. Fails with `InvalidInput` when the text is
    /// empty or only whitespace.
    pub fn fit(&self, text: &str) -> Result<BPE> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("training text cannot be empty"));
        }
        Ok(self.train_words(words_from_text(text))?.model)
    }

    /// The training loop proper, over words that are already split into
    /// single-character symbols. Fails with `InvalidInput` when the words hold
    /// no symbols at all.
    pub fn train_words(&self, mut words: Vec<Word>) -> Result<TrainingOutput> {
        if token_count(&words) == 0 {
            return Err(Error::invalid_input("training text cannot be empty"));
        }

        let mut vocab = Vocabulary::from_alphabet(&words);
        let mut merges = MergeTable::new();
        let mut metrics = MetricsLogger::new(self.config.log_every);

        let original_tokens = token_count(&words);
        let mut current_tokens = original_tokens;
        info!(
            "training on {} words, {} symbols, alphabet of {}, target vocab {}",
            words.len(),
            original_tokens,
            vocab.len(),
            self.config.vocab_size
        );

        let progress = self.setup_progress();
        if let Some(p) = &progress {
            p.set_position(vocab.len() as u64);
        }

        let stop_reason = loop {
            if vocab.len() >= self.config.vocab_size {
                break StopReason::TargetVocabReached;
            }

            let pair_counts = count_pairs(&words);
            let Some((pair, frequency)) = pair_counts.most_frequent() else {
                break StopReason::NoPairs;
            };
            if frequency < self.config.min_frequency {
                break StopReason::BelowMinFrequency;
            }

            let pair = pair.clone();
            let new_symbol = format!("{}{}", pair.0, pair.1);
            debug!("merge {:?} + {:?} -> {:?} ({})", pair.0, pair.1, new_symbol, frequency);

            words = merge_words(&words, &pair.0, &pair.1, &new_symbol);
            vocab.add(&new_symbol);
            merges.push(pair, new_symbol.clone());
            current_tokens = token_count(&words);

            let record = TrainingMetrics {
                iteration: merges.len() - 1,
                vocab_size: vocab.len(),
                tokens: current_tokens,
                new_token: new_symbol,
                frequency,
                compression_ratio: compression_ratio(original_tokens, current_tokens),
            };
            metrics.log_iteration(&record);
            metrics.print_progress(&record, false);

            if let Some(p) = &progress {
                p.set_position(vocab.len() as u64);
            }
        };

        self.finalize_progress(&progress, vocab.len());
        metrics.set_stop_reason(stop_reason);
        metrics.print_summary(vocab.len(), current_tokens, original_tokens);

        Ok(TrainingOutput {
            model: BPE::from_parts(vocab, merges, metrics),
            words,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Model;

    const TEXT: &str = "
        नमस्ते भारत। यह एक परीक्षण वाक्य है।
        हिंदी भाषा बहुत सुंदर है।
        मैं हिंदी सीख रहा हूं।
        ";

    fn trainer(vocab_size: usize, min_frequency: u64) -> BpeTrainer {
        BpeTrainer::builder()
            .vocab_size(vocab_size)
            .min_frequency(min_frequency)
            .show_progress(false)
            .build()
            .unwrap()
    }

    #[test]
    fn zero_vocab_size_is_rejected() {
        let err = BpeTrainer::builder().vocab_size(0).build().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(BpeTrainer::new(0, 2).is_err());
    }

    #[test]
    fn empty_text_is_rejected() {
        let t = trainer(100, 2);
        assert!(matches!(t.fit(""), Err(Error::InvalidInput(_))));
        assert!(matches!(t.fit("   \n\t"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn words_without_symbols_are_rejected() {
        let t = trainer(100, 2);
        assert!(matches!(t.train_words(vec![]), Err(Error::InvalidInput(_))));
        assert!(matches!(
            t.train_words(vec![Word::new(), Word::new()]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn learns_merges_within_bound() {
        let bpe = trainer(100, 2).fit(TEXT).unwrap();
        assert!(!bpe.merges().is_empty());
        assert!(bpe.get_vocab_size() > 0);
        assert!(bpe.get_vocab_size() <= 100);
        assert_eq!(bpe.metrics().len(), bpe.merges().len());
    }

    #[test]
    fn merge_count_matches_iterations_and_replay_matches_final_words() {
        let t = trainer(100, 2);
        let output = t.train_words(words_from_text(TEXT)).unwrap();
        let model = &output.model;

        assert_eq!(model.merges().len(), model.metrics().token_logs.len());
        let replayed = model.apply_merges(&words_from_text(TEXT));
        assert_eq!(replayed, output.words);
    }

    #[test]
    fn compression_ratio_never_decreases() {
        let bpe = trainer(100, 1).fit(TEXT).unwrap();
        let ratios: Vec<f64> = bpe
            .metrics()
            .compression_logs
            .iter()
            .map(|c| c.compression_ratio)
            .collect();
        assert!(!ratios.is_empty());
        for w in ratios.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert!(ratios[0] > 1.0);
    }

    #[test]
    fn high_floor_leaves_only_the_alphabet() {
        let bpe = trainer(100, 10_000).fit(TEXT).unwrap();
        assert!(bpe.merges().is_empty());
        assert!(bpe.metrics().is_empty());
        assert_eq!(bpe.metrics().stop_reason, Some(StopReason::BelowMinFrequency));

        let alphabet = Vocabulary::from_alphabet(&words_from_text(TEXT));
        assert_eq!(bpe.vocab(), &alphabet);
    }

    #[test]
    fn stops_when_no_pairs_remain() {
        let bpe = trainer(100, 1).fit("अ ब क").unwrap();
        assert!(bpe.merges().is_empty());
        assert_eq!(bpe.metrics().stop_reason, Some(StopReason::NoPairs));
    }

    #[test]
    fn stops_at_target_vocab_size() {
        let t = trainer(3, 1);
        let bpe = t.fit("ab ab ab").unwrap();
        // alphabet {a, b} plus one merge
        assert_eq!(bpe.get_vocab_size(), 3);
        assert_eq!(bpe.metrics().stop_reason, Some(StopReason::TargetVocabReached));
    }

    #[test]
    fn alphabet_larger_than_target_makes_no_merges() {
        // five distinct characters against a target of three
        let bpe = trainer(3, 1).fit("कख कख गघङ गघङ").unwrap();
        assert!(bpe.merges().is_empty());
        assert_eq!(bpe.get_vocab_size(), 5);
        assert_eq!(bpe.metrics().stop_reason, Some(StopReason::TargetVocabReached));
        for token in bpe.encode("कख गघङ") {
            assert!(bpe.vocab().contains(&token));
        }
    }

    #[test]
    fn identical_runs_learn_identical_tables() {
        let a = trainer(80, 1).fit(TEXT).unwrap();
        let b = trainer(80, 1).fit(TEXT).unwrap();
        assert_eq!(a.merges(), b.merges());
    }

    #[test]
    fn first_recorded_merge_is_the_most_frequent_pair() {
        let bpe = trainer(100, 1).fit("ab ab cd ab cd").unwrap();
        let first = bpe.merges().iter().next().unwrap();
        assert_eq!(first.symbol, "ab");
        assert_eq!(bpe.metrics().token_logs[0].frequency, 3);
        assert_eq!(bpe.metrics().token_logs[0].iteration, 0);
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: TrainerConfig = serde_json::from_str(r#"{"vocab_size": 300}"#).unwrap();
        assert_eq!(config.vocab_size, 300);
        assert_eq!(config.min_frequency, 2);
        assert_eq!(config.log_every, DEFAULT_LOG_EVERY);
        let t = BpeTrainerBuilder::from_config(config).build().unwrap();
        assert!(t.should_show_progress());
    }
}
