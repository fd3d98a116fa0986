// src/tokenizer/metrics.rs

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::tokenizer::io::{read_json, write_json};
use crate::tokenizer::word::Symbol;
use crate::tokenizer::Result;

pub const DEFAULT_LOG_EVERY: usize = 500;

/// Everything observed about one accepted merge.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingMetrics {
    pub iteration: usize,
    pub vocab_size: usize,
    pub tokens: usize,
    pub new_token: Symbol,
    pub frequency: u64,
    pub compression_ratio: f64,
}

/// Structural half of an iteration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLog {
    pub iteration: usize,
    pub vocab_size: usize,
    pub tokens: usize,
    pub new_token: Symbol,
    pub frequency: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionLog {
    pub iteration: usize,
    pub compression_ratio: f64,
}

/// Why the training loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TargetVocabReached,
    NoPairs,
    BelowMinFrequency,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            StopReason::TargetVocabReached => write!(f, "target vocabulary size reached"),
            StopReason::NoPairs => write!(f, "no adjacent pairs left"),
            StopReason::BelowMinFrequency => write!(f, "best pair below minimum frequency"),
        }
    }
}

fn default_log_every() -> usize {
    DEFAULT_LOG_EVERY
}

/// Append-only record of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsLogger {
    pub token_logs: Vec<TokenLog>,
    pub compression_logs: Vec<CompressionLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    #[serde(skip, default = "default_log_every")]
    log_every: usize,
}

impl Default for MetricsLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_EVERY)
    }
}

impl MetricsLogger {
    /// `log_every` is the reporting cadence in iterations; 0 is treated as 1.
    pub fn new(log_every: usize) -> Self {
        Self {
            token_logs: Vec::new(),
            compression_logs: Vec::new(),
            stop_reason: None,
            log_every: log_every.max(1),
        }
    }

    pub fn log_every(&self) -> usize {
        self.log_every
    }

    pub fn log_iteration(&mut self, metrics: &TrainingMetrics) {
        self.token_logs.push(TokenLog {
            iteration: metrics.iteration,
            vocab_size: metrics.vocab_size,
            tokens: metrics.tokens,
            new_token: metrics.new_token.clone(),
            frequency: metrics.frequency,
        });
        self.compression_logs.push(CompressionLog {
            iteration: metrics.iteration,
            compression_ratio: metrics.compression_ratio,
        });
    }

    pub fn set_stop_reason(&mut self, reason: StopReason) {
        self.stop_reason = Some(reason);
    }

    pub fn len(&self) -> usize {
        self.token_logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_logs.is_empty()
    }

    pub fn last_compression_ratio(&self) -> Option<f64> {
        self.compression_logs.last().map(|c| c.compression_ratio)
    }

    /// Reports `metrics` when its iteration falls on the cadence, or always
    /// when `force` is set.
    pub fn print_progress(&self, metrics: &TrainingMetrics, force: bool) {
        if force || metrics.iteration % self.log_every == 0 {
            info!(
                "iteration {:>6} | vocab {:>6} | ratio {:>6.2} | tokens {:>9} | new {:?} (freq {})",
                metrics.iteration,
                metrics.vocab_size,
                metrics.compression_ratio,
                metrics.tokens,
                metrics.new_token,
                metrics.frequency
            );
        }
    }

    /// Final report. Works from whatever was logged, including nothing at all.
    pub fn print_summary(&self, vocab_size: usize, tokens: usize, original_tokens: usize) {
        let ratio = compression_ratio(original_tokens, tokens);
        let reason = self
            .stop_reason
            .map(|r| r.to_string())
            .unwrap_or_else(|| "not recorded".to_string());
        match self.token_logs.last() {
            Some(last) => info!(
                "training finished after {} merges ({}) | vocab {} | ratio {:.2} | tokens {} | last new {:?} (freq {})",
                self.token_logs.len(),
                reason,
                vocab_size,
                ratio,
                tokens,
                last.new_token,
                last.frequency
            ),
            None => info!(
                "training finished without merges ({}) | vocab {} | tokens {}",
                reason, vocab_size, tokens
            ),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }
}

/// `original / current`, with an empty current count reported as 1.0.
pub fn compression_ratio(original_tokens: usize, current_tokens: usize) -> f64 {
    if current_tokens == 0 {
        1.0
    } else {
        original_tokens as f64 / current_tokens as f64
    }
}
