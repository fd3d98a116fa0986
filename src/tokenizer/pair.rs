// src/tokenizer/pair.rs

use rustc_hash::FxHashMap as HashMap;

use crate::tokenizer::word::{Symbol, Word};

/// Two symbols that sit next to each other inside one word.
pub type Pair = (Symbol, Symbol);

/// Occurrence counts of adjacent pairs, remembering the order in which each
/// pair was first seen so that frequency ties resolve the same way every run.
#[derive(Debug, Default, Clone)]
pub struct PairCounts {
    counts: HashMap<Pair, u64>,
    first_seen: Vec<Pair>,
}

impl PairCounts {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, a: &str, b: &str) {
        let key = (a.to_owned(), b.to_owned());
        match self.counts.get_mut(&key) {
            Some(count) => *count += 1,
            None => {
                self.first_seen.push(key.clone());
                self.counts.insert(key, 1);
            }
        }
    }

    pub fn get(&self, a: &str, b: &str) -> u64 {
        self.counts
            .get(&(a.to_owned(), b.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }

    /// Pairs with their counts, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pair, u64)> {
        self.first_seen
            .iter()
            .map(move |pair| (pair, self.counts.get(pair).copied().unwrap_or(0)))
    }

    /// The highest-count pair. On a tie the pair seen first wins.
    pub fn most_frequent(&self) -> Option<(&Pair, u64)> {
        let mut best: Option<(&Pair, u64)> = None;
        for (pair, count) in self.iter() {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((pair, count)),
            }
        }
        best
    }
}

/// Counts every adjacent symbol pair across `words`. Pairs never span two words.
pub fn count_pairs(words: &[Word]) -> PairCounts {
    let mut pair_counts = PairCounts::new();
    for word in words {
        for window in word.get_symbols().windows(2) {
            pair_counts.add(&window[0], &window[1]);
        }
    }
    pair_counts
}
