// src/tokenizer/vocab.rs

use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::tokenizer::word::{Symbol, Word};

/// The set of symbols a model knows about. Ids follow insertion order, so the
/// initial alphabet comes first and merged symbols follow in merge order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    id2w: Vec<Symbol>,
    w2id: HashMap<Symbol, u32>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the starting alphabet from the characters of `words`, sorted by
    /// code point.
    pub fn from_alphabet(words: &[Word]) -> Self {
        let mut chars: Vec<&Symbol> = words.iter().flat_map(|w| w.get_symbols()).collect();
        // UTF-8 byte order is code point order
        chars.sort_unstable();
        chars.dedup();

        let mut vocab = Self::new();
        for symbol in chars {
            vocab.add(symbol);
        }
        vocab
    }

    /// Adds `symbol` if unseen. Returns `true` when the vocabulary grew.
    pub fn add(&mut self, symbol: &str) -> bool {
        if self.w2id.contains_key(symbol) {
            return false;
        }
        let id = self.id2w.len() as u32;
        self.id2w.push(symbol.to_owned());
        self.w2id.insert(symbol.to_owned(), id);
        true
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.w2id.contains_key(symbol)
    }

    pub fn token_to_id(&self, symbol: &str) -> Option<u32> {
        self.w2id.get(symbol).copied()
    }

    pub fn id_to_token(&self, id: u32) -> Option<&str> {
        self.id2w.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.id2w.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2w.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.id2w.iter().map(String::as_str)
    }

    pub fn get_vocab(&self) -> &HashMap<Symbol, u32> {
        &self.w2id
    }
}

// Persisted as a plain list of symbols; the list position is the id.
impl Serialize for Vocabulary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.id2w.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vocabulary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let symbols = Vec::<Symbol>::deserialize(deserializer)?;
        let mut vocab = Vocabulary::new();
        for symbol in &symbols {
            vocab.add(symbol);
        }
        Ok(vocab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_is_sorted_and_distinct() {
        let words = vec![Word::from_chunk("cab"), Word::from_chunk("ba")];
        let vocab = Vocabulary::from_alphabet(&words);
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(vocab.token_to_id("c"), Some(2));
    }

    #[test]
    fn add_ignores_duplicates() {
        let mut vocab = Vocabulary::new();
        assert!(vocab.add("नम"));
        assert!(!vocab.add("नम"));
        assert_eq!(vocab.len(), 1);
        assert_eq!(vocab.id_to_token(0), Some("नम"));
        assert_eq!(vocab.id_to_token(1), None);
    }

    #[test]
    fn serializes_as_ordered_list() {
        let mut vocab = Vocabulary::new();
        vocab.add("b");
        vocab.add("a");
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"["b","a"]"#);
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vocab);
    }
}
