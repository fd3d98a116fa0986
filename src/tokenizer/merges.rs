// src/tokenizer/merges.rs

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::tokenizer::pair::Pair;
use crate::tokenizer::word::{Symbol, Word};

/// One learned substitution: the pair and the symbol it collapses into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    pub pair: Pair,
    pub symbol: Symbol,
}

/// The ordered list of merges learned during training.
///
/// Replaying must follow insertion order: a pair can only become adjacent
/// after an earlier merge has collapsed the symbols between its halves.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeTable {
    rules: Vec<MergeRule>,
}

impl MergeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pair: Pair, symbol: Symbol) {
        self.rules.push(MergeRule { pair, symbol });
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MergeRule> {
        self.rules.iter()
    }

    /// Symbols produced by the merges, in merge order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.symbol.as_str())
    }

    /// Applies every rule, in order, to one word.
    pub fn apply_to_word(&self, word: &Word) -> Word {
        let mut current = word.clone();
        for rule in &self.rules {
            if current.len() < 2 {
                break;
            }
            current = current.merge(&rule.pair.0, &rule.pair.1, &rule.symbol);
        }
        current
    }

    pub fn apply(&self, words: &[Word]) -> Vec<Word> {
        words.iter().map(|w| self.apply_to_word(w)).collect()
    }
}

impl<'a> IntoIterator for &'a MergeTable {
    type Item = &'a MergeRule;
    type IntoIter = std::slice::Iter<'a, MergeRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Joins a pair into the `"a b"` key used on disk. Symbols never contain
/// whitespace, so the key splits back unambiguously.
pub fn pair_key(pair: &Pair) -> String {
    format!("{} {}", pair.0, pair.1)
}

/// Splits a `"a b"` key back into its pair.
pub fn parse_pair_key(key: &str) -> Option<Pair> {
    let mut parts = key.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Some((a.to_owned(), b.to_owned())),
        _ => None,
    }
}

// On disk the table is a JSON object keyed by "a b". Entries are written in
// table order and read back sequentially, so no hash map ever sees them.
impl Serialize for MergeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for rule in &self.rules {
            map.serialize_entry(&pair_key(&rule.pair), &rule.symbol)?;
        }
        map.end()
    }
}

struct MergeTableVisitor;

impl<'de> Visitor<'de> for MergeTableVisitor {
    type Value = MergeTable;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map from \"a b\" pair keys to merged symbols")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> std::result::Result<MergeTable, M::Error> {
        let mut table = MergeTable::new();
        while let Some((key, symbol)) = access.next_entry::<String, Symbol>()? {
            let pair = parse_pair_key(&key).ok_or_else(|| {
                serde::de::Error::custom(format!("merge key {key:?} is not two space-separated symbols"))
            })?;
            table.push(pair, symbol);
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for MergeTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(MergeTableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> Pair {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn replays_chained_merges_in_order() {
        let mut table = MergeTable::new();
        table.push(pair("न", "म"), "नम".into());
        table.push(pair("स", "्"), "स्".into());
        table.push(pair("नम", "स्"), "नमस्".into());

        let word = table.apply_to_word(&Word::from_chunk("नमस्ते"));
        assert_eq!(word.get_symbols(), &["नमस्", "त", "े"]);
    }

    #[test]
    fn json_keeps_insertion_order() {
        let mut table = MergeTable::new();
        table.push(pair("z", "y"), "zy".into());
        table.push(pair("a", "b"), "ab".into());
        table.push(pair("zy", "ab"), "zyab".into());

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"z y":"zy","a b":"ab","zy ab":"zyab"}"#);

        let back: MergeTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn rejects_bad_pair_key() {
        let err = serde_json::from_str::<MergeTable>(r#"{"abc":"abc"}"#);
        assert!(err.is_err());
        assert_eq!(parse_pair_key("a b c"), None);
        assert_eq!(parse_pair_key("a b"), Some(pair("a", "b")));
    }
}
