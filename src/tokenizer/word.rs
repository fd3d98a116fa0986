// src/tokenizer/word.rs

/// An atomic unit of the vocabulary: a single character or the concatenation
/// of two earlier symbols.
pub type Symbol = String;

/// A whitespace-free chunk of text, stored as the sequence of symbols it is
/// currently split into.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Word {
    pub symbols: Vec<Symbol>,
}

impl Word {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explodes a chunk into one symbol per character.
    pub fn from_chunk(chunk: &str) -> Self {
        Self {
            symbols: chunk.chars().map(String::from).collect(),
        }
    }

    pub fn from_symbols<I: IntoIterator<Item = Symbol>>(symbols: I) -> Self {
        Self {
            symbols: symbols.into_iter().collect(),
        }
    }

    pub fn add(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    pub fn get_symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns a copy of this word with every non-overlapping occurrence of the
    /// adjacent pair (`a`, `b`), scanned left to right, replaced by `new_symbol`.
    ///
    /// Matching is on whole symbols: a longer symbol that merely contains the
    /// characters of `a` or `b` never matches.
    pub fn merge(&self, a: &str, b: &str, new_symbol: &str) -> Word {
        let mut merged = Vec::with_capacity(self.symbols.len());
        let mut i = 0;
        while i < self.symbols.len() {
            if i + 1 < self.symbols.len() && self.symbols[i] == a && self.symbols[i + 1] == b {
                merged.push(new_symbol.to_owned());
                i += 2;
            } else {
                merged.push(self.symbols[i].clone());
                i += 1;
            }
        }
        Word { symbols: merged }
    }
}

/// Applies one merge to every word. The input is left untouched.
pub fn merge_words(words: &[Word], a: &str, b: &str, new_symbol: &str) -> Vec<Word> {
    words.iter().map(|word| word.merge(a, b, new_symbol)).collect()
}

/// Total number of symbols across `words`.
pub fn token_count(words: &[Word]) -> usize {
    words.iter().map(Word::len).sum()
}
