// Pretokenization: turning raw text into words of single-character symbols.

use std::sync::LazyLock;

use regex::Regex;

use crate::tokenizer::word::Word;
use crate::tokenizer::Result;

// Whitespace-free chunks. `\s` is Unicode-aware, matching `str::split_whitespace`.
pub static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+").expect("static word pattern"));

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static tag pattern"));

// Anything outside the Devanagari block, whitespace and `. , ? !`.
static NON_DEVANAGARI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x{0900}-\x{097F}\s.,?!]").expect("static script pattern"));

static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedString {
    content: String,
}

impl NormalizedString {
    pub fn new(content: &str) -> Self {
        Self { content: content.to_string() }
    }

    pub fn get(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Keeps only the matches of `pattern`, dropping the text between them.
    pub fn split_matches(&self, pattern: &Regex) -> Vec<NormalizedString> {
        pattern
            .find_iter(&self.content)
            .map(|m| NormalizedString::new(m.as_str()))
            .collect()
    }

    pub fn replace_all(&mut self, pattern: &Regex, with: &str) {
        self.content = pattern.replace_all(&self.content, with).into_owned();
    }

    pub fn trim(&mut self) {
        let trimmed = self.content.trim();
        if trimmed.len() != self.content.len() {
            self.content = trimmed.to_string();
        }
    }
}

pub struct PreTokenizedString {
    splits: Vec<NormalizedString>,
}

impl PreTokenizedString {
    pub fn new(text: &str) -> Self {
        Self {
            splits: vec![NormalizedString::new(text)],
        }
    }

    pub fn take_splits(self) -> Vec<NormalizedString> {
        self.splits
    }

    pub fn get_splits(&self) -> &[NormalizedString] {
        &self.splits
    }

    pub fn split<F>(&mut self, mut split_fn: F) -> Result<()>
    where
        F: FnMut(usize, NormalizedString) -> Result<Vec<NormalizedString>>,
    {
        let old_splits = std::mem::take(&mut self.splits);
        let mut new_splits = Vec::with_capacity(old_splits.len() * 2);
        for (i, split) in old_splits.into_iter().enumerate() {
            new_splits.extend(split_fn(i, split)?);
        }
        self.splits = new_splits;
        Ok(())
    }

    pub fn normalize<F>(&mut self, mut normalize_fn: F) -> Result<()>
    where
        F: FnMut(&mut NormalizedString) -> Result<()>,
    {
        for split in &mut self.splits {
            normalize_fn(split)?;
        }
        Ok(())
    }

    /// Explodes every split into a word of single-character symbols.
    pub fn into_words(self) -> Vec<Word> {
        self.splits
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| Word::from_chunk(s.get()))
            .collect()
    }
}

pub trait PreTokenizer {
    fn pre_tokenize(&self, pretokenized: &mut PreTokenizedString) -> Result<()>;
}

/// Splits on runs of whitespace. Whitespace itself is discarded.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WhitespaceSplit;

impl WhitespaceSplit {
    pub fn new() -> Self {
        WhitespaceSplit
    }

    /// Infallible shortcut for a single text.
    pub fn split_words(&self, text: &str) -> Vec<Word> {
        WORD_RE
            .find_iter(text)
            .map(|m| Word::from_chunk(m.as_str()))
            .collect()
    }
}

impl PreTokenizer for WhitespaceSplit {
    fn pre_tokenize(&self, pretokenized: &mut PreTokenizedString) -> Result<()> {
        let re_ref = &*WORD_RE;
        pretokenized.split(|_, normalized| Ok(normalized.split_matches(re_ref)))
    }
}

/// Corpus cleanup for scraped Hindi text: strips HTML tags, drops characters
/// outside the Devanagari block (keeping whitespace and `. , ? !`) and
/// collapses whitespace runs to a single space.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DevanagariCleaner;

impl DevanagariCleaner {
    pub fn new() -> Self {
        DevanagariCleaner
    }
}

impl PreTokenizer for DevanagariCleaner {
    fn pre_tokenize(&self, pretokenized: &mut PreTokenizedString) -> Result<()> {
        pretokenized.normalize(|normalized| {
            normalized.replace_all(&HTML_TAG_RE, " ");
            normalized.replace_all(&NON_DEVANAGARI_RE, " ");
            normalized.replace_all(&WHITESPACE_RUN_RE, " ");
            normalized.trim();
            Ok(())
        })
    }
}

/// Splits `text` into words the way both training and encoding see it.
pub fn words_from_text(text: &str) -> Vec<Word> {
    WhitespaceSplit::new().split_words(text)
}

/// Optional cleanup followed by whitespace splitting, as one pipeline.
pub fn pretokenize(text: &str, clean: bool) -> Result<Vec<Word>> {
    let mut pretokenized = PreTokenizedString::new(text);
    if clean {
        DevanagariCleaner::new().pre_tokenize(&mut pretokenized)?;
    }
    WhitespaceSplit::new().pre_tokenize(&mut pretokenized)?;
    Ok(pretokenized.into_words())
}

/// Runs the Devanagari cleanup over `text`.
pub fn clean_text(text: &str) -> Result<String> {
    let mut pretokenized = PreTokenizedString::new(text);
    DevanagariCleaner::new().pre_tokenize(&mut pretokenized)?;
    Ok(pretokenized
        .take_splits()
        .into_iter()
        .map(|ns| ns.get().to_string())
        .collect::<Vec<String>>()
        .join(" "))
}
