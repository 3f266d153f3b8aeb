//! Bidirectional word ↔ id table.

use std::collections::HashMap;
use std::io::BufRead;

use tracing::warn;

use crate::error::{Error, Result};

/// Ordered vocabulary. A word's id is its position.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build from an ordered list of words.
    ///
    /// Duplicate entries keep their own id, but lookups by string resolve to
    /// the first occurrence.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::default();
        for word in words {
            vocab.push(word.into());
        }
        vocab
    }

    /// Read one word per line; the line number (from 0) is the id.
    ///
    /// Trailing `\r` is stripped; every other character is kept, so a blank
    /// line is a legitimate (empty) word.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut vocab = Self::default();
        for line in reader.lines() {
            let line = line?;
            vocab.push(line.trim_end_matches('\r').to_string());
        }
        if vocab.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(vocab)
    }

    fn push(&mut self, word: String) {
        let id = self.words.len();
        if self.index.contains_key(&word) {
            warn!(word = %word, id, "duplicate vocabulary entry; lookups resolve to the first id");
        } else {
            let _ = self.index.insert(word.clone(), id);
        }
        self.words.push(word);
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True if there are no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word for `id`.
    pub fn get(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    /// Id for `word`.
    pub fn id_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Iterate words in id order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}
