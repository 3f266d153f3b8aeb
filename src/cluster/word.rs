//! Per-word bigram counts and the frequency order words are seeded in.

use std::cmp::Ordering;

use crate::counts::CountVector;
use crate::vocab::Vocabulary;

/// Vocabulary id.
pub type WordId = usize;

/// A word's co-occurrence counts on one side, keyed by ids of the other side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Word {
    index: WordId,
    counts: CountVector,
}

impl Word {
    /// Empty counts for vocabulary id `index`.
    pub fn new(index: WordId) -> Self {
        Self {
            index,
            counts: CountVector::new(),
        }
    }

    /// Vocabulary id.
    pub fn index(&self) -> WordId {
        self.index
    }

    /// Total occurrences in this role.
    pub fn total(&self) -> u64 {
        self.counts.total()
    }

    /// Counts keyed by the other side.
    pub fn counts(&self) -> &CountVector {
        &self.counts
    }

    /// Mutable counts.
    pub fn counts_mut(&mut self) -> &mut CountVector {
        &mut self.counts
    }

    /// The word's string.
    pub fn name<'v>(&self, vocab: &'v Vocabulary) -> Option<&'v str> {
        vocab.get(self.index)
    }

    /// Frequency order: descending total, ascending id on ties.
    pub fn frequency_cmp(&self, other: &Self) -> Ordering {
        other.cmp(self)
    }
}

impl PartialOrd for Word {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Word {}

/// Orders by `(total, reversed index)` so that the maximum is the most
/// frequent word, lowest id first among equals.
impl Ord for Word {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total()
            .cmp(&other.total())
            .then_with(|| other.index.cmp(&self.index))
    }
}
