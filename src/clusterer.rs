//! End-to-end driver: vocabulary and bigrams in, bit strings out.

use std::io::{BufRead, Write};

use tracing::info;

use crate::cluster::{ClusterConfig, ClusterEngine, WordId};
use crate::error::{Error, Result};
use crate::hierarchy::ClassTree;
use crate::vocab::Vocabulary;

/// Owns a [`Vocabulary`] and the [`ClusterEngine`] sized to it.
///
/// ```rust
/// use miclass::{ClusterConfig, Clusterer};
///
/// let vocab = "a\nb\nc\nd\n";
/// let bigrams = "0 1 10\n1 0 10\n2 3 10\n3 2 10\n";
/// let config = ClusterConfig::new(2).with_min_class_size(0);
/// let clusterer = Clusterer::from_readers(vocab.as_bytes(), bigrams.as_bytes(), config).unwrap();
/// let output = clusterer.cluster().unwrap();
///
/// let mut out = Vec::new();
/// output.write_bits(&mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap().lines().count(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Clusterer {
    vocab: Vocabulary,
    engine: ClusterEngine,
}

impl Clusterer {
    /// Clusterer over `vocab`.
    pub fn new(vocab: Vocabulary, config: ClusterConfig) -> Result<Self> {
        if vocab.is_empty() {
            return Err(Error::EmptyInput);
        }
        let engine = ClusterEngine::new(vocab.len(), config)?;
        Ok(Self { vocab, engine })
    }

    /// Read a vocabulary (one word per line) and a bigram stream
    /// (`history future count` per line).
    pub fn from_readers<V: BufRead, B: BufRead>(
        vocab: V,
        bigrams: B,
        config: ClusterConfig,
    ) -> Result<Self> {
        let mut clusterer = Self::new(Vocabulary::from_reader(vocab)?, config)?;
        let loaded = clusterer.load_bigrams(bigrams)?;
        info!(
            words = clusterer.vocab.len(),
            bigrams = loaded,
            mass = clusterer.engine.total_mass(),
            "inputs loaded"
        );
        Ok(clusterer)
    }

    /// Record one bigram by id.
    pub fn add_bigram(&mut self, history: WordId, future: WordId, count: u64) -> Result<()> {
        self.engine.add_bigram(history, future, count)
    }

    /// Record one bigram by word. Unknown words are an error.
    pub fn add_bigram_words(&mut self, history: &str, future: &str, count: u64) -> Result<()> {
        let lookup = |w: &str| {
            self.vocab
                .id_of(w)
                .ok_or_else(|| Error::UnknownWord(w.to_string()))
        };
        let (h, f) = (lookup(history)?, lookup(future)?);
        self.engine.add_bigram(h, f, count)
    }

    /// Read bigram triples; see [`ClusterEngine::load_bigrams`].
    pub fn load_bigrams<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        self.engine.load_bigrams(reader)
    }

    /// The vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// The underlying engine.
    pub fn engine(&self) -> &ClusterEngine {
        &self.engine
    }

    /// Build the top-level classes without building the tree.
    pub fn build_classes(&mut self) -> Result<()> {
        self.engine.build_classes()
    }

    /// Dump the top-level classes as `class_id<TAB>word` lines.
    pub fn write_classes<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.engine.build_classes()?;
        self.engine.write_classes(&self.vocab, out)
    }

    /// Run the whole pipeline.
    pub fn cluster(self) -> Result<ClusterOutput> {
        let tree = self.engine.cluster()?;
        Ok(ClusterOutput {
            vocab: self.vocab,
            tree,
        })
    }
}

/// Finished tree together with the vocabulary that names its leaves.
#[derive(Debug, Clone)]
pub struct ClusterOutput {
    vocab: Vocabulary,
    tree: ClassTree,
}

impl ClusterOutput {
    /// The class tree.
    pub fn tree(&self) -> &ClassTree {
        &self.tree
    }

    /// The vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Bit string per word id.
    pub fn bit_strings(&self) -> Vec<String> {
        self.tree.bit_strings()
    }

    /// Bit string of `word`, if it is in the vocabulary.
    pub fn bits_of(&self, word: &str) -> Option<String> {
        let id = self.vocab.id_of(word)?;
        self.tree.bit_strings().into_iter().nth(id)
    }

    /// Write `bits<TAB>word` lines in leaf order.
    pub fn write_bits<W: Write>(&self, out: &mut W) -> Result<()> {
        self.tree.write_bits(&self.vocab, out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn abcd() -> Clusterer {
        let vocab = Vocabulary::from_words(["a", "b", "c", "d"]);
        let mut c = Clusterer::new(vocab, ClusterConfig::new(2).with_min_class_size(0)).unwrap();
        for (h, f) in [("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")] {
            c.add_bigram_words(h, f, 10).unwrap();
        }
        c
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        assert!(matches!(
            Clusterer::new(Vocabulary::default(), ClusterConfig::new(1)),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn unknown_word_is_rejected() {
        let mut c = abcd();
        assert!(matches!(
            c.add_bigram_words("a", "zzz", 1),
            Err(Error::UnknownWord(w)) if w == "zzz"
        ));
    }

    #[test]
    fn cliques_share_their_first_bit() {
        let out = abcd().cluster().unwrap();
        let (a, b, c, d) = (
            out.bits_of("a").unwrap(),
            out.bits_of("b").unwrap(),
            out.bits_of("c").unwrap(),
            out.bits_of("d").unwrap(),
        );
        assert_eq!(a.len(), 2);
        assert_eq!(a[..1], b[..1]);
        assert_eq!(c[..1], d[..1]);
        assert_ne!(a[..1], c[..1]);
        assert_ne!(a, b);
        assert!(out.bits_of("e").is_none());
    }

    #[test]
    fn class_dump_has_one_line_per_word() {
        let mut c = abcd();
        let mut out = Vec::new();
        c.write_classes(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let words: Vec<&str> = text.lines().filter_map(|l| l.split('\t').nth(1)).collect();
        assert_eq!(words.len(), 4);
        assert!(["a", "b", "c", "d"].iter().all(|w| words.contains(w)));
    }
}
