//! Clustering engine: state, seeding and resynchronization.

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use super::config::ClusterConfig;
use super::side::{Side, SideKind, SidePair};
use super::word::WordId;
use crate::counts::NLogN;
use crate::error::{Error, Result};
use crate::hierarchy::{ClassTree, Dendrogram};
use crate::vocab::Vocabulary;

/// Brown-style mutual-information clustering over one vocabulary.
///
/// The engine owns two mirrored [`Side`]s. Word counts on each side are keyed
/// by the other side's ids, so the partitions are mutually dependent: after
/// any structural change, [`ClusterEngine::setup_classes`] must run before one
/// side reads the other's class-collapsed counts.
///
/// ```rust
/// use miclass::{ClusterConfig, ClusterEngine};
///
/// let mut engine = ClusterEngine::new(4, ClusterConfig::new(2).with_min_class_size(0)).unwrap();
/// for (h, f) in [(0, 1), (1, 0), (2, 3), (3, 2)] {
///     engine.add_bigram(h, f, 10).unwrap();
/// }
/// let tree = engine.cluster().unwrap();
/// let bits = tree.bit_strings();
/// assert_eq!(bits[0].chars().next(), bits[1].chars().next());
/// assert_ne!(bits[0].chars().next(), bits[2].chars().next());
/// ```
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    pub(crate) config: ClusterConfig,
    pub(crate) nlogn: NLogN,
    pub(crate) sides: SidePair,
    pub(crate) dendrogram: Dendrogram,
    total_mass: u64,
    classes_built: bool,
}

impl ClusterEngine {
    /// Engine for a vocabulary of `vocab_size` words.
    pub fn new(vocab_size: usize, config: ClusterConfig) -> Result<Self> {
        if vocab_size == 0 {
            return Err(Error::EmptyInput);
        }
        config.validate(vocab_size)?;
        let nlogn = NLogN::new(config.nlogn_table_size);
        Ok(Self {
            config,
            nlogn,
            sides: SidePair::new(vocab_size),
            dendrogram: Dendrogram::default(),
            total_mass: 0,
            classes_built: false,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.sides.history.vocab_size()
    }

    /// Total bigram mass loaded.
    pub fn total_mass(&self) -> u64 {
        self.total_mass
    }

    /// State of one role.
    pub fn side(&self, kind: SideKind) -> &Side {
        self.sides.get(kind)
    }

    /// Record `count` occurrences of `history` followed by `future`.
    pub fn add_bigram(&mut self, history: WordId, future: WordId, count: u64) -> Result<()> {
        let vocab_size = self.vocab_size();
        for id in [history, future] {
            if id >= vocab_size {
                return Err(Error::WordOutOfRange { id, vocab_size });
            }
        }
        self.sides.history.words[history]
            .counts_mut()
            .add(future, count);
        self.sides.future.words[future]
            .counts_mut()
            .add(history, count);
        self.total_mass += count;
        Ok(())
    }

    /// Read `history future count` triples, one per line. Blank lines and
    /// lines starting with `#` are skipped. Returns the number of bigrams read.
    pub fn load_bigrams<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut loaded = 0;
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (history, future, count) = parse_triple(trimmed, n + 1)?;
            if count == 0 {
                warn!(line = n + 1, "skipping zero-count bigram");
                continue;
            }
            self.add_bigram(history, future, count)?;
            loaded += 1;
        }
        debug!(loaded, mass = self.total_mass, "bigrams loaded");
        Ok(loaded)
    }

    /// Seed, absorb, mirror and reclassify: leaves `num_classes` top-level
    /// classes on both sides, synchronized.
    pub fn build_classes(&mut self) -> Result<()> {
        if self.classes_built {
            return Ok(());
        }
        if self.total_mass == 0 {
            return Err(Error::EmptyInput);
        }
        self.sort_words();
        self.setup_seed_classes()?;
        self.absorb_remaining_words()?;
        self.mirror_to_future();
        self.setup_classes();
        info!(
            classes = self.sides.history.frontier.len(),
            ami = self.average_mutual_information(),
            "seed classes built"
        );

        let gain = self.reclassify();
        info!(
            gain,
            ami = self.average_mutual_information(),
            "reclassification finished"
        );
        self.classes_built = true;
        Ok(())
    }

    /// Run every phase and hand back the finished tree.
    pub fn cluster(mut self) -> Result<ClassTree> {
        self.build_classes()?;
        let top_level = self.sides.history.frontier.classes();
        self.split_classes()?;
        let root = self.merge_frontier()?;
        info!(
            root,
            merges = self.dendrogram.n_merges(),
            "class tree complete"
        );
        let history = self.sides.history;
        Ok(ClassTree::new(
            history.classes,
            root,
            top_level,
            self.dendrogram,
            history.words.len(),
        ))
    }

    /// Top-level classes (member word ids), in frontier order.
    pub fn classes(&self) -> Vec<Vec<WordId>> {
        let h = &self.sides.history;
        h.frontier
            .classes()
            .into_iter()
            .map(|c| h.class(c).members().to_vec())
            .collect()
    }

    /// Dump the top-level classes as `class_id<TAB>word` lines.
    pub fn write_classes<W: Write>(&self, vocab: &Vocabulary, out: &mut W) -> Result<()> {
        let h = &self.sides.history;
        for c in h.frontier.classes() {
            for &w in h.class(c).members() {
                writeln!(out, "{}\t{}", c, vocab.get(w).unwrap_or_default())?;
            }
        }
        Ok(())
    }

    /// Average mutual information (bits) between adjacent classes, computed
    /// from the synchronized class counts.
    pub fn average_mutual_information(&self) -> f64 {
        if self.total_mass == 0 {
            return 0.0;
        }
        let l = &self.nlogn;
        let h = &self.sides.history;
        let f = &self.sides.future;
        let rows: f64 = h
            .frontier
            .classes()
            .into_iter()
            .map(|c| h.class(c).counts().mi_contribution(l))
            .sum();
        let cols: f64 = f
            .frontier
            .classes()
            .into_iter()
            .map(|c| l.get(f.class(c).counts().total()))
            .sum();
        (rows - cols + l.get(self.total_mass)) / self.total_mass as f64
    }

    pub(crate) fn sort_words(&mut self) {
        self.sides.history.sort_words();
        self.sides.future.sort_words();
    }

    /// The `num_classes` most frequent history words become singleton classes.
    pub(crate) fn setup_seed_classes(&mut self) -> Result<()> {
        let k = self.config.num_classes;
        let h = &mut self.sides.history;
        h.reset_frontier(k + 1);
        for slot in 0..k {
            let w = h.sorted_words[slot];
            let id = h.alloc_class()?;
            h.classes[id].add_word(w, h.words[w].counts());
            h.word_to_class[w] = id;
            h.frontier.place(slot, id);
        }
        debug!(seeds = k, "seed classes placed");
        Ok(())
    }

    /// Every remaining history word enters the vacant frontier slot as a
    /// singleton and the frontier is immediately reduced back to
    /// `num_classes` classes.
    ///
    /// Frequent words trigger a full pairwise search over the cached losses
    /// (any two classes may merge); rare words are merged straight into the
    /// cheapest existing class.
    pub(crate) fn absorb_remaining_words(&mut self) -> Result<()> {
        let k = self.config.num_classes;
        let min_class_size = self.config.min_class_size;
        let l = &self.nlogn;
        let h = &mut self.sides.history;
        let mut vacant = k;
        let (mut high, mut low) = (0usize, 0usize);

        for rank in k..h.sorted_words.len() {
            let w = h.sorted_words[rank];
            let id = h.alloc_class()?;
            h.classes[id].add_word(w, h.words[w].counts());
            h.word_to_class[w] = id;
            h.frontier.place(vacant, id);
            h.loss.invalidate(vacant);

            if h.words[w].total() > min_class_size {
                high += 1;
                let classes = &h.classes;
                let best = h.loss.select_best(&h.frontier, |a, b| {
                    -classes[a].counts().merge_mi_change(classes[b].counts(), l)
                });
                if let Some((keep, gone, _)) = best {
                    absorb_slot(h, keep, gone);
                    vacant = gone;
                }
            } else {
                low += 1;
                let mut best: Option<(usize, f64)> = None;
                for (slot, c) in h.frontier.occupied() {
                    if slot == vacant {
                        continue;
                    }
                    let loss = -h.classes[c].counts().merge_mi_change(h.classes[id].counts(), l);
                    if best.map_or(true, |(_, b)| loss < b) {
                        best = Some((slot, loss));
                    }
                }
                if let Some((keep, _)) = best {
                    absorb_slot(h, keep, vacant);
                }
            }
        }
        debug!(high, low, "remaining words absorbed");
        Ok(())
    }

    /// Copy the history partition onto the future side, class id for class id.
    pub(crate) fn mirror_to_future(&mut self) {
        let h = &self.sides.history;
        let f = &mut self.sides.future;
        f.mirror_arena(h);
        for (slot, c) in h.frontier.occupied() {
            f.frontier.place(slot, c);
            for &w in h.classes[c].members() {
                f.classes[c].add_word(w, f.words[w].counts());
                f.word_to_class[w] = c;
            }
        }
    }

    /// Resync barrier: rebuild both partitions' word→class maps, re-key every
    /// word's counts by the other side's classes, and rebuild class counts
    /// with dense mirrors sized to the class-id space.
    pub(crate) fn setup_classes(&mut self) {
        for kind in [SideKind::History, SideKind::Future] {
            let side = self.sides.get_mut(kind);
            for c in side.frontier.classes() {
                for &w in side.classes[c].members() {
                    side.word_to_class[w] = c;
                }
            }
        }

        let bound = self
            .sides
            .history
            .class_id_bound()
            .max(self.sides.future.class_id_bound());

        for kind in [SideKind::History, SideKind::Future] {
            let (this, other) = self.sides.split_mut(kind);
            for (class_word, word) in this.class_words.iter_mut().zip(&this.words) {
                let counts = class_word.counts_mut();
                counts.clear();
                for (key, count) in word.counts().iter() {
                    counts.add(other.word_to_class[key], count);
                }
            }
            for c in this.frontier.classes() {
                let class_words = &this.class_words;
                let node = &mut this.classes[c];
                node.recount(|w| class_words[w].counts());
                node.counts_mut().enable_dense_counts(bound);
            }
        }
    }
}

/// Merge the class in frontier slot `gone` into the one in `keep`, recycle its
/// arena slot and leave `gone` vacant.
fn absorb_slot(side: &mut Side, keep: usize, gone: usize) {
    let (Some(kept), Some(absorbed)) = (side.frontier.get(keep), side.frontier.take(gone)) else {
        return;
    };
    for &w in side.classes[absorbed].members() {
        side.word_to_class[w] = kept;
    }
    let (into, from) = side.class_pair_mut(kept, absorbed);
    into.merge_into(from);
    side.release_class(absorbed);
    side.loss.invalidate(keep);
    side.loss.invalidate(gone);
}

fn parse_triple(line: &str, line_no: usize) -> Result<(WordId, WordId, u64)> {
    let mut fields = line.split_whitespace();
    let mut next = |what: &str| {
        fields.next().ok_or_else(|| Error::Parse {
            line: line_no,
            message: format!("missing {what}"),
        })
    };
    let history = next("history id")?;
    let future = next("future id")?;
    let count = next("count")?;
    if fields.next().is_some() {
        return Err(Error::Parse {
            line: line_no,
            message: "expected exactly three fields".to_string(),
        });
    }
    let parse_err = |field: &str, e: std::num::ParseIntError| Error::Parse {
        line: line_no,
        message: format!("bad {field}: {e}"),
    };
    Ok((
        history.parse().map_err(|e| parse_err("history id", e))?,
        future.parse().map_err(|e| parse_err("future id", e))?,
        count.parse().map_err(|e| parse_err("count", e))?,
    ))
}
