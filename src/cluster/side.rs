//! Per-role clustering state.

use std::fmt;

use super::loss_cache::LossCache;
use super::word::{Word, WordId};
use crate::error::{Error, Result};
use crate::hierarchy::{ClassId, ClassNode};

/// Role of a word in a bigram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideKind {
    /// The preceding word.
    History,
    /// The following word.
    Future,
}

impl SideKind {
    /// The mirrored role.
    pub fn other(self) -> Self {
        match self {
            SideKind::History => SideKind::Future,
            SideKind::Future => SideKind::History,
        }
    }
}

impl fmt::Display for SideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideKind::History => write!(f, "history"),
            SideKind::Future => write!(f, "future"),
        }
    }
}

/// Fixed set of slots holding the classes currently eligible for merging.
///
/// Slots double as loss-cache rows, so a class keeps its slot for as long as
/// it sits on the frontier and a vacated slot is reused by the next entrant.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    slots: Vec<Option<ClassId>>,
}

impl Frontier {
    /// Frontier with `slots` empty slots.
    pub fn new(slots: usize) -> Self {
        Self {
            slots: vec![None; slots],
        }
    }

    /// Slot capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Class in `slot`.
    pub fn get(&self, slot: usize) -> Option<ClassId> {
        self.slots.get(slot).copied().flatten()
    }

    /// Put `class` in `slot`.
    pub fn place(&mut self, slot: usize, class: ClassId) {
        debug_assert!(self.slots[slot].is_none(), "frontier slot {slot} is occupied");
        self.slots[slot] = Some(class);
    }

    /// Empty `slot`, returning its class.
    pub fn take(&mut self, slot: usize) -> Option<ClassId> {
        self.slots[slot].take()
    }

    /// Replace the class in an occupied `slot`.
    pub fn replace(&mut self, slot: usize, class: ClassId) -> Option<ClassId> {
        self.slots[slot].replace(class)
    }

    /// First empty slot.
    pub fn vacant(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Occupied `(slot, class)` pairs in slot order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, ClassId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, c)| c.map(|c| (slot, c)))
    }

    /// Occupied classes in slot order.
    pub fn classes(&self) -> Vec<ClassId> {
        self.occupied().map(|(_, c)| c).collect()
    }
}

/// Everything one role owns: raw and class-collapsed word counts, the
/// partition, the class arena, the frontier and its loss cache.
///
/// `words[w]` is keyed by raw ids of the other role; `class_words[w]` holds the
/// same mass keyed by the other role's current class ids and is only valid
/// after a resync.
#[derive(Debug, Clone)]
pub struct Side {
    kind: SideKind,
    pub(crate) words: Vec<Word>,
    pub(crate) class_words: Vec<Word>,
    pub(crate) word_to_class: Vec<ClassId>,
    pub(crate) sorted_words: Vec<WordId>,
    pub(crate) classes: Vec<ClassNode>,
    free: Vec<ClassId>,
    next_class: ClassId,
    pub(crate) frontier: Frontier,
    pub(crate) loss: LossCache,
}

impl Side {
    /// State for a vocabulary of `vocab_size` words with an arena of
    /// `2 · vocab_size` class nodes.
    pub fn new(kind: SideKind, vocab_size: usize) -> Self {
        Self {
            kind,
            words: (0..vocab_size).map(Word::new).collect(),
            class_words: (0..vocab_size).map(Word::new).collect(),
            word_to_class: vec![0; vocab_size],
            sorted_words: (0..vocab_size).collect(),
            classes: (0..2 * vocab_size).map(ClassNode::new).collect(),
            free: Vec::new(),
            next_class: 0,
            frontier: Frontier::default(),
            loss: LossCache::new(0),
        }
    }

    /// Which role this is.
    pub fn kind(&self) -> SideKind {
        self.kind
    }

    /// Vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.words.len()
    }

    /// Arena capacity.
    pub fn capacity(&self) -> usize {
        self.classes.len()
    }

    /// Raw counts of word `w`.
    pub fn word(&self, w: WordId) -> &Word {
        &self.words[w]
    }

    /// Class-collapsed counts of word `w`.
    pub fn class_word(&self, w: WordId) -> &Word {
        &self.class_words[w]
    }

    /// Current class of word `w`.
    pub fn class_of(&self, w: WordId) -> ClassId {
        self.word_to_class[w]
    }

    /// Word ids by descending frequency.
    pub fn sorted_words(&self) -> &[WordId] {
        &self.sorted_words
    }

    /// Class node `id`.
    pub fn class(&self, id: ClassId) -> &ClassNode {
        &self.classes[id]
    }

    /// Mutable class node `id`.
    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassNode {
        &mut self.classes[id]
    }

    /// Classes on the frontier.
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Order words by descending total count, ascending id on ties.
    pub fn sort_words(&mut self) {
        let words = &self.words;
        self.sorted_words
            .sort_by(|&a, &b| words[a].frequency_cmp(&words[b]));
    }

    /// Take a class slot from the free list, or the next unused one.
    pub fn alloc_class(&mut self) -> Result<ClassId> {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let id = self.next_class;
                if id >= self.classes.len() {
                    return Err(Error::ArenaExhausted {
                        requested: id,
                        capacity: self.classes.len(),
                    });
                }
                self.next_class += 1;
                id
            }
        };
        self.classes[id].clear();
        Ok(id)
    }

    /// Clear `id` and make it available to the next allocation.
    pub fn release_class(&mut self, id: ClassId) {
        self.classes[id].clear();
        self.free.push(id);
    }

    /// Number of class ids handed out so far (upper bound of live ids).
    pub fn class_id_bound(&self) -> usize {
        self.next_class
    }

    /// Two distinct class nodes mutably.
    pub fn class_pair_mut(&mut self, a: ClassId, b: ClassId) -> (&mut ClassNode, &mut ClassNode) {
        assert_ne!(a, b, "class pair must be distinct");
        if a < b {
            let (lo, hi) = self.classes.split_at_mut(b);
            (&mut lo[a], &mut hi[0])
        } else {
            let (lo, hi) = self.classes.split_at_mut(a);
            (&mut hi[0], &mut lo[b])
        }
    }

    /// Adopt `other`'s class-id allocation state so ids line up one to one,
    /// and give this side a frontier of the same shape.
    pub fn mirror_arena(&mut self, other: &Side) {
        for class in &mut self.classes {
            class.clear();
        }
        self.free = other.free.clone();
        self.next_class = other.next_class;
        self.reset_frontier(other.frontier.capacity());
    }

    /// Fresh frontier and loss cache with `slots` slots.
    pub fn reset_frontier(&mut self, slots: usize) {
        self.frontier = Frontier::new(slots);
        self.loss = LossCache::new(slots);
    }
}

/// The two mirrored roles, addressed by [`SideKind`].
#[derive(Debug, Clone)]
pub struct SidePair {
    /// Preceding-word role.
    pub history: Side,
    /// Following-word role.
    pub future: Side,
}

impl SidePair {
    /// Both roles for a vocabulary of `vocab_size` words.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            history: Side::new(SideKind::History, vocab_size),
            future: Side::new(SideKind::Future, vocab_size),
        }
    }

    /// Shared access by role.
    pub fn get(&self, kind: SideKind) -> &Side {
        match kind {
            SideKind::History => &self.history,
            SideKind::Future => &self.future,
        }
    }

    /// Mutable access by role.
    pub fn get_mut(&mut self, kind: SideKind) -> &mut Side {
        match kind {
            SideKind::History => &mut self.history,
            SideKind::Future => &mut self.future,
        }
    }

    /// `(this, other)` mutably.
    pub fn split_mut(&mut self, kind: SideKind) -> (&mut Side, &mut Side) {
        match kind {
            SideKind::History => (&mut self.history, &mut self.future),
            SideKind::Future => (&mut self.future, &mut self.history),
        }
    }
}
