//! Class node: counts, member words and binary tree edges.

use crate::cluster::WordId;
use crate::counts::CountVector;

/// Arena index of a class node (also its id in tree edges).
pub type ClassId = usize;

/// A word class and, once the tree is built, a node of the binary class tree.
///
/// Nodes live in a per-side arena and refer to each other by [`ClassId`].
/// A node is a seed-phase singleton, a top-level class, an internal split node,
/// a split leaf, or an agglomeration parent. Edges are assigned once per phase
/// and cleared only by [`ClassNode::clear`] when the slot is recycled.
#[derive(Debug, Clone, Default)]
pub struct ClassNode {
    id: ClassId,
    counts: CountVector,
    members: Vec<WordId>,
    parent: Option<ClassId>,
    left: Option<ClassId>,
    right: Option<ClassId>,
}

impl ClassNode {
    /// Empty node for arena slot `id`.
    pub fn new(id: ClassId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Arena id.
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class counts (row or column of the class bigram table).
    pub fn counts(&self) -> &CountVector {
        &self.counts
    }

    /// Mutable class counts.
    pub fn counts_mut(&mut self) -> &mut CountVector {
        &mut self.counts
    }

    /// Member words in insertion order.
    pub fn members(&self) -> &[WordId] {
        &self.members
    }

    /// Number of member words.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the class has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a word and its counts.
    pub fn add_word(&mut self, word: WordId, counts: &CountVector) {
        self.counts.add_vector(counts);
        self.members.push(word);
    }

    /// Remove a word and its counts. Order of the remaining members is kept.
    pub fn remove_word(&mut self, word: WordId, counts: &CountVector) {
        self.counts.remove_vector(counts);
        if let Some(pos) = self.members.iter().position(|&w| w == word) {
            let _ = self.members.remove(pos);
        } else {
            debug_assert!(false, "word {word} is not a member of class {}", self.id);
        }
    }

    /// Rebuild counts as the sum of the members' vectors.
    pub fn recount<'a, F>(&mut self, counts_of: F)
    where
        F: Fn(WordId) -> &'a CountVector,
    {
        self.counts.clear();
        for &w in &self.members {
            self.counts.add_vector(counts_of(w));
        }
    }

    /// Absorb `other`'s counts and members; `other` is left empty.
    pub fn merge_into(&mut self, other: &mut ClassNode) {
        self.counts.add_vector(&other.counts);
        self.members.append(&mut other.members);
        other.counts.clear();
    }

    /// Make this node the parent of `left` and `right`: counts become
    /// `left + right`, neither child is modified. Edges are set separately.
    pub fn merge_to_new_parent(&mut self, left: &ClassNode, right: &ClassNode) {
        self.counts.clear();
        self.counts.add_vector(&left.counts);
        self.counts.add_vector(&right.counts);
    }

    /// Parent id.
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Left child id.
    pub fn left_child(&self) -> Option<ClassId> {
        self.left
    }

    /// Right child id.
    pub fn right_child(&self) -> Option<ClassId> {
        self.right
    }

    /// Record the parent edge.
    pub fn set_parent(&mut self, parent: ClassId) {
        debug_assert!(self.parent.is_none(), "class {} already has a parent", self.id);
        self.parent = Some(parent);
    }

    /// Record the left child edge.
    pub fn set_left_child(&mut self, child: ClassId) {
        debug_assert!(self.left.is_none(), "class {} already has a left child", self.id);
        self.left = Some(child);
    }

    /// Record the right child edge.
    pub fn set_right_child(&mut self, child: ClassId) {
        debug_assert!(self.right.is_none(), "class {} already has a right child", self.id);
        self.right = Some(child);
    }

    /// True if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Reset for reuse in the same slot.
    pub fn clear(&mut self) {
        self.counts.clear();
        self.members.clear();
        self.parent = None;
        self.left = None;
        self.right = None;
    }
}
