//! The finished binary class tree and its bit-path encoding.

use std::io::Write;

use super::dendrogram::Dendrogram;
use super::node::{ClassId, ClassNode};
use crate::cluster::WordId;
use crate::error::Result;
use crate::vocab::Vocabulary;

/// Binary tree over the vocabulary, produced by
/// [`ClusterEngine::cluster`](crate::ClusterEngine::cluster).
///
/// Below each top-level class sits the subtree built by splitting it down to
/// single words; above them sits the agglomeration dendrogram. A word's bit
/// string is its root-to-leaf path, `0` for a left edge and `1` for a right
/// edge.
#[derive(Debug, Clone)]
pub struct ClassTree {
    nodes: Vec<ClassNode>,
    root: ClassId,
    top_level: Vec<ClassId>,
    dendrogram: Dendrogram,
    vocab_size: usize,
}

impl ClassTree {
    /// Wrap a finished arena.
    pub fn new(
        nodes: Vec<ClassNode>,
        root: ClassId,
        top_level: Vec<ClassId>,
        dendrogram: Dendrogram,
        vocab_size: usize,
    ) -> Self {
        Self {
            nodes,
            root,
            top_level,
            dendrogram,
            vocab_size,
        }
    }

    /// Root class.
    pub fn root(&self) -> ClassId {
        self.root
    }

    /// Node by id.
    pub fn node(&self, id: ClassId) -> Option<&ClassNode> {
        self.nodes.get(id)
    }

    /// Arena slots (including any never reached from the root).
    pub fn nodes(&self) -> &[ClassNode] {
        &self.nodes
    }

    /// The classes that were on the frontier before agglomeration.
    pub fn top_level(&self) -> &[ClassId] {
        &self.top_level
    }

    /// Agglomeration history.
    pub fn dendrogram(&self) -> &Dendrogram {
        &self.dendrogram
    }

    /// Vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Leaves with their paths, left before right.
    pub fn paths(&self) -> Vec<(ClassId, String)> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root, String::new())];
        while let Some((id, prefix)) = stack.pop() {
            let node = &self.nodes[id];
            match (node.left_child(), node.right_child()) {
                (Some(left), Some(right)) => {
                    stack.push((right, format!("{prefix}1")));
                    stack.push((left, prefix + "0"));
                }
                (Some(only), None) | (None, Some(only)) => stack.push((only, prefix)),
                (None, None) => out.push((id, prefix)),
            }
        }
        out
    }

    /// Bit string of every word, indexed by word id. Words that ended up in
    /// no leaf get an empty string.
    pub fn bit_strings(&self) -> Vec<String> {
        let mut bits = vec![String::new(); self.vocab_size];
        for (leaf, path) in self.paths() {
            for &w in self.nodes[leaf].members() {
                bits[w] = path.clone();
            }
        }
        bits
    }

    /// Words in leaf order with their bit strings.
    pub fn words_in_order(&self) -> Vec<(WordId, String)> {
        self.paths()
            .into_iter()
            .flat_map(|(leaf, path)| {
                self.nodes[leaf]
                    .members()
                    .iter()
                    .map(move |&w| (w, path.clone()))
            })
            .collect()
    }

    /// Write `bits<TAB>word` lines in leaf order.
    pub fn write_bits<W: Write>(&self, vocab: &Vocabulary, out: &mut W) -> Result<()> {
        for (w, path) in self.words_in_order() {
            writeln!(out, "{}\t{}", path, vocab.get(w).unwrap_or_default())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::counts::CountVector;

    /// ```text
    ///        4
    ///       / \
    ///      2   3
    ///     / \   \_ word 2
    ///    0   1
    /// ```
    fn small_tree() -> ClassTree {
        let mut nodes: Vec<ClassNode> = (0..5).map(ClassNode::new).collect();
        let empty = CountVector::new();
        nodes[0].add_word(0, &empty);
        nodes[1].add_word(1, &empty);
        nodes[3].add_word(2, &empty);
        for (parent, l, r) in [(2, 0, 1), (4, 2, 3)] {
            nodes[parent].set_left_child(l);
            nodes[parent].set_right_child(r);
            nodes[l].set_parent(parent);
            nodes[r].set_parent(parent);
        }
        let mut d = Dendrogram::new(vec![2, 3]);
        d.add_merge(2, 3, 4, 1.0, 2);
        ClassTree::new(nodes, 4, vec![2, 3], d, 3)
    }

    #[test]
    fn bit_strings_follow_left_zero_right_one() {
        let tree = small_tree();
        assert_eq!(tree.bit_strings(), vec!["00", "01", "1"]);
    }

    #[test]
    fn writes_in_leaf_order() {
        let tree = small_tree();
        let vocab = Vocabulary::from_words(["x", "y", "z"]);
        let mut out = Vec::new();
        tree.write_bits(&vocab, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "00\tx\n01\ty\n1\tz\n");
    }

    #[test]
    fn lone_root_has_empty_path() {
        let mut nodes = vec![ClassNode::new(0)];
        nodes[0].add_word(0, &CountVector::new());
        let tree = ClassTree::new(nodes, 0, vec![0], Dendrogram::new(vec![0]), 1);
        assert_eq!(tree.bit_strings(), vec![String::new()]);
        assert_eq!(tree.paths(), vec![(0, String::new())]);
    }
}
