//! Structural health check of a finished [`ClassTree`].
//!
//! One walk from the root checks that the arena really is a binary tree over
//! the vocabulary: edges agree in both directions, every internal node has
//! two children whose masses add up to its own, and every word sits in
//! exactly one leaf.
//!
//! ```rust
//! use miclass::{ClusterConfig, ClusterEngine, HealthCheck};
//!
//! let mut engine = ClusterEngine::new(3, ClusterConfig::new(2)).unwrap();
//! engine.add_bigram(0, 1, 3).unwrap();
//! engine.add_bigram(1, 2, 1).unwrap();
//! let tree = engine.cluster().unwrap();
//! let report = tree.health_check();
//! assert!(report.is_healthy(), "{report}");
//! ```

use std::collections::HashSet;
use std::fmt;

use super::node::ClassId;
use super::tree::ClassTree;
use crate::cluster::WordId;

/// A defect found in a class tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeIssue {
    /// The root records a parent.
    RootHasParent {
        /// The root.
        root: ClassId,
    },
    /// An edge points past the end of the arena.
    DanglingEdge {
        /// Node holding the edge.
        node: ClassId,
        /// Missing target.
        target: ClassId,
    },
    /// A child does not name its parent back.
    EdgeMismatch {
        /// The child.
        child: ClassId,
        /// Parent that reached it.
        parent: ClassId,
    },
    /// A node was reached twice on the way down.
    Cycle {
        /// Node reached again.
        node: ClassId,
    },
    /// A node carries members or edges but cannot be reached from the root.
    Orphan {
        /// The unreachable node.
        node: ClassId,
    },
    /// An internal node has only one child.
    SingleChild {
        /// The node.
        node: ClassId,
    },
    /// Child masses do not add up to the parent's.
    MassMismatch {
        /// The parent.
        node: ClassId,
        /// Sum over both children.
        children: u64,
        /// Parent total.
        parent: u64,
    },
    /// A leaf holds more than one word.
    WideLeaf {
        /// The leaf.
        node: ClassId,
        /// Number of words in it.
        words: usize,
    },
    /// A leaf names a word outside the vocabulary.
    UnknownWord {
        /// The leaf.
        node: ClassId,
        /// Offending id.
        word: WordId,
    },
    /// Words that sit in no leaf.
    MissingWords {
        /// How many.
        count: usize,
    },
    /// Words that sit in more than one leaf.
    RepeatedWords {
        /// How many.
        count: usize,
    },
}

impl TreeIssue {
    /// Whether the issue breaks the bit-string encoding. A wide leaf only
    /// gives several words the same path.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TreeIssue::WideLeaf { .. })
    }
}

impl fmt::Display for TreeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeIssue::RootHasParent { root } => write!(f, "root {root} has a parent"),
            TreeIssue::DanglingEdge { node, target } => {
                write!(f, "node {node} points at missing node {target}")
            }
            TreeIssue::EdgeMismatch { child, parent } => {
                write!(f, "node {child} does not name {parent} as its parent")
            }
            TreeIssue::Cycle { node } => write!(f, "node {node} reached twice"),
            TreeIssue::Orphan { node } => write!(f, "node {node} is not reachable from the root"),
            TreeIssue::SingleChild { node } => write!(f, "node {node} has a single child"),
            TreeIssue::MassMismatch {
                node,
                children,
                parent,
            } => write!(f, "node {node}: children hold {children}, parent {parent}"),
            TreeIssue::WideLeaf { node, words } => write!(f, "leaf {node} holds {words} words"),
            TreeIssue::UnknownWord { node, word } => {
                write!(f, "leaf {node} holds unknown word {word}")
            }
            TreeIssue::MissingWords { count } => write!(f, "{count} words are in no leaf"),
            TreeIssue::RepeatedWords { count } => {
                write!(f, "{count} words are in more than one leaf")
            }
        }
    }
}

/// Result of [`HealthCheck::health_check`].
#[derive(Debug, Clone, Default)]
pub struct HealthReport {
    /// Defects found, in walk order.
    pub issues: Vec<TreeIssue>,
    /// Nodes reachable from the root.
    pub node_count: usize,
    /// Leaves reachable from the root.
    pub leaf_count: usize,
    /// Longest root-to-leaf path (the longest bit string).
    pub max_depth: usize,
}

impl HealthReport {
    /// No fatal issue was found.
    pub fn is_healthy(&self) -> bool {
        !self.issues.iter().any(TreeIssue::is_fatal)
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} leaves, depth {}",
            self.node_count, self.leaf_count, self.max_depth
        )?;
        if self.issues.is_empty() {
            return write!(f, ", no issues");
        }
        writeln!(f, ", {} issues:", self.issues.len())?;
        for issue in &self.issues {
            writeln!(f, "  {issue}")?;
        }
        Ok(())
    }
}

/// Types that can check their own structure.
pub trait HealthCheck {
    /// Walk the structure and report what is wrong with it.
    fn health_check(&self) -> HealthReport;

    /// Shorthand for `health_check().is_healthy()`.
    fn is_healthy(&self) -> bool {
        self.health_check().is_healthy()
    }
}

impl HealthCheck for ClassTree {
    fn health_check(&self) -> HealthReport {
        let mut report = HealthReport::default();
        let root = self.root();
        if self.node(root).is_some_and(|n| n.parent().is_some()) {
            report.issues.push(TreeIssue::RootHasParent { root });
        }

        let mut seen = vec![0usize; self.vocab_size()];
        let mut visited = HashSet::new();
        let mut stack = vec![(root, None::<ClassId>, 0usize)];
        while let Some((id, from, depth)) = stack.pop() {
            let Some(node) = self.node(id) else {
                report.issues.push(TreeIssue::DanglingEdge {
                    node: from.unwrap_or(id),
                    target: id,
                });
                continue;
            };
            if !visited.insert(id) {
                report.issues.push(TreeIssue::Cycle { node: id });
                continue;
            }
            if let Some(parent) = from {
                if node.parent() != Some(parent) {
                    report.issues.push(TreeIssue::EdgeMismatch { child: id, parent });
                }
            }
            report.max_depth = report.max_depth.max(depth);

            match (node.left_child(), node.right_child()) {
                (Some(l), Some(r)) => {
                    let mass = |c: ClassId| self.node(c).map_or(0, |n| n.counts().total());
                    let children = mass(l) + mass(r);
                    if children != node.counts().total() {
                        report.issues.push(TreeIssue::MassMismatch {
                            node: id,
                            children,
                            parent: node.counts().total(),
                        });
                    }
                    stack.push((r, Some(id), depth + 1));
                    stack.push((l, Some(id), depth + 1));
                }
                (Some(only), None) | (None, Some(only)) => {
                    report.issues.push(TreeIssue::SingleChild { node: id });
                    stack.push((only, Some(id), depth + 1));
                }
                (None, None) => {
                    report.leaf_count += 1;
                    if node.len() > 1 {
                        report.issues.push(TreeIssue::WideLeaf {
                            node: id,
                            words: node.len(),
                        });
                    }
                    for &w in node.members() {
                        match seen.get_mut(w) {
                            Some(n) => *n += 1,
                            None => {
                                report.issues.push(TreeIssue::UnknownWord { node: id, word: w })
                            }
                        }
                    }
                }
            }
        }
        report.node_count = visited.len();

        // anything with members or edges should have been reached
        for node in self.nodes() {
            let touched = !node.is_empty() || !node.is_leaf() || node.parent().is_some();
            if touched && !visited.contains(&node.id()) {
                report.issues.push(TreeIssue::Orphan { node: node.id() });
            }
        }

        let missing = seen.iter().filter(|&&n| n == 0).count();
        if missing > 0 {
            report.issues.push(TreeIssue::MissingWords { count: missing });
        }
        let repeated = seen.iter().filter(|&&n| n > 1).count();
        if repeated > 0 {
            report.issues.push(TreeIssue::RepeatedWords { count: repeated });
        }
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cluster::ClusterConfig;
    use crate::counts::CountVector;
    use crate::hierarchy::{ClassNode, Dendrogram};
    use crate::ClusterEngine;
    use proptest::prelude::*;

    fn leaf(id: ClassId, word: WordId, mass: u64) -> ClassNode {
        let mut n = ClassNode::new(id);
        n.add_word(word, &CountVector::from_pairs([(0, mass)]));
        n
    }

    fn join(nodes: &mut [ClassNode], parent: ClassId, l: ClassId, r: ClassId) {
        let (left, right) = (nodes[l].clone(), nodes[r].clone());
        nodes[parent].merge_to_new_parent(&left, &right);
        nodes[parent].set_left_child(l);
        nodes[parent].set_right_child(r);
        nodes[l].set_parent(parent);
        nodes[r].set_parent(parent);
    }

    fn tree(nodes: Vec<ClassNode>, root: ClassId, vocab_size: usize) -> ClassTree {
        ClassTree::new(nodes, root, vec![root], Dendrogram::new(vec![root]), vocab_size)
    }

    /// Words 0, 1 and 2 under a two-level tree rooted at 4.
    fn three_words() -> Vec<ClassNode> {
        let mut nodes = vec![
            leaf(0, 0, 2),
            leaf(1, 1, 3),
            ClassNode::new(2),
            leaf(3, 2, 4),
            ClassNode::new(4),
        ];
        join(&mut nodes, 2, 0, 1);
        join(&mut nodes, 4, 2, 3);
        nodes
    }

    #[test]
    fn sound_tree_reports_no_issues() {
        let report = tree(three_words(), 4, 3).health_check();
        assert!(report.issues.is_empty(), "{report}");
        assert_eq!((report.node_count, report.leaf_count, report.max_depth), (5, 3, 2));
        assert!(report.to_string().contains("no issues"));
    }

    #[test]
    fn missing_word_is_fatal() {
        let report = tree(three_words(), 4, 4).health_check();
        assert_eq!(report.issues, vec![TreeIssue::MissingWords { count: 1 }]);
        assert!(!report.is_healthy());
    }

    #[test]
    fn repeated_and_unknown_words_are_reported() {
        let mut nodes = three_words();
        nodes[3].add_word(0, &CountVector::new());
        nodes[3].add_word(7, &CountVector::new());
        let report = tree(nodes, 4, 3).health_check();
        assert!(report.issues.contains(&TreeIssue::RepeatedWords { count: 1 }));
        assert!(report.issues.contains(&TreeIssue::UnknownWord { node: 3, word: 7 }));
        assert!(report.issues.contains(&TreeIssue::WideLeaf { node: 3, words: 3 }));
    }

    #[test]
    fn wide_leaf_alone_is_not_fatal() {
        let mut n = ClassNode::new(0);
        n.add_word(0, &CountVector::new());
        n.add_word(1, &CountVector::new());
        let report = tree(vec![n], 0, 2).health_check();
        assert_eq!(report.issues, vec![TreeIssue::WideLeaf { node: 0, words: 2 }]);
        assert!(report.is_healthy());
    }

    #[test]
    fn single_child_and_mass_mismatch() {
        let mut nodes = vec![leaf(0, 0, 5), ClassNode::new(1)];
        nodes[1].set_left_child(0);
        nodes[0].set_parent(1);
        let report = tree(nodes, 1, 1).health_check();
        assert_eq!(report.issues, vec![TreeIssue::SingleChild { node: 1 }]);

        let mut nodes = three_words();
        nodes[2].counts_mut().add(0, 1);
        let report = tree(nodes, 4, 3).health_check();
        assert!(report.issues.contains(&TreeIssue::MassMismatch {
            node: 2,
            children: 5,
            parent: 6
        }));
        assert!(report.issues.contains(&TreeIssue::MassMismatch {
            node: 4,
            children: 10,
            parent: 9
        }));
    }

    #[test]
    fn broken_edges_are_reported() {
        let mut nodes = three_words();
        nodes[3].clear();
        nodes[3].add_word(2, &CountVector::from_pairs([(0, 4)]));
        nodes.push(leaf(5, 3, 0));
        let report = tree(nodes, 4, 4).health_check();
        assert!(report.issues.contains(&TreeIssue::EdgeMismatch { child: 3, parent: 4 }));
        assert!(report.issues.contains(&TreeIssue::Orphan { node: 5 }));
        assert!(report.issues.contains(&TreeIssue::MissingWords { count: 1 }));

        let mut nodes = vec![ClassNode::new(0)];
        nodes[0].set_left_child(0);
        nodes[0].set_right_child(9);
        let report = tree(nodes, 0, 0).health_check();
        assert!(report.issues.contains(&TreeIssue::Cycle { node: 0 }));
        assert!(report.issues.contains(&TreeIssue::DanglingEdge { node: 0, target: 9 }));
    }

    #[test]
    fn root_with_parent_is_reported() {
        let mut nodes = three_words();
        nodes[4].set_parent(2);
        let report = tree(nodes, 4, 3).health_check();
        assert!(report.issues.contains(&TreeIssue::RootHasParent { root: 4 }));
    }

    proptest! {
        #[test]
        fn clustered_tree_is_healthy(
            bigrams in proptest::collection::vec((0usize..10, 0usize..10, 1u64..20), 1..60),
            k in 1usize..6,
        ) {
            let mut engine = ClusterEngine::new(10, ClusterConfig::new(k).with_min_class_size(5)).unwrap();
            for &(h, f, c) in &bigrams {
                engine.add_bigram(h, f, c).unwrap();
            }
            let tree = engine.cluster().unwrap();
            let report = tree.health_check();
            prop_assert!(report.issues.is_empty(), "{}", report);
            prop_assert_eq!(report.leaf_count, 10);
            prop_assert_eq!(report.node_count, 19);
        }
    }
}
