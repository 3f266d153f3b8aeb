//! The binary class tree.
//!
//! Clustering builds one binary tree over the vocabulary in two halves:
//!
//! ```text
//!                 root            ← agglomeration (Dendrogram)
//!               /      \
//!           [c1]        p
//!           /  \      /   \
//!          .    .  [c2]   [c3]    ← top-level classes
//!         / \        |      / \
//!        w   w       w     w   w  ← splitting, down to single words
//! ```
//!
//! Every [`ClassNode`] lives in a per-side arena and links to its parent and
//! children by [`ClassId`]. Reading the tree from the root, a left edge emits
//! `0` and a right edge `1`; a word's bit string is the path to its leaf.
//!
//! - [`ClassNode`]: counts, members and edges of one class
//! - [`Dendrogram`]: the merges that joined the top-level classes
//! - [`ClassTree`]: the finished arena, bit strings and output
//! - [`HealthCheck`]: edge, mass and word-coverage checks of a finished tree

mod dendrogram;
mod node;
mod tree;
mod validate;

pub use dendrogram::{Dendrogram, Merge};
pub use node::{ClassId, ClassNode};
pub use tree::ClassTree;
pub use validate::{HealthCheck, HealthReport, TreeIssue};
