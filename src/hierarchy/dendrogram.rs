//! Merge history of the agglomeration phase.
//!
//! The top-level classes are the leaves; every merge joins two frontier
//! classes under a freshly allocated parent, so `K` leaves produce exactly
//! `K - 1` merges and the last parent is the root.

use std::collections::HashMap;

use super::node::ClassId;
use crate::error::{Error, Result};

/// A dendrogram over the top-level classes.
#[derive(Debug, Clone, Default)]
pub struct Dendrogram {
    /// Merge history in the order the merges happened.
    merges: Vec<Merge>,
    /// Top-level class ids, in frontier order.
    leaves: Vec<ClassId>,
}

/// A single merge operation in the dendrogram.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Merge {
    /// Class that becomes the left child.
    pub class_a: ClassId,
    /// Class that becomes the right child.
    pub class_b: ClassId,
    /// Newly allocated parent.
    pub parent: ClassId,
    /// Objective lost by the merge (objective units, not bits).
    pub loss: f64,
    /// Number of top-level classes below the parent.
    pub size: usize,
}

impl Dendrogram {
    /// Dendrogram whose leaves are `leaves`.
    pub fn new(leaves: Vec<ClassId>) -> Self {
        Self {
            merges: Vec::with_capacity(leaves.len().saturating_sub(1)),
            leaves,
        }
    }

    /// Record a merge operation.
    pub fn add_merge(&mut self, class_a: ClassId, class_b: ClassId, parent: ClassId, loss: f64, size: usize) {
        self.merges.push(Merge {
            class_a,
            class_b,
            parent,
            loss,
            size,
        });
    }

    /// Top-level classes.
    pub fn leaves(&self) -> &[ClassId] {
        &self.leaves
    }

    /// Number of top-level classes.
    pub fn n_items(&self) -> usize {
        self.leaves.len()
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Iterate over merges.
    pub fn merges(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }

    /// Merge losses in merge order.
    pub fn losses(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.loss).collect()
    }

    /// Summed merge loss.
    pub fn total_loss(&self) -> f64 {
        self.merges.iter().map(|m| m.loss).sum()
    }

    /// Group the leaves into `k` clusters by replaying the first
    /// `n_items - k` merges. Returns one cluster index per leaf (in
    /// [`Dendrogram::leaves`] order), numbered by first appearance.
    pub fn cut_to_k(&self, k: usize) -> Result<Vec<usize>> {
        let n = self.n_items();
        if k == 0 || k > n {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: n,
            });
        }
        let replay = (n - k).min(self.merges.len());

        // parent links over arena ids; absent means "is its own root"
        let mut up: HashMap<ClassId, ClassId> = HashMap::new();
        for m in &self.merges[..replay] {
            let _ = up.insert(m.class_a, m.parent);
            let _ = up.insert(m.class_b, m.parent);
        }
        let find = |mut c: ClassId| {
            while let Some(&p) = up.get(&c) {
                c = p;
            }
            c
        };

        let mut numbering: HashMap<ClassId, usize> = HashMap::new();
        Ok(self
            .leaves
            .iter()
            .map(|&leaf| {
                let root = find(leaf);
                let next = numbering.len();
                *numbering.entry(root).or_insert(next)
            })
            .collect())
    }
}
