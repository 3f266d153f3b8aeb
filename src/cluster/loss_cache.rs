//! Memoized pairwise merge losses over frontier slots.

use ndarray::Array2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::side::Frontier;
use crate::hierarchy::ClassId;

/// Symmetric matrix of merge losses indexed by frontier slot.
///
/// An entry is `None` until computed and becomes `None` again whenever either
/// slot's class changes, so a merge only costs a refill of two rows.
#[derive(Debug, Clone)]
pub struct LossCache {
    losses: Array2<Option<f64>>,
}

impl LossCache {
    /// Cache for `slots` frontier slots, all entries stale.
    pub fn new(slots: usize) -> Self {
        Self {
            losses: Array2::from_elem((slots, slots), None),
        }
    }

    /// Number of slots covered.
    pub fn slots(&self) -> usize {
        self.losses.nrows()
    }

    /// Cached loss for the pair, if fresh.
    pub fn get(&self, a: usize, b: usize) -> Option<f64> {
        self.losses[(a, b)]
    }

    /// Store a loss for the pair (both orientations).
    pub fn set(&mut self, a: usize, b: usize, loss: f64) {
        self.losses[(a, b)] = Some(loss);
        self.losses[(b, a)] = Some(loss);
    }

    /// Mark every pair involving `slot` stale.
    pub fn invalidate(&mut self, slot: usize) {
        self.losses.row_mut(slot).fill(None);
        self.losses.column_mut(slot).fill(None);
    }

    /// Mark everything stale.
    pub fn invalidate_all(&mut self) {
        self.losses.fill(None);
    }

    /// Number of fresh entries (each unordered pair counted twice).
    pub fn fresh_entries(&self) -> usize {
        self.losses.iter().filter(|l| l.is_some()).count()
    }

    /// Refill stale entries between occupied slots with `loss(class_a, class_b)`
    /// and return the cheapest pair `(slot_a, slot_b, loss)` with
    /// `slot_a < slot_b`. Ties keep the first pair in slot order.
    pub fn select_best<F>(&mut self, frontier: &Frontier, loss: F) -> Option<(usize, usize, f64)>
    where
        F: Fn(ClassId, ClassId) -> f64 + Sync,
    {
        let occupied: Vec<(usize, ClassId)> = frontier.occupied().collect();

        let mut stale = Vec::new();
        for (x, &(i, a)) in occupied.iter().enumerate() {
            for &(j, b) in &occupied[x + 1..] {
                if self.losses[(i, j)].is_none() {
                    stale.push((i, j, a, b));
                }
            }
        }

        #[cfg(feature = "parallel")]
        let computed: Vec<f64> = stale.par_iter().map(|&(_, _, a, b)| loss(a, b)).collect();

        #[cfg(not(feature = "parallel"))]
        let computed: Vec<f64> = stale.iter().map(|&(_, _, a, b)| loss(a, b)).collect();

        for (&(i, j, _, _), value) in stale.iter().zip(computed) {
            self.set(i, j, value);
        }

        let mut best: Option<(usize, usize, f64)> = None;
        for (x, &(i, _)) in occupied.iter().enumerate() {
            for &(j, _) in &occupied[x + 1..] {
                let value = self.losses[(i, j)].unwrap_or(f64::INFINITY);
                if best.map_or(true, |(_, _, b)| value < b) {
                    best = Some((i, j, value));
                }
            }
        }
        best
    }
}
