//! Sparse integer counts with an optional dense mirror.

use super::nlogn::NLogN;

/// Integer counts keyed by id.
///
/// Entries live in a sparse array sorted by key. Once the key universe is
/// small and stable (class ids after resync), [`CountVector::enable_dense_counts`]
/// adds an array indexed directly by key; lookups then go through the dense
/// view. The dense mirror grows on writes past its end and reads past its end
/// fall back to the sparse array, so the two views agree on every key.
///
/// The `*_mi_change` methods return the signed change of the (unnormalized)
/// mutual-information objective `Σ L(cell) − L(marginal)` restricted to this
/// vector, where `L(x) = x · log2(x)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountVector {
    total: u64,
    entries: Vec<(usize, u64)>,
    dense: Option<Vec<u64>>,
}

impl CountVector {
    /// Create an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, count)` pairs in any order; repeated keys accumulate.
    pub fn from_pairs<I: IntoIterator<Item = (usize, u64)>>(pairs: I) -> Self {
        let mut v = Self::new();
        for (key, count) in pairs {
            v.add(key, count);
        }
        v
    }

    /// Sum of all counts.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of non-zero entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry is non-zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, count)` in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.entries.iter().copied()
    }

    /// Whether the dense mirror is active.
    pub fn is_dense(&self) -> bool {
        self.dense.is_some()
    }

    /// Count stored at `key` (zero if absent).
    #[inline]
    pub fn get_count(&self, key: usize) -> u64 {
        if let Some(&c) = self.dense.as_ref().and_then(|d| d.get(key)) {
            return c;
        }
        self.sparse_count(key)
    }

    #[inline]
    fn sparse_count(&self, key: usize) -> u64 {
        match self.entries.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(i) => self.entries[i].1,
            Err(_) => 0,
        }
    }

    /// Add `count` at `key`.
    pub fn add(&mut self, key: usize, count: u64) {
        if count == 0 {
            return;
        }
        self.total += count;
        match self.entries.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(i) => self.entries[i].1 += count,
            Err(i) => self.entries.insert(i, (key, count)),
        }
        if let Some(dense) = &mut self.dense {
            if key >= dense.len() {
                dense.resize(key + 1, 0);
            }
            dense[key] += count;
        }
    }

    /// Remove `count` from `key`. The entry must hold at least `count`.
    pub fn remove(&mut self, key: usize, count: u64) {
        if count == 0 {
            return;
        }
        match self.entries.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(i) => {
                debug_assert!(self.entries[i].1 >= count, "removing more than stored at key {key}");
                self.entries[i].1 -= count;
                if self.entries[i].1 == 0 {
                    let _ = self.entries.remove(i);
                }
            }
            Err(_) => {
                debug_assert!(false, "removing from absent key {key}");
                return;
            }
        }
        self.total -= count;
        if let Some(dense) = &mut self.dense {
            if let Some(slot) = dense.get_mut(key) {
                *slot -= count;
            }
        }
    }

    /// Add every entry of `other`.
    pub fn add_vector(&mut self, other: &CountVector) {
        if other.is_empty() {
            return;
        }
        let mut merged = Vec::with_capacity(self.entries.len() + other.entries.len());
        let (mut i, mut j) = (0, 0);
        let (a, b) = (&self.entries, &other.entries);
        while i < a.len() && j < b.len() {
            if a[i].0 < b[j].0 {
                merged.push(a[i]);
                i += 1;
            } else if a[i].0 > b[j].0 {
                merged.push(b[j]);
                j += 1;
            } else {
                merged.push((a[i].0, a[i].1 + b[j].1));
                i += 1;
                j += 1;
            }
        }
        merged.extend_from_slice(&a[i..]);
        merged.extend_from_slice(&b[j..]);
        self.entries = merged;
        self.total += other.total;

        if let Some(dense) = &mut self.dense {
            for &(k, c) in &other.entries {
                if k >= dense.len() {
                    dense.resize(k + 1, 0);
                }
                dense[k] += c;
            }
        }
    }

    /// Remove every entry of `other`. Each key of `other` must be present here
    /// with at least its count.
    pub fn remove_vector(&mut self, other: &CountVector) {
        if other.is_empty() {
            return;
        }
        let b = &other.entries;
        let mut j = 0;
        let mut matched = 0;
        self.entries.retain_mut(|(k, c)| {
            while j < b.len() && b[j].0 < *k {
                j += 1;
            }
            if j < b.len() && b[j].0 == *k {
                debug_assert!(*c >= b[j].1, "removing more than stored at key {k}");
                *c -= b[j].1;
                j += 1;
                matched += 1;
            }
            *c > 0
        });
        debug_assert_eq!(matched, b.len(), "removed vector has keys absent here");
        self.total -= other.total;

        if let Some(dense) = &mut self.dense {
            for &(k, c) in b {
                if let Some(slot) = dense.get_mut(k) {
                    *slot -= c;
                }
            }
        }
    }

    /// Move `count` units from `old_key` to `new_key`; the total is unchanged.
    pub fn reclass(&mut self, old_key: usize, new_key: usize, count: u64) {
        if old_key == new_key || count == 0 {
            return;
        }
        self.remove(old_key, count);
        self.add(new_key, count);
    }

    /// Reset to empty and drop the dense mirror.
    pub fn clear(&mut self) {
        self.total = 0;
        self.entries.clear();
        self.dense = None;
    }

    /// Materialize a dense mirror covering at least `0..size`.
    pub fn enable_dense_counts(&mut self, size: usize) {
        let needed = self.entries.last().map_or(0, |&(k, _)| k + 1).max(size);
        let mut dense = vec![0; needed];
        for &(k, c) in &self.entries {
            dense[k] = c;
        }
        self.dense = Some(dense);
    }

    /// `Σ L(c_k) − L(total)`: this vector's own share of the objective.
    pub fn mi_contribution(&self, l: &NLogN) -> f64 {
        self.entries.iter().map(|&(_, c)| l.get(c)).sum::<f64>() - l.get(self.total)
    }

    /// Objective change if `count` units were added at `key`.
    #[inline]
    pub fn add_mi_change(&self, key: usize, count: u64, l: &NLogN) -> f64 {
        let c = self.get_count(key);
        (l.get(self.total) - l.get(self.total + count)) + (l.get(c + count) - l.get(c))
    }

    /// Objective change if `count` units were removed from `key`.
    #[inline]
    pub fn remove_mi_change(&self, key: usize, count: u64, l: &NLogN) -> f64 {
        let c = self.get_count(key);
        debug_assert!(c >= count && self.total >= count);
        (l.get(self.total) - l.get(self.total - count)) + (l.get(c - count) - l.get(c))
    }

    /// Objective change if `count` units moved from `old_key` to `new_key`.
    pub fn reclass_mi_change(&self, old_key: usize, new_key: usize, count: u64, l: &NLogN) -> f64 {
        if old_key == new_key || count == 0 {
            return 0.0;
        }
        let old = self.get_count(old_key);
        let new = self.get_count(new_key);
        debug_assert!(old >= count);
        (l.get(old - count) - l.get(old)) + (l.get(new + count) - l.get(new))
    }

    /// Objective change if every entry of `other` were added.
    pub fn add_mi_change_vector(&self, other: &CountVector, l: &NLogN) -> f64 {
        if self.dense.is_some() {
            return self.add_mi_change_dense(other, l);
        }
        let mut delta = l.get(self.total) - l.get(self.total + other.total);
        let a = &self.entries;
        let mut i = 0;
        for &(k, o) in &other.entries {
            while i < a.len() && a[i].0 < k {
                i += 1;
            }
            let c = if i < a.len() && a[i].0 == k { a[i].1 } else { 0 };
            delta += l.get(c + o) - l.get(c);
        }
        delta
    }

    /// [`CountVector::add_mi_change_vector`] through the dense view: one
    /// direct lookup per entry of `other`.
    pub fn add_mi_change_dense(&self, other: &CountVector, l: &NLogN) -> f64 {
        let mut delta = l.get(self.total) - l.get(self.total + other.total);
        for &(k, o) in &other.entries {
            let c = self.get_count(k);
            delta += l.get(c + o) - l.get(c);
        }
        delta
    }

    /// Objective change if every entry of `other` were removed.
    pub fn remove_mi_change_vector(&self, other: &CountVector, l: &NLogN) -> f64 {
        debug_assert!(self.total >= other.total);
        let mut delta = l.get(self.total) - l.get(self.total - other.total);
        if self.dense.is_some() {
            for &(k, o) in &other.entries {
                let c = self.get_count(k);
                delta += l.get(c - o) - l.get(c);
            }
            return delta;
        }
        let a = &self.entries;
        let mut i = 0;
        for &(k, o) in &other.entries {
            while i < a.len() && a[i].0 < k {
                i += 1;
            }
            let c = if i < a.len() && a[i].0 == k { a[i].1 } else { 0 };
            debug_assert!(c >= o);
            delta += l.get(c - o) - l.get(c);
        }
        delta
    }

    /// Objective change of merging `other` into this vector, `other`'s own
    /// contribution disappearing. Non-positive for any two vectors.
    pub fn merge_mi_change(&self, other: &CountVector, l: &NLogN) -> f64 {
        self.add_mi_change_vector(other, l) - other.mi_contribution(l)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table() -> NLogN {
        NLogN::new(1024)
    }

    #[test]
    fn add_remove_keeps_sorted_and_drops_zeros() {
        let mut v = CountVector::new();
        v.add(5, 2);
        v.add(1, 3);
        v.add(9, 1);
        v.add(5, 1);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 3), (5, 3), (9, 1)]);
        assert_eq!(v.total(), 7);

        v.remove(1, 3);
        assert_eq!(v.get_count(1), 0);
        assert_eq!(v.len(), 2);
        assert_eq!(v.total(), 4);
    }

    #[test]
    fn vector_add_and_remove() {
        let mut a = CountVector::from_pairs([(0, 1), (2, 4)]);
        let b = CountVector::from_pairs([(1, 2), (2, 1), (7, 5)]);
        a.add_vector(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![(0, 1), (1, 2), (2, 5), (7, 5)]);
        assert_eq!(a.total(), 13);
        a.remove_vector(&b);
        assert_eq!(a, CountVector::from_pairs([(0, 1), (2, 4)]));
    }

    #[test]
    fn dense_mirror_grows_on_write_and_falls_back_on_read() {
        let mut v = CountVector::from_pairs([(0, 1), (3, 2)]);
        v.enable_dense_counts(2);
        assert!(v.is_dense());
        assert_eq!(v.get_count(3), 2);
        assert_eq!(v.get_count(100), 0);
        v.add(10, 4);
        assert_eq!(v.get_count(10), 4);
        v.remove(10, 4);
        assert_eq!(v.get_count(10), 0);
    }

    #[test]
    fn reclass_moves_mass() {
        let l = table();
        let mut v = CountVector::from_pairs([(0, 6), (1, 2)]);
        let predicted = v.reclass_mi_change(0, 1, 4, &l);
        let before = v.mi_contribution(&l);
        v.reclass(0, 1, 4);
        assert_eq!(v.total(), 8);
        assert_eq!(v.get_count(0), 2);
        assert_eq!(v.get_count(1), 6);
        assert!((v.mi_contribution(&l) - before - predicted).abs() < 1e-9);
    }

    #[test]
    fn vector_delta_matches_applied_change() {
        let l = table();
        let mut a = CountVector::from_pairs([(0, 3), (4, 7), (5, 1)]);
        let b = CountVector::from_pairs([(4, 2), (6, 9)]);
        let predicted = a.add_mi_change_vector(&b, &l);
        let before = a.mi_contribution(&l);
        a.add_vector(&b);
        assert!((a.mi_contribution(&l) - before - predicted).abs() < 1e-9);

        let predicted = a.remove_mi_change_vector(&b, &l);
        let before = a.mi_contribution(&l);
        a.remove_vector(&b);
        assert!((a.mi_contribution(&l) - before - predicted).abs() < 1e-9);
    }

    #[test]
    fn merge_of_disjoint_rows_costs_marginal_only() {
        let l = table();
        let a = CountVector::from_pairs([(1, 10)]);
        let b = CountVector::from_pairs([(2, 10)]);
        let loss = -a.merge_mi_change(&b, &l);
        assert!((loss - 20.0).abs() < 1e-9);
    }

    fn pairs() -> impl Strategy<Value = Vec<(usize, u64)>> {
        proptest::collection::vec((0usize..32, 1u64..50), 0..40)
    }

    proptest! {
        #[test]
        fn add_then_remove_is_identity(base in pairs(), key in 0usize..40, count in 0u64..100) {
            let l = table();
            let original = CountVector::from_pairs(base);
            let mut v = original.clone();
            let up = v.add_mi_change(key, count, &l);
            v.add(key, count);
            let down = v.remove_mi_change(key, count, &l);
            v.remove(key, count);
            prop_assert_eq!(&v, &original);
            prop_assert!((up + down).abs() < 1e-6);
        }

        #[test]
        fn total_is_net_sum(ops in proptest::collection::vec((0usize..16, 1u64..20, any::<bool>()), 0..80)) {
            let mut v = CountVector::new();
            let mut net: u64 = 0;
            for (key, count, remove) in ops {
                if remove && v.get_count(key) >= count {
                    v.remove(key, count);
                    net -= count;
                } else {
                    v.add(key, count);
                    net += count;
                }
            }
            prop_assert_eq!(v.total(), net);
            prop_assert_eq!(v.iter().map(|(_, c)| c).sum::<u64>(), net);
        }

        #[test]
        fn sparse_and_dense_agree(base in pairs(), extra in pairs(), size in 0usize..48) {
            let mut sparse = CountVector::from_pairs(base);
            let mut dense = sparse.clone();
            dense.enable_dense_counts(size);
            for &(k, c) in &extra {
                sparse.add(k, c);
                dense.add(k, c);
            }
            for (k, c) in extra.into_iter().rev().step_by(2) {
                sparse.remove(k, c);
                dense.remove(k, c);
            }
            for key in 0..64 {
                prop_assert_eq!(sparse.get_count(key), dense.get_count(key));
            }
            let l = table();
            let other = CountVector::from_pairs([(1, 3), (17, 2), (40, 9)]);
            prop_assert!((sparse.add_mi_change_vector(&other, &l) - dense.add_mi_change_vector(&other, &l)).abs() < 1e-9);
        }
    }
}
