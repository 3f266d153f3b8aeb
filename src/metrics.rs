//! From-scratch measures of a class partition.
//!
//! The engine tracks its objective incrementally; the functions here recompute
//! the same quantities directly from a bigram table, which makes them useful
//! for checking the engine and for scoring partitions produced elsewhere.
//!
//! # Average mutual information
//!
//! With `N(c,d)` the number of bigrams whose first word is in history class
//! `c` and whose second word is in future class `d`, and `N` the total:
//!
//! ```text
//! AMI = Σ_{c,d} p(c,d) · log2( p(c,d) / (p(c) · p(d)) )
//! ```
//!
//! ```rust
//! use miclass::metrics::average_mutual_information;
//!
//! // a↔b and c↔d never mix: knowing one class tells you the next exactly
//! let bigrams = [(0, 1, 10), (1, 0, 10), (2, 3, 10), (3, 2, 10)];
//! let classes = [0, 0, 1, 1];
//! let ami = average_mutual_information(&bigrams, &classes, &classes);
//! assert!((ami - 1.0).abs() < 1e-12);
//! ```

use std::collections::HashMap;

/// Average mutual information (bits) between history and future classes.
///
/// `history_class[w]` and `future_class[w]` give the class of word `w` in
/// each role. Bigrams whose ids fall outside either partition are ignored.
pub fn average_mutual_information(
    bigrams: &[(usize, usize, u64)],
    history_class: &[usize],
    future_class: &[usize],
) -> f64 {
    let joint = class_bigram_table(bigrams, history_class, future_class);
    let n: u64 = joint.values().sum();
    if n == 0 {
        return 0.0;
    }

    let mut rows: HashMap<usize, u64> = HashMap::new();
    let mut cols: HashMap<usize, u64> = HashMap::new();
    for (&(c, d), &count) in &joint {
        *rows.entry(c).or_insert(0) += count;
        *cols.entry(d).or_insert(0) += count;
    }

    let n_f = n as f64;
    let mut mi = 0.0;
    for (&(c, d), &count) in &joint {
        let p_joint = count as f64 / n_f;
        let p_c = rows[&c] as f64 / n_f;
        let p_d = cols[&d] as f64 / n_f;
        mi += p_joint * (p_joint / (p_c * p_d)).log2();
    }
    mi
}

/// Class-collapsed bigram counts `N(c,d)`, zero cells omitted.
pub fn class_bigram_table(
    bigrams: &[(usize, usize, u64)],
    history_class: &[usize],
    future_class: &[usize],
) -> HashMap<(usize, usize), u64> {
    let mut joint = HashMap::new();
    for &(h, f, count) in bigrams {
        let (Some(&c), Some(&d)) = (history_class.get(h), future_class.get(f)) else {
            continue;
        };
        if count > 0 {
            *joint.entry((c, d)).or_insert(0) += count;
        }
    }
    joint
}

/// Entropy (bits) of the unigram class distribution on the history side.
pub fn class_entropy(bigrams: &[(usize, usize, u64)], history_class: &[usize]) -> f64 {
    let mut mass: HashMap<usize, u64> = HashMap::new();
    let mut n = 0u64;
    for &(h, _, count) in bigrams {
        if let Some(&c) = history_class.get(h) {
            *mass.entry(c).or_insert(0) += count;
            n += count;
        }
    }
    if n == 0 {
        return 0.0;
    }
    let n_f = n as f64;
    mass.values()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n_f;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_class_carries_no_information() {
        let bigrams = [(0, 1, 3), (1, 2, 5), (2, 0, 1)];
        let one = [0, 0, 0];
        assert_eq!(average_mutual_information(&bigrams, &one, &one), 0.0);
        assert_eq!(class_entropy(&bigrams, &one), 0.0);
    }

    #[test]
    fn independent_classes_carry_no_information() {
        // every history class is followed by every future class in proportion
        let bigrams = [(0, 0, 2), (0, 1, 2), (1, 0, 1), (1, 1, 1)];
        let classes = [0, 1];
        assert!(average_mutual_information(&bigrams, &classes, &classes).abs() < 1e-12);
    }

    #[test]
    fn table_skips_out_of_range_ids() {
        let bigrams = [(0, 1, 3), (0, 9, 4), (1, 1, 0)];
        let table = class_bigram_table(&bigrams, &[5, 6], &[5, 6]);
        assert_eq!(table.len(), 1);
        assert_eq!(table[&(5, 6)], 3);
    }

    #[test]
    fn entropy_of_two_even_classes_is_one_bit() {
        let bigrams = [(0, 1, 4), (1, 0, 4)];
        assert!((class_entropy(&bigrams, &[0, 1]) - 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn ami_is_bounded_by_history_entropy(
            bigrams in proptest::collection::vec((0usize..6, 0usize..6, 1u64..30), 1..40),
            classes in proptest::collection::vec(0usize..3, 6),
        ) {
            let ami = average_mutual_information(&bigrams, &classes, &classes);
            let h = class_entropy(&bigrams, &classes);
            prop_assert!(ami >= -1e-9);
            prop_assert!(ami <= h + 1e-9);
        }

        #[test]
        fn refining_classes_never_loses_information(
            bigrams in proptest::collection::vec((0usize..6, 0usize..6, 1u64..30), 1..40),
            classes in proptest::collection::vec(0usize..3, 6),
        ) {
            let coarse = average_mutual_information(&bigrams, &classes, &classes);
            let words: Vec<usize> = (0..6).collect();
            let fine = average_mutual_information(&bigrams, &words, &words);
            prop_assert!(fine >= coarse - 1e-9);
        }
    }
}
