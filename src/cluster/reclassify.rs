//! Local search: move single words between classes while the objective grows.
//!
//! Both partitions are kept identical, so moving word `w` from class `a` to
//! class `b` moves its history row *and* its future column. The change of the
//! objective is evaluated in two halves that share a fictitious singleton
//! class `x`:
//!
//! ```text
//! Δ(a → b) = Δ(a → x) + Δ(x → b)
//! ```
//!
//! Terms for cells of `x` cancel between the halves and are never computed.
//! Each half is two vector deltas (row and column) plus corrections for the
//! cells where the row and column of `w` meet: `(a,a)` on removal and
//! `(b,b)`, `(b,a)`, `(a,b)` on insertion. `s = N(w,w)` is the self-bigram
//! count, which sits in both the row and the column.

use tracing::{debug, trace};

use super::engine::ClusterEngine;
use super::word::WordId;
use crate::hierarchy::ClassId;

impl ClusterEngine {
    /// Run reclassification passes until a pass gains no more than
    /// `min_reclass_gain` or `max_reclass_iters` passes have run. Resyncs after
    /// every pass. Returns the summed gain (objective units, not bits).
    pub(crate) fn reclassify(&mut self) -> f64 {
        let mut total = 0.0;
        for pass in 0..self.config.max_reclass_iters {
            let (gain, moves) = self.reclassify_pass();
            self.setup_classes();
            total += gain;
            debug!(pass, moves, gain, "reclassification pass");
            if gain <= self.config.min_reclass_gain {
                break;
            }
        }
        total
    }

    /// One pass over all words in frequency order.
    fn reclassify_pass(&mut self) -> (f64, usize) {
        let order = self.sides.history.sorted_words.clone();
        let classes = self.sides.history.frontier.classes();
        let mut gain = 0.0;
        let mut moves = 0;

        for w in order {
            let from = self.sides.history.class_of(w);
            if self.sides.history.class(from).len() <= 1 {
                continue;
            }
            let removal = self.mi_remove_change(w, from);
            let mut best = 0.0;
            let mut target = None;
            for &to in &classes {
                if to == from {
                    continue;
                }
                let delta = removal + self.mi_move_change(w, from, to);
                if delta > best {
                    best = delta;
                    target = Some(to);
                }
            }
            if let Some(to) = target {
                trace!(word = w, from, to, delta = best, "moving word");
                self.move_word(w, from, to);
                gain += best;
                moves += 1;
            }
        }
        (gain, moves)
    }

    /// Objective change of taking `w` out of class `a` into a singleton,
    /// excluding the singleton's own cells.
    pub(crate) fn mi_remove_change(&self, w: WordId, a: ClassId) -> f64 {
        let l = &self.nlogn;
        let h = &self.sides.history;
        let f = &self.sides.future;
        let row = h.class_words[w].counts();
        let col = f.class_words[w].counts();
        let s = h.words[w].counts().get_count(w);

        let row_a = h.classes[a].counts();
        let col_a = f.classes[a].counts();
        let n_aa = row_a.get_count(a);
        let r_a = row.get_count(a);
        let c_a = col.get_count(a);

        let mut delta = row_a.remove_mi_change_vector(row, l) + col_a.remove_mi_change_vector(col, l);
        // (a,a) loses both the row and the column of w, which overlap in s
        delta += l.get((n_aa + s) - (r_a + c_a)) - l.get(n_aa - r_a) - l.get(n_aa - c_a)
            + l.get(n_aa);
        delta
    }

    /// Objective change of putting the singleton holding `w` (formerly in
    /// `a`) into class `b`, excluding the singleton's own cells.
    pub(crate) fn mi_move_change(&self, w: WordId, a: ClassId, b: ClassId) -> f64 {
        let l = &self.nlogn;
        let h = &self.sides.history;
        let f = &self.sides.future;
        let row = h.class_words[w].counts();
        let col = f.class_words[w].counts();
        let s = h.words[w].counts().get_count(w);

        let row_b = h.classes[b].counts();
        let col_b = f.classes[b].counts();
        let n_bb = row_b.get_count(b);
        let n_ba = row_b.get_count(a);
        let n_ab = col_b.get_count(a);
        let (r_a, r_b) = (row.get_count(a), row.get_count(b));
        let (c_a, c_b) = (col.get_count(a), col.get_count(b));

        let mut delta = row_b.add_mi_change_vector(row, l) + col_b.add_mi_change_vector(col, l);

        // (b,b) receives the row, the column and the self-bigram at once
        delta -= (l.get(n_bb + r_b) - l.get(n_bb)) + (l.get(n_bb + c_b) - l.get(n_bb));
        delta += l.get(n_bb + r_b + c_b + s) - l.get(n_bb);

        // (b,a) already lost w's column entry from b when w left a
        delta -= l.get(n_ba + r_a) - l.get(n_ba);
        delta += l.get((n_ba + r_a) - (c_b + s)) - l.get(n_ba - c_b);

        // (a,b) mirrors (b,a)
        delta -= l.get(n_ab + c_a) - l.get(n_ab);
        delta += l.get((n_ab + c_a) - (r_b + s)) - l.get(n_ab - r_b);

        delta
    }

    /// Move `w` from class `a` to class `b` on both sides, keeping class
    /// counts and every neighbour's class-collapsed counts exact.
    pub(crate) fn move_word(&mut self, w: WordId, a: ClassId, b: ClassId) {
        // History row: the future partition still has w in a.
        let row = self.sides.history.class_words[w].counts().clone();
        {
            let h = &mut self.sides.history;
            let (from, to) = h.class_pair_mut(a, b);
            from.remove_word(w, &row);
            to.add_word(w, &row);
            h.word_to_class[w] = b;
        }
        {
            let h = &self.sides.history;
            let f = &mut self.sides.future;
            for (d, n) in row.iter() {
                f.classes[d].counts_mut().reclass(a, b, n);
            }
            for (y, n) in h.words[w].counts().iter() {
                f.class_words[y].counts_mut().reclass(a, b, n);
            }
        }

        // Future column: keyed by the already updated history partition.
        let col = self.sides.future.class_words[w].counts().clone();
        {
            let f = &mut self.sides.future;
            let (from, to) = f.class_pair_mut(a, b);
            from.remove_word(w, &col);
            to.add_word(w, &col);
            f.word_to_class[w] = b;
        }
        {
            let f = &self.sides.future;
            let h = &mut self.sides.history;
            for (c, n) in col.iter() {
                h.classes[c].counts_mut().reclass(a, b, n);
            }
            for (x, n) in f.words[w].counts().iter() {
                h.class_words[x].counts_mut().reclass(a, b, n);
            }
        }
    }
}
