//! Top-down bisection of each top-level class into a binary subtree.

use tracing::debug;

use super::engine::ClusterEngine;
use super::side::Side;
use crate::counts::NLogN;
use crate::error::Result;
use crate::hierarchy::ClassId;

impl ClusterEngine {
    /// Split every top-level history class down to singletons.
    pub(crate) fn split_classes(&mut self) -> Result<()> {
        for class in self.sides.history.frontier.classes() {
            self.recursively_split_class(class)?;
        }
        Ok(())
    }

    /// Bisect `root` and then each child with more than one member.
    pub(crate) fn recursively_split_class(&mut self, root: ClassId) -> Result<()> {
        let mut pending = vec![root];
        let mut splits = 0usize;
        while let Some(class) = pending.pop() {
            if self.sides.history.class(class).len() < 2 {
                continue;
            }
            let (left, right) = self.split_class(class)?;
            splits += 1;
            pending.push(right);
            pending.push(left);
        }
        debug!(root, splits, "class split into subtree");
        Ok(())
    }

    /// Divide the members of `class` between two new children.
    ///
    /// The first two members seed the left and right child. Every later member
    /// joins whichever child loses less objective by absorbing it; on a tie the
    /// child with the smaller total mass takes it. Whenever the size ratio
    /// exceeds `max_split_ratio`, [`balance`] shifts members over.
    pub(crate) fn split_class(&mut self, class: ClassId) -> Result<(ClassId, ClassId)> {
        let l = &self.nlogn;
        let max_ratio = self.config.max_split_ratio;
        let h = &mut self.sides.history;
        let members = h.classes[class].members().to_vec();
        debug_assert!(members.len() >= 2);

        let left = h.alloc_class()?;
        let right = h.alloc_class()?;
        h.classes[left].add_word(members[0], h.class_words[members[0]].counts());
        h.classes[right].add_word(members[1], h.class_words[members[1]].counts());

        for &w in &members[2..] {
            let counts = h.class_words[w].counts();
            let left_loss = -h.classes[left].counts().merge_mi_change(counts, l);
            let right_loss = -h.classes[right].counts().merge_mi_change(counts, l);
            let go_left = if left_loss != right_loss {
                left_loss < right_loss
            } else {
                h.classes[left].counts().total() <= h.classes[right].counts().total()
            };
            let target = if go_left { left } else { right };
            h.classes[target].add_word(w, counts);
            balance(h, left, right, max_ratio, l);
        }

        h.classes[class].set_left_child(left);
        h.classes[class].set_right_child(right);
        h.classes[left].set_parent(class);
        h.classes[right].set_parent(class);
        Ok((left, right))
    }
}

/// Size ratio of the larger to the smaller child.
pub(crate) fn size_ratio(a: usize, b: usize) -> f64 {
    let (big, small) = if a >= b { (a, b) } else { (b, a) };
    if small == 0 {
        f64::INFINITY
    } else {
        big as f64 / small as f64
    }
}

/// While the larger child is more than `max_ratio` times the smaller one,
/// move over the member whose transfer costs the least objective. Stops early
/// when a transfer would only swap the two sizes.
fn balance(side: &mut Side, left: ClassId, right: ClassId, max_ratio: f64, l: &NLogN) {
    loop {
        let (nl, nr) = (side.classes[left].len(), side.classes[right].len());
        if size_ratio(nl, nr) <= max_ratio {
            return;
        }
        let (big, small) = if nl >= nr { (left, right) } else { (right, left) };
        let (big_len, small_len) = (nl.max(nr), nl.min(nr));
        if big_len < small_len + 2 {
            return;
        }

        let mut best: Option<(usize, f64)> = None;
        {
            let big_counts = side.classes[big].counts();
            let small_counts = side.classes[small].counts();
            for &w in side.classes[big].members() {
                let counts = side.class_words[w].counts();
                let delta = big_counts.remove_mi_change_vector(counts, l)
                    + counts.mi_contribution(l)
                    + small_counts.merge_mi_change(counts, l);
                if best.map_or(true, |(_, b)| delta > b) {
                    best = Some((w, delta));
                }
            }
        }
        let Some((w, _)) = best else {
            return;
        };
        let counts = side.class_words[w].counts().clone();
        let (from, to) = side.class_pair_mut(big, small);
        from.remove_word(w, &counts);
        to.add_word(w, &counts);
    }
}
