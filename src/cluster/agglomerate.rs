//! Bottom-up merging of the top-level classes into a single root.

use std::mem;

use tracing::debug;

use super::engine::ClusterEngine;
use crate::error::{Error, Result};
use crate::hierarchy::{ClassId, Dendrogram};

impl ClusterEngine {
    /// Repeatedly merge the cheapest pair of frontier classes under a new
    /// parent until one class is left, and return it.
    ///
    /// Losses are history-side: merging rows `a` and `b` while the columns
    /// they are keyed by stay fixed. A merge therefore only invalidates the
    /// two slots it touches.
    pub(crate) fn merge_frontier(&mut self) -> Result<ClassId> {
        let l = &self.nlogn;
        let h = &mut self.sides.history;
        self.dendrogram = Dendrogram::new(h.frontier.classes());
        h.loss.invalidate_all();

        let mut sizes = vec![1usize; h.capacity()];
        while h.frontier.len() > 1 {
            let classes = &h.classes;
            let Some((i, j, loss)) = h.loss.select_best(&h.frontier, |a, b| {
                -classes[a].counts().merge_mi_change(classes[b].counts(), l)
            }) else {
                break;
            };
            let (Some(a), Some(b)) = (h.frontier.get(i), h.frontier.take(j)) else {
                break;
            };

            let p = h.alloc_class()?;
            let mut parent = mem::take(&mut h.classes[p]);
            parent.merge_to_new_parent(&h.classes[a], &h.classes[b]);
            parent.set_left_child(a);
            parent.set_right_child(b);
            h.classes[p] = parent;
            h.classes[a].set_parent(p);
            h.classes[b].set_parent(p);

            sizes[p] = sizes[a] + sizes[b];
            h.frontier.replace(i, p);
            h.loss.invalidate(i);
            h.loss.invalidate(j);
            self.dendrogram.add_merge(a, b, p, loss, sizes[p]);
            debug!(left = a, right = b, parent = p, loss, "classes merged");
        }

        h.frontier.classes().first().copied().ok_or(Error::EmptyInput)
    }
}
