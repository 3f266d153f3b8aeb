//! Count storage and incremental mutual-information deltas.
//!
//! # The Objective
//!
//! For a bigram table `N(c, d)` over history classes `c` and future classes
//! `d`, average mutual information scaled by the total count `N` is
//!
//! ```text
//! N · AMI = Σ L(N(c,d)) − Σ L(N(c,·)) − Σ L(N(·,d)) + L(N)
//! L(x)    = x · log2(x),   L(0) = 0
//! ```
//!
//! A history class stores its row `N(c, ·)` as a [`CountVector`]; a future
//! class stores its column. Every structural edit (adding a word, merging two
//! classes, moving a word) touches a handful of cells and one marginal per
//! vector, so its effect on the objective is a short sum of `L` differences
//! that [`CountVector`] computes without mutating anything.

mod nlogn;
mod vector;

pub use nlogn::{NLogN, DEFAULT_TABLE_SIZE};
pub use vector::CountVector;
