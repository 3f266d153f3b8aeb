//! Brown-style mutual-information clustering.
//!
//! Words are grouped so that the class of one word says as much as possible
//! about the class of the next. With `N(c,d)` the class bigram counts, the
//! engine maximizes
//!
//! ```text
//! N·AMI = Σ_{c,d} L(N(c,d)) − Σ_c L(N(c,·)) − Σ_d L(N(·,d)) + L(N)
//! ```
//!
//! where `L(x) = x·log2(x)`. Every phase works on incremental changes of this
//! quantity rather than recomputing it.
//!
//! ## Roles
//!
//! A word plays two roles: *history* (the first word of a bigram) and
//! *future* (the second). Each role is a [`Side`] with its own partition;
//! a word's counts on one side are keyed by the other side's ids. The two
//! partitions are kept identical, but the per-side class-collapsed counts
//! are only valid after a resync.
//!
//! ## Phases
//!
//! 1. **Seed**: the `K` most frequent words become singleton classes; every
//!    other word enters as a singleton and the frontier is reduced back to
//!    `K` classes using the [`LossCache`].
//! 2. **Reclassify**: single words move to the class that raises the
//!    objective most, until a pass gains nothing.
//! 3. **Split**: each top-level class is bisected down to single words.
//! 4. **Agglomerate**: the `K` classes are merged pairwise into one root.
//!
//! The result is a [`ClassTree`](crate::hierarchy::ClassTree).

mod agglomerate;
mod config;
mod engine;
mod loss_cache;
mod reclassify;
mod side;
mod split;
mod word;

pub use config::ClusterConfig;
pub use engine::ClusterEngine;
pub use loss_cache::LossCache;
pub use side::{Frontier, Side, SideKind, SidePair};
pub use word::{Word, WordId};
