//! # miclass
//!
//! Hierarchical word clustering from bigram statistics: words are grouped so
//! that the class of one word predicts the class of the next as well as
//! possible (average mutual information, Brown-style clustering), and the
//! classes are arranged in a binary tree whose root-to-leaf paths serve as
//! per-word bit-string features.
//!
//! ```rust
//! use miclass::{ClusterConfig, Clusterer, Vocabulary};
//!
//! let vocab = Vocabulary::from_words(["the", "cat", "a", "dog"]);
//! let mut clusterer = Clusterer::new(vocab, ClusterConfig::new(2)).unwrap();
//! clusterer.add_bigram_words("the", "cat", 5).unwrap();
//! clusterer.add_bigram_words("a", "dog", 4).unwrap();
//! clusterer.add_bigram_words("the", "dog", 1).unwrap();
//!
//! let output = clusterer.cluster().unwrap();
//! assert!(output.bit_strings().iter().all(|b| !b.is_empty()));
//! ```
//!
//! The `parallel` feature fills merge-loss caches with rayon; results are
//! identical either way. The `serde` feature derives serialization for
//! [`ClusterConfig`] and [`hierarchy::Merge`].

pub mod cluster;
pub mod clusterer;
pub mod counts;
/// Error types used across `miclass`.
pub mod error;
pub mod hierarchy;
pub mod metrics;
pub mod vocab;

pub use cluster::{ClusterConfig, ClusterEngine, SideKind, WordId};
pub use clusterer::{ClusterOutput, Clusterer};
pub use counts::{CountVector, NLogN};
pub use error::{Error, Result};
pub use hierarchy::{ClassId, ClassNode, ClassTree, Dendrogram, HealthCheck, HealthReport};
pub use metrics::average_mutual_information;
pub use vocab::Vocabulary;
