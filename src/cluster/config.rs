//! Clustering parameters and their validation.

use crate::counts::DEFAULT_TABLE_SIZE;
use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a clustering run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClusterConfig {
    /// Number of top-level classes (K).
    pub num_classes: usize,
    /// Largest allowed size ratio between the two halves of a split.
    pub max_split_ratio: f64,
    /// Words more frequent than this are absorbed with the full pairwise
    /// frontier scan; the rest use the single-target scan.
    pub min_class_size: u64,
    /// Upper bound on reclassification passes.
    pub max_reclass_iters: usize,
    /// Reclassification stops once a pass gains no more than this.
    pub min_reclass_gain: f64,
    /// Entries in the `x · log2(x)` lookup table.
    pub nlogn_table_size: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            num_classes: 500,
            max_split_ratio: 10.0,
            min_class_size: 100,
            max_reclass_iters: 20,
            min_reclass_gain: 0.0,
            nlogn_table_size: DEFAULT_TABLE_SIZE,
        }
    }
}

impl ClusterConfig {
    /// Default configuration with `num_classes` top-level classes.
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            ..Self::default()
        }
    }

    /// Set the number of top-level classes.
    pub fn with_num_classes(mut self, k: usize) -> Self {
        self.num_classes = k;
        self
    }

    /// Set the split balance bound.
    pub fn with_max_split_ratio(mut self, ratio: f64) -> Self {
        self.max_split_ratio = ratio;
        self
    }

    /// Set the high-frequency threshold.
    pub fn with_min_class_size(mut self, size: u64) -> Self {
        self.min_class_size = size;
        self
    }

    /// Set the reclassification pass cap.
    pub fn with_max_reclass_iters(mut self, iters: usize) -> Self {
        self.max_reclass_iters = iters;
        self
    }

    /// Set the reclassification convergence threshold.
    pub fn with_min_reclass_gain(mut self, gain: f64) -> Self {
        self.min_reclass_gain = gain;
        self
    }

    /// Set the lookup table size.
    pub fn with_nlogn_table_size(mut self, size: usize) -> Self {
        self.nlogn_table_size = size;
        self
    }

    /// Check parameter ranges against a vocabulary of `vocab_size` words.
    pub fn validate(&self, vocab_size: usize) -> Result<()> {
        if self.num_classes == 0 || self.num_classes > vocab_size {
            return Err(Error::InvalidClusterCount {
                requested: self.num_classes,
                n_items: vocab_size,
            });
        }
        if self.max_split_ratio.is_nan() || self.max_split_ratio < 1.0 {
            return Err(Error::InvalidParameter {
                name: "max_split_ratio",
                message: "must be at least 1",
            });
        }
        if !self.min_reclass_gain.is_finite() {
            return Err(Error::InvalidParameter {
                name: "min_reclass_gain",
                message: "must be finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ClusterConfig::new(50);
        assert_eq!(c.num_classes, 50);
        assert_eq!(c.max_split_ratio, 10.0);
        assert_eq!(c.min_class_size, 100);
        assert_eq!(c.max_reclass_iters, 20);
        assert_eq!(c.min_reclass_gain, 0.0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(ClusterConfig::new(3).validate(3).is_ok());
        assert!(matches!(
            ClusterConfig::new(4).validate(3),
            Err(Error::InvalidClusterCount { requested: 4, n_items: 3 })
        ));
        assert!(matches!(
            ClusterConfig::new(0).validate(3),
            Err(Error::InvalidClusterCount { .. })
        ));
        assert!(matches!(
            ClusterConfig::new(2).with_max_split_ratio(0.5).validate(3),
            Err(Error::InvalidParameter { name: "max_split_ratio", .. })
        ));
        assert!(ClusterConfig::new(2)
            .with_max_split_ratio(f64::NAN)
            .validate(3)
            .is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_defaults() {
        let c: ClusterConfig = serde_json::from_str(r#"{"num_classes": 8}"#).unwrap();
        assert_eq!(c, ClusterConfig::new(8));
    }
}
