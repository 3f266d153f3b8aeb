//! Tabulated `x · log2(x)`.

/// Default number of tabulated entries.
pub const DEFAULT_TABLE_SIZE: usize = 1 << 16;

/// Lookup table for `L(x) = x · log2(x)` with `L(0) = 0`.
///
/// Values below the table bound are precomputed; larger arguments are
/// computed directly. Built once and shared by reference with every count
/// vector that needs it.
#[derive(Debug, Clone)]
pub struct NLogN {
    table: Vec<f64>,
}

impl NLogN {
    /// Build a table covering `0..size`.
    pub fn new(size: usize) -> Self {
        let table = (0..size.max(1)).map(|x| Self::compute(x as u64)).collect();
        Self { table }
    }

    /// `x · log2(x)`, exactly `0.0` at `x = 0`.
    #[inline]
    pub fn get(&self, x: u64) -> f64 {
        match self.table.get(x as usize) {
            Some(&v) => v,
            None => Self::compute(x),
        }
    }

    /// Number of tabulated entries.
    pub fn table_size(&self) -> usize {
        self.table.len()
    }

    #[inline]
    fn compute(x: u64) -> f64 {
        if x == 0 {
            0.0
        } else {
            let xf = x as f64;
            xf * xf.log2()
        }
    }
}

impl Default for NLogN {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_exactly_zero() {
        let l = NLogN::new(16);
        assert_eq!(l.get(0), 0.0);
        assert_eq!(l.get(1), 0.0);
    }

    #[test]
    fn table_and_direct_agree_at_bound() {
        let l = NLogN::new(8);
        assert_eq!(l.table_size(), 8);
        assert!((l.get(7) - 7.0 * 7f64.log2()).abs() < 1e-12);
        assert!((l.get(8) - 24.0).abs() < 1e-12);
        assert!((l.get(1 << 20) - 20.0 * (1u64 << 20) as f64).abs() < 1e-6);
    }
}
