//! Validated variable-width bin edges.

use serde::Serialize;
use te_core::{Error, Result};

/// Strictly increasing, finite bin edges defining `len() - 1` half-open bins.
///
/// A value equal to the lower edge of bin `i` falls in bin `i`; a value equal
/// to the last edge is outside every bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BinEdges(Vec<f64>);

impl BinEdges {
    /// Validate and wrap edges.
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::Validation(format!(
                "bin edges need at least 2 values, got {}",
                edges.len()
            )));
        }
        if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
            return Err(Error::Validation(format!("bin edges must be finite, got {bad}")));
        }
        if let Some(w) = edges.windows(2).find(|w| w[1] <= w[0]) {
            return Err(Error::Validation(format!(
                "bin edges must be strictly increasing, got {} followed by {}",
                w[0], w[1]
            )));
        }
        Ok(Self(edges))
    }

    /// Number of bins.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.0.len() - 1
    }

    /// Edge values.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Lower edge of the first bin.
    #[inline]
    pub fn low(&self) -> f64 {
        self.0[0]
    }

    /// Upper edge of the last bin.
    #[inline]
    pub fn high(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// `(low, high)` edges of bin `i`.
    #[inline]
    pub fn bin_range(&self, i: usize) -> (f64, f64) {
        (self.0[i], self.0[i + 1])
    }

    /// Find the bin containing `val`.
    ///
    /// Returns `None` for underflow, overflow, the last edge itself and NaN.
    #[inline]
    pub fn find_bin(&self, val: f64) -> Option<usize> {
        let edges = &self.0;
        if !(val >= edges[0] && val < edges[edges.len() - 1]) {
            return None;
        }
        // First edge strictly above `val`, minus one.
        Some(edges.partition_point(|&e| e <= val) - 1)
    }
}
