//! Binned fired/total counters.

use std::fmt;

use serde::Serialize;
use te_core::{Error, ObjectKind, Result, Variable};

use crate::binning::BinEdges;

/// Composite key of one efficiency counter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CounterKey {
    /// Trigger tag (arity and category).
    pub kind: ObjectKind,
    /// Trigger path name.
    pub path: String,
    /// Binning variable.
    pub variable: Variable,
    /// Dataset label.
    pub dataset: String,
}

impl CounterKey {
    /// Create a key.
    pub fn new(
        kind: ObjectKind,
        path: impl Into<String>,
        variable: Variable,
        dataset: impl Into<String>,
    ) -> Self {
        Self { kind, path: path.into(), variable, dataset: dataset.into() }
    }

    /// Title shared by every dataset, e.g. `effSingleMuon_HLT_X_Pt`.
    pub fn title(&self) -> String {
        format!("eff{}_{}_{}", self.kind, self.path, self.variable)
    }

    /// Full counter name, e.g. `effSingleMuon_HLT_X_Pt_Online`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.title(), self.dataset)
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Per-bin fired/total counts for one [`CounterKey`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyCounter {
    /// Counter key.
    pub key: CounterKey,
    edges: BinEdges,
    fired: Vec<u64>,
    total: Vec<u64>,
    out_of_range: u64,
}

impl EfficiencyCounter {
    /// Create an empty counter with every bin registered.
    pub fn new(key: CounterKey, edges: BinEdges) -> Self {
        let n = edges.n_bins();
        Self { key, edges, fired: vec![0; n], total: vec![0; n], out_of_range: 0 }
    }

    /// Record one object (or pair) with value `value`.
    ///
    /// Returns whether the value landed in a bin. Out-of-range values are
    /// dropped and only tallied in [`EfficiencyCounter::out_of_range`].
    #[inline]
    pub fn fill(&mut self, value: f64, fired: bool) -> bool {
        match self.edges.find_bin(value) {
            Some(bin) => {
                self.total[bin] += 1;
                if fired {
                    self.fired[bin] += 1;
                }
                true
            }
            None => {
                self.out_of_range += 1;
                false
            }
        }
    }

    /// Add the counts of another counter with identical edges.
    pub fn merge(&mut self, other: &EfficiencyCounter) -> Result<()> {
        if self.edges != other.edges {
            return Err(Error::Validation(format!(
                "cannot merge '{}' into '{}': bin edges differ",
                other.key, self.key
            )));
        }
        for (a, b) in self.fired.iter_mut().zip(&other.fired) {
            *a += b;
        }
        for (a, b) in self.total.iter_mut().zip(&other.total) {
            *a += b;
        }
        self.out_of_range += other.out_of_range;
        Ok(())
    }

    /// Bin edges.
    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    /// Fired counts per bin.
    pub fn fired(&self) -> &[u64] {
        &self.fired
    }

    /// Total counts per bin.
    pub fn total(&self) -> &[u64] {
        &self.total
    }

    /// Number of dropped out-of-range fills.
    pub fn out_of_range(&self) -> u64 {
        self.out_of_range
    }

    /// Sum of totals over all bins.
    pub fn entries(&self) -> u64 {
        self.total.iter().sum()
    }
}
