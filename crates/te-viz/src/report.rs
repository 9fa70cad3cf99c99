//! Run-level report written next to the plot artifacts.

use serde::Serialize;
use te_core::Result;
use te_eff::{EfficiencyConfig, RunSummary};

/// Schema tag of [`RunReportArtifact`].
pub const REPORT_SCHEMA_V0: &str = "trigeff_run_report_v0";

/// Summary of one run: event bookkeeping plus the artifacts written.
#[derive(Debug, Clone, Serialize)]
pub struct RunReportArtifact {
    /// Schema tag.
    pub schema_version: String,
    /// Producing tool version.
    pub tool_version: String,
    /// Creation time.
    pub created_unix_ms: u128,
    /// Matching radius used.
    pub match_radius: f64,
    /// Dataset labels in comparison order.
    pub datasets: Vec<String>,
    /// Event bookkeeping.
    pub summary: RunSummary,
    /// Number of counters filled.
    pub n_counters: usize,
    /// Plot artifact paths, relative to the output directory.
    pub plots: Vec<String>,
}

impl RunReportArtifact {
    /// Build a report.
    pub fn new(config: &EfficiencyConfig, summary: RunSummary, plots: Vec<String>) -> Result<Self> {
        Ok(Self {
            schema_version: REPORT_SCHEMA_V0.to_string(),
            tool_version: te_core::VERSION.to_string(),
            created_unix_ms: crate::now_unix_ms()?,
            match_radius: config.match_radius,
            datasets: config.datasets.iter().map(|d| d.label.clone()).collect(),
            summary,
            n_counters: config.n_counters(),
            plots,
        })
    }
}
