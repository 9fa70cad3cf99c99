//! # te-viz
//!
//! Visualization data artifacts for trigeff.
//!
//! Renderers never see counters: they get plot-friendly JSON structures
//! (parallel arrays, `null` for empty bins) grouped one plot per
//! (trigger tag, path, variable), with one series per dataset.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Efficiency plot artifacts.
pub mod efficiency;

/// Run report artifact.
pub mod report;

pub use efficiency::{EfficiencyPlotArtifact, EfficiencySeries, PlotMeta, plots_from_curves};
pub use report::RunReportArtifact;

use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_unix_ms() -> te_core::Result<u128> {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| te_core::Error::Computation(format!("system time error: {}", e)))?;
    Ok(d.as_millis())
}
