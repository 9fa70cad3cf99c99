//! Turn-on curve artifacts: one plot per (trigger tag, path, variable).

use std::collections::BTreeMap;

use serde::Serialize;
use te_core::{Arity, Category, Error, ObjectKind, Result, Variable};
use te_eff::{DatasetSpec, EfficiencyCurve, IntervalConfig, IntervalMethod};

/// Schema tag of [`EfficiencyPlotArtifact`].
pub const PLOT_SCHEMA_V0: &str = "trigeff_efficiency_plot_v0";

/// Provenance block.
#[derive(Debug, Clone, Serialize)]
pub struct PlotMeta {
    /// Producing tool.
    pub tool: String,
    /// Tool version.
    pub tool_version: String,
    /// Creation time.
    pub created_unix_ms: u128,
    /// Interval family used for the error bars.
    pub interval_method: IntervalMethod,
    /// Interval coverage.
    pub confidence_level: f64,
}

/// One dataset's curve as parallel arrays aligned with the bins.
#[derive(Debug, Clone, Serialize)]
pub struct EfficiencySeries {
    /// Dataset label (legend entry).
    pub dataset: String,
    /// Color hint.
    pub color: Option<String>,
    /// True for the first (reference) dataset, drawn with markers.
    pub reference: bool,
    /// Bin centers.
    pub x: Vec<f64>,
    /// Half-widths to the lower edges.
    pub x_err_lo: Vec<f64>,
    /// Half-widths to the upper edges.
    pub x_err_hi: Vec<f64>,
    /// Efficiency, `null` where the bin is empty.
    pub y: Vec<Option<f64>>,
    /// Lower error bars.
    pub y_err_lo: Vec<Option<f64>>,
    /// Upper error bars.
    pub y_err_hi: Vec<Option<f64>>,
    /// Fired counts.
    pub fired: Vec<u64>,
    /// Total counts.
    pub total: Vec<u64>,
}

/// Everything a renderer needs to draw one turn-on plot.
#[derive(Debug, Clone, Serialize)]
pub struct EfficiencyPlotArtifact {
    /// Schema tag.
    pub schema_version: String,
    /// Provenance.
    pub meta: PlotMeta,
    /// Plot title, e.g. `effSingleMuon_HLT_Mu3_Pt`.
    pub title: String,
    /// Trigger tag.
    pub tag: String,
    /// Object category.
    pub category: Category,
    /// Trigger path.
    pub path: String,
    /// Binning variable.
    pub variable: Variable,
    /// x-axis label (TLatex syntax).
    pub x_label: String,
    /// y-axis label.
    pub y_label: String,
    /// x-axis limits, the full binning range even if edge bins are empty.
    pub x_range: [f64; 2],
    /// Bin edges.
    pub bin_edges: Vec<f64>,
    /// Horizontal guide line.
    pub reference_line: f64,
    /// Text lines: path name, then the offline selection.
    pub annotations: Vec<String>,
    /// One series per dataset, reference first.
    pub series: Vec<EfficiencySeries>,
}

impl EfficiencyPlotArtifact {
    /// Category directory name used when writing artifacts (`"SingleMuon"`).
    pub fn group_dir(&self) -> &str {
        &self.tag
    }
}

fn symbol(category: Category) -> &'static str {
    match category {
        Category::Electron => "e",
        Category::Photon => "#gamma",
        Category::Muon => "#mu",
    }
}

fn x_label(kind: ObjectKind, variable: Variable) -> String {
    let s = symbol(kind.category);
    let obj = match kind.arity {
        Arity::Single => s.to_string(),
        Arity::Double => format!("{s}{s}"),
    };
    match variable {
        Variable::Pt => format!("p^{{{obj}}}_{{T}} (GeV/c)"),
        Variable::Eta => format!("#eta^{{{obj}}}"),
        Variable::Phi => format!("#phi^{{{obj}}}"),
        Variable::Rapidity => format!("y^{{{obj}}}"),
        Variable::Mass => format!("m^{{{obj}}} (GeV/c^{{2}})"),
    }
}

/// Offline selection lines drawn under the path name.
fn selection_lines(category: Category) -> [&'static str; 2] {
    match category {
        Category::Electron => ["p^{e}_{T} > 20 GeV/c", "|#eta^{e}| < 2.1"],
        Category::Photon => ["p^{#gamma}_{T} > 40 GeV/c", "|#eta^{#gamma}| < 2.4"],
        Category::Muon => ["p^{#mu}_{T} > 1.5 GeV/c", "|#eta^{#mu}| < 2.4"],
    }
}

fn build_series(curve: &EfficiencyCurve, dataset: &DatasetSpec, reference: bool) -> EfficiencySeries {
    let n = curve.points.len();
    let mut s = EfficiencySeries {
        dataset: dataset.label.clone(),
        color: dataset.color.clone(),
        reference,
        x: Vec::with_capacity(n),
        x_err_lo: Vec::with_capacity(n),
        x_err_hi: Vec::with_capacity(n),
        y: Vec::with_capacity(n),
        y_err_lo: Vec::with_capacity(n),
        y_err_hi: Vec::with_capacity(n),
        fired: Vec::with_capacity(n),
        total: Vec::with_capacity(n),
    };
    for p in &curve.points {
        let xc = p.x_center();
        s.x.push(xc);
        s.x_err_lo.push(xc - p.x_low);
        s.x_err_hi.push(p.x_high - xc);
        s.y.push(p.estimate);
        s.y_err_lo.push(p.err_low);
        s.y_err_hi.push(p.err_high);
        s.fired.push(p.fired);
        s.total.push(p.total);
    }
    s
}

/// Group curves into one artifact per (tag, path, variable).
///
/// Series follow the order of `datasets`; the first is flagged as reference.
pub fn plots_from_curves(
    curves: &[EfficiencyCurve],
    datasets: &[DatasetSpec],
    interval: &IntervalConfig,
) -> Result<Vec<EfficiencyPlotArtifact>> {
    let mut groups: BTreeMap<(ObjectKind, &str, Variable), Vec<&EfficiencyCurve>> =
        BTreeMap::new();
    for c in curves {
        groups.entry((c.key.kind, c.key.path.as_str(), c.key.variable)).or_default().push(c);
    }

    let created_unix_ms = crate::now_unix_ms()?;
    let mut out = Vec::with_capacity(groups.len());
    for ((kind, path, variable), members) in groups {
        let edges = &members[0].edges;
        if members.iter().any(|c| &c.edges != edges) {
            return Err(Error::Validation(format!(
                "curves for {kind}/{path}/{variable} have different bin edges"
            )));
        }
        for c in &members {
            if !datasets.iter().any(|d| d.label == c.key.dataset) {
                return Err(Error::Validation(format!(
                    "curve '{}' belongs to unknown dataset '{}'",
                    c.key, c.key.dataset
                )));
            }
        }

        let series: Vec<EfficiencySeries> = datasets
            .iter()
            .filter_map(|d| members.iter().find(|c| c.key.dataset == d.label).map(|c| (d, *c)))
            .enumerate()
            .map(|(i, (d, c))| build_series(c, d, i == 0))
            .collect();

        let [sel1, sel2] = selection_lines(kind.category);
        out.push(EfficiencyPlotArtifact {
            schema_version: PLOT_SCHEMA_V0.to_string(),
            meta: PlotMeta {
                tool: "trigeff".to_string(),
                tool_version: te_core::VERSION.to_string(),
                created_unix_ms,
                interval_method: interval.method,
                confidence_level: interval.confidence_level,
            },
            title: members[0].key.title(),
            tag: kind.tag(),
            category: kind.category,
            path: path.to_string(),
            variable,
            x_label: x_label(kind, variable),
            y_label: "Efficiency".to_string(),
            x_range: [edges[0], edges[edges.len() - 1]],
            bin_edges: edges.clone(),
            reference_line: 1.0,
            annotations: vec![path.to_string(), sel1.to_string(), sel2.to_string()],
            series,
        });
    }
    Ok(out)
}
