//! `trigeff run` / `trigeff validate`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use te_eff::{Aggregator, CurveBuilder, EfficiencyConfig, RunConfig};
use te_io::{MemoryEventSource, RecordTriggerSource};
use te_viz::{RunReportArtifact, plots_from_curves};

/// Read a run file. YAML is a superset of JSON, so one parser covers both.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: RunConfig = serde_yaml_ng::from_slice(&bytes)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}

fn base_dir(config_path: &Path) -> PathBuf {
    config_path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn open_trigger_sources(
    raw: &RunConfig,
    base: &Path,
) -> Result<Vec<RecordTriggerSource>> {
    raw.datasets
        .iter()
        .map(|d| {
            let rel = d
                .triggers
                .as_ref()
                .with_context(|| format!("dataset '{}' has no `triggers` stream", d.label))?;
            let path = base.join(rel);
            tracing::info!(dataset = %d.label, path = %path.display(), "opening trigger stream");
            RecordTriggerSource::open(&path)
                .with_context(|| format!("failed to open trigger stream {}", path.display()))
        })
        .collect()
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn cmd_run(
    config_path: &Path,
    events_path: &Path,
    output_dir: &Path,
    threads: usize,
    max_events: Option<usize>,
) -> Result<()> {
    if threads > 0 {
        // Best-effort; if a global pool already exists, keep going.
        let _ = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global();
    }

    tracing::info!(path = %config_path.display(), "loading run config");
    let raw = load_run_config(config_path)?;
    let cfg: EfficiencyConfig = raw.resolve()?.with_max_events(max_events);
    tracing::info!(
        datasets = cfg.datasets.len(),
        paths = cfg.paths.len(),
        counters = cfg.n_counters(),
        "run config resolved"
    );

    let mut triggers = open_trigger_sources(&raw, &base_dir(config_path))?;
    let mut events = MemoryEventSource::open(events_path)
        .with_context(|| format!("failed to read events {}", events_path.display()))?;

    let mut agg = Aggregator::new(&cfg, &mut triggers)?;
    let summary = agg.run(&mut events, &mut triggers)?;

    let builder = CurveBuilder::new(cfg.interval)?;
    let curves = builder.build_all(agg.counter_list())?;
    let plots = plots_from_curves(&curves, &cfg.datasets, &cfg.interval)?;

    let mut written = Vec::with_capacity(plots.len());
    for plot in &plots {
        let rel = PathBuf::from(plot.group_dir()).join("json").join(format!("{}.json", plot.title));
        write_json(&output_dir.join(&rel), plot)?;
        written.push(rel.to_string_lossy().into_owned());
    }
    tracing::info!(n = written.len(), dir = %output_dir.display(), "plot artifacts written");

    let report = RunReportArtifact::new(&cfg, summary, written)?;
    write_json(&output_dir.join("report.json"), &report)?;

    eprintln!(
        "Processed {} events ({} skipped as misaligned, {} unreadable, {} failed selection), \
         {} plots written to {}",
        summary.processed_events,
        summary.skipped_events,
        summary.malformed_events,
        summary.failed_selection,
        plots.len(),
        output_dir.display(),
    );
    Ok(())
}

#[derive(serde::Serialize)]
struct CounterLayout {
    index: usize,
    name: String,
    title: String,
    n_bins: usize,
}

pub fn cmd_validate(config_path: &Path, output: Option<&PathBuf>) -> Result<()> {
    let cfg = load_run_config(config_path)?.resolve()?;

    let mut counters = Vec::with_capacity(cfg.n_counters());
    for plan in &cfg.plans {
        for slot in &plan.variables {
            for d in 0..cfg.datasets.len() {
                let key = cfg.counter_key(plan, slot, d);
                counters.push(CounterLayout {
                    index: slot.first_counter + d,
                    name: key.name(),
                    title: key.title(),
                    n_bins: slot.edges.n_bins(),
                });
            }
        }
    }
    let value = serde_json::json!({
        "match_radius": cfg.match_radius,
        "interval": cfg.interval,
        "datasets": cfg.datasets.iter().map(|d| d.label.as_str()).collect::<Vec<_>>(),
        "categories": cfg.categories,
        "paths": cfg.paths,
        "counters": counters,
    });

    let text = serde_json::to_string_pretty(&value)?;
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}
