//! Run configuration: trigger menu, binning tables and datasets.
//!
//! [`RunConfig`] is the deserialized form. [`RunConfig::resolve`] validates it
//! once and produces an immutable [`EfficiencyConfig`] in which every
//! (tag, path, variable, dataset) tuple already has its counter index, so the
//! event loop never looks anything up by name.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Deserialize;
use te_core::{Arity, Category, Error, ObjectKind, Result, Variable};

use crate::binning::BinEdges;
use crate::counter::CounterKey;
use crate::interval::IntervalConfig;

/// Schema identifier accepted in `schema_version`.
pub const CONFIG_SCHEMA_V0: &str = "trigeff_config_v0";

/// Default angular matching radius.
pub const DEFAULT_MATCH_RADIUS: f64 = 0.3;

/// Default progress-log period, in events.
pub const DEFAULT_PROGRESS_EVERY: usize = 10_000;

fn default_match_radius() -> f64 {
    DEFAULT_MATCH_RADIUS
}

fn default_progress_every() -> usize {
    DEFAULT_PROGRESS_EVERY
}

/// One dataset entry of the run file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    /// Dataset label, e.g. `"Online"`.
    pub label: String,
    /// Trigger stream location, resolved by the caller.
    #[serde(default)]
    pub triggers: Option<PathBuf>,
    /// Plot color hint for renderers.
    #[serde(default)]
    pub color: Option<String>,
}

/// Deserialized run file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Optional schema tag; must equal [`CONFIG_SCHEMA_V0`] when present.
    #[serde(default)]
    pub schema_version: Option<String>,
    /// Angular matching radius (delta R).
    #[serde(default = "default_match_radius")]
    pub match_radius: f64,
    /// Uncertainty interval settings.
    #[serde(default)]
    pub interval: IntervalConfig,
    /// Log progress every N events (0 disables).
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
    /// Datasets to compare; the first one is the reference.
    pub datasets: Vec<DatasetConfig>,
    /// Trigger tag (e.g. `SingleMuon`) -> trigger paths.
    pub triggers: BTreeMap<String, Vec<String>>,
    /// Trigger tag -> variable name -> bin edges.
    pub binning: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
}

/// Resolved dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSpec {
    /// Dataset label.
    pub label: String,
    /// Plot color hint.
    pub color: Option<String>,
}

/// Binning of one variable for one trigger path.
#[derive(Debug, Clone)]
pub struct VariableSlot {
    /// Binning variable.
    pub variable: Variable,
    /// Bin edges.
    pub edges: BinEdges,
    /// Index of the dataset-0 counter; dataset `d` uses `first_counter + d`.
    pub first_counter: usize,
}

/// One (tag, path) pair with all its binning variables.
#[derive(Debug, Clone)]
pub struct TriggerPlan {
    /// Trigger tag.
    pub kind: ObjectKind,
    /// Path name.
    pub path: String,
    /// Index into [`EfficiencyConfig::paths`].
    pub path_index: usize,
    /// Variables to fill.
    pub variables: Vec<VariableSlot>,
}

/// Validated, immutable configuration shared by the engine components.
#[derive(Debug, Clone)]
pub struct EfficiencyConfig {
    /// Angular matching radius.
    pub match_radius: f64,
    /// Interval settings for curve building.
    pub interval: IntervalConfig,
    /// Progress-log period (0 disables).
    pub progress_every: usize,
    /// Stop after this many entries.
    pub max_events: Option<usize>,
    /// Datasets in comparison order.
    pub datasets: Vec<DatasetSpec>,
    /// Distinct trigger path names, in registration order.
    pub paths: Vec<String>,
    /// Trigger plans.
    pub plans: Vec<TriggerPlan>,
    /// Object categories that any plan needs.
    pub categories: Vec<Category>,
    n_counters: usize,
}

impl RunConfig {
    /// Validate and resolve into an [`EfficiencyConfig`].
    pub fn resolve(&self) -> Result<EfficiencyConfig> {
        if let Some(v) = self.schema_version.as_deref().filter(|v| *v != CONFIG_SCHEMA_V0) {
            return Err(Error::Config(format!(
                "unsupported schema_version '{v}' (expected '{CONFIG_SCHEMA_V0}')"
            )));
        }
        if !self.match_radius.is_finite() || self.match_radius <= 0.0 {
            return Err(Error::Config(format!(
                "match_radius must be finite and > 0, got {}",
                self.match_radius
            )));
        }
        self.interval.validate()?;

        if self.datasets.is_empty() {
            return Err(Error::Config("at least one dataset is required".to_string()));
        }
        let mut labels = BTreeSet::new();
        for d in &self.datasets {
            if d.label.is_empty() {
                return Err(Error::Config("dataset label must not be empty".to_string()));
            }
            if !labels.insert(d.label.as_str()) {
                return Err(Error::Config(format!("duplicate dataset label '{}'", d.label)));
            }
        }
        let n_datasets = self.datasets.len();

        for tag in self.binning.keys() {
            if !self.triggers.contains_key(tag) {
                log::warn!("binning for '{tag}' has no trigger paths; ignoring");
            }
        }

        let mut paths: Vec<String> = Vec::new();
        let mut plans = Vec::new();
        let mut categories = BTreeSet::new();
        let mut n_counters = 0usize;

        for (tag, tag_paths) in &self.triggers {
            let kind: ObjectKind = tag.parse()?;
            if tag_paths.is_empty() {
                log::debug!("trigger tag '{tag}' has no paths; nothing to measure");
                continue;
            }
            let table = self
                .binning
                .get(tag)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| Error::Config(format!("no binning configured for '{tag}'")))?;

            let mut variables = Vec::with_capacity(table.len());
            for (name, edges) in table {
                let variable: Variable = name.parse()?;
                if !variable.admissible_for(kind.arity) {
                    return Err(Error::Config(format!(
                        "variable '{name}' is not defined for {} triggers ('{tag}')",
                        kind.arity.name()
                    )));
                }
                let edges = BinEdges::new(edges.clone())
                    .map_err(|e| Error::Config(format!("binning '{tag}/{name}': {e}")))?;
                variables.push((variable, edges));
            }

            let mut seen = BTreeSet::new();
            for path in tag_paths {
                if path.is_empty() {
                    return Err(Error::Config(format!("empty trigger path name in '{tag}'")));
                }
                if !seen.insert(path.as_str()) {
                    return Err(Error::Config(format!("duplicate path '{path}' in '{tag}'")));
                }
                let path_index = match paths.iter().position(|p| p == path) {
                    Some(i) => i,
                    None => {
                        paths.push(path.clone());
                        paths.len() - 1
                    }
                };
                let slots = variables
                    .iter()
                    .map(|(variable, edges)| {
                        let slot = VariableSlot {
                            variable: *variable,
                            edges: edges.clone(),
                            first_counter: n_counters,
                        };
                        n_counters += n_datasets;
                        slot
                    })
                    .collect();
                plans.push(TriggerPlan {
                    kind,
                    path: path.clone(),
                    path_index,
                    variables: slots,
                });
            }
            categories.insert(kind.category);
        }

        Ok(EfficiencyConfig {
            match_radius: self.match_radius,
            interval: self.interval,
            progress_every: self.progress_every,
            max_events: None,
            datasets: self
                .datasets
                .iter()
                .map(|d| DatasetSpec { label: d.label.clone(), color: d.color.clone() })
                .collect(),
            paths,
            plans,
            categories: categories.into_iter().collect(),
            n_counters,
        })
    }
}

impl EfficiencyConfig {
    /// Limit the number of entries read from the event source.
    pub fn with_max_events(mut self, max_events: Option<usize>) -> Self {
        self.max_events = max_events;
        self
    }

    /// Total number of counters the configuration defines.
    pub fn n_counters(&self) -> usize {
        self.n_counters
    }

    /// Indices into [`EfficiencyConfig::plans`] for one arity and category.
    pub fn plan_indices(&self, arity: Arity, category: Category) -> Vec<usize> {
        self.plans
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind.arity == arity && p.kind.category == category)
            .map(|(i, _)| i)
            .collect()
    }

    /// Key of the counter at `slot` for dataset index `dataset`.
    pub fn counter_key(&self, plan: &TriggerPlan, slot: &VariableSlot, dataset: usize) -> CounterKey {
        CounterKey::new(plan.kind, plan.path.clone(), slot.variable, self.datasets[dataset].label.clone())
    }

    /// Resolve a counter index by names.
    ///
    /// Returns a configuration error for tuples that were never configured.
    pub fn counter_index(&self, key: &CounterKey) -> Result<usize> {
        let dataset = self
            .datasets
            .iter()
            .position(|d| d.label == key.dataset)
            .ok_or_else(|| Error::Config(format!("unknown dataset '{}'", key.dataset)))?;
        self.plans
            .iter()
            .filter(|p| p.kind == key.kind && p.path == key.path)
            .flat_map(|p| p.variables.iter())
            .find(|s| s.variable == key.variable)
            .map(|s| s.first_counter + dataset)
            .ok_or_else(|| Error::Config(format!("no binning configured for '{key}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_json(extra: &str) -> String {
        format!(
            r#"{{
                "datasets": [{{"label": "Online"}}, {{"label": "Miscalibrated", "color": "red"}}],
                "triggers": {{
                    "SingleMuon": ["HLT_Mu3", "HLT_Mu7"],
                    "DoubleMuon": ["HLT_DoubleMu0", "HLT_Mu3"]
                }},
                "binning": {{
                    "SingleMuon": {{"Pt": [0, 5, 10, 20], "Eta": [-2.4, 0, 2.4]}},
                    "DoubleMuon": {{"Pt": [0, 10, 30], "Rapidity": [-2.4, 2.4]}}
                }}
                {extra}
            }}"#
        )
    }

    fn parse(json: &str) -> RunConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn resolve_assigns_dense_counter_indices() {
        let cfg = parse(&config_json("")).resolve().unwrap();
        assert_eq!(cfg.match_radius, DEFAULT_MATCH_RADIUS);
        assert_eq!(cfg.progress_every, DEFAULT_PROGRESS_EVERY);
        // 4 plans x 2 variables x 2 datasets.
        assert_eq!(cfg.n_counters(), 16);
        assert_eq!(cfg.categories, vec![Category::Muon]);
        // HLT_Mu3 appears under both tags but is registered once.
        assert_eq!(cfg.paths.len(), 3);

        let mut seen: Vec<usize> = Vec::new();
        for plan in &cfg.plans {
            for slot in &plan.variables {
                for d in 0..cfg.datasets.len() {
                    let key = cfg.counter_key(plan, slot, d);
                    let idx = cfg.counter_index(&key).unwrap();
                    assert_eq!(idx, slot.first_counter + d);
                    seen.push(idx);
                }
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn plans_are_filtered_by_arity_and_category() {
        let cfg = parse(&config_json("")).resolve().unwrap();
        let singles = cfg.plan_indices(Arity::Single, Category::Muon);
        assert_eq!(singles.len(), 2);
        assert!(singles.iter().all(|&i| cfg.plans[i].kind.arity == Arity::Single));
        assert_eq!(cfg.plan_indices(Arity::Double, Category::Muon).len(), 2);
        assert!(cfg.plan_indices(Arity::Single, Category::Electron).is_empty());
    }

    #[test]
    fn missing_binning_is_fatal() {
        let json = r#"{
            "datasets": [{"label": "Online"}],
            "triggers": {"SinglePhoton": ["HLT_Photon40"]},
            "binning": {}
        }"#;
        let err = parse(json).resolve().unwrap_err();
        assert!(err.to_string().contains("no binning"), "{err}");
    }

    #[test]
    fn inadmissible_variable_is_fatal() {
        let json = r#"{
            "datasets": [{"label": "Online"}],
            "triggers": {"DoubleMuon": ["HLT_DoubleMu0"]},
            "binning": {"DoubleMuon": {"Eta": [-2.4, 2.4]}}
        }"#;
        assert!(parse(json).resolve().is_err());
    }

    #[test]
    fn bad_edges_are_fatal() {
        let json = r#"{
            "datasets": [{"label": "Online"}],
            "triggers": {"SingleMuon": ["HLT_Mu3"]},
            "binning": {"SingleMuon": {"Pt": [0, 10, 5]}}
        }"#;
        let err = parse(json).resolve().unwrap_err();
        assert!(err.to_string().contains("SingleMuon/Pt"), "{err}");
    }

    #[test]
    fn dataset_and_radius_validation() {
        let dup = config_json("").replace("Miscalibrated", "Online");
        assert!(parse(&dup).resolve().is_err());

        let mut cfg = parse(&config_json(""));
        cfg.match_radius = 0.0;
        assert!(cfg.resolve().is_err());

        let mut cfg = parse(&config_json(""));
        cfg.datasets.clear();
        assert!(cfg.resolve().is_err());

        let mut cfg = parse(&config_json(""));
        cfg.schema_version = Some("other".into());
        assert!(cfg.resolve().is_err());

        let mut cfg = parse(&config_json(""));
        cfg.schema_version = Some(CONFIG_SCHEMA_V0.into());
        assert!(cfg.resolve().is_ok());
    }

    #[test]
    fn tag_without_paths_needs_no_binning() {
        let json = r#"{
            "datasets": [{"label": "Online"}],
            "triggers": {"SingleMuon": ["HLT_Mu3"], "SinglePhoton": []},
            "binning": {"SingleMuon": {"Pt": [0, 10]}}
        }"#;
        let cfg = parse(json).resolve().unwrap();
        assert_eq!(cfg.n_counters(), 1);
        assert_eq!(cfg.categories, vec![Category::Muon]);

        let unknown = json.replace("SinglePhoton", "SingleJet");
        assert!(parse(&unknown).resolve().is_err());
    }

    #[test]
    fn unknown_counter_key_is_config_error() {
        let cfg = parse(&config_json("")).resolve().unwrap();
        let key = CounterKey::new(
            ObjectKind::new(Arity::Single, Category::Muon),
            "HLT_Mu3",
            Variable::Mass,
            "Online",
        );
        assert!(matches!(cfg.counter_index(&key), Err(Error::Config(_))));
    }

    #[test]
    fn optional_fields() {
        let cfg = parse(&config_json(r#", "match_radius": 0.1, "progress_every": 0"#));
        let resolved = cfg.resolve().unwrap();
        assert_eq!(resolved.match_radius, 0.1);
        assert_eq!(resolved.progress_every, 0);
        assert_eq!(resolved.datasets[1].color.as_deref(), Some("red"));
    }
}
