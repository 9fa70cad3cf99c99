//! Streaming aggregation of match decisions into efficiency counters.

use std::collections::BTreeMap;

use serde::Serialize;
use te_core::{
    Alignment, Arity, Category, Error, EventSource, OfflineEvent, PathId, Result, TriggerSource,
};

use crate::config::{EfficiencyConfig, TriggerPlan};
use crate::counter::{CounterKey, EfficiencyCounter};
use crate::matching::MatchEngine;

/// Event bookkeeping for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Events that reached the counters.
    pub processed_events: u64,
    /// Events dropped because a trigger stream was missing them or out of order.
    pub skipped_events: u64,
    /// Events dropped because an input record for them could not be decoded.
    pub malformed_events: u64,
    /// Aligned events rejected by the event-quality selection.
    pub failed_selection: u64,
    /// `(min, max)` centrality of processed events.
    pub centrality_range: Option<(f64, f64)>,
}

impl RunSummary {
    fn record_centrality(&mut self, c: f64) {
        if !c.is_finite() {
            return;
        }
        self.centrality_range = Some(match self.centrality_range {
            Some((lo, hi)) => (lo.min(c), hi.max(c)),
            None => (c, c),
        });
    }

    fn merge(&mut self, other: &RunSummary) {
        self.processed_events += other.processed_events;
        self.skipped_events += other.skipped_events;
        self.malformed_events += other.malformed_events;
        self.failed_selection += other.failed_selection;
        if let Some((lo, hi)) = other.centrality_range {
            self.record_centrality(lo);
            self.record_centrality(hi);
        }
    }
}

/// What happened to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Filled into the counters.
    Processed,
    /// Skipped for every dataset: at least one trigger stream lacked the event.
    Misaligned,
    /// Skipped for every dataset: a trigger record for the event was unreadable.
    Malformed,
    /// Aligned but rejected by the event selection.
    FailedSelection,
}

/// Plans of one offline category, as indices into `Aggregator::plans`.
#[derive(Debug, Clone)]
struct CategoryPlans {
    category: Category,
    singles: Vec<usize>,
    doubles: Vec<usize>,
}

/// Owns every efficiency counter of a run and folds events into them.
///
/// The trigger sources passed to [`Aggregator::process_event`] and
/// [`Aggregator::run`] must be the ones the aggregator was built with, in
/// dataset order.
#[derive(Debug, Clone)]
pub struct Aggregator {
    engine: MatchEngine,
    plans: Vec<TriggerPlan>,
    categories: Vec<CategoryPlans>,
    /// `path_ids[dataset][path_index]`
    path_ids: Vec<Vec<PathId>>,
    counters: Vec<EfficiencyCounter>,
    index: BTreeMap<CounterKey, usize>,
    progress_every: usize,
    max_events: Option<usize>,
    summary: RunSummary,
    fired: Vec<bool>,
}

impl Aggregator {
    /// Pre-register every counter and every trigger path on every source.
    pub fn new<S: TriggerSource>(config: &EfficiencyConfig, sources: &mut [S]) -> Result<Self> {
        let n_datasets = config.datasets.len();
        if sources.len() != n_datasets {
            return Err(Error::Config(format!(
                "expected {n_datasets} trigger sources (one per dataset), got {}",
                sources.len()
            )));
        }
        let engine = MatchEngine::new(config.match_radius)?;

        let path_ids = sources
            .iter_mut()
            .map(|src| config.paths.iter().map(|p| src.register_path(p)).collect())
            .collect();

        let mut counters = Vec::with_capacity(config.n_counters());
        let mut index = BTreeMap::new();
        for plan in &config.plans {
            for slot in &plan.variables {
                for d in 0..n_datasets {
                    debug_assert_eq!(counters.len(), slot.first_counter + d);
                    let key = config.counter_key(plan, slot, d);
                    index.insert(key.clone(), counters.len());
                    counters.push(EfficiencyCounter::new(key, slot.edges.clone()));
                }
            }
        }
        log::debug!(
            "registered {} counters over {} paths and {} datasets",
            counters.len(),
            config.paths.len(),
            n_datasets
        );

        Ok(Self {
            engine,
            plans: config.plans.clone(),
            categories: config
                .categories
                .iter()
                .map(|&category| CategoryPlans {
                    category,
                    singles: config.plan_indices(Arity::Single, category),
                    doubles: config.plan_indices(Arity::Double, category),
                })
                .collect(),
            path_ids,
            counters,
            index,
            progress_every: config.progress_every,
            max_events: config.max_events,
            summary: RunSummary::default(),
            fired: vec![false; n_datasets],
        })
    }

    /// Consume every entry of `events`.
    pub fn run<E, S>(&mut self, events: &mut E, sources: &mut [S]) -> Result<RunSummary>
    where
        E: EventSource,
        S: TriggerSource,
    {
        let available = events.entry_count();
        let n = self.max_events.map_or(available, |m| m.min(available));
        log::info!("processing {n} of {available} events over {} datasets", sources.len());

        for i in 0..n {
            if self.progress_every > 0 && i % self.progress_every == 0 {
                log::info!("processing event {i} / {n}");
            }
            let event = events.load_entry(i)?;
            self.process_event(event, sources)?;
        }

        let dropped = events.malformed_entries();
        if dropped > 0 {
            log::warn!("{dropped} offline records could not be decoded and were dropped");
        }
        self.summary.malformed_events += dropped;

        let s = &self.summary;
        log::info!(
            "done: processed={} skipped={} malformed={} failed_selection={}",
            s.processed_events,
            s.skipped_events,
            s.malformed_events,
            s.failed_selection
        );
        Ok(self.summary)
    }

    /// Align every trigger source with `event` and, if all agree and the event
    /// passes selection, fill it.
    pub fn process_event<S: TriggerSource>(
        &mut self,
        event: &OfflineEvent,
        sources: &mut [S],
    ) -> Result<EventOutcome> {
        if sources.len() != self.path_ids.len() {
            return Err(Error::Validation(format!(
                "aggregator was built for {} trigger sources, got {}",
                self.path_ids.len(),
                sources.len()
            )));
        }

        let id = event.event_id();
        for (d, src) in sources.iter_mut().enumerate() {
            match src.load_for_event(id)? {
                Alignment::Aligned => {}
                Alignment::Missing => {
                    log::debug!("event {id} missing in trigger stream {d}; skipping");
                    self.summary.skipped_events += 1;
                    return Ok(EventOutcome::Misaligned);
                }
                Alignment::Malformed => {
                    log::debug!("event {id} unreadable in trigger stream {d}; skipping");
                    self.summary.malformed_events += 1;
                    return Ok(EventOutcome::Malformed);
                }
            }
        }

        if !event.passes_selection() {
            self.summary.failed_selection += 1;
            return Ok(EventOutcome::FailedSelection);
        }

        self.summary.processed_events += 1;
        self.summary.record_centrality(event.centrality());
        self.fill_event(event, sources);
        Ok(EventOutcome::Processed)
    }

    fn fill_event<S: TriggerSource>(&mut self, event: &OfflineEvent, sources: &[S]) {
        for group in &self.categories {
            let objects = event.objects_of_type(group.category);
            if objects.is_empty() {
                continue;
            }

            for &p in &group.singles {
                let plan = &self.plans[p];
                for obj in objects {
                    for (d, src) in sources.iter().enumerate() {
                        let path = self.path_ids[d][plan.path_index];
                        self.fired[d] = self.engine.is_matched(obj, path, src);
                    }
                    for slot in &plan.variables {
                        let value = slot.variable.value(obj);
                        for (d, &fired) in self.fired.iter().enumerate() {
                            self.counters[slot.first_counter + d].fill(value, fired);
                        }
                    }
                }
            }

            if group.doubles.is_empty() {
                continue;
            }
            for i in 0..objects.len() {
                for j in (i + 1)..objects.len() {
                    let (a, b) = (&objects[i], &objects[j]);
                    let pair = *a + *b;
                    for &p in &group.doubles {
                        let plan = &self.plans[p];
                        for (d, src) in sources.iter().enumerate() {
                            let path = self.path_ids[d][plan.path_index];
                            let leg1 = self.engine.is_matched(a, path, src);
                            let leg2 = self.engine.is_matched(b, path, src);
                            self.fired[d] = leg1 && leg2;
                        }
                        for slot in &plan.variables {
                            let value = slot.variable.value(&pair);
                            for (d, &fired) in self.fired.iter().enumerate() {
                                self.counters[slot.first_counter + d].fill(value, fired);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Add the counts and bookkeeping of an aggregator built from the same
    /// configuration (e.g. one that processed another chunk of events).
    pub fn merge(&mut self, other: &Aggregator) -> Result<()> {
        if self.index.len() != other.index.len()
            || self.index.keys().zip(other.index.keys()).any(|(a, b)| a != b)
        {
            return Err(Error::Validation(
                "cannot merge aggregators with different counter sets".to_string(),
            ));
        }
        for (mine, theirs) in self.counters.iter_mut().zip(&other.counters) {
            mine.merge(theirs)?;
        }
        self.summary.merge(&other.summary);
        Ok(())
    }

    /// Every counter by key, in key order.
    pub fn counters(&self) -> impl Iterator<Item = (&CounterKey, &EfficiencyCounter)> + '_ {
        self.index.iter().map(|(k, &i)| (k, &self.counters[i]))
    }

    /// Counters in configuration order.
    pub fn counter_list(&self) -> &[EfficiencyCounter] {
        &self.counters
    }

    /// Look up one counter.
    pub fn get(&self, key: &CounterKey) -> Option<&EfficiencyCounter> {
        self.index.get(key).map(|&i| &self.counters[i])
    }

    /// Bookkeeping so far.
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Give up ownership of the counters once the stream has ended.
    pub fn into_counters(self) -> Vec<EfficiencyCounter> {
        self.counters
    }
}
