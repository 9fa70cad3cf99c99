//! # te-eff
//!
//! Trigger efficiency engine.
//!
//! Offline objects are matched to online trigger objects ([`MatchEngine`]),
//! the decisions are folded event by event into binned fired/total counters
//! ([`Aggregator`]) and, once the stream is exhausted, each counter is turned
//! into an efficiency curve with binomial uncertainties ([`CurveBuilder`]).
//!
//! ## Example
//!
//! ```no_run
//! use te_eff::{Aggregator, CurveBuilder, RunConfig};
//! # fn sources() -> (te_io::MemoryEventSource, Vec<te_io::RecordTriggerSource>) { unimplemented!() }
//!
//! let cfg: RunConfig = serde_json::from_str(r#"{
//!     "datasets": [{"label": "Online"}],
//!     "triggers": {"SingleMuon": ["HLT_Mu3"]},
//!     "binning": {"SingleMuon": {"Pt": [0, 3, 6, 12]}}
//! }"#).unwrap();
//! let cfg = cfg.resolve().unwrap();
//!
//! let (mut events, mut triggers) = sources();
//! let mut agg = Aggregator::new(&cfg, &mut triggers).unwrap();
//! let summary = agg.run(&mut events, &mut triggers).unwrap();
//! println!("skipped {} events", summary.skipped_events);
//!
//! let curves = CurveBuilder::new(cfg.interval).unwrap().build_all(agg.counter_list()).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregator;
pub mod binning;
pub mod config;
pub mod counter;
pub mod curve;
pub mod interval;
pub mod matching;

pub use aggregator::{Aggregator, EventOutcome, RunSummary};
pub use binning::BinEdges;
pub use config::{
    DatasetConfig, DatasetSpec, EfficiencyConfig, RunConfig, TriggerPlan, VariableSlot,
};
pub use counter::{CounterKey, EfficiencyCounter};
pub use curve::{CurveBuilder, CurvePoint, EfficiencyCurve};
pub use interval::{IntervalConfig, IntervalMethod};
pub use matching::MatchEngine;
