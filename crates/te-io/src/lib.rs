//! # te-io
//!
//! Concrete [`EventSource`](te_core::EventSource) and
//! [`TriggerSource`](te_core::TriggerSource) implementations.
//!
//! Both read JSON-lines dumps, one event per line:
//!
//! ```text
//! {"event": 42, "selected": true, "centrality": 12.5, "objects": {"muon": [{"pt": 4.1, "eta": 0.3, "phi": -1.2, "mass": 0.105}]}}
//! {"event": 42, "paths": {"HLT_HIL1DoubleMuOpen": [{"eta": 0.31, "phi": -1.19}]}}
//! ```
//!
//! In-memory constructors exist for tests and for callers that already hold
//! decoded events.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod events;
pub mod records;
pub mod triggers;

pub use events::MemoryEventSource;
pub use records::{ObjectRecord, OfflineRecord, TriggerRecord};
pub use triggers::RecordTriggerSource;
