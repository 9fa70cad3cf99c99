//! # te-core
//!
//! Core types for trigeff.
//!
//! This crate holds what every other trigeff crate agrees on: the error
//! type, Lorentz-vector kinematics, the object/trigger vocabulary and the
//! traits through which offline events and online trigger decisions are
//! pulled into the efficiency engine.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod event;
pub mod kinematics;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use event::OfflineEvent;
pub use kinematics::{Direction, LorentzVector};
pub use traits::{Alignment, EventSource, PathId, TriggerSource};
pub use types::{Arity, Category, ObjectKind, Variable};

/// trigeff version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
