//! Source traits for offline events and online trigger decisions.
//!
//! The efficiency engine never touches files. It pulls events through
//! [`EventSource`] and trigger objects through one [`TriggerSource`] per
//! dataset, so storage formats stay outside the core.

use crate::Result;
use crate::event::OfflineEvent;
use crate::kinematics::Direction;

/// Handle to a trigger path registered on a [`TriggerSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathId(pub usize);

/// Result of positioning a [`TriggerSource`] on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// The stream holds a readable record for the event.
    Aligned,
    /// The event is absent or out of order in the stream.
    Missing,
    /// The stream has a record for the event but it could not be decoded.
    Malformed,
}

impl Alignment {
    /// True for [`Alignment::Aligned`].
    pub fn is_aligned(self) -> bool {
        self == Alignment::Aligned
    }
}

/// Sequential access to offline-reconstructed events.
pub trait EventSource {
    /// Number of entries.
    fn entry_count(&self) -> usize;

    /// Load entry `index` and return a view of it.
    ///
    /// The returned view stays valid until the next call.
    fn load_entry(&mut self, index: usize) -> Result<&OfflineEvent>;

    /// Input records dropped because they could not be decoded.
    fn malformed_entries(&self) -> u64 {
        0
    }
}

/// Online trigger objects for one dataset, aligned to events by identifier.
pub trait TriggerSource {
    /// Register a path before the first event is loaded.
    ///
    /// Registering the same name twice returns the same handle.
    fn register_path(&mut self, name: &str) -> PathId;

    /// Position the source on `event_id`.
    ///
    /// Missing and undecodable records are reported through [`Alignment`];
    /// errors are reserved for failures of the underlying reader.
    fn load_for_event(&mut self, event_id: u64) -> Result<Alignment>;

    /// Online objects recorded for `path` in the current event.
    ///
    /// Unknown handles and paths that did not fire yield an empty slice.
    fn online_objects(&self, path: PathId) -> &[Direction];
}

impl<S: TriggerSource + ?Sized> TriggerSource for Box<S> {
    fn register_path(&mut self, name: &str) -> PathId {
        (**self).register_path(name)
    }

    fn load_for_event(&mut self, event_id: u64) -> Result<Alignment> {
        (**self).load_for_event(event_id)
    }

    fn online_objects(&self, path: PathId) -> &[Direction] {
        (**self).online_objects(path)
    }
}
