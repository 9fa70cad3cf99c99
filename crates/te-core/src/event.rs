//! Offline-reconstructed event view.

use std::collections::BTreeMap;

use crate::kinematics::LorentzVector;
use crate::types::Category;

/// One offline-reconstructed event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfflineEvent {
    /// Event identifier used to align with trigger streams.
    pub event_id: u64,
    /// Whether the event passes the event-quality selection.
    pub selected: bool,
    /// Collision centrality (percentile).
    pub centrality: f64,
    /// Reconstructed objects per category, in reconstruction order.
    pub objects: BTreeMap<Category, Vec<LorentzVector>>,
}

impl OfflineEvent {
    /// Create an empty event.
    pub fn new(event_id: u64, selected: bool, centrality: f64) -> Self {
        Self { event_id, selected, centrality, objects: BTreeMap::new() }
    }

    /// Builder-style helper to attach a collection.
    pub fn with_objects(mut self, category: Category, objects: Vec<LorentzVector>) -> Self {
        self.objects.insert(category, objects);
        self
    }

    /// Event identifier.
    #[inline]
    pub fn event_id(&self) -> u64 {
        self.event_id
    }

    /// Event-quality gate (valid primary vertex and friends).
    #[inline]
    pub fn passes_selection(&self) -> bool {
        self.selected
    }

    /// Collision centrality.
    #[inline]
    pub fn centrality(&self) -> f64 {
        self.centrality
    }

    /// Objects of one category. Missing collections are empty.
    #[inline]
    pub fn objects_of_type(&self, category: Category) -> &[LorentzVector] {
        self.objects.get(&category).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
