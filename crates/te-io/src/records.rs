//! Serialized record layouts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use te_core::{Category, Direction, Error, LorentzVector, OfflineEvent, Result};

fn default_true() -> bool {
    true
}

/// One reconstructed object in detector coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuthal angle.
    pub phi: f64,
    /// Mass (defaults to 0).
    #[serde(default)]
    pub mass: f64,
}

impl ObjectRecord {
    fn to_p4(self) -> Result<LorentzVector> {
        let ok = self.pt.is_finite()
            && self.pt >= 0.0
            && self.eta.is_finite()
            && self.phi.is_finite()
            && self.mass.is_finite()
            && self.mass >= 0.0;
        if !ok {
            return Err(Error::Source(format!(
                "invalid object kinematics (pt={}, eta={}, phi={}, mass={})",
                self.pt, self.eta, self.phi, self.mass
            )));
        }
        Ok(LorentzVector::from_pt_eta_phi_m(self.pt, self.eta, self.phi, self.mass))
    }
}

/// One offline event line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineRecord {
    /// Event identifier.
    pub event: u64,
    /// Event-quality flag (defaults to true).
    #[serde(default = "default_true")]
    pub selected: bool,
    /// Centrality (defaults to 0).
    #[serde(default)]
    pub centrality: f64,
    /// Collections keyed by lowercase category (`electron`, `photon`, `muon`).
    #[serde(default)]
    pub objects: BTreeMap<String, Vec<ObjectRecord>>,
}

impl OfflineRecord {
    /// Convert into an [`OfflineEvent`]. Unknown collections are ignored.
    pub fn into_event(self) -> Result<OfflineEvent> {
        let mut ev = OfflineEvent::new(self.event, self.selected, self.centrality);
        for (name, objects) in self.objects {
            let Some(category) = Category::from_key(&name) else {
                log::debug!("event {}: skipping unknown collection '{name}'", self.event);
                continue;
            };
            let p4s = objects
                .into_iter()
                .map(ObjectRecord::to_p4)
                .collect::<Result<Vec<_>>>()
                .map_err(|e| Error::Source(format!("event {} ({name}): {e}", self.event)))?;
            ev.objects.insert(category, p4s);
        }
        Ok(ev)
    }
}

/// Event id of a line that failed to decode, if it still carries one.
pub(crate) fn event_id_hint(line: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(line).ok()?.get("event")?.as_u64()
}

/// One trigger-stream line: online objects per path for one event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerRecord {
    /// Event identifier.
    pub event: u64,
    /// Path name -> online object directions.
    #[serde(default)]
    pub paths: BTreeMap<String, Vec<Direction>>,
}

impl TriggerRecord {
    /// Empty record for `event`.
    pub fn new(event: u64) -> Self {
        Self { event, paths: BTreeMap::new() }
    }

    /// Builder-style helper to add online objects for a path.
    pub fn with_path(mut self, path: impl Into<String>, objects: Vec<Direction>) -> Self {
        self.paths.insert(path.into(), objects);
        self
    }
}
