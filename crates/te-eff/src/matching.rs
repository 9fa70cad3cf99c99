//! Geometric matching of offline objects to online trigger objects.

use te_core::{Error, LorentzVector, PathId, Result, TriggerSource};

/// Decides whether a trigger path fired on an offline object.
///
/// Stateless apart from the radius: every call depends only on the object,
/// the path handle and the trigger source's current event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchEngine {
    radius: f64,
    radius2: f64,
}

impl MatchEngine {
    /// Create an engine with matching radius `radius` in (eta, phi).
    pub fn new(radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::Config(format!(
                "match radius must be finite and > 0, got {radius}"
            )));
        }
        Ok(Self { radius, radius2: radius * radius })
    }

    /// Matching radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// True if any online object of `path` lies within the radius of `object`.
    ///
    /// Paths with no online objects in the current event (including paths the
    /// source does not know) never match.
    #[inline]
    pub fn is_matched<S>(&self, object: &LorentzVector, path: PathId, source: &S) -> bool
    where
        S: TriggerSource + ?Sized,
    {
        let online = source.online_objects(path);
        if online.is_empty() {
            return false;
        }
        let dir = object.direction();
        online.iter().any(|o| dir.delta_r2(o) < self.radius2)
    }
}
