//! Four-vector kinematics for offline objects and online trigger objects.

use std::f64::consts::{PI, TAU};
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Wrap an azimuthal difference into `[-pi, pi)`.
#[inline]
pub fn wrap_phi(dphi: f64) -> f64 {
    (dphi + PI).rem_euclid(TAU) - PI
}

/// A direction in (eta, phi) space.
///
/// Online trigger objects are only ever used for geometric matching, so this
/// is all a trigger source has to provide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuthal angle in radians.
    pub phi: f64,
}

impl Direction {
    /// Create a direction.
    pub fn new(eta: f64, phi: f64) -> Self {
        Self { eta, phi }
    }

    /// Squared angular distance `deta^2 + dphi^2`, with `dphi` wrapped.
    #[inline]
    pub fn delta_r2(&self, other: &Direction) -> f64 {
        let deta = self.eta - other.eta;
        let dphi = wrap_phi(self.phi - other.phi);
        deta * deta + dphi * dphi
    }

    /// Angular distance `sqrt(deta^2 + dphi^2)`.
    #[inline]
    pub fn delta_r(&self, other: &Direction) -> f64 {
        self.delta_r2(other).sqrt()
    }
}

/// Cartesian four-vector `(px, py, pz, E)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LorentzVector {
    /// x momentum component.
    pub px: f64,
    /// y momentum component.
    pub py: f64,
    /// z momentum component.
    pub pz: f64,
    /// Energy.
    pub e: f64,
}

impl LorentzVector {
    /// Build from cartesian components.
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Build from detector coordinates `(pt, eta, phi, m)`.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = (px * px + py * py + pz * pz + mass * mass).sqrt();
        Self { px, py, pz, e }
    }

    /// Transverse momentum.
    #[inline]
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Pseudorapidity. Infinite along the beam axis.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            return if self.pz == 0.0 { 0.0 } else { f64::INFINITY.copysign(self.pz) };
        }
        (self.pz / pt).asinh()
    }

    /// Azimuthal angle in `(-pi, pi]`.
    #[inline]
    pub fn phi(&self) -> f64 {
        self.py.atan2(self.px)
    }

    /// Rapidity `0.5 * ln((E + pz) / (E - pz))`.
    pub fn rapidity(&self) -> f64 {
        0.5 * ((self.e + self.pz) / (self.e - self.pz)).ln()
    }

    /// Invariant mass. Spacelike vectors are reported as 0.
    pub fn mass(&self) -> f64 {
        let p2 = self.px * self.px + self.py * self.py + self.pz * self.pz;
        (self.e * self.e - p2).max(0.0).sqrt()
    }

    /// Direction of the momentum in (eta, phi).
    #[inline]
    pub fn direction(&self) -> Direction {
        Direction { eta: self.eta(), phi: self.phi() }
    }

    /// Angular distance to a direction.
    #[inline]
    pub fn delta_r(&self, other: &Direction) -> f64 {
        self.direction().delta_r(other)
    }
}

impl Add for LorentzVector {
    type Output = LorentzVector;

    fn add(self, rhs: LorentzVector) -> LorentzVector {
        LorentzVector {
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
            e: self.e + rhs.e,
        }
    }
}

impl AddAssign for LorentzVector {
    fn add_assign(&mut self, rhs: LorentzVector) {
        self.px += rhs.px;
        self.py += rhs.py;
        self.pz += rhs.pz;
        self.e += rhs.e;
    }
}
