//! Object and trigger vocabulary shared across trigeff.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kinematics::LorentzVector;

/// Offline object category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Reconstructed electron.
    Electron,
    /// Reconstructed photon.
    Photon,
    /// Reconstructed muon.
    Muon,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 3] = [Category::Electron, Category::Photon, Category::Muon];

    /// Capitalized name, as used in trigger tags (`"Muon"`).
    pub fn name(self) -> &'static str {
        match self {
            Category::Electron => "Electron",
            Category::Photon => "Photon",
            Category::Muon => "Muon",
        }
    }

    /// Lowercase collection key, as used by event sources (`"muon"`).
    pub fn key(self) -> &'static str {
        match self {
            Category::Electron => "electron",
            Category::Photon => "photon",
            Category::Muon => "muon",
        }
    }

    /// Parse the lowercase collection key.
    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of offline objects a trigger path fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Arity {
    /// One object per decision.
    Single,
    /// A pair of same-category objects; both legs must be matched.
    Double,
}

impl Arity {
    /// Tag prefix (`"Single"` / `"Double"`).
    pub fn name(self) -> &'static str {
        match self {
            Arity::Single => "Single",
            Arity::Double => "Double",
        }
    }
}

/// Arity and category of a trigger tag, e.g. `DoubleMuon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectKind {
    /// Single or double object.
    pub arity: Arity,
    /// Offline object category.
    pub category: Category,
}

impl ObjectKind {
    /// Create a kind.
    pub fn new(arity: Arity, category: Category) -> Self {
        Self { arity, category }
    }

    /// Trigger tag, e.g. `"SingleElectron"`.
    pub fn tag(&self) -> String {
        format!("{}{}", self.arity.name(), self.category.name())
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.arity.name(), self.category.name())
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (arity, rest) = if let Some(rest) = s.strip_prefix("Single") {
            (Arity::Single, rest)
        } else if let Some(rest) = s.strip_prefix("Double") {
            (Arity::Double, rest)
        } else {
            return Err(Error::Config(format!(
                "unknown trigger tag '{s}': expected Single<Category> or Double<Category>"
            )));
        };
        let category = Category::ALL
            .into_iter()
            .find(|c| c.name() == rest)
            .ok_or_else(|| Error::Config(format!("unknown object category in tag '{s}'")))?;
        Ok(Self { arity, category })
    }
}

/// Kinematic variable an efficiency is binned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variable {
    /// Transverse momentum.
    Pt,
    /// Pseudorapidity.
    Eta,
    /// Azimuthal angle.
    Phi,
    /// Rapidity (pairs).
    Rapidity,
    /// Invariant mass (pairs).
    Mass,
}

impl Variable {
    /// All variables in canonical order.
    pub const ALL: [Variable; 5] =
        [Variable::Pt, Variable::Eta, Variable::Phi, Variable::Rapidity, Variable::Mass];

    /// Name as used in configuration and counter names.
    pub fn name(self) -> &'static str {
        match self {
            Variable::Pt => "Pt",
            Variable::Eta => "Eta",
            Variable::Phi => "Phi",
            Variable::Rapidity => "Rapidity",
            Variable::Mass => "Mass",
        }
    }

    /// Whether the variable is defined for objects of the given arity.
    ///
    /// Single objects are binned in `Pt`, `Eta`, `Phi`; pairs in the combined
    /// `Pt`, `Rapidity`, `Mass`.
    pub fn admissible_for(self, arity: Arity) -> bool {
        match arity {
            Arity::Single => matches!(self, Variable::Pt | Variable::Eta | Variable::Phi),
            Arity::Double => matches!(self, Variable::Pt | Variable::Rapidity | Variable::Mass),
        }
    }

    /// Evaluate the variable on a four-vector (single object or pair sum).
    #[inline]
    pub fn value(self, p4: &LorentzVector) -> f64 {
        match self {
            Variable::Pt => p4.pt(),
            Variable::Eta => p4.eta(),
            Variable::Phi => p4.phi(),
            Variable::Rapidity => p4.rapidity(),
            Variable::Mass => p4.mass(),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Variable::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| Error::Config(format!("unknown binning variable '{s}'")))
    }
}
