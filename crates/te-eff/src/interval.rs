//! Binomial-proportion confidence intervals for efficiencies.
//!
//! Both methods use Beta quantiles, so the bounds never leave `[0, 1]` and
//! stay sensible for efficiencies close to 0 or 1.
//!
//! Quantiles are found by bisection on the regularized incomplete beta
//! function with a fixed iteration cap. Once both shape parameters exceed
//! [`LARGE_SHAPE`] the Cornish–Fisher expansion is used instead, since
//! `beta_reg` loses precision there and bins of 1e7+ entries are routine.

use serde::{Deserialize, Serialize};
use statrs::function::beta::checked_beta_reg;
use statrs::function::erf::erfc_inv;
use te_core::{Error, Result};

/// Central one-sigma coverage.
pub const ONE_SIGMA_CL: f64 = 0.682_689_492_137_086;

/// Smallest shape parameter at which quantiles switch to the normal expansion.
pub const LARGE_SHAPE: f64 = 1.0e4;

const MAX_BISECTIONS: usize = 200;

/// Interval family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalMethod {
    /// Exact (frequentist) Clopper–Pearson interval.
    #[default]
    ClopperPearson,
    /// Equal-tailed Jeffreys interval, Beta(k + 1/2, n - k + 1/2) posterior.
    Jeffreys,
}

/// Interval method plus coverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntervalConfig {
    /// Interval family.
    #[serde(default)]
    pub method: IntervalMethod,
    /// Two-sided confidence (or credibility) level in `(0, 1)`.
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
}

fn default_confidence_level() -> f64 {
    ONE_SIGMA_CL
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self { method: IntervalMethod::default(), confidence_level: ONE_SIGMA_CL }
    }
}

impl IntervalConfig {
    /// Validate the coverage.
    pub fn validate(&self) -> Result<()> {
        let cl = self.confidence_level;
        if !cl.is_finite() || cl <= 0.0 || cl >= 1.0 {
            return Err(Error::Config(format!("confidence_level must be in (0, 1), got {cl}")));
        }
        Ok(())
    }

    /// Lower and upper bounds on the efficiency for `fired` out of `total`.
    pub fn bounds(&self, fired: u64, total: u64) -> Result<(f64, f64)> {
        match self.method {
            IntervalMethod::ClopperPearson => {
                clopper_pearson(fired, total, self.confidence_level)
            }
            IntervalMethod::Jeffreys => jeffreys(fired, total, self.confidence_level),
        }
    }
}

fn beta_quantile(p: f64, a: f64, b: f64) -> Result<f64> {
    if !(a > 0.0 && b > 0.0 && a.is_finite() && b.is_finite()) || !(0.0..=1.0).contains(&p) {
        return Err(Error::Computation(format!("invalid Beta({a}, {b}) quantile at p={p}")));
    }
    if a.min(b) > LARGE_SHAPE {
        return Ok(beta_quantile_normal(p, a, b));
    }
    beta_quantile_bisect(p, a, b)
}

fn beta_quantile_bisect(p: f64, a: f64, b: f64) -> Result<f64> {
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let cdf = checked_beta_reg(a, b, mid).map_err(|e| {
            Error::Computation(format!("incomplete beta I({mid}; {a}, {b}) failed: {e}"))
        })?;
        if cdf < p {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(0.5 * (lo + hi))
}

/// Cornish–Fisher quantile with the skewness term.
fn beta_quantile_normal(p: f64, a: f64, b: f64) -> f64 {
    let z = -std::f64::consts::SQRT_2 * erfc_inv(2.0 * p);
    let s = a + b;
    let mean = a / s;
    let sd = (a * b / (s * s * (s + 1.0))).sqrt();
    let skew = 2.0 * (b - a) * (s + 1.0).sqrt() / ((s + 2.0) * (a * b).sqrt());
    (mean + sd * (z + (z * z - 1.0) * skew / 6.0)).clamp(0.0, 1.0)
}

fn check_counts(fired: u64, total: u64, cl: f64) -> Result<()> {
    if total == 0 {
        return Err(Error::Validation("interval undefined for total = 0".to_string()));
    }
    if fired > total {
        return Err(Error::Validation(format!(
            "fired must be <= total, got fired={fired} total={total}"
        )));
    }
    if !(cl > 0.0 && cl < 1.0) {
        return Err(Error::Validation(format!("confidence level must be in (0, 1), got {cl}")));
    }
    Ok(())
}

/// Clopper–Pearson interval.
///
/// `lo = B^-1(alpha/2; k, n-k+1)`, `hi = B^-1(1-alpha/2; k+1, n-k)` with the
/// conventional `lo = 0` at `k = 0` and `hi = 1` at `k = n`. The other bound
/// at those extremes has the closed form `(alpha/2)^(1/n)`.
pub fn clopper_pearson(fired: u64, total: u64, cl: f64) -> Result<(f64, f64)> {
    check_counts(fired, total, cl)?;
    let alpha = 0.5 * (1.0 - cl);
    let k = fired as f64;
    let n = total as f64;
    let tail_root = alpha.ln() / n;
    let lo = match fired {
        0 => 0.0,
        f if f == total => tail_root.exp(),
        _ => beta_quantile(alpha, k, n - k + 1.0)?,
    };
    let hi = match fired {
        f if f == total => 1.0,
        0 => -tail_root.exp_m1(),
        _ => beta_quantile(1.0 - alpha, k + 1.0, n - k)?,
    };
    Ok((lo, hi))
}

/// Equal-tailed Jeffreys interval.
///
/// The lower bound is pinned to 0 at `k = 0` and the upper bound to 1 at
/// `k = n`, otherwise the interval would exclude the observed proportion.
pub fn jeffreys(fired: u64, total: u64, cl: f64) -> Result<(f64, f64)> {
    check_counts(fired, total, cl)?;
    let alpha = 0.5 * (1.0 - cl);
    let a = fired as f64 + 0.5;
    let b = (total - fired) as f64 + 0.5;
    let lo = if fired == 0 { 0.0 } else { beta_quantile(alpha, a, b)? };
    let hi = if fired == total { 1.0 } else { beta_quantile(1.0 - alpha, a, b)? };
    Ok((lo, hi))
}
