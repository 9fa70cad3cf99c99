//! Efficiency curves with asymmetric binomial uncertainties.

use rayon::prelude::*;
use serde::Serialize;
use te_core::Result;

use crate::counter::{CounterKey, EfficiencyCounter};
use crate::interval::IntervalConfig;

/// One bin of an efficiency curve.
///
/// `estimate`, `err_low` and `err_high` are `None` for bins without entries;
/// such bins still carry their x-range so renderers can keep the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    /// Lower bin edge.
    pub x_low: f64,
    /// Upper bin edge.
    pub x_high: f64,
    /// Fired count.
    pub fired: u64,
    /// Total count.
    pub total: u64,
    /// `fired / total`.
    pub estimate: Option<f64>,
    /// Distance from the estimate down to the lower bound.
    pub err_low: Option<f64>,
    /// Distance from the estimate up to the upper bound.
    pub err_high: Option<f64>,
}

impl CurvePoint {
    /// Bin center.
    pub fn x_center(&self) -> f64 {
        0.5 * (self.x_low + self.x_high)
    }

    /// Whether the bin has an estimate.
    pub fn is_defined(&self) -> bool {
        self.estimate.is_some()
    }
}

/// Efficiency versus one kinematic variable for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyCurve {
    /// Counter key the curve was built from.
    pub key: CounterKey,
    /// Bin edges (x-axis domain).
    pub edges: Vec<f64>,
    /// One point per bin.
    pub points: Vec<CurvePoint>,
}

impl EfficiencyCurve {
    /// Points that have an estimate.
    pub fn defined_points(&self) -> impl Iterator<Item = &CurvePoint> + '_ {
        self.points.iter().filter(|p| p.is_defined())
    }
}

/// Turns finalized counters into curves.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveBuilder {
    interval: IntervalConfig,
}

impl CurveBuilder {
    /// Create a builder using `interval` for the uncertainties.
    pub fn new(interval: IntervalConfig) -> Result<Self> {
        interval.validate()?;
        Ok(Self { interval })
    }

    /// Interval settings.
    pub fn interval(&self) -> &IntervalConfig {
        &self.interval
    }

    /// Build the curve of one counter.
    pub fn build(&self, counter: &EfficiencyCounter) -> Result<EfficiencyCurve> {
        let edges = counter.edges();
        let mut points = Vec::with_capacity(edges.n_bins());
        for (i, (&fired, &total)) in counter.fired().iter().zip(counter.total()).enumerate() {
            let (x_low, x_high) = edges.bin_range(i);
            let mut point = CurvePoint {
                x_low,
                x_high,
                fired,
                total,
                estimate: None,
                err_low: None,
                err_high: None,
            };
            if total > 0 {
                let p = fired as f64 / total as f64;
                let (lo, hi) = self.interval.bounds(fired, total)?;
                point.estimate = Some(p);
                point.err_low = Some((p - lo).clamp(0.0, p));
                point.err_high = Some((hi - p).clamp(0.0, 1.0 - p));
            }
            points.push(point);
        }
        Ok(EfficiencyCurve { key: counter.key.clone(), edges: edges.as_slice().to_vec(), points })
    }

    /// Build curves for many counters in parallel, preserving order.
    pub fn build_all(&self, counters: &[EfficiencyCounter]) -> Result<Vec<EfficiencyCurve>> {
        counters.par_iter().map(|c| self.build(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::BinEdges;
    use crate::interval::IntervalMethod;
    use te_core::{Arity, Category, ObjectKind, Variable};

    fn counter(fills: &[(f64, bool)]) -> EfficiencyCounter {
        let key = CounterKey::new(
            ObjectKind::new(Arity::Single, Category::Electron),
            "HLT_Ele20",
            Variable::Pt,
            "Online",
        );
        let mut c =
            EfficiencyCounter::new(key, BinEdges::new(vec![0.0, 10.0, 20.0, 30.0]).unwrap());
        for &(v, f) in fills {
            c.fill(v, f);
        }
        c
    }

    #[test]
    fn empty_bins_are_placeholders() {
        let curve = CurveBuilder::default().build(&counter(&[(15.0, true)])).unwrap();
        assert_eq!(curve.edges, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(curve.points.len(), 3);
        assert!(!curve.points[0].is_defined());
        assert_eq!(curve.points[0].x_low, 0.0);
        assert_eq!(curve.points[0].x_high, 10.0);
        assert_eq!(curve.points[1].estimate, Some(1.0));
        assert_eq!(curve.points[1].err_high, Some(0.0));
        assert!(curve.points[1].err_low.unwrap() > 0.0);
        assert_eq!(curve.defined_points().count(), 1);
        assert_eq!(curve.points[1].x_center(), 15.0);
    }

    #[test]
    fn zero_efficiency_bin() {
        let curve = CurveBuilder::default().build(&counter(&[(5.0, false), (6.0, false)])).unwrap();
        let p = curve.points[0];
        assert_eq!(p.estimate, Some(0.0));
        assert_eq!(p.err_low, Some(0.0));
        assert!(p.err_high.unwrap() > 0.0 && p.err_high.unwrap() < 1.0);
    }

    #[test]
    fn both_methods_respect_unit_interval() {
        let fills: Vec<(f64, bool)> =
            (0..40).map(|i| (25.0, i % 7 != 0)).chain([(5.0, true), (15.0, false)]).collect();
        let c = counter(&fills);
        for method in [IntervalMethod::ClopperPearson, IntervalMethod::Jeffreys] {
            let b = CurveBuilder::new(IntervalConfig { method, ..IntervalConfig::default() })
                .unwrap();
            for p in b.build(&c).unwrap().defined_points() {
                let e = p.estimate.unwrap();
                assert!((0.0..=1.0).contains(&e));
                assert!(e - p.err_low.unwrap() >= 0.0);
                assert!(e + p.err_high.unwrap() <= 1.0);
            }
        }
    }

    #[test]
    fn build_all_preserves_order() {
        let counters = vec![counter(&[(1.0, true)]), counter(&[(25.0, false)])];
        let curves = CurveBuilder::default().build_all(&counters).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].points[0].estimate, Some(1.0));
        assert_eq!(curves[1].points[2].estimate, Some(0.0));
    }

    #[test]
    fn invalid_interval_config() {
        let bad = IntervalConfig { confidence_level: 0.0, ..IntervalConfig::default() };
        assert!(CurveBuilder::new(bad).is_err());
    }
}
