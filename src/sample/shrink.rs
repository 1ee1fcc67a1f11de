//! Step control by shrinking a trial step.
//!
//! Every step starts from a quarter of the domain and contracts by a factor
//! of 1.5 until the value, slope and curvature at the trial point are within
//! `curve_eps` (relatively) of those at the current point. Steps that reach
//! `min_step` without settling are accepted at that length.

use super::{
    FallbackPolicy, SamplerSettings, SamplerStats, Step, StepControl,
    StepKind,
};
use crate::curve::PiecewiseCurve;

const SHRINK_FACTOR: f64 = 1.5;

/// Value, slope and curvature of the curve at one position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Jet {
    pub value: f64,
    pub slope: f64,
    pub curvature: f64,
}

impl Jet {
    /// Returns `true` if each component of `next` drifts from `self` by at
    /// most `eps`, measured as `|old - new| / (eps + |old|)`.
    pub fn settled(&self, next: &Jet, eps: f64) -> bool {
        drift(self.value, next.value, eps) <= eps
            && drift(self.slope, next.slope, eps) <= eps
            && drift(self.curvature, next.curvature, eps) <= eps
    }
}

pub(super) fn drift(old: f64, new: f64, eps: f64) -> f64 {
    (old - new).abs() / (eps + old.abs())
}

pub(super) struct Shrink<'c> {
    curve: &'c PiecewiseCurve,
    slope: PiecewiseCurve,
    curvature: PiecewiseCurve,
    max_step: f64,
    min_step: f64,
    curve_eps: f64,
    obj_tolerance: f64,
    fallback: FallbackPolicy,
    current: Jet,
}

impl<'c> Shrink<'c> {
    pub fn new(
        curve: &'c PiecewiseCurve,
        settings: &SamplerSettings,
        obj_tolerance: f64,
    ) -> Shrink<'c> {
        let slope = curve.differentiate();
        let curvature = slope.differentiate();
        let domain = curve.bounds();

        let mut control = Shrink {
            curve,
            slope,
            curvature,
            max_step: (domain.width() / 4.0).max(settings.min_step),
            min_step: settings.min_step,
            curve_eps: settings.curve_eps,
            obj_tolerance,
            fallback: settings.fallback,
            current: Jet {
                value: 0.0,
                slope: 0.0,
                curvature: 0.0,
            },
        };

        control.current = control.jet(domain.inf);
        control
    }

    fn jet(&self, x: f64) -> Jet {
        Jet {
            value: self.curve.eval(x),
            slope: self.slope.eval(x),
            curvature: self.curvature.eval(x),
        }
    }

    /// Moves to the right bound, which is never reached by a trial step.
    fn finish(&mut self, boundary: f64, kind: StepKind) -> Step {
        self.current = self.jet(boundary);

        Step {
            position: boundary,
            kind,
        }
    }
}

impl StepControl for Shrink<'_> {
    fn value(&self) -> f64 {
        self.current.value
    }

    fn step(
        &mut self,
        p: f64,
        boundary: f64,
        stats: &mut SamplerStats,
    ) -> Step {
        let remaining = boundary - p;

        if remaining <= self.obj_tolerance {
            stats.evaluations += 1;
            return self.finish(boundary, StepKind::Snapped);
        }

        let mut h = self.max_step;

        let (trial, settled) = loop {
            let trial = self.jet(p + h);
            stats.evaluations += 1;

            if self.current.settled(&trial, self.curve_eps) {
                break (trial, true);
            }

            if h <= self.min_step {
                break (trial, false);
            }

            h = (h / SHRINK_FACTOR).max(self.min_step);
        };

        if !settled {
            stats.floored += 1;
            self.fallback.report(format_args!(
                "step from {p} accepted at minimum length {h} without settling"
            ));
        }

        // Rounding can swallow a floored step far from the origin.
        if h >= remaining || p + h <= p {
            stats.evaluations += 1;
            return self.finish(boundary, StepKind::Clamped);
        }

        self.current = trial;

        Step {
            position: p + h,
            kind: if settled {
                StepKind::Converged
            } else {
                StepKind::Floored
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tolerances;
    use crate::curve::{Piece, Polynomial};
    use crate::sample::tests::triangle;
    use crate::sample::{render, Strategy};
    use crate::utils::Interval;

    fn jet_at(curve: &PiecewiseCurve, x: f64) -> Jet {
        Jet {
            value: curve.eval(x),
            slope: curve.derivative(1, x),
            curvature: curve.derivative(2, x),
        }
    }

    #[test]
    fn drift_is_relative() {
        assert_eq!(drift(2.0, 2.0, 0.1), 0.0);
        assert!((drift(1.9, 2.0, 0.1) - 0.05).abs() < 1e-15);
        assert_eq!(drift(0.0, 0.5, 0.5), 1.0);
        assert_eq!(drift(-3.0, 3.0, 1.0), 1.5);
    }

    #[test]
    fn converged_steps_stay_within_tolerance() {
        let (table, curve) = triangle();
        let settings = SamplerSettings::default();

        let rendering =
            render(&curve, &table, &Tolerances::default(), &settings).unwrap();

        let eps = settings.curve_eps;

        for pair in rendering.samples.windows(2) {
            if pair[1].kind != StepKind::Converged {
                continue;
            }

            let old = jet_at(&curve, pair[0].x);
            let new = jet_at(&curve, pair[1].x);

            assert!(old.settled(&new, eps), "{pair:?}");
        }

        assert!(rendering
            .samples
            .iter()
            .skip(1)
            .any(|s| s.kind == StepKind::Converged));
    }

    #[test]
    fn straight_line_takes_quarter_steps() {
        let curve = PiecewiseCurve::new(vec![Piece {
            domain: Interval::new(0.0, 8.0),
            poly: Polynomial::new(vec![5.0]),
        }])
        .unwrap();

        let mut table = crate::table::TabulatedFunction::new();
        table.push(0.0, 5.0).unwrap();
        table.push(8.0, 5.0).unwrap();

        let settings = SamplerSettings {
            strategy: Strategy::Shrink,
            ..Default::default()
        };

        let rendering =
            render(&curve, &table, &Tolerances::default(), &settings).unwrap();

        let xs: Vec<_> = rendering.samples.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(rendering.stats.max_error, 0.0);
    }

    #[test]
    fn kinked_curve_floors_steps() {
        // Curvature jumps from 0 to 2 at the knot.
        let curve = PiecewiseCurve::new(vec![
            Piece {
                domain: Interval::new(-1.0, 0.0),
                poly: Polynomial::new(vec![1.0]),
            },
            Piece {
                domain: Interval::new(0.0, 1.0),
                poly: Polynomial::new(vec![1.0, 0.0, 1.0]),
            },
        ])
        .unwrap();

        let table = crate::table::TabulatedFunction::new();
        let settings = SamplerSettings::default();

        let rendering =
            render(&curve, &table, &Tolerances::default(), &settings).unwrap();

        assert!(rendering.stats.floored > 0);
        assert_eq!(rendering.samples.last().unwrap().x, 1.0);
        assert!(rendering
            .samples
            .iter()
            .any(|s| s.kind == StepKind::Floored));
    }

    #[test]
    fn snaps_to_boundary_within_tolerance() {
        let curve = PiecewiseCurve::new(vec![Piece {
            domain: Interval::new(0.0, 1.0),
            poly: Polynomial::new(vec![1.0]),
        }])
        .unwrap();

        let settings = SamplerSettings::default();
        let mut control = Shrink::new(&curve, &settings, 1e-3);
        let mut stats = SamplerStats::default();

        let step = control.step(1.0 - 1e-4, 1.0, &mut stats);

        assert_eq!(step.position, 1.0);
        assert_eq!(step.kind, StepKind::Snapped);
        assert_eq!(control.value(), 1.0);
    }
}
