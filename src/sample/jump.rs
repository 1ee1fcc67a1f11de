//! Step control by solving for the slope.
//!
//! Rather than searching for a step length, each step goes straight to the
//! first point where the slope has drifted by `(curve_eps + |slope|) *
//! curve_eps` in either direction.

use super::{
    FallbackPolicy, SamplerSettings, SamplerStats, Step, StepControl,
    StepKind,
};
use crate::curve::PiecewiseCurve;

pub(super) struct Jump<'c> {
    curve: &'c PiecewiseCurve,
    slope: PiecewiseCurve,
    min_step: f64,
    curve_eps: f64,
    obj_tolerance: f64,
    fallback: FallbackPolicy,
    value: f64,
    current_slope: f64,
}

impl<'c> Jump<'c> {
    pub fn new(
        curve: &'c PiecewiseCurve,
        settings: &SamplerSettings,
        obj_tolerance: f64,
    ) -> Jump<'c> {
        let slope = curve.differentiate();
        let start = curve.bounds().inf;

        Jump {
            curve,
            min_step: settings.min_step,
            curve_eps: settings.curve_eps,
            obj_tolerance,
            fallback: settings.fallback,
            value: curve.eval(start),
            current_slope: slope.eval(start),
            slope,
        }
    }

    /// Allowed drift of the slope away from its value at the current point.
    pub fn max_change(&self) -> f64 {
        (self.curve_eps + self.current_slope.abs()) * self.curve_eps
    }

    fn within_band(&self, x: f64) -> bool {
        (self.slope.eval(x) - self.current_slope).abs() <= self.max_change()
    }

    /// Pulls a root back from `root` towards `p` until the slope there is
    /// inside the band. Roots are found in local coordinates, and shifting
    /// them back by a large origin can round past the edge.
    fn settle(&self, p: f64, root: f64) -> f64 {
        if self.within_band(root) {
            return root;
        }

        let (mut inside, mut outside) = (p, root);

        for _ in 0..MAX_SETTLE {
            let mid = inside + (outside - inside) / 2.0;

            if mid <= inside || mid >= outside {
                break;
            }

            if self.within_band(mid) {
                inside = mid;
            } else {
                outside = mid;
            }
        }

        inside
    }
}

const MAX_SETTLE: usize = 64;

impl StepControl for Jump<'_> {
    fn value(&self) -> f64 {
        self.value
    }

    fn step(
        &mut self,
        p: f64,
        boundary: f64,
        stats: &mut SamplerStats,
    ) -> Step {
        let change = self.max_change();
        let tol = self.obj_tolerance;

        let below =
            self.slope.solve(self.current_slope - change, p, boundary, tol);
        let above =
            self.slope.solve(self.current_slope + change, p, boundary, tol);

        let roots = below.into_iter().chain(above);

        let (mut position, mut kind) = match roots.reduce(f64::min) {
            Some(root) => (self.settle(p, root), StepKind::RootJump),
            None => {
                stats.root_misses += 1;
                self.fallback.report(format_args!(
                    "slope stays within {change} of {} beyond {p}",
                    self.current_slope
                ));

                (boundary, StepKind::RootMiss)
            }
        };

        if position < p + self.min_step {
            stats.floored += 1;
            position = p + self.min_step;
            kind = StepKind::Floored;
        }

        // Rounding can swallow a floored step far from the origin.
        if position > boundary || position <= p {
            position = boundary;
            kind = StepKind::Clamped;
        }

        stats.evaluations += 1;
        self.value = self.curve.eval(position);
        self.current_slope = self.slope.eval(position);

        Step { position, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tolerances;
    use crate::curve::{CurveFitter, HermiteFitter, Piece, Polynomial};
    use crate::sample::tests::triangle;
    use crate::sample::{render, Strategy};
    use crate::table::TabulatedFunction;
    use crate::utils::Interval;

    fn jump_settings() -> SamplerSettings {
        SamplerSettings {
            strategy: Strategy::Jump,
            ..Default::default()
        }
    }

    #[test]
    fn slope_drift_is_bounded() {
        let (table, curve) = triangle();
        let settings = jump_settings();
        let eps = settings.curve_eps;

        let rendering =
            render(&curve, &table, &Tolerances::default(), &settings).unwrap();

        let slope = curve.differentiate();
        let last = rendering.samples.len() - 1;

        for (i, pair) in rendering.samples.windows(2).enumerate() {
            if i + 1 == last || pair[1].kind != StepKind::RootJump {
                continue;
            }

            let old = slope.eval(pair[0].x);
            let new = slope.eval(pair[1].x);
            let change = (eps + old.abs()) * eps;

            assert!((new - old).abs() <= change + 1e-9, "{pair:?}");
        }

        assert!(rendering
            .samples
            .iter()
            .any(|s| s.kind == StepKind::RootJump));
    }

    #[test]
    fn slope_band_holds_far_from_origin() {
        let mut table = TabulatedFunction::new();

        for (x, y) in [(1e6, 0.0), (1e6 + 1.0, 1.4), (1e6 + 2.0, 0.0)] {
            table.push(x, y).unwrap();
        }

        let tolerances = Tolerances::default();
        let domain = table.extended_domain().unwrap();
        let curve = HermiteFitter::default()
            .fit(&table, domain, &tolerances)
            .unwrap();

        let settings = SamplerSettings {
            curve_eps: 1e-3,
            ..jump_settings()
        };
        let eps = settings.curve_eps;

        let rendering = render(&curve, &table, &tolerances, &settings).unwrap();
        let slope = curve.differentiate();

        for pair in rendering.samples.windows(2) {
            if pair[1].kind != StepKind::RootJump {
                continue;
            }

            let old = slope.eval(pair[0].x);
            let new = slope.eval(pair[1].x);
            let change = (eps + old.abs()) * eps;

            assert!((new - old).abs() <= change, "{pair:?}");
        }
    }

    #[test]
    fn parabola_steps_follow_slope() {
        // Slope 2x on [0, 1]; starting from zero the allowed drift is 1e-4.
        let curve = PiecewiseCurve::new(vec![Piece {
            domain: Interval::new(0.0, 1.0),
            poly: Polynomial::new(vec![0.0, 0.0, 1.0]),
        }])
        .unwrap();

        let settings = jump_settings();
        let mut control = Jump::new(&curve, &settings, 1e-12);
        let mut stats = SamplerStats::default();

        assert!((control.max_change() - 1e-4).abs() < 1e-18);

        let step = control.step(0.0, 1.0, &mut stats);

        assert_eq!(step.kind, StepKind::RootJump);
        assert!((step.position - 5e-5).abs() < 1e-11);
        assert!(step.position <= 5e-5);
        assert_eq!(control.value(), step.position * step.position);
    }

    #[test]
    fn straight_line_misses_root() {
        let curve = PiecewiseCurve::new(vec![Piece {
            domain: Interval::new(-2.0, 2.0),
            poly: Polynomial::new(vec![1.0, 3.0]),
        }])
        .unwrap();

        let mut table = TabulatedFunction::new();
        table.push(-2.0, 1.0).unwrap();
        table.push(2.0, 13.0).unwrap();

        let rendering = render(
            &curve,
            &table,
            &Tolerances::default(),
            &jump_settings(),
        )
        .unwrap();

        let kinds: Vec<_> = rendering.samples.iter().map(|s| s.kind).collect();

        assert_eq!(kinds, vec![StepKind::Start, StepKind::RootMiss]);
        assert_eq!(rendering.samples[1].x, 2.0);
        assert_eq!(rendering.stats.root_misses, 1);
    }

    #[test]
    fn floor_guarantees_progress() {
        // Slope 2e9 x: the allowed drift is crossed almost immediately.
        let curve = PiecewiseCurve::new(vec![Piece {
            domain: Interval::new(0.0, 1e-6),
            poly: Polynomial::new(vec![0.0, 0.0, 1e9]),
        }])
        .unwrap();

        let settings = jump_settings();
        let mut control = Jump::new(&curve, &settings, 1e-15);
        let mut stats = SamplerStats::default();

        let step = control.step(0.0, 1e-6, &mut stats);

        assert_eq!(step.kind, StepKind::Floored);
        assert_eq!(step.position, settings.min_step);
        assert_eq!(stats.floored, 1);
    }
}
