//! Fitting smooth curves to tabulated functions.

use std::fmt;

use super::{Piece, PiecewiseCurve, Polynomial};
use crate::config::Tolerances;
use crate::table::TabulatedFunction;
use crate::utils::{mixed_error, Interval};

/// Bisection depth beyond which intervals are accepted regardless of error.
const MAX_DEPTH: u32 = 64;

/// Constructs a continuous, differentiable piecewise approximation of a table
/// over a given domain.
pub trait CurveFitter {
    fn fit(
        &self,
        table: &TabulatedFunction,
        domain: Interval,
        tolerances: &Tolerances,
    ) -> Result<PiecewiseCurve, FitError>;
}

/// Piecewise cubic Hermite fitting by recursive bisection.
///
/// Each interval's cubic agrees with the table, and with a smoothed table
/// slope, at both of its ends; since neighbouring intervals share endpoint
/// data the result is C¹. An interval is halved while its mixed error exceeds
/// `max_rel_err + obj_tolerance` and both halves stay at least
/// `min_knot_distance` wide.
pub struct HermiteFitter {
    /// Interior points checked per interval, in addition to any table
    /// abscissae that fall inside it.
    pub probes: usize,
    /// Half-width of the central difference used for slopes, relative to the
    /// width of the domain.
    pub bandwidth: f64,
}

impl Default for HermiteFitter {
    fn default() -> Self {
        HermiteFitter {
            probes: 8,
            bandwidth: 1e-3,
        }
    }
}

struct Context<'a> {
    table: &'a TabulatedFunction,
    tolerances: &'a Tolerances,
    step: f64,
}

impl Context<'_> {
    fn knot(&self, x: f64) -> (f64, f64) {
        let slope = (self.table.eval(x + self.step)
            - self.table.eval(x - self.step))
            / (2.0 * self.step);

        (self.table.eval(x), slope)
    }
}

impl HermiteFitter {
    fn refine(
        &self,
        ctx: &Context,
        domain: Interval,
        depth: u32,
        out: &mut Vec<Piece>,
    ) {
        let piece =
            hermite(domain, ctx.knot(domain.inf), ctx.knot(domain.sup));
        let error = self.max_error(ctx, &piece);

        let Tolerances {
            max_rel_err,
            min_knot_distance,
            obj_tolerance,
            ..
        } = *ctx.tolerances;

        let (left, right) = domain.bisect();

        let splittable = depth < MAX_DEPTH
            && left.is_proper()
            && right.is_proper()
            && left.width() >= min_knot_distance
            && right.width() >= min_knot_distance;

        if error > max_rel_err + obj_tolerance && splittable {
            log::debug!("splitting {domain}: mixed error {error}");

            self.refine(ctx, left, depth + 1, out);
            self.refine(ctx, right, depth + 1, out);
        } else {
            out.push(piece);
        }
    }

    fn max_error(&self, ctx: &Context, piece: &Piece) -> f64 {
        let Interval { inf, sup } = piece.domain;
        let xs = ctx.table.xs();

        let first = xs.partition_point(|&x| x <= inf);
        let last = xs.partition_point(|&x| x < sup);

        let uniform = (1..=self.probes).map(|k| {
            inf + (sup - inf) * k as f64 / (self.probes + 1) as f64
        });

        xs[first..last.max(first)]
            .iter()
            .copied()
            .chain(uniform)
            .map(|x| {
                mixed_error(
                    piece.eval(x),
                    ctx.table.eval(x),
                    ctx.tolerances.err_delta,
                )
            })
            .fold(0.0, f64::max)
    }
}

impl CurveFitter for HermiteFitter {
    fn fit(
        &self,
        table: &TabulatedFunction,
        domain: Interval,
        tolerances: &Tolerances,
    ) -> Result<PiecewiseCurve, FitError> {
        if table.is_empty() {
            return Err(FitError::EmptyTable);
        }

        if !domain.is_proper() {
            return Err(FitError::DegenerateDomain(domain));
        }

        validate(tolerances)?;

        let ctx = Context {
            table,
            tolerances,
            step: domain.width() * self.bandwidth,
        };

        let mut pieces = Vec::new();
        self.refine(&ctx, domain, 0, &mut pieces);

        log::info!("fitted {} intervals over {domain}", pieces.len());

        PiecewiseCurve::new(pieces).map_err(FitError::Curve)
    }
}

/// Builds the cubic with the given value and slope at either end of `domain`.
fn hermite(
    domain: Interval,
    (y0, m0): (f64, f64),
    (y1, m1): (f64, f64),
) -> Piece {
    let h = domain.width();
    let secant = (y1 - y0) / h;

    let c2 = (3.0 * secant - 2.0 * m0 - m1) / h;
    let c3 = (m0 + m1 - 2.0 * secant) / (h * h);

    Piece {
        domain,
        poly: Polynomial::new(vec![y0, m0, c2, c3]),
    }
}

fn validate(tolerances: &Tolerances) -> Result<(), FitError> {
    let named = [
        ("max_mixed_err", tolerances.max_rel_err),
        ("min_knot_distance", tolerances.min_knot_distance),
        ("mixed_err_delta", tolerances.err_delta),
        ("obj_tolerance", tolerances.obj_tolerance),
    ];

    match named.into_iter().find(|(_, v)| !(v.is_finite() && *v >= 0.0)) {
        Some((name, value)) => Err(FitError::BadTolerance { name, value }),
        None => Ok(()),
    }
}

#[derive(Debug, PartialEq)]
pub enum FitError {
    EmptyTable,
    DegenerateDomain(Interval),
    BadTolerance { name: &'static str, value: f64 },
    Curve(super::CurveError),
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FitError::EmptyTable => write!(f, "cannot fit an empty table"),
            FitError::DegenerateDomain(domain) => {
                write!(f, "cannot fit over degenerate domain {domain}")
            }
            FitError::BadTolerance { name, value } => {
                write!(
                    f,
                    "tolerance {name} = {value} must be finite and non-negative"
                )
            }
            FitError::Curve(err) => write!(f, "invalid fitted curve: {err}"),
        }
    }
}
