//! Piecewise polynomial curves.

use std::fmt;

use super::Polynomial;
use crate::utils::Interval;

/// One interval of a piecewise curve. The polynomial is expressed in the
/// local variable `t = x - domain.inf`.
#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    pub domain: Interval,
    pub poly: Polynomial,
}

impl Piece {
    pub fn eval(&self, x: f64) -> f64 {
        self.poly.eval(x - self.domain.inf)
    }
}

/// A curve defined over contiguous intervals `[x_i, x_{i+1})`, each holding
/// its own polynomial. The last interval is closed on the right.
///
/// Queries outside the curve's bounds extend the nearest end piece.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecewiseCurve {
    pieces: Vec<Piece>,
}

impl PiecewiseCurve {
    pub fn new(pieces: Vec<Piece>) -> Result<PiecewiseCurve, CurveError> {
        if pieces.is_empty() {
            return Err(CurveError::Empty);
        }

        if let Some(piece) = pieces.iter().find(|p| !p.domain.is_proper()) {
            return Err(CurveError::Degenerate(piece.domain));
        }

        for (left, right) in pieces.iter().zip(&pieces[1..]) {
            if left.domain.sup != right.domain.inf {
                return Err(CurveError::Gap {
                    left: left.domain,
                    right: right.domain,
                });
            }
        }

        Ok(PiecewiseCurve { pieces })
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn num_intervals(&self) -> usize {
        self.pieces.len()
    }

    pub fn interval(&self, i: usize) -> Interval {
        self.pieces[i].domain
    }

    pub fn bounds(&self) -> Interval {
        let first = &self.pieces[0];
        let last = &self.pieces[self.pieces.len() - 1];

        Interval::new(first.domain.inf, last.domain.sup)
    }

    /// Width of the narrowest interval.
    pub fn min_width(&self) -> f64 {
        self.pieces
            .iter()
            .map(|p| p.domain.width())
            .fold(f64::INFINITY, f64::min)
    }

    /// Left endpoints of the intervals.
    pub fn knots(&self) -> impl Iterator<Item = f64> + '_ {
        self.pieces.iter().map(|p| p.domain.inf)
    }

    fn locate(&self, x: f64) -> usize {
        let i = self.pieces.partition_point(|p| p.domain.sup <= x);

        i.min(self.pieces.len() - 1)
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.pieces[self.locate(x)].eval(x)
    }

    /// Evaluates the derivative of the given order at `x`.
    pub fn derivative(&self, order: u32, x: f64) -> f64 {
        let piece = &self.pieces[self.locate(x)];
        let poly = (0..order).fold(piece.poly.clone(), |p, _| p.derivative());

        poly.eval(x - piece.domain.inf)
    }

    /// Returns the derivative as a curve over the same intervals.
    pub fn differentiate(&self) -> PiecewiseCurve {
        let pieces = self
            .pieces
            .iter()
            .map(|p| Piece {
                domain: p.domain,
                poly: p.poly.derivative(),
            })
            .collect();

        PiecewiseCurve { pieces }
    }

    /// Finds the smallest `x` in `[lo, hi]` with `self(x) = target`, to
    /// within `tol`.
    ///
    /// The curve does not cross `target` on `[lo, x)`.
    pub fn solve(
        &self,
        target: f64,
        lo: f64,
        hi: f64,
        tol: f64,
    ) -> Option<f64> {
        let range = Interval::new(lo, hi);

        self.pieces[self.locate(lo)..].iter().find_map(|piece| {
            let section = piece.domain.intersect(&range)?;
            let origin = piece.domain.inf;

            let t = piece.poly.offset(target).smallest_root(
                section.inf - origin,
                section.sup - origin,
                tol,
            )?;

            Some((t + origin).clamp(lo, hi))
        })
    }
}

#[derive(Debug, PartialEq)]
pub enum CurveError {
    Empty,
    Degenerate(Interval),
    Gap { left: Interval, right: Interval },
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CurveError::Empty => write!(f, "curve has no intervals"),
            CurveError::Degenerate(domain) => {
                write!(f, "interval {domain} is degenerate")
            }
            CurveError::Gap { left, right } => {
                write!(f, "intervals {left} and {right} are not contiguous")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(inf: f64, sup: f64, coeffs: Vec<f64>) -> Piece {
        Piece {
            domain: Interval::new(inf, sup),
            poly: Polynomial::new(coeffs),
        }
    }

    /// `x^2` on `[-1, 0)` continued as `x^2` on `[0, 2]`.
    fn parabola() -> PiecewiseCurve {
        PiecewiseCurve::new(vec![
            piece(-1.0, 0.0, vec![1.0, -2.0, 1.0]),
            piece(0.0, 2.0, vec![0.0, 0.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn structure() {
        let curve = parabola();

        assert_eq!(curve.num_intervals(), 2);
        assert_eq!(curve.bounds(), Interval::new(-1.0, 2.0));
        assert_eq!(curve.min_width(), 1.0);
        assert_eq!(curve.knots().collect::<Vec<_>>(), vec![-1.0, 0.0]);
    }

    #[test]
    fn evaluation() {
        let curve = parabola();

        for x in [-1.0, -0.5, 0.0, 0.75, 2.0] {
            assert!((curve.eval(x) - x * x).abs() < 1e-15);
            assert!((curve.derivative(1, x) - 2.0 * x).abs() < 1e-15);
            assert_eq!(curve.derivative(2, x), 2.0);
            assert_eq!(curve.derivative(3, x), 0.0);
        }

        // Extends the end pieces.
        assert_eq!(curve.eval(3.0), 9.0);
        assert_eq!(curve.eval(-2.0), 4.0);

        let slope = curve.differentiate();
        assert_eq!(slope.eval(1.5), 3.0);
    }

    #[test]
    fn rejects_gaps() {
        let pieces = vec![
            piece(0.0, 1.0, vec![0.0]),
            piece(1.5, 2.0, vec![0.0]),
        ];

        assert!(matches!(
            PiecewiseCurve::new(pieces),
            Err(CurveError::Gap { .. })
        ));
        assert_eq!(PiecewiseCurve::new(Vec::new()), Err(CurveError::Empty));
        assert!(matches!(
            PiecewiseCurve::new(vec![piece(1.0, 1.0, vec![0.0])]),
            Err(CurveError::Degenerate(_))
        ));
    }

    #[test]
    fn solving() {
        let curve = parabola();

        let x = curve.solve(0.25, -1.0, 2.0, 1e-12).unwrap();
        assert!((x + 0.5).abs() <= 1e-12);

        let x = curve.solve(0.25, -0.4, 2.0, 1e-12).unwrap();
        assert!((x - 0.5).abs() <= 1e-12);
        assert!(x <= 0.5);

        assert_eq!(curve.solve(5.0, -1.0, 2.0, 1e-12), None);
        assert_eq!(curve.solve(0.25, 0.6, 2.0, 1e-12), None);
    }
}
