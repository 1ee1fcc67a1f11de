//! Dense univariate polynomials.

use itertools::Itertools;

/// Bisection steps after which a root search gives up narrowing its bracket.
const MAX_BISECTIONS: u32 = 200;

/// A polynomial with coefficients stored in ascending order of degree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<f64>) -> Polynomial {
        Polynomial { coeffs }
    }

    /// Degree ignoring vanishing leading coefficients. The zero polynomial
    /// has degree zero.
    pub fn degree(&self) -> usize {
        self.coeffs
            .iter()
            .rposition(|&c| c != 0.0)
            .unwrap_or_default()
    }

    pub fn eval(&self, t: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }

    pub fn derivative(&self) -> Polynomial {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, &c)| k as f64 * c)
            .collect();

        Polynomial { coeffs }
    }

    /// Returns `self - value`.
    pub fn offset(&self, value: f64) -> Polynomial {
        let mut coeffs = self.coeffs.clone();

        match coeffs.first_mut() {
            Some(c) => *c -= value,
            None => coeffs.push(-value),
        }

        Polynomial { coeffs }
    }

    /// Finds the roots in `[lo, hi]`, each to within `tol`, in increasing
    /// order. Roots closer together than `tol` are reported once.
    pub fn roots(&self, lo: f64, hi: f64, tol: f64) -> Vec<f64> {
        let mut roots: Vec<f64> = Vec::new();

        for (a, b) in self.monotone_sections(lo, hi, tol) {
            if let Some(root) = self.bracketed_root(a, b, tol) {
                if roots.last().map_or(true, |&last| root - last > tol) {
                    roots.push(root);
                }
            }
        }

        roots
    }

    /// Finds the smallest root in `[lo, hi]` to within `tol`.
    ///
    /// The returned point is the end of the final bracket on the same side of
    /// zero as `lo`, so the polynomial does not change sign on `[lo, root)`.
    pub fn smallest_root(&self, lo: f64, hi: f64, tol: f64) -> Option<f64> {
        self.monotone_sections(lo, hi, tol)
            .find_map(|(a, b)| self.bracketed_root(a, b, tol))
    }

    /// Splits `[lo, hi]` at the stationary points of the polynomial.
    fn monotone_sections(
        &self,
        lo: f64,
        hi: f64,
        tol: f64,
    ) -> impl Iterator<Item = (f64, f64)> {
        let stationary = if self.degree() >= 2 {
            self.derivative().roots(lo, hi, tol)
        } else {
            Vec::new()
        };

        std::iter::once(lo)
            .chain(stationary.into_iter().filter(move |&x| lo < x && x < hi))
            .chain(std::iter::once(hi))
            .tuple_windows()
    }

    /// Bisects a section on which the polynomial is monotone.
    fn bracketed_root(&self, mut a: f64, mut b: f64, tol: f64) -> Option<f64> {
        if self.degree() == 0 {
            return None;
        }

        let fa = self.eval(a);
        let fb = self.eval(b);

        if fa == 0.0 {
            return Some(a);
        }

        if fb == 0.0 {
            return Some(b);
        }

        if fa.signum() == fb.signum() || fa.is_nan() || fb.is_nan() {
            return None;
        }

        for _ in 0..MAX_BISECTIONS {
            if b - a <= tol {
                break;
            }

            let m = a + (b - a) / 2.0;

            if m <= a || m >= b {
                break;
            }

            let fm = self.eval(m);

            if fm == 0.0 {
                return Some(m);
            }

            if fm.signum() == fa.signum() {
                a = m;
            } else {
                b = m;
            }
        }

        Some(a)
    }
}
