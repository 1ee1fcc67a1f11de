//! Closed intervals on the real line.

use std::fmt;

/// A closed interval `[inf, sup]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub inf: f64,
    pub sup: f64,
}

impl Interval {
    pub fn new(inf: f64, sup: f64) -> Interval {
        Interval { inf, sup }
    }

    pub fn width(&self) -> f64 {
        self.sup - self.inf
    }

    pub fn midpoint(&self) -> f64 {
        self.inf + self.width() / 2.0
    }

    /// Returns `true` if the interval has a non-empty interior. NaN endpoints
    /// make an interval degenerate.
    pub fn is_proper(&self) -> bool {
        self.inf < self.sup && self.inf.is_finite() && self.sup.is_finite()
    }

    /// Splits the interval at its midpoint.
    pub fn bisect(&self) -> (Interval, Interval) {
        let mid = self.midpoint();

        (Interval::new(self.inf, mid), Interval::new(mid, self.sup))
    }

    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let inf = self.inf.max(other.inf);
        let sup = self.sup.min(other.sup);

        (inf <= sup).then_some(Interval { inf, sup })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.inf, self.sup)
    }
}
