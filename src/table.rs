//! Tabulated lookup functions.

use std::fmt;
use std::ops::Range;

use itertools::Itertools;

use crate::utils::{source, Interval};

/// An ordered sequence of `(x, y)` points, strictly increasing in `x`,
/// evaluated by linear interpolation.
///
/// Outside of the tabulated range the end values are held constant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabulatedFunction {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl TabulatedFunction {
    pub fn new() -> TabulatedFunction {
        Default::default()
    }

    /// Appends a point, which must lie to the right of every existing point.
    pub fn push(&mut self, x: f64, y: f64) -> Result<(), TableError> {
        if let Some(&last) = self.xs.last() {
            if !(x > last) {
                return Err(TableError::Unordered { x, span: None });
            }
        }

        self.xs.push(x);
        self.ys.push(y);

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        Some((*self.xs.first()?, *self.ys.first()?))
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.xs.last()?, *self.ys.last()?))
    }

    /// Evaluates the table at `x`. An empty table evaluates to zero.
    pub fn eval(&self, x: f64) -> f64 {
        let (Some((x0, y0)), Some((xn, yn))) = (self.first(), self.last())
        else {
            return 0.0;
        };

        if x <= x0 {
            return y0;
        }

        if x >= xn {
            return yn;
        }

        // First index whose abscissa exceeds `x`; in `1..len` here.
        let i = self.xs.partition_point(|&xi| xi <= x);

        let (xa, xb) = (self.xs[i - 1], self.xs[i]);
        let (ya, yb) = (self.ys[i - 1], self.ys[i]);

        ya + (x - xa) / (xb - xa) * (yb - ya)
    }

    /// The tabulated range widened by half its width on either side.
    pub fn extended_domain(&self) -> Option<Interval> {
        let (a, _) = self.first()?;
        let (b, _) = self.last()?;
        let xtd = (b - a) / 2.0;

        Some(Interval::new(a - xtd, b + xtd))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TableError {
    Missing { index: usize, available: usize },
    BadNumber { token: String, span: Range<usize> },
    Unordered { x: f64, span: Option<Range<usize>> },
    TooFewPoints { index: usize, span: Range<usize> },
}

impl TableError {
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            TableError::Missing { .. } => None,
            TableError::BadNumber { span, .. }
            | TableError::TooFewPoints { span, .. } => Some(span.clone()),
            TableError::Unordered { span, .. } => span.clone(),
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableError::Missing { index, available } => write!(
                f,
                "no lookup table with index {index} ({available} available)"
            ),
            TableError::BadNumber { token, .. } => {
                write!(f, "expected a real value, found '{token}'")
            }
            TableError::Unordered { x, .. } => {
                write!(f, "abscissa {x} is not strictly increasing")
            }
            TableError::TooFewPoints { index, .. } => {
                write!(f, "lookup table {index} needs at least two points")
            }
        }
    }
}

/// Selects the table with the given 0-based index from `src`.
///
/// Every line that is not a setting holds one table as whitespace-separated
/// `x y` pairs, so a blank line is an empty table. A trailing unpaired token
/// is ignored.
pub fn select(
    src: &str,
    index: usize,
) -> Result<TabulatedFunction, TableError> {
    let mut tables =
        source::lines(src).filter(|(_, line)| !source::is_setting(line));

    let Some((offset, line)) = tables.nth(index) else {
        return Err(TableError::Missing {
            index,
            available: count_tables(src),
        });
    };

    let table = parse_line(offset, line)?;

    if table.len() < 2 {
        return Err(TableError::TooFewPoints {
            index,
            span: offset..offset + line.len(),
        });
    }

    Ok(table)
}

/// Counts the table lines of `src`.
pub fn count_tables(src: &str) -> usize {
    source::lines(src)
        .filter(|(_, line)| !source::is_setting(line))
        .count()
}

fn parse_line(
    offset: usize,
    line: &str,
) -> Result<TabulatedFunction, TableError> {
    let mut table = TabulatedFunction::new();

    let number = |token: &str| {
        token.parse::<f64>().map_err(|_| TableError::BadNumber {
            token: token.to_owned(),
            span: source::subspan(offset, line, token),
        })
    };

    for (x, y) in line.split_whitespace().tuples() {
        let (px, py) = (number(x)?, number(y)?);

        table.push(px, py).map_err(|_| TableError::Unordered {
            x: px,
            span: Some(source::subspan(offset, line, x)),
        })?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TabulatedFunction {
        let mut table = TabulatedFunction::new();

        for (x, y) in [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)] {
            table.push(x, y).unwrap();
        }

        table
    }

    #[test]
    fn interpolation() {
        let table = triangle();

        assert_eq!(table.eval(0.5), 0.5);
        assert_eq!(table.eval(1.0), 1.0);
        assert_eq!(table.eval(1.25), 0.75);
        assert_eq!(table.eval(2.0), 0.0);
    }

    #[test]
    fn constant_extrapolation() {
        let mut table = TabulatedFunction::new();
        table.push(1.0, 3.0).unwrap();
        table.push(2.0, 5.0).unwrap();

        assert_eq!(table.eval(-10.0), 3.0);
        assert_eq!(table.eval(10.0), 5.0);
    }

    #[test]
    fn rejects_unordered_points() {
        let mut table = triangle();

        assert!(table.push(2.0, 1.0).is_err());
        assert!(table.push(1.5, 1.0).is_err());
        assert!(table.push(f64::NAN, 1.0).is_err());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn extended_domain() {
        assert_eq!(
            triangle().extended_domain(),
            Some(Interval::new(-1.0, 3.0))
        );
        assert_eq!(TabulatedFunction::new().extended_domain(), None);
    }

    #[test]
    fn selection_skips_settings() {
        let src = "max_mixed_err=0.1\n0 0 1 1\n\n\
                   obj_tolerance=1\n0 0 1 1 2 0 9\n";

        assert_eq!(count_tables(src), 3);
        assert_eq!(select(src, 2).unwrap(), triangle());
        assert_eq!(
            select(src, 3),
            Err(TableError::Missing {
                index: 3,
                available: 3
            })
        );
    }

    #[test]
    fn blank_line_is_an_empty_table() {
        let src = "0 0 1 1

0 0 2 2
";

        assert!(matches!(
            select(src, 1),
            Err(TableError::TooFewPoints { index: 1, .. })
        ));
        assert_eq!(select(src, 2).unwrap().xs(), &[0.0, 2.0]);
    }

    #[test]
    fn selection_errors_point_at_tokens() {
        let src = "0 0 1 x\n0 0 2 1 1 1\n5 5\n";

        let err = select(src, 0).unwrap_err();
        assert_eq!(&src[err.span().unwrap()], "x");

        let err = select(src, 1).unwrap_err();
        assert!(matches!(err, TableError::Unordered { x, .. } if x == 1.0));
        assert_eq!(&src[err.span().unwrap()], "1");

        let err = select(src, 2).unwrap_err();
        assert!(matches!(err, TableError::TooFewPoints { index: 2, .. }));
    }
}
