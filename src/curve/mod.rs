//! Smooth piecewise approximations of tabulated functions.

pub mod fit;
pub mod piecewise;
pub mod polynomial;

pub use fit::{CurveFitter, FitError, HermiteFitter};
pub use piecewise::{CurveError, Piece, PiecewiseCurve};
pub use polynomial::Polynomial;
