/// Relative error of `approx` against `exact`, stabilised near zero by
/// `delta`: `|approx - exact| / (|exact| + delta)`.
pub fn mixed_error(approx: f64, exact: f64, delta: f64) -> f64 {
    (approx - exact).abs() / (exact.abs() + delta)
}
