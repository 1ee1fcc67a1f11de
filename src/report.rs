//! Plot data output.
//!
//! Each trace is a text file of tab-separated `x y` rows. Numbers are written
//! in the shortest form that reads back as the same `f64`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::curve::PiecewiseCurve;
use crate::sample::{ErrorPoint, Rendering, Sample};
use crate::table::TabulatedFunction;
use crate::utils::Interval;

pub const LINEAR_TRACE: &str = "data_linear.dat";
pub const SMOOTH_TRACE: &str = "data_smooth.dat";
pub const ERROR_TRACE: &str = "data_err.dat";
pub const KNOT_TRACE: &str = "data_knots.dat";

fn write_row<W: Write>(w: &mut W, x: f64, y: f64) -> io::Result<()> {
    writeln!(w, "{x}\t{y}")
}

/// Writes the raw table, extended to both ends of `domain` by repeating the
/// end values.
pub fn write_linear<W: Write>(
    w: &mut W,
    table: &TabulatedFunction,
    domain: Interval,
) -> io::Result<()> {
    let (Some((_, first)), Some((_, last))) = (table.first(), table.last())
    else {
        return Ok(());
    };

    write_row(w, domain.inf, first)?;

    for (x, y) in table.points() {
        write_row(w, x, y)?;
    }

    write_row(w, domain.sup, last)
}

pub fn write_samples<W: Write>(
    w: &mut W,
    samples: &[Sample],
) -> io::Result<()> {
    samples.iter().try_for_each(|s| write_row(w, s.x, s.y))
}

pub fn write_errors<W: Write>(
    w: &mut W,
    errors: &[ErrorPoint],
) -> io::Result<()> {
    errors.iter().try_for_each(|e| write_row(w, e.x, e.error))
}

/// Writes the left end of every interval with the curve's value there.
pub fn write_knots<W: Write>(
    w: &mut W,
    curve: &PiecewiseCurve,
) -> io::Result<()> {
    curve.knots().try_for_each(|x| write_row(w, x, curve.eval(x)))
}

fn create(dir: &Path, name: &str) -> io::Result<BufWriter<File>> {
    File::create(dir.join(name)).map(BufWriter::new)
}

/// Writes all four traces into `dir`.
pub fn write_all(
    dir: &Path,
    table: &TabulatedFunction,
    curve: &PiecewiseCurve,
    rendering: &Rendering,
) -> io::Result<()> {
    let mut linear = create(dir, LINEAR_TRACE)?;
    write_linear(&mut linear, table, curve.bounds())?;
    linear.flush()?;

    let mut smooth = create(dir, SMOOTH_TRACE)?;
    write_samples(&mut smooth, &rendering.samples)?;
    smooth.flush()?;

    let mut err = create(dir, ERROR_TRACE)?;
    write_errors(&mut err, &rendering.errors)?;
    err.flush()?;

    let mut knots = create(dir, KNOT_TRACE)?;
    write_knots(&mut knots, curve)?;
    knots.flush()
}
