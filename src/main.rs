use std::fs;
use std::process::ExitCode;
use std::time::Instant;

use lookup_plot::config::{self, Tolerances};
use lookup_plot::curve::{CurveFitter, HermiteFitter, PiecewiseCurve};
use lookup_plot::opts::Opts;
use lookup_plot::table::{self, TabulatedFunction};
use lookup_plot::utils::{Diagnostic, Reporter};
use lookup_plot::{report, sample};

fn echo_table(index: usize, table: &TabulatedFunction) {
    println!("\nLOOKUP {index}:");

    for (x, y) in table.points() {
        println!("\tAdded ({x},{y})");
    }
}

fn echo_curve(curve: &PiecewiseCurve, tolerances: &Tolerances) {
    println!(
        "Curve has {} intervals. The smallest has size {}",
        curve.num_intervals(),
        curve.min_width()
    );
    println!(
        "Maximum mixed error is {} (delta={})",
        tolerances.max_rel_err, tolerances.err_delta
    );
}

fn main() -> ExitCode {
    let opts = Opts::parse();

    env_logger::Builder::new()
        .filter_level(opts.log_level)
        .init();

    let src = match fs::read_to_string(&opts.input) {
        Ok(src) => src,
        Err(err) => {
            Reporter::new("", "").emit(&Diagnostic::from(err));

            return ExitCode::FAILURE;
        }
    };

    let filename = opts.input.to_string_lossy();
    let mut reporter = Reporter::new(&filename, &src);

    let (tolerances, warnings) = config::parse_settings(&src, opts.index);

    for warning in &warnings {
        reporter.emit(&Diagnostic::from(warning));
    }

    let table = match table::select(&src, opts.index) {
        Ok(table) => table,
        Err(err) => {
            reporter.emit(&Diagnostic::from(&err));

            return ExitCode::FAILURE;
        }
    };

    echo_table(opts.index, &table);

    let Some(domain) = table.extended_domain() else {
        reporter
            .emit(&Diagnostic::error().with_message("lookup table is empty"));

        return ExitCode::FAILURE;
    };

    println!("{} to {}", domain.inf, domain.sup);

    let start = Instant::now();

    let curve = match HermiteFitter::default().fit(&table, domain, &tolerances)
    {
        Ok(curve) => curve,
        Err(err) => {
            reporter.emit(&Diagnostic::error().with_message(err.to_string()));

            return ExitCode::FAILURE;
        }
    };

    println!("Fitting took {} seconds.", start.elapsed().as_secs_f64());
    echo_curve(&curve, &tolerances);

    let settings = opts.sampler_settings();

    let rendering =
        match sample::render(&curve, &table, &tolerances, &settings) {
            Ok(rendering) => rendering,
            Err(err) => {
                reporter
                    .emit(&Diagnostic::error().with_message(err.to_string()));

                return ExitCode::FAILURE;
            }
        };

    if let Err(err) =
        report::write_all(&opts.output_dir, &table, &curve, &rendering)
    {
        reporter.emit(&Diagnostic::from(err));

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
