//! Run settings read from `name=value` lines of the input stream.

use std::fmt;
use std::ops::Range;

use crate::utils::source;

/// Names accepted on setting lines, in the order they are reported.
pub const SETTING_NAMES: [&str; 4] = [
    "max_mixed_err",
    "min_knot_distance",
    "mixed_err_delta",
    "obj_tolerance",
];

/// Numeric tolerances governing the fit and the sampler. Immutable for the
/// duration of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    /// Bound on the mixed error of the fitted curve against the table.
    pub max_rel_err: f64,
    pub min_knot_distance: f64,
    /// Stabiliser of the mixed error, `delta`.
    pub err_delta: f64,
    /// Objective tolerance, `eps`.
    pub obj_tolerance: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            max_rel_err: 0.01,
            min_knot_distance: 1e-7,
            err_delta: 2.0,
            obj_tolerance: 1e-7,
        }
    }
}

impl Tolerances {
    fn slot(&mut self, name: &str) -> Option<&mut f64> {
        if name.eq_ignore_ascii_case("max_mixed_err") {
            Some(&mut self.max_rel_err)
        } else if name.eq_ignore_ascii_case("min_knot_distance") {
            Some(&mut self.min_knot_distance)
        } else if name.eq_ignore_ascii_case("mixed_err_delta") {
            Some(&mut self.err_delta)
        } else if name.eq_ignore_ascii_case("obj_tolerance") {
            Some(&mut self.obj_tolerance)
        } else {
            None
        }
    }
}

/// A setting line that was ignored.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigWarning {
    BadValue {
        name: String,
        value: String,
        span: Range<usize>,
    },
    UnknownOption {
        name: String,
        span: Range<usize>,
    },
}

impl ConfigWarning {
    pub fn span(&self) -> Range<usize> {
        match self {
            ConfigWarning::BadValue { span, .. }
            | ConfigWarning::UnknownOption { span, .. } => span.clone(),
        }
    }

    pub fn note(&self) -> String {
        match self {
            ConfigWarning::BadValue { .. } => {
                String::from("expected a real value")
            }
            ConfigWarning::UnknownOption { .. } => {
                format!("supported options are: {}", SETTING_NAMES.join(", "))
            }
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigWarning::BadValue { name, value, .. } => {
                write!(f, "bad value '{value}' for option '{name}' is ignored")
            }
            ConfigWarning::UnknownOption { name, .. } => {
                write!(f, "unknown option ignored '{name}'")
            }
        }
    }
}

/// Reads the setting lines of `src` that come before the table with index
/// `table`, starting from the default tolerances. Lines after that table are
/// never looked at; if there is no such table the whole stream is read.
///
/// Nothing here is fatal: a value that is not a real number, or a name that
/// is not one of [`SETTING_NAMES`], leaves the tolerances untouched and is
/// reported as a warning. Names match case-insensitively and later lines
/// override earlier ones.
pub fn parse_settings(
    src: &str,
    table: usize,
) -> (Tolerances, Vec<ConfigWarning>) {
    let mut tolerances = Tolerances::default();
    let mut warnings = Vec::new();
    let mut tables = 0;

    for (offset, line) in source::lines(src) {
        let Some((name, value)) = line.split_once('=') else {
            if tables == table {
                break;
            }

            tables += 1;
            continue;
        };

        let name = name.trim();
        let value = value.trim();

        let Ok(parsed) = value.parse::<f64>() else {
            warnings.push(ConfigWarning::BadValue {
                name: name.to_owned(),
                value: value.to_owned(),
                span: source::subspan(offset, line, value),
            });

            continue;
        };

        match tolerances.slot(name) {
            Some(slot) => {
                log::debug!("setting {name} = {parsed}");
                *slot = parsed;
            }
            None => warnings.push(ConfigWarning::UnknownOption {
                name: name.to_owned(),
                span: source::subspan(offset, line, name),
            }),
        }
    }

    (tolerances, warnings)
}
