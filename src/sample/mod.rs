//! Adaptive sampling of fitted curves into plot samples.
//!
//! The sampler walks a [`PiecewiseCurve`] from its left bound to its right
//! bound. Each step is chosen by a [`StepControl`] so that consecutive
//! samples stay close in value and slope; the sampler itself only does the
//! bookkeeping shared by every strategy: emitting samples, recording the
//! mixed error against the table, and stopping at the right bound.

mod jump;
mod shrink;

use std::fmt;
use std::str::FromStr;

use crate::config::Tolerances;
use crate::curve::PiecewiseCurve;
use crate::table::TabulatedFunction;
use crate::utils::mixed_error;

use jump::Jump;
use shrink::Shrink;

/// Policy for choosing the length of each step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Shrink a trial step until value, slope and curvature settle.
    #[default]
    Shrink,
    /// Jump to where the slope has drifted by the allowed amount.
    Jump,
}

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("shrink") {
            Ok(Strategy::Shrink)
        } else if s.eq_ignore_ascii_case("jump") {
            Ok(Strategy::Jump)
        } else {
            Err(ParseStrategyError)
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strategy::Shrink => write!(f, "shrink"),
            Strategy::Jump => write!(f, "jump"),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ParseStrategyError;

impl fmt::Display for ParseStrategyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected `shrink` or `jump`")
    }
}

/// What to do when a strategy falls back to a lenient default: a shrinking
/// step accepted at its floor without settling, or a jump that finds no
/// root and heads for the right bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    #[default]
    Silent,
    Warn,
}

impl FallbackPolicy {
    fn report(self, args: fmt::Arguments) {
        match self {
            FallbackPolicy::Silent => log::debug!("{args}"),
            FallbackPolicy::Warn => log::warn!("{args}"),
        }
    }
}

/// Sampler-local settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerSettings {
    pub strategy: Strategy,
    /// Relative tolerance governing sample spacing.
    pub curve_eps: f64,
    /// Absolute floor on the step length.
    pub min_step: f64,
    pub fallback: FallbackPolicy,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        SamplerSettings {
            strategy: Strategy::Shrink,
            curve_eps: 1e-2,
            min_step: 1e-7,
            fallback: FallbackPolicy::Silent,
        }
    }
}

impl SamplerSettings {
    fn validate(&self) -> Result<(), SampleError> {
        if !(self.curve_eps.is_finite() && self.curve_eps > 0.0) {
            return Err(SampleError::BadSetting {
                name: "curve_eps",
                value: self.curve_eps,
            });
        }

        if !(self.min_step.is_finite() && self.min_step > 0.0) {
            return Err(SampleError::BadSetting {
                name: "min_step",
                value: self.min_step,
            });
        }

        Ok(())
    }
}

/// How the step leading to a sample was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// The left bound.
    Start,
    /// A trial step whose value and derivatives settled.
    Converged,
    /// A step held at the minimum length.
    Floored,
    /// A step cut short at the right bound.
    Clamped,
    /// A step to the right bound from within the objective tolerance.
    Snapped,
    /// A step to where the slope reached the edge of its allowed drift.
    RootJump,
    /// A step to the right bound because the slope never left its band.
    RootMiss,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub kind: StepKind,
}

/// Mixed error of the curve against the table at one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorPoint {
    pub x: f64,
    pub error: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SamplerStats {
    /// Positions at which the curve was evaluated.
    pub evaluations: usize,
    pub floored: usize,
    pub root_misses: usize,
    pub max_error: f64,
}

/// The rendered polyline together with its pointwise error trace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rendering {
    pub samples: Vec<Sample>,
    pub errors: Vec<ErrorPoint>,
    pub stats: SamplerStats,
}

/// The position chosen for the next sample.
pub(crate) struct Step {
    pub position: f64,
    pub kind: StepKind,
}

/// A policy deciding how far the sampler advances between samples.
pub(crate) trait StepControl {
    /// The curve's value at the current position.
    fn value(&self) -> f64;

    /// Chooses the position following `p`, which lies strictly left of
    /// `boundary`. The result lies in `(p, boundary]`.
    fn step(
        &mut self,
        p: f64,
        boundary: f64,
        stats: &mut SamplerStats,
    ) -> Step;
}

#[derive(Debug, PartialEq)]
pub enum SampleError {
    BadSetting { name: &'static str, value: f64 },
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SampleError::BadSetting { name, value } => {
                write!(f, "invalid sampler setting {name} = {value}")
            }
        }
    }
}

/// Renders `curve` from its left bound to its right bound.
///
/// The first sample lies on the left bound and the last exactly on the right
/// bound. Each sample carries the mixed error of the curve against `table`.
pub fn render(
    curve: &PiecewiseCurve,
    table: &TabulatedFunction,
    tolerances: &Tolerances,
    settings: &SamplerSettings,
) -> Result<Rendering, SampleError> {
    settings.validate()?;

    let domain = curve.bounds();
    let eps = tolerances.obj_tolerance;

    let mut control: Box<dyn StepControl + '_> = match settings.strategy {
        Strategy::Shrink => Box::new(Shrink::new(curve, settings, eps)),
        Strategy::Jump => Box::new(Jump::new(curve, settings, eps)),
    };

    let mut rendering = Rendering::default();
    rendering.stats.evaluations = 1;

    let mut p = domain.inf;
    let mut kind = StepKind::Start;

    loop {
        let y = control.value();
        let error = mixed_error(y, table.eval(p), tolerances.err_delta);

        let stats = &mut rendering.stats;
        stats.max_error = stats.max_error.max(error);

        rendering.samples.push(Sample { x: p, y, kind });
        rendering.errors.push(ErrorPoint { x: p, error });

        if p >= domain.sup {
            break;
        }

        let step = control.step(p, domain.sup, &mut rendering.stats);

        log::trace!("{:?} step {p} -> {}", step.kind, step.position);

        p = step.position;
        kind = step.kind;
    }

    log::info!(
        "rendered {} samples with {} strategy ({} evaluations)",
        rendering.samples.len(),
        settings.strategy,
        rendering.stats.evaluations
    );

    Ok(rendering)
}
