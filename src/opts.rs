use std::path::PathBuf;

use argh::FromArgs;
use log::LevelFilter;

use crate::sample::{FallbackPolicy, SamplerSettings, Strategy};

/// Plot a smooth approximation of a tabulated lookup function.
#[derive(FromArgs)]
pub struct Opts {
    /// index of the lookup table to plot
    #[argh(positional)]
    pub index: usize,

    /// file holding settings and lookup tables
    #[argh(option, short = 'i', default = "PathBuf::from(\"lookups.dat\")")]
    pub input: PathBuf,

    /// directory receiving the plot data
    #[argh(option, short = 'o', default = "PathBuf::from(\".\")")]
    pub output_dir: PathBuf,

    /// step strategy, `shrink` or `jump`
    #[argh(option, default = "Default::default()")]
    pub strategy: Strategy,

    /// relative tolerance on the change between consecutive samples
    #[argh(option, default = "1e-2")]
    pub curve_eps: f64,

    /// minimum distance between consecutive samples
    #[argh(option, default = "1e-7")]
    pub min_step: f64,

    /// warn when a step falls back to a lenient default
    #[argh(switch)]
    pub warn_fallbacks: bool,

    /// logging level
    #[argh(option, long = "log", default = "LevelFilter::Warn")]
    pub log_level: LevelFilter,
}

impl Opts {
    /// Parse options from `env::args`.
    pub fn parse() -> Opts {
        argh::from_env()
    }

    pub fn sampler_settings(&self) -> SamplerSettings {
        SamplerSettings {
            strategy: self.strategy,
            curve_eps: self.curve_eps,
            min_step: self.min_step,
            fallback: if self.warn_fallbacks {
                FallbackPolicy::Warn
            } else {
                FallbackPolicy::Silent
            },
        }
    }
}
