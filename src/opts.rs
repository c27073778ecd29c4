//! Command line surface and the validated run configuration built from it.
use std::path::PathBuf;

use argh::FromArgs;
use log::LevelFilter;

use crate::{
    error::{Error, Result},
    statistics::BasisSize,
    value::CoordExt,
};

/// Default number of samples in a tabulation.
pub const DEFAULT_SAMPLES: usize = 100;

/// Range used for tabulation when no points are available to derive it from.
pub const FALLBACK_RANGE: (f64, f64) = (0.0, 1.0);

/// Least-squares Legendre approximation of 2D points.
///
/// With `--points`, fits the points and writes the coefficients file.
/// Without it, loads the coefficients file. Either way the model can then be tabulated.
#[derive(Debug, FromArgs)]
pub struct Opts {
    /// points to fit (`x y` pairs, or a JSON array of pairs for `.json` files)
    #[argh(option, short = 'p')]
    pub points: Option<PathBuf>,

    /// coefficients file: written after a fit, read otherwise
    #[argh(option, short = 's')]
    pub coefficients: PathBuf,

    /// write a table of `x y` samples of the model to this file
    #[argh(option, short = 'g')]
    pub table: Option<PathBuf>,

    /// first x of the table (default: first x of the points, or 0)
    #[argh(option, short = 'f')]
    pub from: Option<f64>,

    /// last x of the table (default: last x of the points, or 1)
    #[argh(option, short = 't')]
    pub to: Option<f64>,

    /// number of table samples, at least 2
    #[argh(option, short = 'n', default = "DEFAULT_SAMPLES")]
    pub samples: usize,

    /// number of Legendre terms to fit (default: min(points - 1, 10))
    #[argh(option, short = 'b')]
    pub base: Option<usize>,

    /// logging level
    #[argh(option, long = "log", default = "LevelFilter::Warn")]
    pub log_level: LevelFilter,
}

impl Opts {
    /// Parse options from `env::args`.
    #[must_use]
    pub fn parse() -> Opts {
        argh::from_env()
    }
}

/// What to tabulate, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    /// Destination file
    pub path: PathBuf,

    /// Explicit first x, if any
    pub from: Option<f64>,

    /// Explicit last x, if any
    pub to: Option<f64>,

    /// Number of samples, always greater than 1
    pub samples: usize,
}
impl TableSpec {
    /// Resolves the tabulation range.
    ///
    /// Explicit bounds win. Missing bounds come from the first and last x of `points` when at
    /// least two points are available, and from [`FALLBACK_RANGE`] otherwise.
    #[must_use]
    pub fn range(&self, points: Option<&[(f64, f64)]>) -> (f64, f64) {
        let default = match points {
            Some(points) if self.from.is_none() || self.to.is_none() => {
                if !points.is_sorted_by_x() {
                    log::warn!(
                        "points are not sorted by x; the default table range may not cover them"
                    );
                }
                points.first_last_x().unwrap_or(FALLBACK_RANGE)
            }
            _ => FALLBACK_RANGE,
        };

        (self.from.unwrap_or(default.0), self.to.unwrap_or(default.1))
    }
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Points to fit; `None` means the coefficients are loaded instead
    pub points: Option<PathBuf>,

    /// Coefficients file
    pub coefficients: PathBuf,

    /// Optional tabulation
    pub table: Option<TableSpec>,

    /// Basis size policy for fresh fits
    pub size: BasisSize,
}

impl TryFrom<Opts> for Config {
    type Error = Error;

    fn try_from(opts: Opts) -> Result<Self> {
        if opts.samples <= 1 {
            return Err(Error::InvalidParameters(format!(
                "sample count must be greater than 1, got {}",
                opts.samples
            )));
        }

        for (name, bound) in [("--from", opts.from), ("--to", opts.to)] {
            if bound.is_some_and(|b| !b.is_finite()) {
                return Err(Error::InvalidParameters(format!("{name} must be a finite number")));
            }
        }

        let size = match opts.base {
            Some(0) => {
                return Err(Error::InvalidParameters(
                    "basis size must be at least 1".to_string(),
                ))
            }
            Some(base) => BasisSize::Custom(base),
            None => BasisSize::Stable,
        };

        if opts.base.is_some() && opts.points.is_none() {
            log::warn!("--base has no effect without --points");
        }

        let table = match opts.table {
            Some(path) => Some(TableSpec {
                path,
                from: opts.from,
                to: opts.to,
                samples: opts.samples,
            }),
            None => {
                if opts.from.is_some() || opts.to.is_some() {
                    log::warn!("--from/--to have no effect without --table");
                }
                None
            }
        };

        Ok(Config {
            points: opts.points,
            coefficients: opts.coefficients,
            table,
            size,
        })
    }
}
