//! The batch pipeline: read, fit or load, tabulate, write.
use crate::{
    codec,
    error::Result,
    opts::{Config, TableSpec},
    CurveFit, Polynomial,
};

/// Quality of a fresh fit, measured on the points it was fitted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitQuality {
    /// Number of points fitted
    pub points: usize,

    /// Coefficient of determination
    pub r_squared: f64,

    /// Root mean squared error
    pub rmse: f64,

    /// Largest absolute residual
    pub max_abs_residual: f64,
}
impl FitQuality {
    fn of(fit: &CurveFit) -> Self {
        Self {
            points: fit.data().len(),
            r_squared: fit.r_squared(),
            rmse: fit.rmse(),
            max_abs_residual: fit.max_abs_residual(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The model that was fitted or loaded
    pub model: Polynomial,

    /// Set when the model was fitted in this run
    pub quality: Option<FitQuality>,

    /// Rows written to the table, if one was requested
    pub table_rows: Option<usize>,
}

/// Runs the pipeline described by `config`.
///
/// # Errors
/// Any error from reading, fitting, tabulating or writing. Every failure aborts the run; files
/// written before the failure are complete, and no partially written file is left behind.
pub fn run(config: &Config) -> Result<Report> {
    let points = config
        .points
        .as_deref()
        .map(codec::read_points)
        .transpose()?;

    let (model, quality) = match &points {
        Some(points) => {
            let fit = CurveFit::with_size(&points[..], config.size)?;
            let quality = FitQuality::of(&fit);
            log::info!(
                "fitted {} points with {} terms: r² = {}, rmse = {}, max |residual| = {}",
                quality.points,
                fit.base(),
                quality.r_squared,
                quality.rmse,
                quality.max_abs_residual
            );

            let model = fit.into_polynomial();
            codec::write_coefficients(&config.coefficients, &model)?;
            (model, Some(quality))
        }

        None => (codec::read_coefficients(&config.coefficients)?, None),
    };

    let table_rows = match &config.table {
        Some(spec) => Some(tabulate(&model, spec, points.as_deref())?),
        None => None,
    };

    Ok(Report {
        model,
        quality,
        table_rows,
    })
}

fn tabulate(model: &Polynomial, spec: &TableSpec, points: Option<&[(f64, f64)]>) -> Result<usize> {
    let (from, to) = spec.range(points);

    let basis = model.basis();
    if !basis.normalizer.contains(from) || !basis.normalizer.contains(to) {
        let (x_min, x_max) = model.domain();
        log::warn!(
            "table range {from}..{to} leaves the fitted domain {x_min}..{x_max}; extrapolating"
        );
    }

    let table = model.tabulate(from, to, spec.samples)?;
    codec::write_table(&spec.path, &table)?;
    Ok(table.len())
}
