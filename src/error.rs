//! Error types for Legendre approximation
//!
//! This module defines the failures encountered when reading samples, fitting
//! coefficients, evaluating a model, or persisting results, along with a
//! convenient `Result` alias.
//!
//! Every variant belongs to one [`ErrorKind`], which is what the binary
//! reports to the user and what callers should match on when they only care
//! about the broad category.
use std::path::PathBuf;

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A source or sink could not be opened, read or written.
    Io,

    /// Points or coefficients content could not be parsed, or violates a
    /// structural requirement such as the minimum number of points.
    MalformedInput,

    /// Fitting failed numerically, or produced / loaded a model that cannot be evaluated.
    DegenerateFit,

    /// Invalid tabulation or command-line parameters.
    InvalidParameters,
}

/// Errors that can occur while fitting, evaluating or persisting a Legendre series.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file could not be opened for the required mode.
    #[error("can not {action} {}: {source}", path.display())]
    Io {
        /// What was being attempted, e.g. `"read points file"`
        action: &'static str,
        /// The offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Text content could not be parsed.
    #[error("bad contents of {what} (line {line}): {reason}")]
    Malformed {
        /// Which kind of document was being parsed
        what: &'static str,
        /// 1-based line number of the problem, or 0 if not tied to a line
        line: usize,
        /// Human readable description
        reason: String,
    },

    /// Not enough sample points to fit.
    #[error("at least {min} points are required for a fit, got {got}")]
    TooFewPoints {
        /// Number of points supplied
        got: usize,
        /// Minimum number of points
        min: usize,
    },

    /// The domain has zero (or negative) width, so there is no interval to map onto [-1, 1].
    ///
    /// Happens when every sample shares the same x-value.
    #[error("degenerate domain [{x_min}, {x_max}]; x_min must be below x_max")]
    DegenerateDomain {
        /// Lower bound
        x_min: f64,
        /// Upper bound
        x_max: f64,
    },

    /// Cannot compute the fit because the normal matrix is singular.
    ///
    /// Usually the basis is too large for the data, or x-values repeat.
    #[error("normal matrix (P^T P) is singular or too ill-conditioned to solve [n: {n}, k: {k}]")]
    SingularMatrix {
        /// Number of data points
        n: usize,
        /// Number of basis functions
        k: usize,
    },

    /// NaN or infinite values where finite ones are required.
    ///
    /// Raised for non-finite sample points, and for a solve that produced non-finite coefficients.
    #[error("non-finite values in {0}")]
    NonFinite(&'static str),

    /// A coefficient model with an unusable basis size.
    #[error("bad coefficients: base={0}")]
    InvalidBase(usize),

    /// Tabulation or command-line parameters are unusable.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// JSON encoding or decoding failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the broad category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::Malformed { .. } | Error::Json(_) => ErrorKind::MalformedInput,
            Error::TooFewPoints { .. }
            | Error::DegenerateDomain { .. }
            | Error::SingularMatrix { .. }
            | Error::NonFinite(_)
            | Error::InvalidBase(_) => ErrorKind::DegenerateFit,
            Error::InvalidParameters(_) => ErrorKind::InvalidParameters,
        }
    }

    pub(crate) fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(what: &'static str, line: usize, reason: impl Into<String>) -> Self {
        Error::Malformed {
            what,
            line,
            reason: reason.into(),
        }
    }
}

/// Result type for Legendre approximation
pub type Result<T> = std::result::Result<T, Error>;
