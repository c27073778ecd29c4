//! # Legfit
//! ## Least squares in the Legendre basis
//!
//! Fits a set of 2D sample points with a polynomial written in the Legendre basis, keeps the
//! coefficients around in a small text (or JSON) file, and evaluates or tabulates the result.
//!
//! Legendre polynomials are orthogonal on `[-1, 1]`, which keeps the least-squares system far
//! better conditioned than the same fit in plain powers of `x`. The price is a domain mapping:
//! every model remembers the `x` range it was fitted on and maps inputs into `[-1, 1]` first.
//!
//! ```rust
//! # use legfit::{CurveFit, assert_y};
//! let data = [(0.0, 0.0), (1.0, 1.0), (2.0, 4.0), (3.0, 9.0)];
//!
//! let fit = CurveFit::new(&data[..], 4).unwrap();
//! assert_y!(fit, 1.5, 2.25, tol = 1e-9);
//!
//! // The fitted model outlives the data
//! let model = fit.into_polynomial();
//! let table = model.tabulate(0.0, 3.0, 4).unwrap();
//! assert_eq!(table.len(), 4);
//! ```
//!
//! # Core Concepts
//! - A [`Polynomial`] is the coefficient model: `base` weights for `P₀ … P_{base-1}` plus the
//!   domain `(x_min, x_max)` they were fitted over.
//!     - It is immutable once built, and evaluation is pure, so it can be shared across threads.
//!     - Evaluating outside the domain is allowed, but accuracy degrades quickly.
//! - A [`CurveFit`] solves the normal equations for a point set, and reports how well it did.
//!     - At least [`MIN_POINTS`] points are needed.
//!     - The number of terms is either explicit ([`CurveFit::new`]) or picked by a
//!       [`statistics::BasisSize`] policy ([`CurveFit::with_size`]).
//!     - Singular or badly conditioned systems are an error, never a silent NaN.
//! - [`basis::LegendreBasis`] evaluates the basis functions by their three-term recurrence.
//! - [`statistics::DomainNormalizer`] is the affine map between the data domain and `[-1, 1]`.
//! - [`codec`] reads and writes points, coefficients and tables.
//!
//! # The `legfit` binary
//! `legfit -p points.txt -s coefs.txt -g table.dat` fits the points, writes the coefficients and
//! a 100 line table. Drop `-p` to load `coefs.txt` instead of fitting. See [`opts::Opts`] for
//! the full set of options, and [`app::run`] for the pipeline behind them.
//!
//! # Testing utilities
//!
//! Float assertions used throughout the crate's tests are exported; see [`test`].
//!
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::needless_range_loop)] // The worst clippy lint
#![allow(clippy::cast_precision_loss)] // I don't care about this one
#![allow(clippy::similar_names)] //       Clippy does not get to decide what names are similar


pub mod app;
pub mod basis;
pub mod codec;
pub mod error;
pub mod opts;
pub mod statistics;
pub mod value;

mod fit;
mod polynomial;

pub use fit::*;
pub use polynomial::Polynomial;

pub use nalgebra;
