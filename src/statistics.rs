//! Domain mapping, basis-size selection and fit diagnostics
//!
//! # Domain Mapping
//! - [`DomainNormalizer`]: affine map between the sample domain `[x_min, x_max]` and the
//!   Legendre orthogonality interval `[-1, 1]`.
//! - [`to_unit_interval`]: one-shot version of the same map, for callers without a normalizer.
//!
//! # Basis Size
//! - [`BasisSize`]: how many Legendre terms to fit for a given number of points.
//!
//! # Model Fit Diagnostics
//! - [`r_squared`]: Proportion of variance explained by the model. Higher is better (0 to 1).
//! - [`residual_variance`]: Unbiased estimate of variance of errors after fitting.
//! - [`root_mean_squared_error`]: Error in the same units as the observed values. Lower is better.
//! - [`max_abs_residual`]: Worst absolute error over the data. Lower is better.
//!
//! # Examples
//!
//! ```rust
//! use legfit::statistics::{r_squared, DomainNormalizer};
//!
//! let norm = DomainNormalizer::new(0.0, 10.0).unwrap();
//! assert_eq!(norm.normalize(0.0), -1.0);
//! assert_eq!(norm.normalize(10.0), 1.0);
//!
//! let y = vec![1.0, 2.0, 3.0];
//! let y_fit = vec![1.1, 1.9, 3.05];
//! let r2 = r_squared(y.iter().copied(), y_fit.iter().copied());
//! println!("R² = {r2}");
//! ```
use crate::error::{Error, Result};

/// Maps `x` from `[x_min, x_max]` onto `[-1, 1]`.
///
/// ```math
/// u = 2 (x - x_min) / (x_max - x_min) - 1
/// ```
///
/// Values outside the domain map outside `[-1, 1]`; they are not clamped.
///
/// # Errors
/// Returns [`Error::DegenerateDomain`] if `x_max <= x_min`, or either bound is not finite.
pub fn to_unit_interval(x: f64, x_min: f64, x_max: f64) -> Result<f64> {
    Ok(DomainNormalizer::new(x_min, x_max)?.normalize(x))
}

/// Affine map between a sample domain `[x_min, x_max]` and `[-1, 1]`.
///
/// Construction validates the domain, so [`DomainNormalizer::normalize`] never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainNormalizer {
    src_range: (f64, f64),
    scale: f64,
}
impl DomainNormalizer {
    /// Creates a normalizer for the domain `[x_min, x_max]`.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateDomain`] if `x_max <= x_min`, or either bound is not finite.
    pub fn new(x_min: f64, x_max: f64) -> Result<Self> {
        let width = x_max - x_min;
        if !x_min.is_finite() || !x_max.is_finite() || !(width > 0.0) || !width.is_finite() {
            return Err(Error::DegenerateDomain { x_min, x_max });
        }

        Ok(Self {
            src_range: (x_min, x_max),
            scale: 2.0 / width,
        })
    }

    /// Creates a normalizer spanning the smallest and largest value in `data`.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateDomain`] if `data` is empty or all values are equal.
    pub fn from_data(data: impl Iterator<Item = f64>) -> Result<Self> {
        let (min, max) = data.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        Self::new(min, max)
    }

    /// The identity map, for models whose domain is already `[-1, 1]`.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            src_range: (-1.0, 1.0),
            scale: 1.0,
        }
    }

    /// Returns the source domain `(x_min, x_max)`.
    #[must_use]
    pub fn src_range(&self) -> (f64, f64) {
        self.src_range
    }

    /// Maps a value from the source domain into `[-1, 1]`.
    ///
    /// The endpoints map exactly: `x_min -> -1` and `x_max -> 1`.
    #[must_use]
    pub fn normalize(&self, x: f64) -> f64 {
        let (x_min, x_max) = self.src_range;
        if x == x_max {
            return 1.0;
        }

        (x - x_min) * self.scale - 1.0
    }

    /// Maps a value from `[-1, 1]` back into the source domain.
    #[must_use]
    pub fn denormalize(&self, u: f64) -> f64 {
        let (x_min, _) = self.src_range;
        x_min + (u + 1.0) / self.scale
    }

    /// True if `x` lies inside the source domain.
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        let (x_min, x_max) = self.src_range;
        (x_min..=x_max).contains(&x)
    }
}
impl Default for DomainNormalizer {
    fn default() -> Self {
        Self::identity()
    }
}
impl std::fmt::Display for DomainNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (src_min, src_max) = self.src_range;
        write!(f, "T[ {src_min}..{src_max} -> -1..1 ]")
    }
}

/// Upper limit on the number of terms [`BasisSize::Stable`] will pick.
pub const MAX_STABLE_BASE: usize = 10;

/// Policy for choosing the basis size (number of Legendre terms) from the number of points.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// The normal matrix of `k` terms over `n` points is singular when `k > n`. With `k == n` the
/// fit interpolates every point; with `k < n` it smooths.
/// ```math
/// Stable:    k = clamp(min(n - 1, MAX_STABLE_BASE), 1, ..)
/// Custom(c): k = clamp(min(c, n), 1, ..)
/// ```
/// </div>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BasisSize {
    /// Largest basis that leaves at least one residual degree of freedom, capped at [`MAX_STABLE_BASE`].
    #[default]
    Stable,

    /// User-specified number of terms. Clamped to the number of points.
    Custom(usize),
}
impl From<usize> for BasisSize {
    fn from(value: usize) -> Self {
        BasisSize::Custom(value)
    }
}
impl BasisSize {
    /// Computes the number of terms to use for `n` points.
    #[must_use]
    pub fn terms(self, n: usize) -> usize {
        let k = match self {
            BasisSize::Stable => n.saturating_sub(1).min(MAX_STABLE_BASE),
            BasisSize::Custom(k) => k.min(n),
        };
        k.max(1)
    }
}

/// Computes the residual variance of a model's predictions.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// σ² = Σ (y_i - y_fit_i)² / (n - k)
/// ```
/// </div>
///
/// Returns zero when there are no residual degrees of freedom (`n <= k`).
///
/// # Example
/// ```rust
/// # use legfit::statistics::residual_variance;
/// let y = vec![1.0, 2.0, 3.0];
/// let y_fit = vec![0.9, 2.1, 2.95];
/// let variance = residual_variance(y.into_iter(), y_fit.into_iter(), 2);
/// ```
pub fn residual_variance(
    y: impl Iterator<Item = f64>,
    y_fit: impl Iterator<Item = f64>,
    k: usize,
) -> f64 {
    let mut ss_res = 0.0;
    let mut n = 0usize;
    for (y, y_fit) in y.zip(y_fit) {
        ss_res += (y - y_fit).powi(2);
        n += 1;
    }

    if n <= k {
        return 0.0;
    }
    ss_res / (n - k) as f64
}

/// Calculate the R-squared value for a set of data.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// R² = 1 - (SS_res / SS_tot)
/// ```
/// </div>
///
/// Constant data that is reproduced exactly scores 1; otherwise constant data scores 0.
///
/// # Example
/// ```rust
/// # use legfit::statistics::r_squared;
/// let y = vec![1.0, 2.0, 3.0];
/// let y_fit = vec![1.1, 1.9, 3.05];
/// let r2 = r_squared(y.into_iter(), y_fit.into_iter());
/// assert!(r2 > 0.98);
/// ```
pub fn r_squared(y: impl Iterator<Item = f64>, y_fit: impl Iterator<Item = f64>) -> f64 {
    let pairs: Vec<(f64, f64)> = y.zip(y_fit).collect();
    if pairs.is_empty() {
        return 0.0;
    }

    let y_mean = mean(pairs.iter().map(|(y, _)| *y));
    let (ss_res, ss_tot) = pairs.iter().fold((0.0, 0.0), |(res, tot), (y, y_fit)| {
        (res + (y - y_fit).powi(2), tot + (y - y_mean).powi(2))
    });

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Computes the arithmetic mean, or zero for an empty iterator.
pub fn mean(data: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = data.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Computes the root mean squared error (RMSE) between two sets of values.
///
/// # Example
/// ```
/// # use legfit::statistics::root_mean_squared_error;
/// let y = vec![1.0, 2.0, 3.0];
/// let y_fit = vec![1.0, 2.0, 5.0];
/// let rmse = root_mean_squared_error(y.into_iter(), y_fit.into_iter());
/// assert!((rmse - (4.0f64 / 3.0).sqrt()).abs() < 1e-12);
/// ```
pub fn root_mean_squared_error(
    y: impl Iterator<Item = f64>,
    y_fit: impl Iterator<Item = f64>,
) -> f64 {
    mean(y.zip(y_fit).map(|(y, y_fit)| (y - y_fit).powi(2))).sqrt()
}

/// Largest absolute difference between observed and predicted values.
pub fn max_abs_residual(y: impl Iterator<Item = f64>, y_fit: impl Iterator<Item = f64>) -> f64 {
    y.zip(y_fit)
        .map(|(y, y_fit)| (y - y_fit).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::assert_close;

    #[test]
    fn normalizer_maps_endpoints_exactly() {
        let norm = DomainNormalizer::new(0.1, 0.7).unwrap();
        assert_eq!(norm.normalize(0.1), -1.0);
        assert_eq!(norm.normalize(0.7), 1.0);
        assert_close!(norm.normalize(0.4), 0.0, tol = 1e-12);
        assert_close!(norm.denormalize(norm.normalize(0.25)), 0.25, tol = 1e-12);
    }

    #[test]
    fn normalizer_extrapolates_without_clamping() {
        let norm = DomainNormalizer::new(0.0, 2.0).unwrap();
        assert_eq!(norm.normalize(4.0), 3.0);
        assert_eq!(norm.normalize(-2.0), -3.0);
        assert!(!norm.contains(4.0));
        assert!(norm.contains(1.0));
    }

    #[test]
    fn degenerate_domains_are_rejected() {
        assert!(matches!(
            DomainNormalizer::new(1.0, 1.0),
            Err(Error::DegenerateDomain { .. })
        ));
        assert!(DomainNormalizer::new(2.0, 1.0).is_err());
        assert!(DomainNormalizer::new(0.0, f64::INFINITY).is_err());
        assert!(DomainNormalizer::new(f64::NAN, 1.0).is_err());
        assert!(DomainNormalizer::from_data([3.0, 3.0, 3.0].into_iter()).is_err());
        assert!(DomainNormalizer::from_data(std::iter::empty()).is_err());
        assert!(to_unit_interval(5.0, 2.0, 2.0).is_err());
    }

    #[test]
    fn from_data_uses_min_and_max() {
        let norm = DomainNormalizer::from_data([3.0, -1.0, 7.0].into_iter()).unwrap();
        assert_eq!(norm.src_range(), (-1.0, 7.0));
        assert_eq!(to_unit_interval(3.0, -1.0, 7.0).unwrap(), 0.0);
    }

    #[test]
    fn identity_is_a_no_op() {
        let norm = DomainNormalizer::identity();
        for x in [-1.0, -0.3, 0.0, 0.5, 1.0] {
            assert_close!(norm.normalize(x), x, tol = 1e-15);
        }
    }

    #[test]
    fn basis_size_policy() {
        assert_eq!(BasisSize::Stable.terms(4), 3);
        assert_eq!(BasisSize::Stable.terms(1000), MAX_STABLE_BASE);
        assert_eq!(BasisSize::Stable.terms(1), 1);
        assert_eq!(BasisSize::Stable.terms(0), 1);
        assert_eq!(BasisSize::Custom(4).terms(4), 4);
        assert_eq!(BasisSize::Custom(9).terms(4), 4);
        assert_eq!(BasisSize::Custom(0).terms(4), 1);
        assert_eq!(BasisSize::from(3), BasisSize::Custom(3));
    }

    #[test]
    fn residual_variance_simple_case() {
        // errors: [1, 2], squared = [1, 4], sum = 5, n - k = 1
        let var = residual_variance([1.0, 2.0].into_iter(), [0.0, 0.0].into_iter(), 1);
        assert_eq!(var, 5.0);
    }

    #[test]
    fn residual_variance_invalid_degrees_of_freedom() {
        let var = residual_variance([1.0, 2.0].into_iter(), [1.5, 2.0].into_iter(), 2);
        assert_eq!(var, 0.0);
    }

    #[test]
    fn r_squared_perfect_and_bad_fit() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(r_squared(y.into_iter(), y.into_iter()), 1.0);
        assert_eq!(r_squared(y.into_iter(), [2.0, 2.0, 2.0].into_iter()), 0.0);
        assert_eq!(r_squared([4.0, 4.0].into_iter(), [4.0, 4.0].into_iter()), 1.0);
    }

    #[test]
    fn error_metrics() {
        let y = [1.0, -2.0, 3.0];
        let y_fit = [1.0, 2.0, 3.5];
        assert_eq!(max_abs_residual(y.into_iter(), y_fit.into_iter()), 4.0);
        assert_close!(
            root_mean_squared_error(y.into_iter(), y_fit.into_iter()),
            (16.25f64 / 3.0).sqrt(),
            tol = 1e-12
        );
        assert_eq!(mean(std::iter::empty()), 0.0);
    }
}
