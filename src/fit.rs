use std::borrow::Cow;

use nalgebra::{DMatrix, DVector};

use crate::{
    basis::LegendreBasis,
    error::{Error, Result},
    statistics::{self, BasisSize},
    value::CoordExt,
    Polynomial,
};

/// Smallest point set a fit will accept.
///
/// Four points are enough to pin down a cubic, the smallest basis this tool is meant for.
pub const MIN_POINTS: usize = 4;

/// A least-squares fit of a point set in the Legendre basis.
///
/// `CurveFit` finds the coefficients `c` minimizing
/// ```math
/// Σᵢ (yᵢ - Σₖ cₖ Pₖ(uᵢ))²,   uᵢ = 2 (xᵢ - x_min) / (x_max - x_min) - 1
/// ```
/// and stores both the original data and the resulting [`Polynomial`].
///
/// # How it works
/// - The domain `[x_min, x_max]` is the smallest and largest x in the data, so input does not
///   need to be sorted.
/// - Builds a **basis matrix** `P` with shape `[n, k]`, one row of `P₀(u) … Pₖ₋₁(u)` per point.
/// - Forms the normal equations `(PᵀP) c = Pᵀy`.
/// - Solves them with a Cholesky decomposition. A matrix that is not positive definite, or
///   whose conditioning is too poor to trust, is reported as [`Error::SingularMatrix`] rather
///   than producing garbage coefficients.
///
/// # Example
/// ```
/// # use legfit::CurveFit;
/// let data = [(0.0, 0.0), (1.0, 1.0), (2.0, 4.0), (3.0, 9.0)];
/// let fit = CurveFit::new(&data[..], 4).unwrap();
/// assert!((fit.y(1.5) - 2.25).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFit<'data> {
    data: Cow<'data, [(f64, f64)]>,
    function: Polynomial,
}
impl<'data> CurveFit<'data> {
    /// Turns a dataset into a basis matrix and y-values vector.
    fn create_matrix(
        data: &[(f64, f64)],
        basis: &LegendreBasis,
        k: usize,
    ) -> (DMatrix<f64>, DVector<f64>) {
        let mut bigx = DMatrix::zeros(data.len(), k);
        let b = DVector::from_iterator(data.len(), data.y_iter());

        let mut row = vec![0.0; k];
        for (i, (x, _)) in data.iter().enumerate() {
            let u = basis.normalize_x(*x);
            basis.fill_row(u, &mut row);
            for (j, p) in row.iter().enumerate() {
                bigx[(i, j)] = *p;
            }
        }

        (bigx, b)
    }

    /// Reduce the n by k / n by 1 system into a k by k and k by 1 system.
    fn normal_equations(matrix: &DMatrix<f64>, b: &DVector<f64>) -> (DMatrix<f64>, DVector<f64>) {
        let xtx = matrix.tr_mul(matrix);
        let xtb = matrix.tr_mul(b);
        (xtx, xtb)
    }

    /// Solves the normal equations using a Cholesky decomposition.
    fn solve_matrix(xtx: DMatrix<f64>, xtb: &DVector<f64>, n: usize) -> Result<Vec<f64>> {
        let k = xtx.nrows();
        let singular = Error::SingularMatrix { n, k };

        let Some(decomp) = xtx.cholesky() else {
            return Err(singular);
        };

        // cond(PᵀP) is bounded below by (max Lᵢᵢ / min Lᵢᵢ)²
        let diagonal = decomp.l_dirty().diagonal();
        let (d_min, d_max) = diagonal
            .iter()
            .fold((f64::INFINITY, 0.0f64), |(lo, hi), d| (lo.min(*d), hi.max(*d)));
        let inverse_condition = (d_min / d_max).powi(2);
        if !(inverse_condition > f64::EPSILON * k as f64) {
            log::debug!("normal matrix rejected, 1/cond estimate = {inverse_condition:e}");
            return Err(singular);
        }

        let coefficients: Vec<f64> = decomp.solve(xtb).iter().copied().collect();

        // Make sure the coefficients are valid
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::NonFinite("coefficients"));
        }

        Ok(coefficients)
    }

    /// Creates a new fit of the given data with exactly `base` Legendre terms (`P₀ … P_{base-1}`).
    ///
    /// # Parameters
    /// - `data`: Slice of `(x, y)` points to fit.
    /// - `base`: Number of basis terms. `base == data.len()` interpolates the points.
    ///
    /// # Errors
    /// Returns an [`Error`] in the following cases:
    /// - `Error::TooFewPoints`: fewer than [`MIN_POINTS`] points.
    /// - `Error::InvalidBase`: `base` is zero or larger than the number of points.
    /// - `Error::NonFinite`: a coordinate is NaN or infinite.
    /// - `Error::DegenerateDomain`: every point has the same x.
    /// - `Error::SingularMatrix`: the normal equations could not be solved reliably.
    pub fn new(data: impl Into<Cow<'data, [(f64, f64)]>>, base: usize) -> Result<Self> {
        let data: Cow<_> = data.into();
        let n = data.len();

        if n < MIN_POINTS {
            return Err(Error::TooFewPoints {
                got: n,
                min: MIN_POINTS,
            });
        } else if base == 0 || base > n {
            return Err(Error::InvalidBase(base));
        }

        if data.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(Error::NonFinite("points"));
        }

        let basis = LegendreBasis::from_data(&data)?;
        log::debug!("fitting {n} points with {base} Legendre terms over {}", basis.normalizer);

        let (m, b) = Self::create_matrix(&data, &basis, base);
        let (xtx, xtb) = Self::normal_equations(&m, &b);
        let coefs = Self::solve_matrix(xtx, &xtb, n)?;

        let function = Polynomial::from_basis(basis, coefs)?;
        Ok(Self { data, function })
    }

    /// Creates a new fit, choosing the number of terms with a [`BasisSize`] policy.
    ///
    /// # Errors
    /// See [`CurveFit::new`].
    ///
    /// # Example
    /// ```
    /// # use legfit::{CurveFit, statistics::BasisSize};
    /// let data: Vec<_> = (0..20).map(|i| (i as f64, (i as f64).sin())).collect();
    /// let fit = CurveFit::with_size(&data[..], BasisSize::Stable).unwrap();
    /// assert_eq!(fit.base(), 10);
    /// ```
    pub fn with_size(
        data: impl Into<Cow<'data, [(f64, f64)]>>,
        size: impl Into<BasisSize>,
    ) -> Result<Self> {
        let data: Cow<_> = data.into();
        let size = size.into();
        let base = size.terms(data.len());
        if let BasisSize::Custom(requested) = size {
            if requested != base {
                log::warn!("basis size {requested} clamped to {base} for {} points", data.len());
            }
        }

        Self::new(data, base)
    }

    /// Returns an owned version of this curve fit, with a full copy of the data.
    #[must_use]
    pub fn to_owned(&self) -> CurveFit<'static> {
        CurveFit {
            data: Cow::Owned(self.data.to_vec()),
            function: self.function.clone(),
        }
    }

    /// Returns the data points the fit was computed from.
    #[must_use]
    pub fn data(&self) -> &[(f64, f64)] {
        &self.data
    }

    /// Returns the fitted series.
    #[must_use]
    pub fn as_polynomial(&self) -> &Polynomial {
        &self.function
    }

    /// Consumes the fit, returning the fitted series.
    #[must_use]
    pub fn into_polynomial(self) -> Polynomial {
        self.function
    }

    /// Returns the number of basis terms.
    #[must_use]
    pub fn base(&self) -> usize {
        self.function.base()
    }

    /// Returns the fitted coefficients.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        self.function.coefficients()
    }

    /// Evaluates the fit at `x`. See [`Polynomial::y`].
    #[must_use]
    pub fn y(&self, x: f64) -> f64 {
        self.function.y(x)
    }

    /// Returns the fitted y for every x in the data.
    #[must_use]
    pub fn fitted(&self) -> Vec<f64> {
        self.data.x_iter().map(|x| self.function.y(x)).collect()
    }

    /// Returns `(x, y - y_fit)` for every point in the data.
    #[must_use]
    pub fn residuals(&self) -> Vec<(f64, f64)> {
        self.data
            .iter()
            .map(|&(x, y)| (x, y - self.function.y(x)))
            .collect()
    }

    /// Proportion of the data's variance explained by the fit. See [`statistics::r_squared`].
    #[must_use]
    pub fn r_squared(&self) -> f64 {
        statistics::r_squared(self.data.y_iter(), self.fitted().into_iter())
    }

    /// Root mean squared error over the data. See [`statistics::root_mean_squared_error`].
    #[must_use]
    pub fn rmse(&self) -> f64 {
        statistics::root_mean_squared_error(self.data.y_iter(), self.fitted().into_iter())
    }

    /// Largest absolute residual. See [`statistics::max_abs_residual`].
    #[must_use]
    pub fn max_abs_residual(&self) -> f64 {
        statistics::max_abs_residual(self.data.y_iter(), self.fitted().into_iter())
    }

    /// Unbiased residual variance. See [`statistics::residual_variance`].
    #[must_use]
    pub fn residual_variance(&self) -> f64 {
        statistics::residual_variance(self.data.y_iter(), self.fitted().into_iter(), self.base())
    }
}
impl AsRef<Polynomial> for CurveFit<'_> {
    fn as_ref(&self) -> &Polynomial {
        &self.function
    }
}
impl std::fmt::Display for CurveFit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.function)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{assert_all_close, assert_close, assert_y, value::LinearSpace};

    fn parabola() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (1.0, 1.0), (2.0, 4.0), (3.0, 9.0)]
    }

    #[test]
    fn parabola_is_reconstructed() {
        let data = parabola();
        let fit = CurveFit::new(&data[..], 4).unwrap();
        assert_eq!(fit.base(), 4);
        assert_eq!(fit.as_polynomial().domain(), (0.0, 3.0));
        assert_y!(fit, 1.5, 2.25, tol = 1e-9);

        // x² over [0, 3] has no cubic component
        assert_close!(fit.coefficients()[3], 0.0, tol = 1e-9);

        let table = fit.as_polynomial().tabulate(0.0, 3.0, 4).unwrap();
        let xs: Vec<f64> = table.iter().map(|(x, _)| *x).collect();
        let ys: Vec<f64> = table.iter().map(|(_, y)| *y).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
        assert_all_close!(ys, [0.0, 1.0, 4.0, 9.0], tol = 1e-9);
    }

    #[test]
    fn interpolates_when_base_equals_point_count() {
        let data = vec![
            (-2.0, 3.1),
            (-0.5, -1.0),
            (0.7, 0.4),
            (1.1, 2.2),
            (2.9, -0.3),
            (4.0, 1.7),
        ];
        let fit = CurveFit::new(&data[..], data.len()).unwrap();
        for &(x, y) in &data {
            assert_y!(fit, x, y, tol = 1e-8, "interpolation at {x}");
        }
        assert_close!(fit.max_abs_residual(), 0.0, tol = 1e-8);

        let residuals = fit.residuals();
        assert_eq!(residuals.len(), data.len());
        for (&(rx, r), &(x, _)) in residuals.iter().zip(&data) {
            assert_eq!(rx, x);
            assert_close!(r, 0.0, tol = 1e-8, "residual at {x}");
        }
    }

    #[test]
    fn unsorted_points_give_the_same_fit() {
        let sorted = parabola();
        let shuffled = vec![(2.0, 4.0), (0.0, 0.0), (3.0, 9.0), (1.0, 1.0)];
        let a = CurveFit::new(&sorted[..], 3).unwrap();
        let b = CurveFit::new(&shuffled[..], 3).unwrap();
        assert_eq!(a.as_polynomial().domain(), b.as_polynomial().domain());
        assert_all_close!(a.coefficients(), b.coefficients(), tol = 1e-12);
    }

    #[test]
    fn smoothing_fit_recovers_line() {
        // y = 3x - 2 plus an alternating wobble that a line cannot follow
        let data: Vec<_> = LinearSpace::new(0.0, 10.0, 51)
            .enumerate()
            .map(|(i, x)| (x, 3.0 * x - 2.0 + if i % 2 == 0 { 0.01 } else { -0.01 }))
            .collect();
        let fit = CurveFit::new(&data[..], 2).unwrap();

        // c0 = mean over domain = 3 * 5 - 2, c1 = half the rise = 15
        assert_close!(fit.coefficients()[0], 13.0, tol = 1e-3);
        assert_close!(fit.coefficients()[1], 15.0, tol = 1e-3);
        assert!(fit.r_squared() > 0.999);
        assert!(fit.rmse() < 0.02);
        assert!(fit.residual_variance() > 0.0);
    }

    #[test]
    fn with_size_policies() {
        let data: Vec<_> = LinearSpace::new(-1.0, 1.0, 30).map(|x| (x, x.exp())).collect();

        let stable = CurveFit::with_size(&data[..], BasisSize::Stable).unwrap();
        assert_eq!(stable.base(), crate::statistics::MAX_STABLE_BASE);
        assert!(stable.max_abs_residual() < 1e-7);

        let custom = CurveFit::with_size(&data[..], 3).unwrap();
        assert_eq!(custom.base(), 3);

        let small = parabola();
        let clamped = CurveFit::with_size(&small[..], 12).unwrap();
        assert_eq!(clamped.base(), 4);
    }

    #[test]
    fn too_few_points() {
        let data = vec![(0.0, 1.0), (1.0, 2.0), (2.0, 0.0)];
        assert!(matches!(
            CurveFit::new(&data[..], 2),
            Err(Error::TooFewPoints { got: 3, min: 4 })
        ));
        assert!(matches!(
            CurveFit::new(Vec::<(f64, f64)>::new(), 1),
            Err(Error::TooFewPoints { got: 0, .. })
        ));
    }

    #[test]
    fn degenerate_domain() {
        let data = vec![(2.0, 1.0), (2.0, 2.0), (2.0, 3.0), (2.0, 4.0)];
        assert!(matches!(
            CurveFit::new(&data[..], 2),
            Err(Error::DegenerateDomain { .. })
        ));
    }

    #[test]
    fn invalid_base() {
        let data = parabola();
        assert!(matches!(CurveFit::new(&data[..], 0), Err(Error::InvalidBase(0))));
        assert!(matches!(CurveFit::new(&data[..], 5), Err(Error::InvalidBase(5))));
    }

    #[test]
    fn repeated_x_is_singular() {
        // Only two distinct x-values cannot support three terms
        let data = vec![(0.0, 1.0), (0.0, 1.5), (1.0, 2.0), (1.0, 2.5)];
        assert!(matches!(
            CurveFit::new(&data[..], 3),
            Err(Error::SingularMatrix { n: 4, k: 3 })
        ));

        // ... but a line through the pair means is fine
        let line = CurveFit::new(&data[..], 2).unwrap();
        assert_y!(line, 0.0, 1.25, tol = 1e-12);
        assert_y!(line, 1.0, 2.25, tol = 1e-12);
    }

    #[test]
    fn non_finite_points() {
        let data = vec![(0.0, 1.0), (1.0, f64::NAN), (2.0, 0.0), (3.0, 1.0)];
        assert!(matches!(
            CurveFit::new(&data[..], 2),
            Err(Error::NonFinite("points"))
        ));
    }

    #[test]
    fn owned_fit_outlives_data() {
        let fit = {
            let data = parabola();
            CurveFit::new(&data[..], 3).unwrap().to_owned()
        };
        assert_eq!(fit.data().len(), 4);
        assert!(fit.to_string().starts_with("y(x) = "));
        assert_eq!(fit.into_polynomial().base(), 3);
    }
}
