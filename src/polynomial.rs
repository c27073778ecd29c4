use serde::{Deserialize, Serialize};

use crate::{
    basis::LegendreBasis,
    error::{Error, Result},
    value::LinearSpace,
};

/// A Legendre series: the coefficient model produced by a fit or loaded from disk.
///
/// Unlike [`crate::CurveFit`], this struct is **not tied to any dataset**. It holds the ordered
/// coefficients, where `coefficients[k]` weighs `Pₖ`, and the domain `[x_min, x_max]` used to map
/// x-values onto `[-1, 1]` before evaluating the basis.
///
/// A `Polynomial` always has at least one coefficient, finite coefficients and a non-degenerate
/// domain; every constructor checks this. Once built it is immutable, so it can be shared freely
/// between threads and evaluated concurrently.
///
/// # Example
/// ```
/// # use legfit::Polynomial;
/// // 1 + 2·P₁(u) over the domain [0, 10]
/// let poly = Polynomial::new((0.0, 10.0), vec![1.0, 2.0]).unwrap();
/// assert_eq!(poly.base(), 2);
/// assert_eq!(poly.y(10.0), 3.0); // u = 1
/// assert_eq!(poly.y(0.0), -1.0); // u = -1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolynomialRecord", into = "PolynomialRecord")]
pub struct Polynomial {
    basis: LegendreBasis,
    coefficients: Vec<f64>,
}
impl Polynomial {
    /// Creates a new series over the domain `(x_min, x_max)`.
    ///
    /// # Errors
    /// - [`Error::InvalidBase`] if `coefficients` is empty.
    /// - [`Error::NonFinite`] if any coefficient is NaN or infinite.
    /// - [`Error::DegenerateDomain`] if `x_max <= x_min`.
    pub fn new(domain: (f64, f64), coefficients: Vec<f64>) -> Result<Self> {
        let basis = LegendreBasis::new(domain.0, domain.1)?;
        Self::from_basis(basis, coefficients)
    }

    /// Creates a new series over the canonical domain `[-1, 1]`.
    ///
    /// # Errors
    /// See [`Polynomial::new`].
    pub fn canonical(coefficients: Vec<f64>) -> Result<Self> {
        Self::from_basis(LegendreBasis::default(), coefficients)
    }

    /// Creates a new series from a basis and coefficients.
    ///
    /// # Errors
    /// - [`Error::InvalidBase`] if `coefficients` is empty.
    /// - [`Error::NonFinite`] if any coefficient is NaN or infinite.
    pub fn from_basis(basis: LegendreBasis, coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(Error::InvalidBase(0));
        }

        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::NonFinite("coefficients"));
        }

        Ok(Self {
            basis,
            coefficients,
        })
    }

    /// Decomposes the series into its basis and coefficients.
    #[must_use]
    pub fn into_inner(self) -> (LegendreBasis, Vec<f64>) {
        (self.basis, self.coefficients)
    }

    /// Returns a reference to the series' basis.
    #[must_use]
    pub fn basis(&self) -> &LegendreBasis {
        &self.basis
    }

    /// Returns the domain `(x_min, x_max)` evaluation points are mapped from.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.basis.domain()
    }

    /// Returns the coefficients; index `k` is the weight of `Pₖ`.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Returns the number of basis terms. Always at least 1.
    #[must_use]
    pub fn base(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns the degree of the highest basis polynomial, `base - 1`.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Evaluates the series at a given x-value.
    ///
    /// <div class="warning">
    ///
    /// **Technical Details**
    ///
    /// ```math
    /// u = 2 (x - x_min) / (x_max - x_min) - 1
    /// y(x) = Σ cₖ Pₖ(u)
    /// ```
    /// </div>
    ///
    /// x-values outside the domain are extrapolated (`|u| > 1`); accuracy degrades the further
    /// out they are, but this is not an error.
    #[must_use]
    pub fn y(&self, x: f64) -> f64 {
        let u = self.basis.normalize_x(x);
        self.coefficients
            .iter()
            .zip(self.basis.values(u))
            .map(|(c, p)| c * p)
            .sum()
    }

    /// Evaluates the series at multiple x-values.
    ///
    /// # Returns
    /// A `Vec` of `(x, y)` pairs corresponding to each input value.
    pub fn solve(&self, x: impl IntoIterator<Item = f64>) -> Vec<(f64, f64)> {
        x.into_iter().map(|x| (x, self.y(x))).collect()
    }

    /// Evaluates the series at `n` evenly spaced points from `from` to `to`, inclusive.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameters`] if `n <= 1` or either bound is not finite.
    ///
    /// # Example
    /// ```
    /// # use legfit::Polynomial;
    /// let poly = Polynomial::new((0.0, 3.0), vec![1.0]).unwrap();
    /// let table = poly.tabulate(0.0, 3.0, 4).unwrap();
    /// assert_eq!(table, vec![(0.0, 1.0), (1.0, 1.0), (2.0, 1.0), (3.0, 1.0)]);
    /// ```
    pub fn tabulate(&self, from: f64, to: f64, n: usize) -> Result<Vec<(f64, f64)>> {
        if n <= 1 {
            return Err(Error::InvalidParameters(format!(
                "number of table points must be > 1, got {n}"
            )));
        }

        if !from.is_finite() || !to.is_finite() {
            return Err(Error::InvalidParameters(format!(
                "table range {from}..{to} is not finite"
            )));
        }

        Ok(self.solve(LinearSpace::new(from, to, n)))
    }
}
impl AsRef<Polynomial> for Polynomial {
    fn as_ref(&self) -> &Polynomial {
        self
    }
}
impl std::fmt::Display for Polynomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "y(x) = ")?;
        for (k, c) in self.coefficients.iter().enumerate() {
            let sign = if c.is_sign_negative() { "-" } else { "+" };
            match k {
                0 => write!(f, "{c}")?,
                _ => write!(f, " {sign} {}·P{}(xₛ)", c.abs(), subscript(k))?,
            }
        }

        let (x_min, x_max) = self.domain();
        write!(f, ", xₛ = T[ {x_min}..{x_max} -> -1..1 ]")
    }
}

fn subscript(n: usize) -> String {
    const DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| DIGITS[d as usize]))
        .collect()
}

/// Serialized form of a [`Polynomial`]; validated on the way back in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PolynomialRecord {
    domain: (f64, f64),
    coefficients: Vec<f64>,
}
impl TryFrom<PolynomialRecord> for Polynomial {
    type Error = Error;

    fn try_from(record: PolynomialRecord) -> Result<Self> {
        Polynomial::new(record.domain, record.coefficients)
    }
}
impl From<Polynomial> for PolynomialRecord {
    fn from(poly: Polynomial) -> Self {
        let domain = poly.domain();
        Self {
            domain,
            coefficients: poly.coefficients,
        }
    }
}
