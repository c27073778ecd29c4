//! Legendre polynomial basis
//!
//! This module provides [`LegendreBasis`], the basis every fit and model in this crate is
//! expressed in. It bundles the [`DomainNormalizer`] that maps sample x-values onto the
//! Legendre orthogonality interval `[-1, 1]` with the routines that evaluate the basis
//! functions there.
//!
//! # Evaluation
//! - [`legendre`]: a single `Pₙ(u)`.
//! - [`LegendreBasis::fill_row`]: `P₀(u) … Pₖ₋₁(u)` in one pass of the three-term recurrence.
//!   This is what the fitter and evaluator use in their inner loops.
//!
//! # Orthogonality
//! - [`LegendreBasis::gauss_nodes`]: Gauss–Legendre quadrature nodes and weights.
//! - [`LegendreBasis::gauss_normalization`]: `∫ Pₙ² du = 2 / (2n + 1)`.
//! - [`LegendreBasis::gauss_matrix`]: the Gram matrix of the first few functions; identity
//!   up to normalization when the recurrence is implemented correctly.
use crate::statistics::DomainNormalizer;

/// Evaluates the Legendre polynomial `Pₙ(u)` using the three-term recurrence.
///
/// ```math
/// P₀(u) = 1
/// P₁(u) = u
/// Pₙ(u) = ((2n - 1) u Pₙ₋₁(u) - (n - 1) Pₙ₋₂(u)) / n
/// ```
///
/// `Pₙ(±1) = (±1)ⁿ` exactly.
///
/// # Example
/// ```
/// # use legfit::basis::legendre;
/// assert_eq!(legendre(2, 0.5), -0.125);
/// assert_eq!(legendre(5, -1.0), -1.0);
/// ```
#[must_use]
pub fn legendre(n: usize, u: f64) -> f64 {
    let mut p_prev = 1.0;
    if n == 0 {
        return p_prev;
    }

    let mut p_curr = u;
    for k in 2..=n {
        let p_next = recurrence_step(k, u, p_curr, p_prev);
        p_prev = p_curr;
        p_curr = p_next;
    }

    p_curr
}

#[inline]
fn recurrence_step(n: usize, u: f64, p1: f64, p2: f64) -> f64 {
    let nf = n as f64;
    ((2.0 * nf - 1.0) * u * p1 - (nf - 1.0) * p2) / nf
}

/// Normalized Legendre basis for polynomial curves.
///
/// This basis uses the Legendre polynomials, which form an
/// orthogonal family of polynomials on the interval [-1, 1].
///
/// Inputs are normalized so that the evaluation domain
/// [`x_min`, `x_max`] is mapped onto [-1, 1]. This allows Legendre
/// polynomials to be used naturally with arbitrary input ranges
/// while retaining their orthogonality properties.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegendreBasis {
    /// Normalizer to map input domain to [-1, 1]
    pub normalizer: DomainNormalizer,
}
impl LegendreBasis {
    /// Creates a new Legendre basis that normalizes inputs from the given range to [-1, 1].
    ///
    /// # Errors
    /// Returns [`crate::error::Error::DegenerateDomain`] if `x_max <= x_min`.
    pub fn new(x_min: f64, x_max: f64) -> crate::error::Result<Self> {
        let normalizer = DomainNormalizer::new(x_min, x_max)?;
        Ok(Self { normalizer })
    }

    /// Creates a basis spanning the x-range of the given points.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::DegenerateDomain`] if all x-values are equal.
    pub fn from_data(data: &[(f64, f64)]) -> crate::error::Result<Self> {
        let normalizer = DomainNormalizer::from_data(data.iter().map(|(x, _)| *x))?;
        Ok(Self { normalizer })
    }

    /// Returns the domain `(x_min, x_max)` this basis normalizes from.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.normalizer.src_range()
    }

    /// Normalizes the input value `x` into [-1, 1].
    #[must_use]
    pub fn normalize_x(&self, x: f64) -> f64 {
        self.normalizer.normalize(x)
    }

    /// Evaluates the jth basis function at an already normalized `u`.
    #[must_use]
    pub fn solve_function(&self, j: usize, u: f64) -> f64 {
        legendre(j, u)
    }

    /// Returns an iterator over `P₀(u), P₁(u), P₂(u), …`.
    ///
    /// Each item costs one recurrence step; the iterator never ends, so zip or `take` it.
    #[must_use]
    pub fn values(&self, u: f64) -> LegendreValues {
        LegendreValues {
            u,
            n: 0,
            p1: 0.0,
            p2: 0.0,
        }
    }

    /// Writes `P₀(u) … Pₖ₋₁(u)` into `row`, where `k = row.len()`.
    ///
    /// `u` must already be normalized with [`LegendreBasis::normalize_x`].
    pub fn fill_row(&self, u: f64, row: &mut [f64]) {
        let k = row.len();
        if k == 0 {
            return;
        }

        row[0] = 1.0;
        if k == 1 {
            return;
        }

        row[1] = u;
        for n in 2..k {
            row[n] = recurrence_step(n, u, row[n - 1], row[n - 2]);
        }
    }

    /// Returns the nodes and weights for `n`-point Gauss–Legendre quadrature on [-1, 1].
    ///
    /// The basis functions up to degree `n - 1` are exactly orthogonal against these nodes.
    /// Nodes are sorted ascending.
    #[must_use]
    pub fn gauss_nodes(&self, n: usize) -> Vec<(f64, f64)> {
        const TOLERANCE: f64 = 1e-14;
        const MAX_ITERATIONS: usize = 100;

        let mut nodes = Vec::with_capacity(n);
        let m = n.div_ceil(2); // roots in [0,1]
        for i in 0..m {
            // Initial guess via cosine
            let theta = std::f64::consts::PI * (i as f64 + 0.75) / (n as f64 + 0.5);
            let mut x = theta.cos();

            // Newton–Raphson
            for _ in 0..MAX_ITERATIONS {
                let (p, dp) = legendre_and_derivative(n, x);
                let dx = -p / dp;
                x += dx;
                if dx.abs() < TOLERANCE {
                    break;
                }
            }

            let (_, dp) = legendre_and_derivative(n, x);
            let w = 2.0 / ((1.0 - x * x) * dp * dp);

            // Mirror pair
            nodes.push((-x, w));
            if i != m - 1 || n % 2 == 0 {
                nodes.push((x, w));
            }
        }

        nodes.sort_by(|a, b| a.0.total_cmp(&b.0));
        nodes
    }

    /// Returns `∫₋₁¹ Pₙ(u)² du = 2 / (2n + 1)`.
    #[must_use]
    pub fn gauss_normalization(&self, n: usize) -> f64 {
        2.0 / (2.0 * n as f64 + 1.0)
    }

    /// Computes the inner product of two basis functions over weighted nodes.
    #[must_use]
    pub fn inner_product(&self, i: usize, j: usize, nodes: &[(f64, f64)]) -> f64 {
        nodes
            .iter()
            .map(|&(u, w)| self.solve_function(i, u) * self.solve_function(j, u) * w)
            .sum()
    }

    /// Constructs the Gram matrix for the first `functions` basis functions using Gauss quadrature.
    ///
    /// Should have shape (n, n), and be ~zero outside the diagonal.
    #[must_use]
    pub fn gauss_matrix(&self, functions: usize, nodes: usize) -> nalgebra::DMatrix<f64> {
        let nodes = self.gauss_nodes(nodes);
        let mut mat = nalgebra::DMatrix::<f64>::zeros(functions, functions);
        for i in 0..functions {
            for j in i..functions {
                let val = self.inner_product(i, j, &nodes);
                mat[(i, j)] = val;
                mat[(j, i)] = val;
            }
        }
        mat
    }
}

/// Unbounded iterator over the Legendre polynomials evaluated at one point.
///
/// See [`LegendreBasis::values`].
#[derive(Debug, Clone)]
pub struct LegendreValues {
    u: f64,
    n: usize,
    p1: f64,
    p2: f64,
}
impl Iterator for LegendreValues {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        let value = match self.n {
            0 => 1.0,
            1 => self.u,
            n => recurrence_step(n, self.u, self.p1, self.p2),
        };

        self.p2 = self.p1;
        self.p1 = value;
        self.n += 1;
        Some(value)
    }
}

// Evaluate P_n(x) and derivative at once
fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    for k in 2..=n {
        let p2 = recurrence_step(k, x, p1, p0);
        p0 = p1;
        p1 = p2;
    }
    let p = if n == 0 { p0 } else { p1 };
    let dp = (n as f64) * (x * p - p0) / (x * x - 1.0);
    (p, dp)
}
