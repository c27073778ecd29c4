//! Coordinate helpers and sample-point iteration.
//!
//! # Traits
//!
//! - [`CoordExt`]: accessors over slices of `(x, y)` points, including the
//!   domain bounds the fitter needs and the first/last x used to default a
//!   tabulation range.
//!
//! # Iterators
//!
//! - [`LinearSpace`]: `n` evenly spaced values starting at `from`, the sample
//!   positions of a tabulated model.
//!
//! # Example
//!
//! ```rust
//! use legfit::value::{CoordExt, LinearSpace};
//!
//! let points = vec![(0.0, 1.0), (2.0, 5.0), (1.0, 3.0)];
//! assert_eq!(points.x_range(), Some((0.0, 2.0)));
//! assert_eq!(points.first_last_x(), Some((0.0, 1.0)));
//!
//! let xs: Vec<f64> = LinearSpace::new(0.0, 3.0, 4).collect();
//! assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
//! ```

/// Iterator over `n` evenly spaced values.
///
/// Yields `from + i * dx` for `i` in `0..n`, where `dx = (to - from) / (n - 1)`.
/// A single-sample space yields just `from`.
#[derive(Debug, Clone)]
pub struct LinearSpace {
    from: f64,
    dx: f64,
    index: usize,
    n: usize,
}
impl LinearSpace {
    /// Creates `n` samples covering `from..=to`.
    #[must_use]
    pub fn new(from: f64, to: f64, n: usize) -> Self {
        let dx = if n > 1 {
            (to - from) / (n - 1) as f64
        } else {
            0.0
        };

        Self {
            from,
            dx,
            index: 0,
            n,
        }
    }

    /// Distance between consecutive samples.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.dx
    }
}
impl Iterator for LinearSpace {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.n {
            let value = self.from + self.index as f64 * self.dx;
            self.index += 1;
            Some(value)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.n - self.index;
        (remaining, Some(remaining))
    }
}
impl ExactSizeIterator for LinearSpace {}

/// Extension trait for accessing the `x` and `y` coordinates of a point set.
///
/// # Examples
///
/// ```
/// # use legfit::value::CoordExt;
/// let data = vec![(1.5, -2.0), (2.0, 3.0), (0.0, 1.0)];
/// println!("{:?}", data.y());
/// ```
pub trait CoordExt {
    /// Returns an iterator over the x-coordinates.
    fn x_iter(&self) -> impl Iterator<Item = f64>;

    /// Returns an iterator over the y-coordinates.
    fn y_iter(&self) -> impl Iterator<Item = f64>;

    /// Returns the x-coordinates.
    fn x(&self) -> Vec<f64> {
        self.x_iter().collect()
    }

    /// Returns the y-coordinates.
    fn y(&self) -> Vec<f64> {
        self.y_iter().collect()
    }

    /// Returns `(min, max)` over all x-coordinates, or `None` if there are none.
    fn x_range(&self) -> Option<(f64, f64)> {
        self.x_iter().fold(None, |acc: Option<(f64, f64)>, x| {
            Some(match acc {
                Some((min, max)) => (min.min(x), max.max(x)),
                None => (x, x),
            })
        })
    }

    /// Returns the x-coordinates of the first and last point.
    ///
    /// `None` unless there are at least two points.
    fn first_last_x(&self) -> Option<(f64, f64)> {
        let mut xs = self.x_iter();
        let first = xs.next()?;
        let last = xs.last()?;
        Some((first, last))
    }

    /// True if the x-coordinates never decrease.
    fn is_sorted_by_x(&self) -> bool {
        let xs = self.x();
        xs.windows(2).all(|w| w[0] <= w[1])
    }
}
impl CoordExt for [(f64, f64)] {
    fn x_iter(&self) -> impl Iterator<Item = f64> {
        self.iter().map(|(x, _)| *x)
    }

    fn y_iter(&self) -> impl Iterator<Item = f64> {
        self.iter().map(|(_, y)| *y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_space_hits_both_ends() {
        let xs: Vec<_> = LinearSpace::new(0.0, 3.0, 4).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);

        let space = LinearSpace::new(-1.0, 1.0, 100);
        assert_eq!(space.len(), 100);
        let xs: Vec<_> = space.collect();
        assert_eq!(xs[0], -1.0);
        assert!((xs[99] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn linear_space_degenerate_counts() {
        assert_eq!(LinearSpace::new(2.0, 5.0, 0).count(), 0);
        let xs: Vec<_> = LinearSpace::new(2.0, 5.0, 1).collect();
        assert_eq!(xs, vec![2.0]);
    }

    #[test]
    fn coord_ranges() {
        let data = vec![(3.0, 0.0), (-1.0, 2.0), (7.0, 1.0)];
        assert_eq!(data.x_range(), Some((-1.0, 7.0)));
        assert_eq!(data.first_last_x(), Some((3.0, 7.0)));
        assert!(!data.is_sorted_by_x());
        assert_eq!(data.y(), vec![0.0, 2.0, 1.0]);

        let single = vec![(1.0, 1.0)];
        assert_eq!(single.first_last_x(), None);

        let empty: Vec<(f64, f64)> = vec![];
        assert_eq!(empty.x_range(), None);
        assert!(empty.is_sorted_by_x());
    }
}
