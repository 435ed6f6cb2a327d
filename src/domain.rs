//! Bounding boxes used to normalise points when scoring pivots.
use crate::traits::{Coordinates, Scalar};
use crate::types::Lattice;

/// How the domain of a query is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomainBounds {
    /// The unit cube. Appropriate for data the caller has normalised to `[0, 1]`.
    #[default]
    Unit,
    /// The bounding box of the input points.
    FitToData,
}

/// An axis aligned box, given by its lower and upper corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain<T: Scalar> {
    /// Lower bound along each dimension.
    pub min: Vec<T>,

    /// Upper bound along each dimension.
    pub max: Vec<T>,
}

impl<T: Scalar> Domain<T> {
    /// Construct a domain from user specified bounds.
    ///
    /// # Arguments
    /// * `min` - The lower corner.
    /// * `max` - The upper corner, of the same dimension.
    pub fn new(min: &[T], max: &[T]) -> Self {
        assert_eq!(min.len(), max.len(), "Bounds have different dimensions");
        Self {
            min: min.to_vec(),
            max: max.to_vec(),
        }
    }

    /// The unit cube `[0, 1]^dim`
    pub fn unit(dim: usize) -> Self {
        Self {
            min: vec![T::zero(); dim],
            max: vec![T::one(); dim],
        }
    }

    /// Compute the bounding box of a set of points. An empty set gives the unit cube.
    ///
    /// # Arguments
    /// * `points` - Points of a common dimension `dim`.
    pub fn from_points<C: Coordinates<T = T>>(points: &[C], dim: usize) -> Self {
        if points.is_empty() {
            return Self::unit(dim);
        }
        let mut min = vec![T::infinity(); dim];
        let mut max = vec![T::neg_infinity(); dim];
        for point in points {
            for (d, &value) in point.values().iter().enumerate() {
                min[d] = min[d].min(value);
                max[d] = max[d].max(value);
            }
        }
        Self { min, max }
    }

    /// Compute the domain of a query.
    pub fn with_bounds<C: Coordinates<T = T>>(
        bounds: DomainBounds,
        points: &[C],
        dim: usize,
    ) -> Self {
        match bounds {
            DomainBounds::Unit => Self::unit(dim),
            DomainBounds::FitToData => Self::from_points(points, dim),
        }
    }

    /// Number of dimensions
    pub fn dim(&self) -> usize {
        self.min.len()
    }

    /// Extent along each dimension
    pub fn ranges(&self) -> Vec<T> {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(&lo, &hi)| hi - lo)
            .collect()
    }

    /// Returns true if the point lies inside the box, boundary included
    pub fn contains(&self, point: &[T]) -> bool {
        point
            .iter()
            .zip(self.min.iter().zip(&self.max))
            .all(|(p, (lo, hi))| lo <= p && p <= hi)
    }

    /// The part of this domain occupied by a region of `pivot`.
    ///
    /// On dimensions where the region bit is set the region lies above the pivot, otherwise
    /// below it.
    pub fn split(&self, lattice: Lattice, pivot: &[T]) -> Self {
        let mut min = self.min.clone();
        let mut max = self.max.clone();
        for (d, &value) in pivot.iter().enumerate() {
            if lattice & (1 << d) != 0 {
                min[d] = value;
            } else {
                max[d] = value;
            }
        }
        Self { min, max }
    }
}
