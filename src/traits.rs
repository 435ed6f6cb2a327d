//! Trait definitions

use crate::types::{Item, Statistics};
use num::Float;
use std::fmt::Debug;

/// Floating point type that coordinates are stored in.
pub trait Scalar: Float + Send + Sync + Debug {}

impl<T: Float + Send + Sync + Debug> Scalar for T {}

pub trait Coordinates: Clone + Send + Sync + Debug {
    //! The coordinate vector of a single point
    //!
    //! Fixed size arrays carry their dimension in the type, so the dominance tests on them are
    //! monomorphised for that dimension. `Vec` is the fallback for dimensions only known at runtime.

    /// The scalar type
    type T: Scalar;

    /// The dimension, if it is known at compile time
    const DIM: Option<usize>;

    /// The coordinate values
    fn values(&self) -> &[Self::T];

    /// The number of dimensions of this point
    fn dim(&self) -> usize {
        self.values().len()
    }
}

impl<T: Scalar, const D: usize> Coordinates for [T; D] {
    type T = T;
    const DIM: Option<usize> = Some(D);

    #[inline]
    fn values(&self) -> &[T] {
        self
    }

    #[inline]
    fn dim(&self) -> usize {
        D
    }
}

impl<T: Scalar> Coordinates for Vec<T> {
    type T = T;
    const DIM: Option<usize> = None;

    #[inline]
    fn values(&self) -> &[T] {
        self
    }
}

pub trait SkylineEngine<C: Coordinates> {
    //! Skyline computation strategy
    //!
    //! An engine takes ownership of the working items of one query and returns the ids of the
    //! skyline points, in no particular order.

    /// Compute the skyline, recording counters in `statistics`
    fn compute(&self, items: Vec<Item<C>>, statistics: &mut Statistics) -> Vec<usize>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fixed_and_dynamic_agree() {
        let fixed = [0.25, 0.5, 0.75];
        let dynamic = vec![0.25, 0.5, 0.75];

        assert_eq!(<[f64; 3] as Coordinates>::DIM, Some(3));
        assert_eq!(<Vec<f64> as Coordinates>::DIM, None);
        assert_eq!(fixed.dim(), dynamic.dim());
        assert_eq!(Coordinates::values(&fixed), Coordinates::values(&dynamic));
    }
}
