//! Dominance tests and region bitmaps
//!
//! Smaller values are better on every dimension. All comparisons are plain floating point
//! comparisons without tolerance, so ties are only detected for bit-identical coordinates.
use crate::traits::Scalar;
use crate::types::{Dominance, Lattice};

/// Two-way dominance test.
///
/// Stops as soon as each point has been seen to be strictly better on some dimension. Equal
/// points are [`Dominance::Incomparable`].
#[inline]
pub fn dominance_test<T: Scalar>(left: &[T], right: &[T]) -> Dominance {
    debug_assert_eq!(left.len(), right.len(), "Points have different dimensions");
    let mut left_better = false;
    let mut right_better = false;
    for (l, r) in left.iter().zip(right) {
        if l < r {
            left_better = true;
        } else if l > r {
            right_better = true;
        }
        if left_better && right_better {
            return Dominance::Incomparable;
        }
    }
    match (left_better, right_better) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Incomparable,
    }
}

/// Returns true if `left` dominates `right`.
///
/// Cheaper than [`dominance_test`] when only one direction matters: the scan stops at the first
/// dimension where `left` is worse.
#[inline]
pub fn dominates<T: Scalar>(left: &[T], right: &[T]) -> bool {
    debug_assert_eq!(left.len(), right.len(), "Points have different dimensions");
    if left.iter().zip(right).any(|(l, r)| l > r) {
        return false;
    }
    left.iter().zip(right).any(|(l, r)| l < r)
}

/// Exact coordinate-wise equality
#[inline]
pub fn is_equal<T: Scalar>(left: &[T], right: &[T]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| l == r)
}

/// Region of `point` relative to `reference`.
///
/// Bit `i` is set when `reference[i] <= point[i]`. The full bitmap (see [`full_lattice`]) means
/// that the reference dominates or equals the point.
#[inline]
pub fn lattice<T: Scalar>(reference: &[T], point: &[T]) -> Lattice {
    debug_assert_eq!(reference.len(), point.len(), "Points have different dimensions");
    reference
        .iter()
        .zip(point)
        .enumerate()
        .fold(0, |lattice, (d, (r, p))| {
            if r <= p {
                lattice | (1 << d)
            } else {
                lattice
            }
        })
}

/// The bitmap with one bit set for each of `dim` dimensions
#[inline]
pub fn full_lattice(dim: usize) -> Lattice {
    debug_assert!(
        dim > 0 && dim <= Lattice::BITS as usize,
        "Unsupported dimension {dim}"
    );
    Lattice::MAX >> (Lattice::BITS as usize - dim)
}

/// Returns true if every bit of `sub` is set in `sup`
#[inline]
pub fn is_submask(sub: Lattice, sup: Lattice) -> bool {
    sub & sup == sub
}

/// Returns true if points in the two regions may dominate one another.
///
/// Only nested regions can hold comparable points; points in regions that are not submasks of one
/// another are incomparable.
#[inline]
pub fn regions_comparable(first: Lattice, second: Lattice) -> bool {
    let common = first & second;
    common == first || common == second
}
