//! Free-standing numeric and ordering helpers shared by the comparators and algorithms.

use core::cmp::Ordering;
use num_traits::Float;

type Kbn<T> = compensated_summation::KahanBabuskaNeumaier<T>;

/// Returns the squared Euclidean norm of a sequence of components
///
/// The squares are accumulated with Kahan-Babuska-Neumaier summation so long
/// vectors with mixed magnitudes keep their precision.
///
/// # Arguments
///
/// * `components` - The components of the vector
///
/// # Returns
///
/// * `T` - The sum of squared components, zero for an empty slice
#[inline]
pub fn squared_norm<T: Float + Default>(components: &[T]) -> T {
    let mut sum = Kbn::<T>::default();
    for &component in components {
        sum += component * component;
    }
    sum.total()
}

/// Compares two sequences element by element.
///
/// The first differing pair decides; if one sequence is a prefix of the other,
/// the shorter one is smaller.
///
/// # Arguments
///
/// * `a` - The left-hand sequence
/// * `b` - The right-hand sequence
/// * `compare` - Order over single elements
///
/// # Returns
///
/// * `Ordering` - Where `a` sorts relative to `b`
#[inline]
pub fn compare_sequences<T, F>(a: &[T], b: &[T], mut compare: F) -> Ordering
where
    F: FnMut(&T, &T) -> Ordering,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| compare(x, y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}
