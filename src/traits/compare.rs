use core::cmp::Ordering;

/// Total order used by a tree to place, find and remove its elements.
///
/// Implementations must be a strict total order that stays the same for the
/// whole lifetime of the tree they are given to: `Less`, `Equal` and `Greater`
/// mean "sorts before", "is the same element" and "sorts after".
///
/// Any `Fn(&T, &T) -> Ordering` closure or function is a `Compare<T>`.
///
/// # Examples
///
/// ```
/// use arena_rbtree::{Compare, NaturalOrder};
/// use core::cmp::Ordering;
///
/// assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
///
/// let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
/// assert_eq!(by_len.compare(&"abc", &"de"), Ordering::Greater);
/// ```
pub trait Compare<T: ?Sized> {
    /// Compares `a` against `b`
    ///
    /// # Arguments
    ///
    /// * `a` - The left-hand element
    /// * `b` - The right-hand element
    ///
    /// # Returns
    ///
    /// * `Ordering` - Where `a` sorts relative to `b`
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T, F> Compare<T> for F
where
    T: ?Sized,
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Orders elements by their own [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Compare<T> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}
