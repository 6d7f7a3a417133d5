/// Releases one element when it leaves a tree.
///
/// A tree calls `destroy` exactly once for every element it held: when the
/// element is removed, or when the tree is cleared or dropped. Elements that
/// are handed back to the caller (see [`RbTree::take`](crate::RbTree::take))
/// or rejected on insert never reach it.
///
/// Any `FnMut(T)` closure or function is a `Destroy<T>`.
pub trait Destroy<T> {
    /// Consumes and releases `value`
    ///
    /// # Arguments
    ///
    /// * `value` - The element leaving the tree
    fn destroy(&mut self, value: T);
}

impl<T, F> Destroy<T> for F
where
    F: FnMut(T),
{
    #[inline]
    fn destroy(&mut self, value: T) {
        self(value)
    }
}

/// Releases elements by dropping them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropElement;

impl<T> Destroy<T> for DropElement {
    #[inline]
    fn destroy(&mut self, value: T) {
        drop(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloc::vec::Vec;

    #[test]
    fn test_closure_destroy_receives_values() {
        let mut released = Vec::new();
        {
            let mut sink = |value: i32| released.push(value);
            sink.destroy(4);
            sink.destroy(2);
        }
        assert_eq!(released, [4, 2]);
    }
}
