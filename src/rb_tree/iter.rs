use alloc::vec::Vec;
use core::iter::FusedIterator;

use super::{NIL, Node};

/// In-order iterator over the elements of an [`RbTree`](crate::RbTree).
///
/// Created by [`RbTree::iter`](crate::RbTree::iter). Uses an explicit stack of at
/// most one entry per tree level instead of recursion.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    /// Links of the tree being walked
    nodes: &'a [Node],
    /// Payloads of the tree being walked
    values: &'a [Option<T>],
    /// Slots whose left subtree is done but which are not yet yielded
    stack: Vec<usize>,
    /// Elements not yet yielded
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(nodes: &'a [Node], values: &'a [Option<T>], root: usize, len: usize) -> Self {
        let mut iter = Self {
            nodes,
            values,
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: usize) {
        while node != NIL {
            self.stack.push(node);
            node = self.nodes[node].left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(self.nodes[node].right);
        self.remaining = self.remaining.saturating_sub(1);

        let values = self.values;
        values[node].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use crate::RbTree;

    use alloc::vec::Vec;

    #[test]
    fn test_iter_empty() {
        let tree = RbTree::<u8>::ordered();
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_iter_exact_size() {
        let mut tree = RbTree::ordered();
        for key in [30, 10, 20, 50, 40] {
            tree.insert(key).unwrap();
        }

        let mut iter = tree.iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next(), Some(&10));
        assert_eq!(iter.len(), 4);

        let rest: Vec<_> = iter.copied().collect();
        assert_eq!(rest, [20, 30, 40, 50]);
    }

    #[test]
    fn test_into_iterator_for_reference() {
        let mut tree = RbTree::ordered();
        for key in ["b", "c", "a"] {
            tree.insert(key).unwrap();
        }

        let mut joined = Vec::new();
        for key in &tree {
            joined.push(*key);
        }
        assert_eq!(joined, ["a", "b", "c"]);
    }
}
