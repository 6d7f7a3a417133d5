use alloc::{collections::TryReserveError, vec::Vec};
use core::{
    cmp::Ordering,
    fmt::{self, Debug},
    ops::ControlFlow,
};
use log::{debug, trace, warn};

use crate::{Compare, Destroy, DropElement, NaturalOrder, TreeError};

mod insert;
mod iter;
mod remove;

pub use iter::Iter;

/// Sentinel index representing an absent link (no parent, no child, empty tree)
pub(crate) const NIL: usize = usize::MAX;

/// Red-Black tree node colors used to maintain tree balance properties.
///
/// Red-Black trees maintain balance by ensuring:
/// - Red nodes have black children
/// - All paths from root to leaves have equal black node counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    /// Red node - cannot be adjacent to other red nodes
    Red,
    /// Black node - contributes to black height, absent children count as black
    Black,
}

/// Structural part of a tree node.
///
/// The element itself lives in the parallel `values` arena at the same index,
/// so payloads can be exchanged without touching the links.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    /// Index of parent node in the arena (nil if this is root)
    pub(crate) parent: usize,

    /// Index of left child node in the arena (nil if no left child)
    pub(crate) left: usize,

    /// Index of right child node in the arena (nil if no right child)
    pub(crate) right: usize,

    /// Color of this node (Red or Black) used for Red-Black tree balancing
    pub(crate) color: Color,
}

impl Node {
    /// A freshly inserted node: red, childless, hanging off `parent`
    const fn leaf(parent: usize) -> Self {
        Self {
            parent,
            left: NIL,
            right: NIL,
            color: Color::Red,
        }
    }
}

/// Outcome of a comparator-guided descent from the root.
pub(crate) enum Search {
    /// An element comparing equal sits at this index
    Found(usize),
    /// No equal element; a new one would hang off `parent` on the `ordering` side
    Vacant { parent: usize, ordering: Ordering },
}

/// A Red-Black tree holding unique elements in the order defined by a [`Compare`]
/// implementation, releasing them through a [`Destroy`] implementation.
///
/// Nodes are stored in an index-addressed arena: parent links are plain indices used
/// only for upward walks during rebalancing, never for ownership. Slots freed by
/// removals are kept on a free list and reused by later insertions.
///
/// Key properties:
/// - Insert, remove and lookup are O(log n) comparisons
/// - In-order traversal visits elements in ascending comparator order
/// - Every element is handed to the destructor exactly once, on removal or teardown
/// - Failing operations leave the tree exactly as before
///
/// The tree performs no internal locking; sharing one across threads requires
/// external synchronization.
///
/// # Examples
///
/// ```
/// use arena_rbtree::{RbTree, TreeError};
///
/// let mut tree = RbTree::ordered();
/// for key in [5, 3, 8, 1, 4, 7, 9] {
///     tree.insert(key).unwrap();
/// }
/// assert_eq!(tree.insert(4), Err(TreeError::DuplicateKey));
///
/// tree.remove(&3).unwrap();
/// tree.remove(&8).unwrap();
///
/// let keys: Vec<i32> = tree.iter().copied().collect();
/// assert_eq!(keys, [1, 4, 5, 7, 9]);
/// ```
pub struct RbTree<T, C = NaturalOrder, D = DropElement>
where
    C: Compare<T>,
    D: Destroy<T>,
{
    /// Links and colors, indexed by slot
    nodes: Vec<Node>,

    /// Element payloads, indexed by slot (None for free slots)
    values: Vec<Option<T>>,

    /// Stack of slots released by removals, reused before the arena grows
    /// Its capacity always covers every slot, so releasing never allocates
    free_list: Vec<usize>,

    /// Number of elements currently held
    len: usize,

    /// Index of the root node, nil when the tree is empty
    root: usize,

    /// Maximum number of slots for a bounded tree, None when the arena may grow
    capacity: Option<usize>,

    /// Total order over elements
    compare: C,

    /// Releases elements leaving the tree
    destroy: D,
}

impl<T: Ord> RbTree<T> {
    /// Creates an empty tree ordered by `T`'s own [`Ord`] that drops removed elements
    ///
    /// # Returns
    ///
    /// * `Self` - The empty tree
    pub const fn ordered() -> Self {
        Self::new(NaturalOrder, DropElement)
    }
}

impl<T: Ord> Default for RbTree<T> {
    fn default() -> Self {
        Self::ordered()
    }
}

impl<T, C, D> RbTree<T, C, D>
where
    C: Compare<T>,
    D: Destroy<T>,
{
    /// Creates an empty tree. No memory is allocated until the first insertion.
    ///
    /// # Arguments
    ///
    /// * `compare` - Total order over elements, fixed for the tree's lifetime
    /// * `destroy` - Called once for every element leaving the tree
    ///
    /// # Returns
    ///
    /// * `Self` - The empty tree
    pub const fn new(compare: C, destroy: D) -> Self {
        Self {
            nodes: Vec::new(),
            values: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            root: NIL,
            capacity: None,
            compare,
            destroy,
        }
    }

    /// Creates an empty tree with room for at least `capacity` elements before the
    /// arena has to grow
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of slots to reserve up front
    /// * `compare` - Total order over elements, fixed for the tree's lifetime
    /// * `destroy` - Called once for every element leaving the tree
    ///
    /// # Returns
    ///
    /// * `Result<Self, TreeError>` - The empty tree, or `AllocationFailure`
    pub fn with_capacity(capacity: usize, compare: C, destroy: D) -> Result<Self, TreeError> {
        let mut tree = Self::new(compare, destroy);
        tree.reserve_slots(capacity)?;
        Ok(tree)
    }

    /// Creates an empty fixed-capacity tree.
    ///
    /// All slots are reserved up front and the arena never grows: inserting into a
    /// full tree reports `AllocationFailure` and leaves the tree untouched.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of elements, must be greater than 0
    /// * `compare` - Total order over elements, fixed for the tree's lifetime
    /// * `destroy` - Called once for every element leaving the tree
    ///
    /// # Returns
    ///
    /// * `Result<Self, TreeError>` - The empty tree, or `AllocationFailure`
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0
    pub fn bounded(capacity: usize, compare: C, destroy: D) -> Result<Self, TreeError> {
        assert!(capacity > 0, "Capacity must be greater than 0");

        let mut tree = Self::with_capacity(capacity, compare, destroy)?;
        tree.capacity = Some(capacity);
        Ok(tree)
    }

    /// Returns the number of elements in the tree
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no elements
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the fixed capacity of a bounded tree, `None` if the tree can grow
    #[inline]
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Returns how many more elements a bounded tree accepts, `None` if the tree can grow
    #[inline]
    pub fn remaining_capacity(&self) -> Option<usize> {
        self.capacity.map(|capacity| capacity - self.len)
    }

    /// Returns `true` if an element comparing equal to `value` is in the tree
    ///
    /// # Arguments
    ///
    /// * `value` - The element to look for
    ///
    /// # Returns
    ///
    /// * `bool` - Whether the element is present
    pub fn contains(&self, value: &T) -> bool {
        self.find_node(value).is_some()
    }

    /// Returns the held element comparing equal to `value`
    ///
    /// # Arguments
    ///
    /// * `value` - The element to look for
    ///
    /// # Returns
    ///
    /// * `Option<&T>` - The stored element, or `None` if absent
    pub fn get(&self, value: &T) -> Option<&T> {
        self.find_node(value).map(|node| self.value_at(node))
    }

    /// Returns the smallest element, or `None` if the tree is empty
    pub fn min(&self) -> Option<&T> {
        if self.root == NIL {
            return None;
        }
        Some(self.value_at(self.find_minimum(self.root)))
    }

    /// Returns the largest element, or `None` if the tree is empty
    pub fn max(&self) -> Option<&T> {
        if self.root == NIL {
            return None;
        }
        Some(self.value_at(self.find_maximum(self.root)))
    }

    /// Returns an iterator over the elements in ascending order
    ///
    /// # Returns
    ///
    /// * `Iter<'_, T>` - A borrowing in-order iterator
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.nodes, &self.values, self.root, self.len)
    }

    /// Calls `visit` on every element in ascending order, stopping at the first
    /// element for which it returns `false`.
    ///
    /// The stop signal belongs to this call alone, so nested or repeated traversals
    /// never affect each other.
    ///
    /// # Arguments
    ///
    /// * `visit` - Receives each element and the shared context, returns `false` to stop
    /// * `context` - State shared by every visit of this traversal
    ///
    /// # Returns
    ///
    /// * `Result<(), TreeError>` - `Ok` if every element was visited successfully,
    ///   `CallbackFailure` carrying the number of visits otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use arena_rbtree::{RbTree, TreeError};
    ///
    /// let mut tree = RbTree::ordered();
    /// for key in [4, 1, 3, 2] {
    ///     tree.insert(key).unwrap();
    /// }
    ///
    /// let mut sum = 0;
    /// tree.for_each(|key, sum| { *sum += key; true }, &mut sum).unwrap();
    /// assert_eq!(sum, 10);
    ///
    /// let mut seen = Vec::new();
    /// let result = tree.for_each(|key, seen: &mut Vec<i32>| { seen.push(*key); *key < 2 }, &mut seen);
    /// assert_eq!(result, Err(TreeError::CallbackFailure { visited: 2 }));
    /// assert_eq!(seen, [1, 2]);
    /// ```
    pub fn for_each<X, F>(&self, mut visit: F, context: &mut X) -> Result<(), TreeError>
    where
        X: ?Sized,
        F: FnMut(&T, &mut X) -> bool,
    {
        let mut visited = 0;
        match self.visit_in_order(self.root, &mut visit, context, &mut visited) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => {
                debug!("traversal stopped by visitor after {visited} of {} element(s)", self.len);
                Err(TreeError::CallbackFailure { visited })
            }
        }
    }

    /// Removes every element, handing each to the destructor in post-order
    /// (children before their parent). The tree stays usable and keeps its capacity.
    pub fn clear(&mut self) {
        let released = self.len;
        self.destroy_subtree(self.root);

        self.nodes.clear();
        self.values.clear();
        self.free_list.clear();
        self.root = NIL;
        self.len = 0;

        if released > 0 {
            debug!("cleared tree, released {released} element(s)");
        }
    }

    fn visit_in_order<X, F>(
        &self,
        node: usize,
        visit: &mut F,
        context: &mut X,
        visited: &mut usize,
    ) -> ControlFlow<()>
    where
        X: ?Sized,
        F: FnMut(&T, &mut X) -> bool,
    {
        if node == NIL {
            return ControlFlow::Continue(());
        }

        let Node { left, right, .. } = self.nodes[node];
        self.visit_in_order(left, visit, context, visited)?;

        *visited += 1;
        if !visit(self.value_at(node), context) {
            return ControlFlow::Break(());
        }

        self.visit_in_order(right, visit, context, visited)
    }

    fn destroy_subtree(&mut self, node: usize) {
        if node == NIL {
            return;
        }

        let Node { left, right, .. } = self.nodes[node];
        self.destroy_subtree(left);
        self.destroy_subtree(right);

        if let Some(value) = self.values[node].take() {
            self.destroy.destroy(value);
        }
    }

    /// Reserves room for exactly `additional` more slots
    fn reserve_slots(&mut self, additional: usize) -> Result<(), TreeError> {
        let reserved = self
            .nodes
            .try_reserve_exact(additional)
            .and_then(|()| self.values.try_reserve_exact(additional));
        self.cover_free_list(reserved)
    }

    /// Makes room for one more slot, letting the arena grow geometrically
    fn grow_arena(&mut self) -> Result<(), TreeError> {
        let reserved = self
            .nodes
            .try_reserve(1)
            .and_then(|()| self.values.try_reserve(1));
        self.cover_free_list(reserved)
    }

    /// Sizes the free list so it can hold every slot the arena has room for
    fn cover_free_list(&mut self, reserved: Result<(), TryReserveError>) -> Result<(), TreeError> {
        reserved
            .and_then(|()| {
                self.free_list
                    .try_reserve_exact(self.values.capacity() - self.free_list.len())
            })
            .map_err(|err| {
                warn!(
                    "failed to grow node arena past {} slot(s): {err}",
                    self.values.len()
                );
                TreeError::AllocationFailure
            })
    }

    /// Places `value` in a free slot (or a new one) as a red leaf under `parent`
    fn allocate_node(&mut self, value: T, parent: usize) -> Result<usize, TreeError> {
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx] = Node::leaf(parent);
            self.values[idx] = Some(value);
            return Ok(idx);
        }

        let idx = self.values.len();
        if self.capacity.is_some_and(|capacity| idx >= capacity) {
            warn!("bounded tree is full ({idx} element(s)), insert rejected");
            return Err(TreeError::AllocationFailure);
        }

        self.grow_arena()?;
        self.nodes.push(Node::leaf(parent));
        self.values.push(Some(value));
        Ok(idx)
    }

    /// Empties the slot at `idx` and returns its element. Never allocates.
    fn release_node(&mut self, idx: usize) -> T {
        let value = self.values[idx].take();
        self.free_list.push(idx);
        match value {
            Some(value) => value,
            None => vacant_slot(idx),
        }
    }

    #[inline]
    fn value_at(&self, idx: usize) -> &T {
        match &self.values[idx] {
            Some(value) => value,
            None => vacant_slot(idx),
        }
    }

    pub(crate) fn search(&self, value: &T) -> Search {
        let mut current = self.root;
        let mut parent = NIL;
        let mut ordering = Ordering::Equal;

        while current != NIL {
            ordering = self.compare.compare(value, self.value_at(current));
            parent = current;
            current = match ordering {
                Ordering::Equal => return Search::Found(current),
                Ordering::Less => self.nodes[current].left,
                Ordering::Greater => self.nodes[current].right,
            };
        }
        Search::Vacant { parent, ordering }
    }

    fn find_node(&self, value: &T) -> Option<usize> {
        match self.search(value) {
            Search::Found(node) => Some(node),
            Search::Vacant { .. } => None,
        }
    }

    fn find_minimum(&self, mut node: usize) -> usize {
        while node != NIL {
            let left = self.nodes[node].left;
            if left == NIL {
                break;
            }
            node = left;
        }
        node
    }

    fn find_maximum(&self, mut node: usize) -> usize {
        while node != NIL {
            let right = self.nodes[node].right;
            if right == NIL {
                break;
            }
            node = right;
        }
        node
    }

    #[inline]
    fn get_color(&self, node: usize) -> Color {
        if node == NIL {
            Color::Black
        } else {
            self.nodes[node].color
        }
    }

    #[inline]
    fn set_color(&mut self, node: usize, color: Color) {
        if node != NIL {
            self.nodes[node].color = color;
        }
    }

    #[inline]
    fn is_red(&self, node: usize) -> bool {
        self.get_color(node) == Color::Red
    }

    #[inline]
    fn is_black(&self, node: usize) -> bool {
        self.get_color(node) == Color::Black
    }

    #[inline]
    fn get_parent(&self, node: usize) -> usize {
        if node == NIL {
            NIL
        } else {
            self.nodes[node].parent
        }
    }

    #[inline]
    fn get_left(&self, node: usize) -> usize {
        if node == NIL {
            NIL
        } else {
            self.nodes[node].left
        }
    }

    #[inline]
    fn get_right(&self, node: usize) -> usize {
        if node == NIL {
            NIL
        } else {
            self.nodes[node].right
        }
    }

    fn rotate_left(&mut self, x: usize) {
        if x == NIL {
            return;
        }

        let y = self.nodes[x].right;
        if y == NIL {
            return;
        }
        trace!("rotate left at slot {x}");

        let y_left = self.nodes[y].left;
        self.nodes[x].right = y_left;
        if y_left != NIL {
            self.nodes[y_left].parent = x;
        }

        let x_parent = self.nodes[x].parent;
        self.nodes[y].parent = x_parent;
        self.replace_child(x_parent, x, y);

        self.nodes[y].left = x;
        self.nodes[x].parent = y;
    }

    fn rotate_right(&mut self, y: usize) {
        if y == NIL {
            return;
        }

        let x = self.nodes[y].left;
        if x == NIL {
            return;
        }
        trace!("rotate right at slot {y}");

        let x_right = self.nodes[x].right;
        self.nodes[y].left = x_right;
        if x_right != NIL {
            self.nodes[x_right].parent = y;
        }

        let y_parent = self.nodes[y].parent;
        self.nodes[x].parent = y_parent;
        self.replace_child(y_parent, y, x);

        self.nodes[x].right = y;
        self.nodes[y].parent = x;
    }

    /// Points whichever link of `parent` held `old` at `new`; a nil parent means
    /// `old` was the root
    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if parent == NIL {
            self.root = new;
        } else if old == self.nodes[parent].left {
            self.nodes[parent].left = new;
        } else {
            self.nodes[parent].right = new;
        }
    }

    /// Puts `new_node` (possibly nil) where `old_node` hangs in the tree
    fn transplant(&mut self, old_node: usize, new_node: usize) {
        let parent = self.nodes[old_node].parent;
        self.replace_child(parent, old_node, new_node);

        if new_node != NIL {
            self.nodes[new_node].parent = parent;
        }
    }

    #[cfg(any(test, debug_assertions))]
    fn verify_rb_invariants(&self) -> bool {
        if self.root == NIL {
            return self.len == 0;
        }

        if !self.is_black(self.root) || self.nodes[self.root].parent != NIL {
            return false;
        }

        let mut count = 0;
        self.verify_black_height(self.root, &mut count).is_some()
            && count == self.len
            && self.is_strictly_ascending()
    }

    #[cfg(any(test, debug_assertions))]
    fn verify_black_height(&self, node: usize, count: &mut usize) -> Option<usize> {
        if node == NIL {
            return Some(1);
        }
        *count += 1;

        let Node { left, right, .. } = self.nodes[node];
        if [left, right]
            .into_iter()
            .any(|child| child != NIL && self.nodes[child].parent != node)
        {
            return None;
        }

        if self.is_red(node) && (self.is_red(left) || self.is_red(right)) {
            return None;
        }

        let left_height = self.verify_black_height(left, count)?;
        let right_height = self.verify_black_height(right, count)?;

        if left_height != right_height {
            return None;
        }

        if self.is_black(node) {
            Some(left_height + 1)
        } else {
            Some(left_height)
        }
    }

    #[cfg(any(test, debug_assertions))]
    fn is_strictly_ascending(&self) -> bool {
        let mut iter = self.iter();
        let Some(mut prev) = iter.next() else {
            return true;
        };
        for value in iter {
            if self.compare.compare(prev, value) != Ordering::Less {
                return false;
            }
            prev = value;
        }
        true
    }
}

#[cold]
#[inline(never)]
fn vacant_slot(idx: usize) -> ! {
    unreachable!("slot {idx} is linked into the tree but holds no element")
}

impl<T, C, D> Drop for RbTree<T, C, D>
where
    C: Compare<T>,
    D: Destroy<T>,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, C, D> Debug for RbTree<T, C, D>
where
    T: Debug,
    C: Compare<T>,
    D: Destroy<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, C, D> IntoIterator for &'a RbTree<T, C, D>
where
    C: Compare<T>,
    D: Destroy<T>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{XorShift, init_logging};

    use ahash::RandomState;
    use alloc::{format, vec::Vec};
    use hashbrown::HashMap;

    fn tree_of(keys: &[i32]) -> RbTree<i32> {
        let mut tree = RbTree::ordered();
        for &key in keys {
            tree.insert(key).unwrap();
        }
        tree
    }

    fn keys(tree: &RbTree<i32>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[test]
    fn test_rbtree_creation() {
        let tree = RbTree::<f64, _, _>::new(f64::total_cmp, DropElement);
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.capacity(), None);
        assert_eq!(tree.remaining_capacity(), None);
        assert!(tree.min().is_none());
        assert!(tree.max().is_none());
        assert!(!tree.contains(&1.0));
        assert!(tree.verify_rb_invariants());
    }

    #[test]
    #[should_panic(expected = "Capacity must be greater than 0")]
    fn test_rbtree_zero_capacity() {
        let _ = RbTree::<i32>::bounded(0, NaturalOrder, DropElement);
    }

    #[test]
    fn test_rbtree_min_max_get() {
        let tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(tree.min(), Some(&1));
        assert_eq!(tree.max(), Some(&9));
        assert_eq!(tree.get(&7), Some(&7));
        assert_eq!(tree.get(&6), None);
        assert!(tree.contains(&4));
        assert!(!tree.contains(&10));
    }

    #[test]
    fn test_rbtree_debug_lists_in_order() {
        let tree = tree_of(&[2, 3, 1]);
        assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
    }

    #[test]
    fn test_for_each_visits_all_in_order() {
        let tree = tree_of(&[9, 2, 7, 4, 5, 1, 8, 3, 6]);

        let mut seen = Vec::new();
        let result = tree.for_each(
            |key, seen: &mut Vec<i32>| {
                seen.push(*key);
                true
            },
            &mut seen,
        );

        assert_eq!(result, Ok(()));
        assert_eq!(seen, [1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_for_each_stops_at_first_failure() {
        let tree = tree_of(&[9, 2, 7, 4, 5, 1, 8, 3, 6]);

        for fail_at in 1..=9 {
            let mut calls = 0;
            let result = tree.for_each(
                |key, calls: &mut usize| {
                    *calls += 1;
                    *key != fail_at
                },
                &mut calls,
            );

            assert_eq!(
                result,
                Err(TreeError::CallbackFailure {
                    visited: fail_at as usize
                })
            );
            assert_eq!(calls, fail_at as usize);
        }
    }

    #[test]
    fn test_for_each_on_empty_tree() {
        let tree = RbTree::<i32>::ordered();
        let mut calls = 0;
        assert_eq!(
            tree.for_each(
                |_, calls: &mut i32| {
                    *calls += 1;
                    false
                },
                &mut calls
            ),
            Ok(())
        );
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_nested_traversals_do_not_interfere() {
        let tree = tree_of(&[1, 2, 3]);

        // The inner traversal fails every time; the outer one must still finish.
        let mut pairs = 0;
        let outer = tree.for_each(
            |outer_key, pairs: &mut usize| {
                let inner = tree.for_each(
                    |inner_key, pairs: &mut usize| {
                        *pairs += 1;
                        inner_key < outer_key
                    },
                    pairs,
                );
                inner.is_err()
            },
            &mut pairs,
        );

        assert_eq!(outer, Ok(()));
        assert_eq!(pairs, 1 + 2 + 3);

        // A failed traversal does not poison the next one.
        let mut count = 0;
        assert_eq!(
            tree.for_each(
                |_, count: &mut usize| {
                    *count += 1;
                    true
                },
                &mut count
            ),
            Ok(())
        );
        assert_eq!(count, 3);
    }

    #[test]
    fn test_teardown_destroys_each_element_once() {
        init_logging();

        let mut released: HashMap<i32, usize, RandomState> =
            HashMap::with_hasher(RandomState::default());
        {
            let mut tree: RbTree<i32, _, _> = RbTree::new(NaturalOrder, |key: i32| {
                *released.entry(key).or_insert(0) += 1;
            });
            for key in 0..64 {
                tree.insert(key).unwrap();
            }
            for key in (0..64).step_by(3) {
                tree.remove(&key).unwrap();
            }
            assert_eq!(tree.len(), 64 - 22);
        }

        assert_eq!(released.len(), 64);
        assert!(released.values().all(|&count| count == 1));
    }

    #[test]
    fn test_teardown_order_is_post_order() {
        let mut order = Vec::new();
        {
            let mut tree: RbTree<i32, _, _> =
                RbTree::new(NaturalOrder, |key: i32| order.push(key));
            for key in [2, 1, 3] {
                tree.insert(key).unwrap();
            }
        }
        assert_eq!(order, [1, 3, 2]);
    }

    #[test]
    fn test_teardown_of_empty_tree_is_noop() {
        let mut released = 0;
        {
            let _tree: RbTree<i32, _, _> = RbTree::new(NaturalOrder, |_: i32| released += 1);
        }
        assert_eq!(released, 0);
    }

    #[test]
    fn test_clear_keeps_tree_usable() {
        let mut released = 0;
        {
            let mut tree: RbTree<i32, _, _> =
                RbTree::bounded(4, NaturalOrder, |_: i32| released += 1).unwrap();
            for key in 1..=4 {
                tree.insert(key).unwrap();
            }
            assert_eq!(tree.remaining_capacity(), Some(0));

            tree.clear();
            assert!(tree.is_empty());
            assert_eq!(tree.remaining_capacity(), Some(4));
            assert!(tree.verify_rb_invariants());

            tree.insert(42).unwrap();
            assert_eq!(tree.len(), 1);
        }
        assert_eq!(released, 5);
    }

    #[test]
    fn test_with_capacity_grows_past_reservation() {
        let mut tree = RbTree::with_capacity(2, NaturalOrder, DropElement).unwrap();
        for key in 0..10 {
            tree.insert(key).unwrap();
        }
        assert_eq!(tree.len(), 10);
        assert_eq!(tree.capacity(), None);
    }

    #[test]
    fn test_arena_grows_geometrically() {
        let mut tree = RbTree::ordered();
        let mut growths = 0;
        let mut last_capacity = tree.nodes.capacity();
        for key in 0..1_000 {
            tree.insert(key).unwrap();
            if tree.nodes.capacity() != last_capacity {
                growths += 1;
                last_capacity = tree.nodes.capacity();
            }
            assert!(tree.free_list.capacity() >= tree.values.len());
        }
        assert!(growths <= 16, "arena grew {growths} times over 1000 inserts");
    }

    #[test]
    fn test_custom_comparator_orders_traversal() {
        let mut tree = RbTree::new(|a: &i32, b: &i32| b.cmp(a), DropElement);
        for key in [3, 1, 4, 5, 9, 2, 6] {
            tree.insert(key).unwrap();
        }
        let keys: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(keys, [9, 6, 5, 4, 3, 2, 1]);
        assert!(tree.verify_rb_invariants());
    }

    #[test]
    fn test_randomized_workload_keeps_invariants() {
        init_logging();

        let mut rng = XorShift::new(0x9E37_79B9_7F4A_7C15);
        let mut tree = RbTree::ordered();
        let mut model = Vec::new();

        for _ in 0..2_000 {
            let key = (rng.next_u64() % 256) as i32;
            if rng.next_u64() % 3 == 0 {
                let expected = model.binary_search(&key).map(|pos| model.remove(pos));
                assert_eq!(tree.remove(&key).is_ok(), expected.is_ok());
            } else {
                let expected = match model.binary_search(&key) {
                    Ok(_) => Err(TreeError::DuplicateKey),
                    Err(pos) => {
                        model.insert(pos, key);
                        Ok(())
                    }
                };
                assert_eq!(tree.insert(key), expected);
            }

            assert!(tree.verify_rb_invariants());
            assert_eq!(tree.len(), model.len());
        }

        assert_eq!(keys(&tree), model);
    }
}
