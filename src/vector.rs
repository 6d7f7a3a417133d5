use alloc::vec::Vec;
use core::cmp::Ordering;
use log::warn;
use num_traits::Float;
use ordered_float::{OrderedFloat, PrimitiveFloat};

use crate::{
    Compare, Destroy, RbTree, TreeError,
    helper::{compare_sequences, squared_norm},
};

/// A numeric vector: an ordered sequence of components of any length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector<T> {
    /// The components, in order
    components: Vec<T>,
}

impl<T> Vector<T> {
    /// Creates a vector from its components
    ///
    /// # Arguments
    ///
    /// * `components` - The components, in order
    ///
    /// # Returns
    ///
    /// * `Self` - The vector
    pub const fn new(components: Vec<T>) -> Self {
        Self { components }
    }

    /// Returns the number of components
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the vector has no components
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the components as a slice
    #[inline]
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Consumes the vector, returning its components
    pub fn into_inner(self) -> Vec<T> {
        self.components
    }
}

impl<T: Copy> Vector<T> {
    /// Deep-copies the vector, reporting allocation failure instead of aborting
    ///
    /// # Returns
    ///
    /// * `Result<Self, TreeError>` - The copy, or `AllocationFailure`
    pub fn try_clone(&self) -> Result<Self, TreeError> {
        let mut copy = Self::new(Vec::new());
        copy.copy_from(self)?;
        Ok(copy)
    }

    /// Overwrites this vector's components with a copy of `other`'s, reusing the
    /// existing buffer when it is large enough
    fn copy_from(&mut self, other: &Self) -> Result<(), TreeError> {
        self.components.clear();
        self.components
            .try_reserve_exact(other.len())
            .map_err(|err| {
                warn!("failed to copy a {}-component vector: {err}", other.len());
                TreeError::AllocationFailure
            })?;
        self.components.extend_from_slice(&other.components);
        Ok(())
    }
}

impl<T: Float + Default> Vector<T> {
    /// Returns the squared Euclidean norm (sum of squared components)
    #[inline]
    pub fn squared_norm(&self) -> T {
        squared_norm(&self.components)
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(components: Vec<T>) -> Self {
        Self::new(components)
    }
}

/// Orders vectors by their first differing component; when one vector is a prefix
/// of the other, the shorter one is smaller.
///
/// Components are compared with [`OrderedFloat`], so NaN sorts above every other
/// value and the order stays total.
///
/// # Examples
///
/// ```
/// use arena_rbtree::{Compare, Vector, VectorOrder};
/// use core::cmp::Ordering;
///
/// let a = Vector::new(vec![1.0, 2.0]);
/// let b = Vector::new(vec![1.0, 2.0, 0.0]);
/// assert_eq!(VectorOrder.compare(&a, &b), Ordering::Less);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VectorOrder;

impl<T> Compare<Vector<T>> for VectorOrder
where
    T: Float + PrimitiveFloat,
{
    fn compare(&self, a: &Vector<T>, b: &Vector<T>) -> Ordering {
        compare_sequences(&a.components, &b.components, |x, y| {
            OrderedFloat(*x).cmp(&OrderedFloat(*y))
        })
    }
}

/// Running maximum carried through a single traversal
#[derive(Debug)]
struct MaxNorm<T> {
    /// Copy of the largest-norm vector seen so far
    best: Option<Vector<T>>,
    /// Squared norm of `best`
    best_norm: T,
    /// Error that stopped the traversal, if any
    error: Option<TreeError>,
}

impl<T: Float + Default> MaxNorm<T> {
    fn new() -> Self {
        Self {
            best: None,
            best_norm: T::zero(),
            error: None,
        }
    }

    /// Keeps a copy of `candidate` if nothing is held yet or its squared norm is
    /// strictly larger than the held one.
    ///
    /// Returns `false` once `copy` fails, recording its error.
    fn offer<F>(&mut self, candidate: &Vector<T>, copy: &mut F) -> bool
    where
        F: FnMut(&Vector<T>, &mut Option<Vector<T>>) -> Result<(), TreeError>,
    {
        let norm = candidate.squared_norm();
        if self.best.is_some() && norm.partial_cmp(&self.best_norm) != Some(Ordering::Greater) {
            return true;
        }

        match copy(candidate, &mut self.best) {
            Ok(()) => {
                self.best_norm = norm;
                true
            }
            Err(err) => {
                self.error = Some(err);
                false
            }
        }
    }
}

/// Copies `candidate` into `best`, reusing the held buffer when there is one
fn copy_into<T: Copy>(
    candidate: &Vector<T>,
    best: &mut Option<Vector<T>>,
) -> Result<(), TreeError> {
    if let Some(held) = best.as_mut() {
        held.copy_from(candidate)
    } else {
        *best = Some(candidate.try_clone()?);
        Ok(())
    }
}

/// Finds the vector with the largest squared Euclidean norm in `tree`.
///
/// Ties keep the first such vector in the tree's order. The result is an
/// independent copy owned by the caller.
///
/// # Arguments
///
/// * `tree` - A tree of vectors, in any order
///
/// # Returns
///
/// * `Result<Option<Vector<T>>, TreeError>` - A copy of the largest vector, `None`
///   for an empty tree, or `AllocationFailure` if the copy could not be made
///
/// # Examples
///
/// ```
/// use arena_rbtree::{DropElement, RbTree, Vector, VectorOrder, find_max_norm_vector};
///
/// let mut tree = RbTree::new(VectorOrder, DropElement);
/// for components in [vec![1.0, 2.0], vec![3.0, 0.0], vec![0.0, 0.0]] {
///     tree.insert(Vector::new(components)).unwrap();
/// }
///
/// let max = find_max_norm_vector(&tree).unwrap().unwrap();
/// assert_eq!(max.components(), &[3.0, 0.0]);
/// ```
pub fn find_max_norm_vector<T, C, D>(
    tree: &RbTree<Vector<T>, C, D>,
) -> Result<Option<Vector<T>>, TreeError>
where
    T: Float + Default,
    C: Compare<Vector<T>>,
    D: Destroy<Vector<T>>,
{
    find_max_norm_with(tree, copy_into)
}

/// Runs the max-norm traversal with `copy` as the step that keeps a candidate.
/// A failed copy stops the traversal, drops the partial result and is returned.
fn find_max_norm_with<T, C, D, F>(
    tree: &RbTree<Vector<T>, C, D>,
    mut copy: F,
) -> Result<Option<Vector<T>>, TreeError>
where
    T: Float + Default,
    C: Compare<Vector<T>>,
    D: Destroy<Vector<T>>,
    F: FnMut(&Vector<T>, &mut Option<Vector<T>>) -> Result<(), TreeError>,
{
    let mut max_norm = MaxNorm::new();
    let traversal = tree.for_each(
        |candidate, max_norm: &mut MaxNorm<T>| max_norm.offer(candidate, &mut copy),
        &mut max_norm,
    );

    match traversal {
        Ok(()) => Ok(max_norm.best),
        Err(err) => Err(max_norm.error.unwrap_or(err)),
    }
}
