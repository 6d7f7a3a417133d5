/// Failures reported by [`RbTree`](crate::RbTree) operations and the algorithms built on it.
///
/// Every failing operation leaves the tree exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Growing the node arena (or copying an element) could not allocate,
    /// or a bounded tree has no free slot left
    #[error("allocation failed")]
    AllocationFailure,
    /// An element comparing equal to the inserted one is already held
    #[error("an equal element is already present")]
    DuplicateKey,
    /// No held element compares equal to the requested one
    #[error("element not found")]
    NotFound,
    /// A `for_each` visitor reported failure and stopped the traversal
    #[error("visitor failed after {visited} element(s)")]
    CallbackFailure {
        /// Number of elements handed to the visitor, the failing one included
        visited: usize,
    },
}
