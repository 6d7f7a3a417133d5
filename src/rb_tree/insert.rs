use core::cmp::Ordering;
use log::{debug, trace};

use super::{Color, NIL, RbTree, Search};
use crate::{Compare, Destroy, TreeError};

impl<T, C, D> RbTree<T, C, D>
where
    C: Compare<T>,
    D: Destroy<T>,
{
    /// Inserts `value` into the tree.
    ///
    /// The new element starts as a red leaf at the position found by the comparator
    /// walk, then red-black balance is restored by recoloring and at most two
    /// rotations. A rejected value is dropped and the tree is left unchanged.
    ///
    /// # Arguments
    ///
    /// * `value` - The element to insert
    ///
    /// # Returns
    ///
    /// * `Result<(), TreeError>` - `DuplicateKey` if an equal element is held,
    ///   `AllocationFailure` if no slot could be obtained
    pub fn insert(&mut self, value: T) -> Result<(), TreeError> {
        let (parent, ordering) = match self.search(&value) {
            Search::Found(existing) => {
                debug!("insert rejected, equal element held at slot {existing}");
                return Err(TreeError::DuplicateKey);
            }
            Search::Vacant { parent, ordering } => (parent, ordering),
        };

        let new_idx = self.allocate_node(value, parent)?;
        self.link_to_parent(new_idx, parent, ordering);
        self.len += 1;

        if parent == NIL {
            self.set_color(new_idx, Color::Black);
        } else if self.is_red(parent) {
            self.fix_insertion_violations(new_idx);
        }

        #[cfg(debug_assertions)]
        debug_assert!(
            self.verify_rb_invariants(),
            "RB tree invariants violated after insertion"
        );

        Ok(())
    }

    fn link_to_parent(&mut self, node_idx: usize, parent_idx: usize, ordering: Ordering) {
        if parent_idx == NIL {
            self.root = node_idx;
        } else if ordering == Ordering::Less {
            self.nodes[parent_idx].left = node_idx;
        } else {
            self.nodes[parent_idx].right = node_idx;
        }
    }

    fn fix_insertion_violations(&mut self, mut node: usize) {
        while node != self.root && self.is_red(self.get_parent(node)) {
            let parent = self.get_parent(node);
            let grandparent = self.get_parent(parent);

            if parent == self.get_left(grandparent) {
                let uncle = self.get_right(grandparent);

                if self.is_red(uncle) {
                    trace!("insert fixup: red uncle at slot {uncle}, recolor");
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.get_right(parent) {
                        node = parent;
                        self.rotate_left(node);
                    }
                    let updated_parent = self.get_parent(node);
                    let updated_grandparent = self.get_parent(updated_parent);
                    self.set_color(updated_parent, Color::Black);
                    self.set_color(updated_grandparent, Color::Red);
                    self.rotate_right(updated_grandparent);
                }
            } else {
                let uncle = self.get_left(grandparent);

                if self.is_red(uncle) {
                    trace!("insert fixup: red uncle at slot {uncle}, recolor");
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.get_left(parent) {
                        node = parent;
                        self.rotate_right(node);
                    }
                    let updated_parent = self.get_parent(node);
                    let updated_grandparent = self.get_parent(updated_parent);
                    self.set_color(updated_parent, Color::Black);
                    self.set_color(updated_grandparent, Color::Red);
                    self.rotate_left(updated_grandparent);
                }
            }
        }
        self.set_color(self.root, Color::Black);
    }
}
