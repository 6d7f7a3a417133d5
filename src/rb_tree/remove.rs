use log::{debug, trace};

use super::{Color, NIL, Node, RbTree};
use crate::{Compare, Destroy, TreeError};

impl<T, C, D> RbTree<T, C, D>
where
    C: Compare<T>,
    D: Destroy<T>,
{
    /// Removes the element comparing equal to `value` and hands it to the destructor
    ///
    /// # Arguments
    ///
    /// * `value` - The element to remove
    ///
    /// # Returns
    ///
    /// * `Result<(), TreeError>` - `NotFound` if no equal element is held
    pub fn remove(&mut self, value: &T) -> Result<(), TreeError> {
        let removed = self.take(value)?;
        self.destroy.destroy(removed);
        Ok(())
    }

    /// Removes the element comparing equal to `value` and returns it to the caller
    /// instead of the destructor
    ///
    /// # Arguments
    ///
    /// * `value` - The element to remove
    ///
    /// # Returns
    ///
    /// * `Result<T, TreeError>` - The removed element, or `NotFound`
    pub fn take(&mut self, value: &T) -> Result<T, TreeError> {
        let Some(mut node) = self.find_node(value) else {
            debug!("remove rejected, no equal element among {}", self.len);
            return Err(TreeError::NotFound);
        };

        if self.len == 1 {
            self.root = NIL;
        } else {
            let Node { left, right, .. } = self.nodes[node];
            if left != NIL && right != NIL {
                // Move the successor's payload up; its slot (at most one child) is the one unlinked
                let successor = self.find_minimum(right);
                self.values.swap(node, successor);
                node = successor;
            }
            self.unlink_node(node);
        }

        self.len -= 1;
        let removed = self.release_node(node);

        #[cfg(debug_assertions)]
        debug_assert!(
            self.verify_rb_invariants(),
            "RB tree invariants violated after removal"
        );

        Ok(removed)
    }

    /// Detaches a node with at most one child, restoring balance first when a black
    /// leaf is about to disappear
    fn unlink_node(&mut self, node: usize) {
        let Node {
            left, right, color, ..
        } = self.nodes[node];
        let child = if left != NIL { left } else { right };

        match color {
            // A red node with at most one child has none
            Color::Red => self.transplant(node, child),
            // A black node's only child is red: it takes the node's place and color
            Color::Black if child != NIL => {
                self.transplant(node, child);
                self.set_color(child, Color::Black);
            }
            Color::Black => {
                self.fix_double_black(node);
                self.transplant(node, NIL);
            }
        }
    }

    /// Rebalances around `node`, a black node whose subtree is about to lose one
    /// black level, while it is still linked into the tree
    fn fix_double_black(&mut self, mut node: usize) {
        while node != self.root {
            let parent = self.get_parent(node);

            if node == self.get_left(parent) {
                let mut sibling = self.get_right(parent);

                if self.is_red(sibling) {
                    trace!("remove fixup: red sibling at slot {sibling}, rotate left");
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    sibling = self.get_right(parent);
                }

                if self.is_black(self.get_left(sibling)) && self.is_black(self.get_right(sibling)) {
                    self.set_color(sibling, Color::Red);
                    if self.is_red(parent) {
                        trace!("remove fixup: absorbed by red parent at slot {parent}");
                        self.set_color(parent, Color::Black);
                        break;
                    }
                    node = parent;
                } else {
                    if self.is_black(self.get_right(sibling)) {
                        self.set_color(self.get_left(sibling), Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.get_right(parent);
                    }

                    self.set_color(sibling, self.get_color(parent));
                    self.set_color(parent, Color::Black);
                    self.set_color(self.get_right(sibling), Color::Black);
                    self.rotate_left(parent);
                    break;
                }
            } else {
                let mut sibling = self.get_left(parent);

                if self.is_red(sibling) {
                    trace!("remove fixup: red sibling at slot {sibling}, rotate right");
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sibling = self.get_left(parent);
                }

                if self.is_black(self.get_right(sibling)) && self.is_black(self.get_left(sibling)) {
                    self.set_color(sibling, Color::Red);
                    if self.is_red(parent) {
                        trace!("remove fixup: absorbed by red parent at slot {parent}");
                        self.set_color(parent, Color::Black);
                        break;
                    }
                    node = parent;
                } else {
                    if self.is_black(self.get_left(sibling)) {
                        self.set_color(self.get_right(sibling), Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.get_left(parent);
                    }

                    self.set_color(sibling, self.get_color(parent));
                    self.set_color(parent, Color::Black);
                    self.set_color(self.get_left(sibling), Color::Black);
                    self.rotate_right(parent);
                    break;
                }
            }
        }
        self.set_color(self.root, Color::Black);
    }
}
