use alloc::string::String;
use core::cmp::Ordering;

use crate::{Compare, helper::compare_sequences};

/// Orders strings lexicographically by byte; when one string is a prefix of the
/// other, the shorter one is smaller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringOrder;

impl<S> Compare<S> for StringOrder
where
    S: AsRef<str> + ?Sized,
{
    fn compare(&self, a: &S, b: &S) -> Ordering {
        compare_sequences(a.as_ref().as_bytes(), b.as_ref().as_bytes(), u8::cmp)
    }
}

/// `for_each` visitor appending `word` and a line break to `out`
///
/// # Arguments
///
/// * `word` - The visited element
/// * `out` - The text being built
///
/// # Returns
///
/// * `bool` - `false` if `out` could not grow, which stops the traversal
///
/// # Examples
///
/// ```
/// use arena_rbtree::{DropElement, RbTree, StringOrder, concatenate_line};
///
/// let mut tree = RbTree::new(StringOrder, DropElement);
/// for word in ["pear", "apple", "app"] {
///     tree.insert(String::from(word)).unwrap();
/// }
///
/// let mut text = String::new();
/// tree.for_each(concatenate_line, &mut text).unwrap();
/// assert_eq!(text, "app\napple\npear\n");
/// ```
pub fn concatenate_line<S>(word: &S, out: &mut String) -> bool
where
    S: AsRef<str> + ?Sized,
{
    let word = word.as_ref();
    if out.try_reserve(word.len() + 1).is_err() {
        return false;
    }
    out.push_str(word);
    out.push('\n');
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DropElement, RbTree, TreeError};

    #[test]
    fn test_string_order() {
        assert_eq!(StringOrder.compare("abc", "abd"), Ordering::Less);
        assert_eq!(StringOrder.compare("b", "abc"), Ordering::Greater);
        assert_eq!(StringOrder.compare("ab", "abc"), Ordering::Less);
        assert_eq!(StringOrder.compare("abc", "ab"), Ordering::Greater);
        assert_eq!(StringOrder.compare("", ""), Ordering::Equal);
        assert_eq!(StringOrder.compare("Z", "a"), Ordering::Less);
    }

    #[test]
    fn test_string_tree_concatenates_in_order() {
        let mut tree = RbTree::new(StringOrder, DropElement);
        for word in ["delta", "alpha", "charlie", "bravo", "al"] {
            tree.insert(String::from(word)).unwrap();
        }
        assert_eq!(
            tree.insert(String::from("bravo")),
            Err(TreeError::DuplicateKey)
        );

        let mut text = String::new();
        tree.for_each(concatenate_line, &mut text).unwrap();
        assert_eq!(text, "al\nalpha\nbravo\ncharlie\ndelta\n");

        tree.remove(&String::from("charlie")).unwrap();
        text.clear();
        tree.for_each(concatenate_line, &mut text).unwrap();
        assert_eq!(text, "al\nalpha\nbravo\ndelta\n");
    }
}
