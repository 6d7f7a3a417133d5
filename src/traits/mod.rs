mod compare;
pub use compare::{Compare, NaturalOrder};

mod destroy;
pub use destroy::{Destroy, DropElement};
