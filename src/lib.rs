#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]

extern crate alloc;

mod utils;
pub use utils::helper;

mod traits;
pub use traits::{Compare, Destroy, DropElement, NaturalOrder};

mod error;
pub use error::TreeError;

mod rb_tree;
pub use rb_tree::{Iter, RbTree};

mod vector;
pub use vector::{Vector, VectorOrder, find_max_norm_vector};

mod string;
pub use string::{StringOrder, concatenate_line};
