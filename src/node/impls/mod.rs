//! `Node` implementations for the standard types.

mod arrays;
mod collections;
mod option;
mod scalar;
