//! A module containing [`Vector`], the uniform-type dynamic array.

mod tests;
mod vector;

pub use vector::*;
