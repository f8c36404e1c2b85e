//! Contiguous collection types: [`Vector`] and its raw slot buffer.

mod raw;
pub mod vector;

#[doc(inline)]
pub use vector::Vector;
