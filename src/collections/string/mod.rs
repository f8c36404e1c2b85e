//! A module containing [`ByteString`], the small-buffer-optimized byte string.

mod byte_string;

pub use byte_string::*;
