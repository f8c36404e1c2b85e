//! The type-erasure core: [`TypeTag`], the erased [`Value`] payload, the per-type [`OpsTable`]
//! and the [`TypedCell`] through which containers mediate all element access.

mod cell;
mod ops;
mod tag;
mod value;

pub use cell::*;
pub use ops::*;
pub use tag::*;
pub use value::*;
