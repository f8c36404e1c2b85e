use derive_more::{Display, Error, IsVariant};

use crate::cell::TypeTag;

/// The closed set of failure codes used across the crate.
///
/// Every fallible operation reports one of these; comparison callbacks which return an [`Err`]
/// cause the surrounding scan to abort with that same value. Allocation failure ([`Error::NoMem`])
/// additionally guarantees that the container involved was left exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, IsVariant)]
pub enum Error {
    /// A propagated failure without a more specific code, typically surfaced from a user callback.
    #[display("Operation failed!")]
    Failure,
    /// The requested operation has neither an override nor a default for the type in question.
    #[display("No method available for the requested operation!")]
    NoSuchMethod,
    /// An allocation failed. The operation had no effect.
    #[display("Allocation failure!")]
    NoMem,
    /// A malformed call: out-of-range index, undersized buffer, or an inapplicable option.
    #[display("Bad parameter!")]
    BadParam,
    /// A value's type tag didn't match the tag expected by its table or container.
    #[display("Type mismatch: expected {expected}, found {found}!")]
    TypeMismatch {
        expected: TypeTag,
        found: TypeTag,
    },
}

impl Error {
    /// Shorthand for building an [`Error::TypeMismatch`] from the two tags involved.
    pub const fn mismatch(expected: TypeTag, found: TypeTag) -> Error {
        Error::TypeMismatch { expected, found }
    }
}
