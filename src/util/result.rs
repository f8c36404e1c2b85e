use std::error::Error;

pub(crate) trait ResultExtension<T, E: Error> {
    /// Behaves like [`Result::unwrap`] for error types implementing [`Error`], except that the
    /// panic message is the error's own [`Display`](std::fmt::Display) output.
    ///
    /// This is the fail-fast boundary for callers who don't want to handle the `try_*` surface:
    /// the recoverable API stays primary and this wrapper panics on the first error.
    ///
    /// # Panics
    /// Panics if the [`Result`] is an [`Err`].
    fn throw(self) -> T;
}

impl<T, E: Error> ResultExtension<T, E> for Result<T, E> {
    fn throw(self) -> T {
        match self {
            Ok(val) => val,
            Err(error) => panic!("{}", error),
        }
    }
}
