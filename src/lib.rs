//! Runtime-typed containers: collections whose element type is chosen when the container is
//! created, not when the code is compiled.
//!
//! # Purpose
//! Everything in this crate revolves around a small type-erasure core. A [`TypeTag`](cell::TypeTag)
//! names one of a closed set of element kinds, a [`Value`](cell::Value) holds one element of any
//! of those kinds in a fixed-size slot, and a [`TypedCell`](cell::TypedCell) mediates access to a
//! value, dispatching through an optional per-type [`OpsTable`](cell::OpsTable) of
//! construct/copy/destruct/compare overrides. The containers in [`collections`] store `Value`s and
//! route every element operation through that machinery, so a
//! [`Vector`](collections::contiguous::Vector) of strings and a `Vector` of nested vectors are the
//! same type at compile time.
//!
//! This is deliberately not how one writes a Rust-native collection; `std` generics already do
//! this job better when the element type is known at compile time. The crate exists for the cases
//! where it isn't: interpreters, config and message plumbing, and other code that decides element
//! types from runtime data.
//!
//! # Error Handling
//! Anything that can fail returns a [`Result`] with the strongly typed [`Error`] enum; that
//! includes allocation, which surfaces as [`Error::NoMem`] instead of aborting. Fallible
//! operations are failure-atomic: an error means the container looks exactly as it did before the
//! call. The panicking convenience constructors are thin wrappers over the fallible ones.
//!
//! # Concurrency
//! Containers carry a shared scratch [`TypedCell`](cell::TypedCell) and raw buffers, making them
//! inherently single-threaded (`!Send`/`!Sync`). Element-touching traversals take `&mut self`
//! because of that scratch view, even when they only read.

#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod cell;
pub mod collections;
pub mod options;

pub(crate) mod util;

pub use util::error::Error;
