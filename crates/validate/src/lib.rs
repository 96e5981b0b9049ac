//! Per-platform content validation.
//!
//! Pure functions from (descriptor, content) to a [`Verdict`]. Errors block
//! dispatch to that platform; warnings never do.

pub mod guidelines;
pub mod rules;

pub use rules::{Verdict, validate};
