//! Shared error plumbing and small utilities used across all crier crates.

pub mod error;
pub mod time;

pub use {
    error::{CrierError, Error, FromMessage, Result},
    time::now_ms,
};
