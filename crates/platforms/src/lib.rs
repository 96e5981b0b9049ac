//! Platform adapter system.
//!
//! Each social network (Twitter/X, LinkedIn, Instagram, ...) implements the
//! [`PlatformAdapter`] trait: descriptor + constraints, authorization URL
//! construction, code exchange, profile fetch, and publishing. The
//! [`PlatformRegistry`] is how the connection manager and dispatcher resolve
//! platform ids to adapters.

pub mod adapter;
pub mod content;
pub mod descriptor;
pub mod error;
pub mod registry;

pub use {
    adapter::{PlatformAdapter, TokenRefresh},
    content::{MediaKind, PostContent, extract_hashtags},
    descriptor::{PlatformConstraints, PlatformDescriptor},
    error::{Error, Result},
    registry::PlatformRegistry,
};
