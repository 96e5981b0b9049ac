//! Connection lifecycle for social platforms.
//!
//! The [`ConnectionManager`] owns the OAuth dance per platform (initiate,
//! callback completion, persisted record), answers status queries without
//! touching the network, and silently refreshes expired tokens where the
//! platform supports it. Records persist behind the narrow
//! [`ConnectionStore`] trait so the backing can be swapped without touching
//! the manager.

pub mod error;
pub mod manager;
pub mod store;
pub mod store_file;
pub mod store_memory;
pub mod types;

pub use {
    error::{Error, Result},
    manager::ConnectionManager,
    store::ConnectionStore,
    store_file::FileStore,
    store_memory::InMemoryStore,
    types::{AuthorizeTicket, ConnectionRecord, ConnectionStatus},
};
