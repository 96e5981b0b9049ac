//! Twitter/X platform adapter.
//!
//! OAuth 2.0 authorization-code flow with PKCE (S256), v2 API for posting
//! and profile lookup, v1.1 chunked-media host for uploads. Twitter is the
//! only built-in platform that issues refresh tokens, via the
//! `offline.access` scope.

mod adapter;

pub use adapter::{DESCRIPTOR, TwitterAdapter, TwitterEndpoints};
