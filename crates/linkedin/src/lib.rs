//! LinkedIn platform adapter.
//!
//! Plain OAuth 2.0 authorization-code flow (no PKCE), UGC posts API for
//! publishing. Image attachments go through the registerUpload asset flow
//! before the post references them by URN.

mod adapter;
mod media;

pub use adapter::{DESCRIPTOR, LinkedInAdapter, LinkedInEndpoints};
