//! Instagram platform adapter.
//!
//! OAuth against api.instagram.com, content publishing against the Graph
//! host. Short-lived tokens are swapped for long-lived ones during code
//! exchange, and every post goes through the container-then-publish
//! two-step. Instagram is media-first: posts without media are rejected.

mod adapter;

pub use adapter::{DESCRIPTOR, InstagramAdapter, InstagramEndpoints};
