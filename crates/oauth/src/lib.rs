//! OAuth 2.0 building blocks shared by the platform adapters: PKCE and state
//! generation, token grant types, and a loopback listener that captures the
//! provider's authorization redirect.

pub mod callback;
pub mod error;
pub mod pkce;
pub mod types;

pub use {
    callback::{CallbackListener, CallbackParams},
    error::{Error, Result},
    pkce::{PkceChallenge, generate_pkce, generate_state},
    types::{AppCredentials, TokenGrant, serialize_option_secret, serialize_secret},
};
