//! PKCE (RFC 7636) verifier/challenge generation and the anti-CSRF `state`
//! parameter. Encodings match what the providers accept: URL-safe unpadded
//! base64 for the PKCE pair, standard base64 for `state`.

use {
    base64::{
        Engine,
        engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    },
    rand::RngCore,
    sha2::{Digest, Sha256},
};

/// PKCE verifier and its derived S256 challenge.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

/// Generate a fresh PKCE pair: 32 random bytes as the verifier, SHA-256 of
/// its ASCII form as the challenge, both URL-safe base64 without padding.
pub fn generate_pkce() -> PkceChallenge {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let verifier = URL_SAFE_NO_PAD.encode(bytes);
    let challenge = challenge_s256(&verifier);
    PkceChallenge {
        verifier,
        challenge,
    }
}

/// Derive the S256 code challenge for a verifier.
pub fn challenge_s256(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Generate an unpredictable single-use `state` value (16 random bytes).
pub fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_is_url_safe_and_long_enough() {
        let pkce = generate_pkce();
        // 32 bytes -> 43 unpadded base64 chars, the RFC 7636 minimum.
        assert_eq!(pkce.verifier.len(), 43);
        assert!(
            pkce.verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn challenge_matches_rfc7636_vector() {
        // Appendix B of RFC 7636.
        let challenge = challenge_s256("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
        assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn challenge_is_derived_from_verifier() {
        let pkce = generate_pkce();
        assert_eq!(pkce.challenge, challenge_s256(&pkce.verifier));
        assert_ne!(pkce.challenge, pkce.verifier);
    }

    #[test]
    fn state_values_are_unique() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }
}
