use {
    crier_oauth::{serialize_option_secret, serialize_secret},
    secrecy::Secret,
    serde::{Deserialize, Serialize},
};

/// Persisted credentials and profile for one connected platform.
///
/// Created on successful OAuth completion, overwritten on reconnect, deleted
/// on disconnect. The connection manager is the sole writer.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub platform_id: String,
    #[serde(serialize_with = "serialize_secret")]
    pub access_token: Secret<String>,
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<Secret<String>>,
    /// Epoch millis when the access token expires. Absent means no known
    /// expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
    /// Provider-shaped profile JSON captured at connect time.
    pub user_info: serde_json::Value,
    pub connected_at_ms: u64,
}

impl ConnectionRecord {
    /// Usable right now: token present and not past its expiry.
    #[must_use]
    pub fn is_live(&self, now_ms: u64) -> bool {
        self.expires_at_ms.is_none_or(|at| now_ms < at)
    }
}

impl std::fmt::Debug for ConnectionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRecord")
            .field("platform_id", &self.platform_id)
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at_ms", &self.expires_at_ms)
            .field("connected_at_ms", &self.connected_at_ms)
            .finish()
    }
}

/// Read-only connection view served by status queries. Never carries tokens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub platform_id: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<serde_json::Value>,
    /// Detail from the most recent failed completion attempt, cleared by the
    /// next successful connect or by disconnect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Where to send the user's browser, handed back by initiate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeTicket {
    pub platform_id: String,
    pub url: String,
    /// Anti-CSRF state the provider will echo back; completion must present
    /// it unchanged.
    pub state: String,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn record(expires_at_ms: Option<u64>) -> ConnectionRecord {
        ConnectionRecord {
            platform_id: "twitter".into(),
            access_token: Secret::new("acc-secret".into()),
            refresh_token: Some(Secret::new("ref-secret".into())),
            expires_at_ms,
            user_info: serde_json::json!({"username": "crier"}),
            connected_at_ms: 1_000,
        }
    }

    #[test]
    fn liveness_follows_expiry() {
        assert!(record(None).is_live(5_000));
        assert!(record(Some(6_000)).is_live(5_000));
        assert!(!record(Some(5_000)).is_live(5_000));
    }

    #[test]
    fn serde_round_trip_preserves_tokens() {
        use secrecy::ExposeSecret;

        let json = serde_json::to_string(&record(Some(9_000))).unwrap();
        let back: ConnectionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.access_token.expose_secret(), "acc-secret");
        assert_eq!(back.refresh_token.unwrap().expose_secret(), "ref-secret");
        assert_eq!(back.expires_at_ms, Some(9_000));
    }

    #[test]
    fn debug_redacts_tokens() {
        let debug = format!("{:?}", record(None));
        assert!(!debug.contains("acc-secret"));
        assert!(!debug.contains("ref-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
