use std::time::Duration;

use {
    async_trait::async_trait,
    crier_oauth::{AppCredentials, TokenGrant},
    crier_platforms::{
        Error, MediaKind, PlatformAdapter, PlatformConstraints, PlatformDescriptor, PostContent,
        Result,
    },
    secrecy::{ExposeSecret, Secret},
    serde_json::Value,
    tracing::{debug, info},
};

/// Identity and publishing constraints, usable without credentials.
pub static DESCRIPTOR: PlatformDescriptor = PlatformDescriptor {
    id: "instagram",
    display_name: "Instagram",
    color: "#E4405F",
    icon: "\u{1f4f7}",
    constraints: PlatformConstraints {
        max_text_length: 2200,
        supports_images: true,
        supports_videos: true,
        requires_media: true,
        max_hashtags: 30,
        optimal_hashtags: 11,
    },
};

const OAUTH_SCOPE: &str = "user_profile,user_media,instagram_basic,instagram_content_publish";
const PROFILE_FIELDS: &str =
    "id,username,media_count,followers_count,follows_count,profile_picture_url,biography,website";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Instagram host pair. OAuth lives on api.instagram.com, everything else
/// on the Graph host. Tests point both at a local mock server.
#[derive(Debug, Clone)]
pub struct InstagramEndpoints {
    pub oauth_base: String,
    pub graph_base: String,
}

impl Default for InstagramEndpoints {
    fn default() -> Self {
        Self {
            oauth_base: "https://api.instagram.com".into(),
            graph_base: "https://graph.instagram.com".into(),
        }
    }
}

#[derive(serde::Deserialize)]
struct ShortTokenResponse {
    access_token: String,
}

#[derive(serde::Deserialize)]
struct LongTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

pub struct InstagramAdapter {
    credentials: AppCredentials,
    endpoints: InstagramEndpoints,
    client: reqwest::Client,
}

impl InstagramAdapter {
    #[must_use]
    pub fn new(credentials: AppCredentials) -> Self {
        Self::with_endpoints(credentials, InstagramEndpoints::default())
    }

    #[must_use]
    pub fn with_endpoints(credentials: AppCredentials, endpoints: InstagramEndpoints) -> Self {
        Self {
            credentials,
            endpoints,
            client: reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Swap a short-lived token for a long-lived one (~60 days).
    async fn exchange_long_lived(&self, short_token: &str) -> Result<LongTokenResponse> {
        let resp = self
            .client
            .get(format!("{}/access_token", self.endpoints.graph_base))
            .query(&[
                ("grant_type", "ig_exchange_token"),
                ("client_secret", self.credentials.client_secret.expose_secret()),
                ("access_token", short_token),
            ])
            .send()
            .await
            .map_err(|source| Error::external("instagram long-lived token exchange", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "instagram long-lived token exchange returned HTTP {status}: {body}"
            )));
        }

        resp.json().await.map_err(|source| {
            Error::external("failed to parse instagram long-lived token response", source)
        })
    }

    /// Create a media container for the post. Returns the container id to
    /// hand to `me/media_publish`.
    async fn create_container(
        &self,
        access_token: &Secret<String>,
        content: &PostContent,
        media_url: &str,
    ) -> Result<String> {
        let (url_param, media_type) = match content.media_kind {
            Some(MediaKind::Video) => ("video_url", "VIDEO"),
            _ => ("image_url", "IMAGE"),
        };
        let resp = self
            .client
            .post(format!("{}/me/media", self.endpoints.graph_base))
            .form(&[
                ("access_token", access_token.expose_secret().as_str()),
                (url_param, media_url),
                ("media_type", media_type),
                ("caption", content.text.as_str()),
            ])
            .send()
            .await
            .map_err(|source| Error::external("failed to create instagram container", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "instagram container create returned HTTP {status}: {body}"
            )));
        }

        let body: Value = resp.json().await.map_err(|source| {
            Error::external("failed to parse instagram container response", source)
        })?;
        let container_id = body["id"]
            .as_str()
            .ok_or_else(|| Error::unexpected("instagram container response missing id"))?;
        debug!(container_id, media_type, "created instagram media container");
        Ok(container_id.to_string())
    }
}

#[async_trait]
impl PlatformAdapter for InstagramAdapter {
    fn descriptor(&self) -> &PlatformDescriptor {
        &DESCRIPTOR
    }

    fn authorize_url(&self, state: &str, _challenge: Option<&str>) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("redirect_uri", &self.credentials.redirect_uri)
            .append_pair("scope", OAUTH_SCOPE)
            .append_pair("response_type", "code")
            .append_pair("state", state);
        format!(
            "{}/oauth/authorize?{}",
            self.endpoints.oauth_base,
            query.finish()
        )
    }

    /// Code exchange immediately swaps the short-lived token for a
    /// long-lived one; only the long-lived token is ever stored.
    async fn exchange_code(&self, code: &str, _verifier: Option<&str>) -> Result<TokenGrant> {
        let form = reqwest::multipart::Form::new()
            .text("client_id", self.credentials.client_id.clone())
            .text(
                "client_secret",
                self.credentials.client_secret.expose_secret().clone(),
            )
            .text("grant_type", "authorization_code")
            .text("redirect_uri", self.credentials.redirect_uri.clone())
            .text("code", code.to_string());

        let resp = self
            .client
            .post(format!(
                "{}/oauth/access_token",
                self.endpoints.oauth_base
            ))
            .multipart(form)
            .send()
            .await
            .map_err(|source| Error::external("instagram token exchange", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "instagram token exchange returned HTTP {status}: {body}"
            )));
        }

        let short: ShortTokenResponse = resp.json().await.map_err(|source| {
            Error::external("failed to parse instagram token response", source)
        })?;

        let long = self.exchange_long_lived(&short.access_token).await?;
        info!("exchanged instagram authorization code for long-lived token");
        Ok(TokenGrant {
            access_token: Secret::new(long.access_token),
            refresh_token: None,
            expires_in_secs: long.expires_in,
        })
    }

    /// Graph API authenticates with the token as a query parameter.
    async fn fetch_profile(&self, access_token: &Secret<String>) -> Result<Value> {
        let resp = self
            .client
            .get(format!("{}/me", self.endpoints.graph_base))
            .query(&[
                ("fields", PROFILE_FIELDS),
                ("access_token", access_token.expose_secret()),
            ])
            .send()
            .await
            .map_err(|source| Error::external("failed to fetch instagram profile", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "instagram profile lookup returned HTTP {status}: {body}"
            )));
        }

        resp.json()
            .await
            .map_err(|source| Error::external("failed to parse instagram profile response", source))
    }

    async fn publish(
        &self,
        access_token: &Secret<String>,
        content: &PostContent,
        _profile: &Value,
    ) -> Result<String> {
        let media_url = content
            .media_url
            .as_deref()
            .ok_or_else(|| Error::message("instagram posts require media"))?;

        let container_id = self
            .create_container(access_token, content, media_url)
            .await?;

        let resp = self
            .client
            .post(format!("{}/me/media_publish", self.endpoints.graph_base))
            .form(&[
                ("access_token", access_token.expose_secret().as_str()),
                ("creation_id", container_id.as_str()),
            ])
            .send()
            .await
            .map_err(|source| Error::external("failed to publish instagram media", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "instagram media publish returned HTTP {status}: {body}"
            )));
        }

        let body: Value = resp.json().await.map_err(|source| {
            Error::external("failed to parse instagram publish response", source)
        })?;
        let post_id = body["id"]
            .as_str()
            .ok_or_else(|| Error::unexpected("instagram publish response missing id"))?;
        info!(post_id, "instagram post published");
        Ok(post_id.to_string())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn adapter_for(server: &mockito::ServerGuard) -> InstagramAdapter {
        let url = server.url();
        InstagramAdapter::with_endpoints(
            AppCredentials::new("client-1", "shhh", "http://127.0.0.1:9400/callback"),
            InstagramEndpoints {
                oauth_base: url.clone(),
                graph_base: url,
            },
        )
    }

    #[test]
    fn authorize_url_lists_publish_scope() {
        let adapter = InstagramAdapter::new(AppCredentials::new(
            "client-1",
            "shhh",
            "http://127.0.0.1:9400/callback",
        ));
        let url = adapter.authorize_url("st4te", None);

        assert!(url.starts_with("https://api.instagram.com/oauth/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("state=st4te"));
        assert!(url.contains("instagram_content_publish"));
        assert!(!url.contains("code_challenge"));
        assert!(!adapter.uses_pkce());
        assert!(adapter.refresher().is_none());
        assert!(adapter.descriptor().constraints.requires_media);
    }

    #[tokio::test]
    async fn exchange_swaps_short_token_for_long() {
        let mut server = mockito::Server::new_async().await;
        let short = server
            .mock("POST", "/oauth/access_token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"SHORT-1","user_id":99}"#)
            .create_async()
            .await;
        let long = server
            .mock("GET", "/access_token")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "ig_exchange_token".into()),
                Matcher::UrlEncoded("client_secret".into(), "shhh".into()),
                Matcher::UrlEncoded("access_token".into(), "SHORT-1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"LONG-1","token_type":"bearer","expires_in":5183944}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let grant = adapter.exchange_code("ig_c0de", None).await.unwrap();

        assert_eq!(grant.access_token.expose_secret(), "LONG-1");
        assert!(grant.refresh_token.is_none());
        assert_eq!(grant.expires_in_secs, Some(5183944));
        short.assert_async().await;
        long.assert_async().await;
    }

    #[tokio::test]
    async fn profile_authenticates_via_query_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/me")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("fields".into(), PROFILE_FIELDS.into()),
                Matcher::UrlEncoded("access_token".into(), "LONG-1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"998","username":"crier.shots","media_count":42}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let profile = adapter
            .fetch_profile(&Secret::new("LONG-1".into()))
            .await
            .unwrap();

        assert_eq!(profile["username"], "crier.shots");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn publish_runs_container_then_publish() {
        let mut server = mockito::Server::new_async().await;
        let container = server
            .mock("POST", "/me/media")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("access_token".into(), "LONG-1".into()),
                Matcher::UrlEncoded("image_url".into(), "https://cdn.example/p.png".into()),
                Matcher::UrlEncoded("media_type".into(), "IMAGE".into()),
                Matcher::UrlEncoded("caption".into(), "sunset #nofilter".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"container-5"}"#)
            .create_async()
            .await;
        let publish = server
            .mock("POST", "/me/media_publish")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("access_token".into(), "LONG-1".into()),
                Matcher::UrlEncoded("creation_id".into(), "container-5".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"ig-post-31","media_type":"IMAGE"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let content = PostContent::new(
            "sunset #nofilter",
            Some("https://cdn.example/p.png".into()),
            Some(MediaKind::Image),
        );
        let post_id = adapter
            .publish(&Secret::new("LONG-1".into()), &content, &Value::Null)
            .await
            .unwrap();

        assert_eq!(post_id, "ig-post-31");
        container.assert_async().await;
        publish.assert_async().await;
    }

    #[tokio::test]
    async fn video_containers_use_the_video_url_param() {
        let mut server = mockito::Server::new_async().await;
        let container = server
            .mock("POST", "/me/media")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("video_url".into(), "https://cdn.example/v.mp4".into()),
                Matcher::UrlEncoded("media_type".into(), "VIDEO".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"container-6"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/me/media_publish")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"ig-post-32"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let content = PostContent::new(
            "clip",
            Some("https://cdn.example/v.mp4".into()),
            Some(MediaKind::Video),
        );
        let post_id = adapter
            .publish(&Secret::new("LONG-1".into()), &content, &Value::Null)
            .await
            .unwrap();

        assert_eq!(post_id, "ig-post-32");
        container.assert_async().await;
    }

    #[tokio::test]
    async fn publish_without_media_is_rejected() {
        let adapter = InstagramAdapter::new(AppCredentials::new(
            "client-1",
            "shhh",
            "http://127.0.0.1:9400/callback",
        ));
        let err = adapter
            .publish(
                &Secret::new("LONG-1".into()),
                &PostContent::text_only("no pic"),
                &Value::Null,
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("require media"));
    }
}
