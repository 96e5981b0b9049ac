use std::time::Duration;

use {
    async_trait::async_trait,
    crier_oauth::{AppCredentials, TokenGrant},
    crier_platforms::{
        Error, MediaKind, PlatformAdapter, PlatformConstraints, PlatformDescriptor, PostContent,
        Result,
    },
    secrecy::{ExposeSecret, Secret},
    serde_json::{Value, json},
    tracing::{debug, info},
};

/// Identity and publishing constraints, usable without credentials.
pub static DESCRIPTOR: PlatformDescriptor = PlatformDescriptor {
    id: "linkedin",
    display_name: "LinkedIn",
    color: "#0077B5",
    icon: "\u{1f4bc}",
    constraints: PlatformConstraints {
        max_text_length: 3000,
        supports_images: true,
        supports_videos: true,
        requires_media: false,
        max_hashtags: 5,
        optimal_hashtags: 3,
    },
};

const OAUTH_SCOPE: &str = "w_member_social,r_liteprofile,r_emailaddress";
const PROFILE_PROJECTION: &str =
    "~:(id,localizedFirstName,localizedLastName,profilePicture(displayImage~:playableStreams))";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// LinkedIn host set. Tests point these at a local mock server.
#[derive(Debug, Clone)]
pub struct LinkedInEndpoints {
    pub auth_base: String,
    pub api_base: String,
}

impl Default for LinkedInEndpoints {
    fn default() -> Self {
        Self {
            auth_base: "https://www.linkedin.com".into(),
            api_base: "https://api.linkedin.com".into(),
        }
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

pub struct LinkedInAdapter {
    pub(crate) credentials: AppCredentials,
    pub(crate) endpoints: LinkedInEndpoints,
    pub(crate) client: reqwest::Client,
}

impl LinkedInAdapter {
    #[must_use]
    pub fn new(credentials: AppCredentials) -> Self {
        Self::with_endpoints(credentials, LinkedInEndpoints::default())
    }

    #[must_use]
    pub fn with_endpoints(credentials: AppCredentials, endpoints: LinkedInEndpoints) -> Self {
        Self {
            credentials,
            endpoints,
            client: reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl PlatformAdapter for LinkedInAdapter {
    fn descriptor(&self) -> &PlatformDescriptor {
        &DESCRIPTOR
    }

    fn authorize_url(&self, state: &str, _challenge: Option<&str>) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("redirect_uri", &self.credentials.redirect_uri)
            .append_pair("state", state)
            .append_pair("scope", OAUTH_SCOPE);
        format!(
            "{}/oauth/v2/authorization?{}",
            self.endpoints.auth_base,
            query.finish()
        )
    }

    /// LinkedIn puts the client secret in the form body, not basic auth.
    async fn exchange_code(&self, code: &str, _verifier: Option<&str>) -> Result<TokenGrant> {
        let resp = self
            .client
            .post(format!(
                "{}/oauth/v2/accessToken",
                self.endpoints.auth_base
            ))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.credentials.client_id),
                ("client_secret", self.credentials.client_secret.expose_secret()),
                ("redirect_uri", &self.credentials.redirect_uri),
            ])
            .send()
            .await
            .map_err(|source| Error::external("linkedin token exchange", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "linkedin token exchange returned HTTP {status}: {body}"
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|source| Error::external("failed to parse linkedin token response", source))?;
        info!("exchanged linkedin authorization code");
        Ok(TokenGrant {
            access_token: Secret::new(token.access_token),
            refresh_token: token.refresh_token.map(Secret::new),
            expires_in_secs: token.expires_in,
        })
    }

    async fn fetch_profile(&self, access_token: &Secret<String>) -> Result<Value> {
        let resp = self
            .client
            .get(format!(
                "{}/v2/people/{PROFILE_PROJECTION}",
                self.endpoints.api_base
            ))
            .bearer_auth(access_token.expose_secret())
            .send()
            .await
            .map_err(|source| Error::external("failed to fetch linkedin profile", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "linkedin profile lookup returned HTTP {status}: {body}"
            )));
        }

        resp.json()
            .await
            .map_err(|source| Error::external("failed to parse linkedin profile response", source))
    }

    async fn publish(
        &self,
        access_token: &Secret<String>,
        content: &PostContent,
        profile: &Value,
    ) -> Result<String> {
        let person_id = profile["id"]
            .as_str()
            .ok_or_else(|| Error::unexpected("linkedin profile missing id"))?;
        let author = format!("urn:li:person:{person_id}");

        let share_content = if let (Some(media_url), Some(MediaKind::Image)) =
            (&content.media_url, content.media_kind)
        {
            let asset = self.upload_image(access_token, media_url, &author).await?;
            json!({
                "shareCommentary": { "text": content.text },
                "shareMediaCategory": "IMAGE",
                "media": [{
                    "status": "READY",
                    "description": { "text": "Image description" },
                    "media": asset,
                    "title": { "text": "Image" }
                }]
            })
        } else {
            // Only image uploads are wired up; anything else posts as text.
            if content.has_media() {
                debug!("linkedin media is not an image, posting text only");
            }
            json!({
                "shareCommentary": { "text": content.text },
                "shareMediaCategory": "NONE"
            })
        };

        let body = json!({
            "author": author,
            "lifecycleState": "PUBLISHED",
            "specificContent": { "com.linkedin.ugc.ShareContent": share_content },
            "visibility": { "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC" }
        });

        let resp = self
            .client
            .post(format!("{}/v2/ugcPosts", self.endpoints.api_base))
            .bearer_auth(access_token.expose_secret())
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&body)
            .send()
            .await
            .map_err(|source| Error::external("failed to create linkedin post", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "linkedin post create returned HTTP {status}: {body}"
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|source| Error::external("failed to parse linkedin post response", source))?;
        let post_id = body["id"]
            .as_str()
            .ok_or_else(|| Error::unexpected("linkedin post response missing id"))?;
        info!(post_id, "linkedin post published");
        Ok(post_id.to_string())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn adapter_for(server: &mockito::ServerGuard) -> LinkedInAdapter {
        let url = server.url();
        LinkedInAdapter::with_endpoints(
            AppCredentials::new("client-1", "shhh", "http://127.0.0.1:9400/callback"),
            LinkedInEndpoints {
                auth_base: url.clone(),
                api_base: url,
            },
        )
    }

    fn default_adapter() -> LinkedInAdapter {
        LinkedInAdapter::new(AppCredentials::new(
            "client-1",
            "shhh",
            "http://127.0.0.1:9400/callback",
        ))
    }

    #[test]
    fn authorize_url_has_no_pkce() {
        let adapter = default_adapter();
        let url = adapter.authorize_url("st4te", None);

        assert!(url.starts_with("https://www.linkedin.com/oauth/v2/authorization?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("state=st4te"));
        assert!(url.contains("w_member_social%2Cr_liteprofile"));
        assert!(!url.contains("code_challenge"));
        assert!(!adapter.uses_pkce());
        assert!(adapter.refresher().is_none());
    }

    #[tokio::test]
    async fn exchange_sends_credentials_in_the_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/v2/accessToken")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "c0de".into()),
                Matcher::UrlEncoded("client_id".into(), "client-1".into()),
                Matcher::UrlEncoded("client_secret".into(), "shhh".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"AT-L","expires_in":5184000,"scope":"w_member_social"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let grant = adapter.exchange_code("c0de", None).await.unwrap();

        assert_eq!(grant.access_token.expose_secret(), "AT-L");
        assert!(grant.refresh_token.is_none());
        assert_eq!(grant.expires_in_secs, Some(5184000));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn profile_requests_the_liteprofile_projection() {
        let mut server = mockito::Server::new_async().await;
        let path = format!("/v2/people/{PROFILE_PROJECTION}");
        let mock = server
            .mock("GET", path.as_str())
            .match_header("authorization", "Bearer AT-L")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"AbC123","localizedFirstName":"Ada","localizedLastName":"L"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let profile = adapter
            .fetch_profile(&Secret::new("AT-L".into()))
            .await
            .unwrap();

        assert_eq!(profile["id"], "AbC123");
        assert_eq!(profile["localizedFirstName"], "Ada");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn text_post_uses_share_media_category_none() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/ugcPosts")
            .match_header("x-restli-protocol-version", "2.0.0")
            .match_body(Matcher::PartialJson(json!({
                "author": "urn:li:person:AbC123",
                "lifecycleState": "PUBLISHED",
                "specificContent": {
                    "com.linkedin.ugc.ShareContent": {
                        "shareCommentary": { "text": "quarterly update" },
                        "shareMediaCategory": "NONE"
                    }
                }
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"urn:li:share:7001"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let post_id = adapter
            .publish(
                &Secret::new("AT-L".into()),
                &PostContent::text_only("quarterly update"),
                &json!({"id": "AbC123"}),
            )
            .await
            .unwrap();

        assert_eq!(post_id, "urn:li:share:7001");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn image_post_registers_uploads_and_references_the_asset() {
        let mut server = mockito::Server::new_async().await;
        let media_fetch = server
            .mock("GET", "/img.jpg")
            .with_status(200)
            .with_body(&b"\xff\xd8jpegbytes"[..])
            .create_async()
            .await;
        let register = server
            .mock("POST", "/v2/assets")
            .match_query(Matcher::UrlEncoded("action".into(), "registerUpload".into()))
            .match_body(Matcher::PartialJson(json!({
                "registerUploadRequest": {
                    "recipes": ["urn:li:digitalmediaRecipe:feedshare-image"],
                    "owner": "urn:li:person:AbC123"
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"value":{{"uploadMechanism":{{"com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest":{{"uploadUrl":"{}/upload-dest"}}}},"asset":"urn:li:digitalmediaAsset:X99"}}}}"#,
                server.url()
            ))
            .create_async()
            .await;
        let upload = server
            .mock("PUT", "/upload-dest")
            .match_header("authorization", "Bearer AT-L")
            .with_status(201)
            .create_async()
            .await;
        let post = server
            .mock("POST", "/v2/ugcPosts")
            .match_body(Matcher::PartialJson(json!({
                "specificContent": {
                    "com.linkedin.ugc.ShareContent": {
                        "shareMediaCategory": "IMAGE",
                        "media": [{ "status": "READY", "media": "urn:li:digitalmediaAsset:X99" }]
                    }
                }
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"urn:li:share:7002"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let content = PostContent::new(
            "new office!",
            Some(format!("{}/img.jpg", server.url())),
            Some(MediaKind::Image),
        );
        let post_id = adapter
            .publish(&Secret::new("AT-L".into()), &content, &json!({"id": "AbC123"}))
            .await
            .unwrap();

        assert_eq!(post_id, "urn:li:share:7002");
        media_fetch.assert_async().await;
        register.assert_async().await;
        upload.assert_async().await;
        post.assert_async().await;
    }

    #[tokio::test]
    async fn video_media_falls_back_to_a_text_post() {
        let mut server = mockito::Server::new_async().await;
        let register = server
            .mock("POST", "/v2/assets")
            .expect(0)
            .create_async()
            .await;
        let post = server
            .mock("POST", "/v2/ugcPosts")
            .match_body(Matcher::PartialJson(json!({
                "specificContent": {
                    "com.linkedin.ugc.ShareContent": { "shareMediaCategory": "NONE" }
                }
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"urn:li:share:7003"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let content = PostContent::new(
            "launch video",
            Some("https://cdn.example/launch.mp4".into()),
            Some(MediaKind::Video),
        );
        let post_id = adapter
            .publish(&Secret::new("AT-L".into()), &content, &json!({"id": "AbC123"}))
            .await
            .unwrap();

        assert_eq!(post_id, "urn:li:share:7003");
        register.assert_async().await;
        post.assert_async().await;
    }

    #[tokio::test]
    async fn publish_without_profile_id_is_rejected() {
        let adapter = default_adapter();
        let err = adapter
            .publish(
                &Secret::new("AT-L".into()),
                &PostContent::text_only("hello"),
                &Value::Null,
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("profile missing id"));
    }
}
