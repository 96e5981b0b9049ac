//! Two-step LinkedIn asset upload: register the upload, then PUT the bytes.

use {
    crier_platforms::{Error, Result},
    secrecy::{ExposeSecret, Secret},
    serde_json::{Value, json},
    tracing::debug,
};

use crate::adapter::LinkedInAdapter;

const UPLOAD_MECHANISM: &str = "com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest";
const FEEDSHARE_RECIPE: &str = "urn:li:digitalmediaRecipe:feedshare-image";

impl LinkedInAdapter {
    /// Upload the image behind `media_url` as a feedshare asset owned by
    /// `owner`, returning the asset URN the post references.
    pub(crate) async fn upload_image(
        &self,
        access_token: &Secret<String>,
        media_url: &str,
        owner: &str,
    ) -> Result<String> {
        let media = self
            .client
            .get(media_url)
            .send()
            .await
            .map_err(|source| {
                Error::external("failed to fetch media for linkedin upload", source)
            })?;
        if !media.status().is_success() {
            let status = media.status();
            return Err(Error::message(format!(
                "media fetch returned HTTP {status}"
            )));
        }
        let bytes = media
            .bytes()
            .await
            .map_err(|source| Error::external("failed to read media bytes", source))?;

        let register = json!({
            "registerUploadRequest": {
                "recipes": [FEEDSHARE_RECIPE],
                "owner": owner,
                "serviceRelationships": [{
                    "relationshipType": "OWNER",
                    "identifier": "urn:li:userGeneratedContent"
                }]
            }
        });
        let resp = self
            .client
            .post(format!(
                "{}/v2/assets?action=registerUpload",
                self.endpoints.api_base
            ))
            .bearer_auth(access_token.expose_secret())
            .json(&register)
            .send()
            .await
            .map_err(|source| Error::external("failed to register linkedin upload", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "linkedin upload registration returned HTTP {status}: {body}"
            )));
        }

        let body: Value = resp.json().await.map_err(|source| {
            Error::external("failed to parse linkedin upload registration", source)
        })?;
        let upload_url = body["value"]["uploadMechanism"][UPLOAD_MECHANISM]["uploadUrl"]
            .as_str()
            .ok_or_else(|| Error::unexpected("linkedin upload registration missing uploadUrl"))?;
        let asset = body["value"]["asset"]
            .as_str()
            .ok_or_else(|| Error::unexpected("linkedin upload registration missing asset"))?;

        let put = self
            .client
            .put(upload_url)
            .bearer_auth(access_token.expose_secret())
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|source| Error::external("failed to upload image to linkedin", source))?;
        if !put.status().is_success() {
            let status = put.status();
            return Err(Error::message(format!(
                "linkedin image upload returned HTTP {status}"
            )));
        }

        debug!(asset, "uploaded image to linkedin");
        Ok(asset.to_string())
    }
}
