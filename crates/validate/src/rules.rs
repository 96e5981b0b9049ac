use {
    crier_platforms::{MediaKind, PlatformDescriptor, PostContent},
    serde::Serialize,
};

use crate::guidelines;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "mov", "avi"];

/// Outcome of validating one post against one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check `content` against the platform's publishing constraints.
///
/// Never mutates the content and touches no I/O; the same inputs always
/// produce the same verdict.
#[must_use]
pub fn validate(descriptor: &PlatformDescriptor, content: &PostContent) -> Verdict {
    let limits = &descriptor.constraints;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let text_len = content.text.chars().count();
    if text_len > limits.max_text_length {
        errors.push(format!(
            "Text exceeds maximum length of {} characters",
            limits.max_text_length
        ));
    }
    if content.text.is_empty() {
        errors.push("Text content cannot be empty".to_string());
    }

    if limits.requires_media && !content.has_media() {
        errors.push(format!(
            "{} posts require media (image or video)",
            descriptor.display_name
        ));
    }
    if content.has_media() && content.media_kind == Some(MediaKind::Image) && !limits.supports_images
    {
        errors.push(format!("{} does not support images", descriptor.display_name));
    }
    if content.has_media() && content.media_kind == Some(MediaKind::Video) && !limits.supports_videos
    {
        errors.push(format!("{} does not support videos", descriptor.display_name));
    }

    let hashtag_count = content.hashtags.len();
    if hashtag_count > limits.max_hashtags {
        errors.push(format!(
            "Too many hashtags ({hashtag_count}). Maximum allowed: {}",
            limits.max_hashtags
        ));
    }
    if hashtag_count > limits.optimal_hashtags {
        warnings.push(format!(
            "Consider reducing hashtags to {} for optimal engagement",
            limits.optimal_hashtags
        ));
    }

    warnings.extend(guidelines::advisories(descriptor.id, content));
    if let Some(advisory) = media_extension_advisory(content) {
        warnings.push(advisory);
    }

    Verdict {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Warn when the media URL's extension contradicts the declared kind.
fn media_extension_advisory(content: &PostContent) -> Option<String> {
    let url = content.media_url.as_deref()?;
    let kind = content.media_kind?;
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit('.').next().unwrap_or_default().to_lowercase();

    match kind {
        MediaKind::Image if !IMAGE_EXTENSIONS.contains(&ext.as_str()) => Some(format!(
            "Media URL does not look like an image (expected one of: {})",
            IMAGE_EXTENSIONS.join(", ")
        )),
        MediaKind::Video if !VIDEO_EXTENSIONS.contains(&ext.as_str()) => Some(format!(
            "Media URL does not look like a video (expected one of: {})",
            VIDEO_EXTENSIONS.join(", ")
        )),
        _ => None,
    }
}
