use serde::Serialize;

/// Publishing limits one network enforces for a single post.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConstraints {
    pub max_text_length: usize,
    pub supports_images: bool,
    pub supports_videos: bool,
    /// Posts on this network must carry an image or video.
    pub requires_media: bool,
    pub max_hashtags: usize,
    /// Recommended ceiling. Exceeding it warns, never blocks.
    pub optimal_hashtags: usize,
}

/// Immutable identity card of a network integration, defined by its adapter
/// crate at process start.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDescriptor {
    /// Registry key (e.g. "twitter", "linkedin").
    pub id: &'static str,
    pub display_name: &'static str,
    /// Brand color as `#rrggbb`.
    pub color: &'static str,
    pub icon: &'static str,
    pub constraints: PlatformConstraints,
}
