use std::sync::LazyLock;

use {regex::Regex, serde::Serialize};

#[allow(clippy::unwrap_used)] // literal pattern
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());

/// Media attachment class. Networks gate what they accept on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// One logical post, as handed to validation and dispatch.
///
/// Transient: this layer never persists content. Hashtags are derived from
/// the text once, at construction.
#[derive(Debug, Clone, Serialize)]
pub struct PostContent {
    pub text: String,
    /// Where the media bytes live (the remote backend hosts uploads).
    pub media_url: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub hashtags: Vec<String>,
}

impl PostContent {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        media_url: Option<String>,
        media_kind: Option<MediaKind>,
    ) -> Self {
        let text = text.into();
        let hashtags = extract_hashtags(&text);
        Self {
            text,
            media_url,
            media_kind,
            hashtags,
        }
    }

    #[must_use]
    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new(text, None, None)
    }

    #[must_use]
    pub fn has_media(&self) -> bool {
        self.media_url.is_some()
    }
}

/// All `#word` tokens in the text, `#` included, in order of appearance.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_hashtags_in_order() {
        let content = PostContent::text_only("Launch day! #rust #async2 #de_v");
        assert_eq!(content.hashtags, vec!["#rust", "#async2", "#de_v"]);
    }

    #[test]
    fn no_hashtags_yields_empty() {
        assert!(extract_hashtags("no tags here, just # a stray hash").is_empty());
    }

    #[test]
    fn media_flag_follows_url() {
        let with = PostContent::new("pic", Some("https://cdn.example/p.png".into()), Some(MediaKind::Image));
        let without = PostContent::text_only("pic");
        assert!(with.has_media());
        assert!(!without.has_media());
    }
}
