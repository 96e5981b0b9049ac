//! Advisory checks beyond the hard constraints. All results are warnings.

use crier_platforms::PostContent;

const INSTAGRAM_SPAM_TAGS: [&str; 4] = ["follow4follow", "like4like", "f4f", "l4l"];
const LINKEDIN_CASUAL_WORDS: [&str; 4] = ["amazing", "awesome", "killer", "insane"];

const LINKEDIN_MIN_CHARS: usize = 10;

/// Platform-specific content advisories.
#[must_use]
pub fn advisories(platform_id: &str, content: &PostContent) -> Vec<String> {
    match platform_id {
        "instagram" => instagram(content),
        "linkedin" => linkedin(content),
        _ => Vec::new(),
    }
}

fn instagram(content: &PostContent) -> Vec<String> {
    let mut warnings = Vec::new();
    if contains_any(&content.text, &INSTAGRAM_SPAM_TAGS) {
        warnings.push("Caption contains words that might be flagged as spam".to_string());
    }
    warnings
}

fn linkedin(content: &PostContent) -> Vec<String> {
    let mut warnings = Vec::new();
    if content.text.chars().count() < LINKEDIN_MIN_CHARS {
        warnings.push(format!(
            "Post is too short - LinkedIn posts should be at least {LINKEDIN_MIN_CHARS} characters"
        ));
    }
    if contains_any(&content.text, &LINKEDIN_CASUAL_WORDS) {
        warnings.push("Consider using more professional language for LinkedIn".to_string());
    }
    warnings
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    let lower = text.to_lowercase();
    words.iter().any(|w| lower.contains(w))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instagram_flags_spam_tags() {
        let warnings = advisories("instagram", &PostContent::text_only("pic of the day #F4F"));
        assert_eq!(
            warnings,
            vec!["Caption contains words that might be flagged as spam"]
        );
    }

    #[test]
    fn linkedin_flags_casual_register_and_short_posts() {
        let warnings = advisories("linkedin", &PostContent::text_only("Awesome!"));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("too short"));
        assert!(warnings[1].contains("professional language"));
    }

    #[test]
    fn other_platforms_get_no_advisories() {
        assert!(advisories("twitter", &PostContent::text_only("hi")).is_empty());
    }
}
