//! URL parsing utilities shared across stages.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Matches clip/VOD links: optional scheme, optional `www.`, optional
/// `clips.` subdomain, host `twitch.tv`, path-and-beyond captured verbatim.
static CLIP_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?(?:clips\.)?\btwitch\.tv/\S+").expect("valid clip URL pattern")
});

/// Extract all clip/VOD links from a raw text blob.
///
/// Matches are returned verbatim, in discovery order. Duplicates are
/// preserved; deduplication is not this layer's job.
pub fn extract_clip_urls(text: &str) -> Vec<String> {
    CLIP_URL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Errors that can occur during clip slug extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The embed reference is not a parseable URL
    InvalidEmbedUrl,
    /// The embed URL carries no `clip` query parameter
    SlugNotFound,
}

impl std::fmt::Display for SlugError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlugError::InvalidEmbedUrl => write!(f, "embed reference is not a valid URL"),
            SlugError::SlugNotFound => write!(f, "no clip parameter in embed URL"),
        }
    }
}

impl std::error::Error for SlugError {}

/// Result type for slug extraction.
pub type SlugResult<T> = Result<T, SlugError>;

/// Extract the clip slug from a player embed URL.
///
/// The embed target looks like
/// `//clips.twitch.tv/embed?parent=twitchtracker.com&autoplay=true&clip=SLUG`;
/// scheme-relative references are accepted.
pub fn extract_clip_slug(embed_src: &str) -> SlugResult<String> {
    let embed_src = embed_src.trim();
    let absolute;
    let embed_src = if embed_src.starts_with("//") {
        absolute = format!("https:{}", embed_src);
        absolute.as_str()
    } else {
        embed_src
    };

    let url = Url::parse(embed_src).map_err(|_| SlugError::InvalidEmbedUrl)?;

    url.query_pairs()
        .find(|(key, _)| key == "clip")
        .map(|(_, value)| value.into_owned())
        .filter(|slug| !slug.is_empty())
        .ok_or(SlugError::SlugNotFound)
}

/// Extract the clip slug from a canonical clip URL.
///
/// Returns the last non-empty path segment, with any query or fragment
/// stripped. `None` for a bare host.
pub fn clip_slug_from_url(url: &str) -> Option<&str> {
    let url = url.trim();
    let url = url.split(['?', '#']).next()?;
    let slug = url.trim_end_matches('/').rsplit('/').next()?;

    if slug.is_empty() || slug.contains('.') {
        // A segment containing a dot is the host itself, not a slug.
        return None;
    }
    Some(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_urls_preserves_order_and_duplicates() {
        let text = "first https://clips.twitch.tv/Abc then www.twitch.tv/videos/123 \
                    and again https://clips.twitch.tv/Abc";
        let urls = extract_clip_urls(text);
        assert_eq!(
            urls,
            vec![
                "https://clips.twitch.tv/Abc",
                "www.twitch.tv/videos/123",
                "https://clips.twitch.tv/Abc",
            ]
        );
    }

    #[test]
    fn test_extract_urls_ignores_other_hosts() {
        let urls = extract_clip_urls("https://youtube.com/watch?v=x https://nottwitch.tv/abc");
        assert!(urls.is_empty());
    }

    #[test]
    fn test_extract_urls_empty_input() {
        assert!(extract_clip_urls("").is_empty());
    }

    #[test]
    fn test_extract_slug_from_embed() {
        let src = "//clips.twitch.tv/embed?parent=twitchtracker.com&autoplay=true&clip=SuperEasyTrianglePJSalt-J0IgXQHTA0_ws9Lk";
        assert_eq!(
            extract_clip_slug(src),
            Ok("SuperEasyTrianglePJSalt-J0IgXQHTA0_ws9Lk".to_string())
        );
    }

    #[test]
    fn test_extract_slug_missing() {
        assert_eq!(
            extract_clip_slug("https://clips.twitch.tv/embed?parent=twitchtracker.com"),
            Err(SlugError::SlugNotFound)
        );
        assert_eq!(
            extract_clip_slug("not a url at all"),
            Err(SlugError::InvalidEmbedUrl)
        );
    }

    #[test]
    fn test_slug_from_canonical_url() {
        assert_eq!(
            clip_slug_from_url("https://clips.twitch.tv/FunnyClip-abc"),
            Some("FunnyClip-abc")
        );
        assert_eq!(clip_slug_from_url("clips.twitch.tv/Xyz?autoplay=true"), Some("Xyz"));
        assert_eq!(clip_slug_from_url("https://clips.twitch.tv/"), None);
        assert_eq!(clip_slug_from_url("clips.twitch.tv"), None);
    }
}
