use url::Url;

use crate::db::content_store::ContentStore;
use crate::error::AppError;

/// Base used to resolve relative inputs such as `about/` or `/blog/post`.
const RELATIVE_BASE: &str = "http://localhost/";

/// Turn arbitrary text into a URL-safe slug.
///
/// Lowercases, maps whitespace, `-` and `.` to single hyphens, keeps
/// underscores and alphanumerics, and drops everything else.
pub fn sanitize_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());

    for c in input.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if c == '_' {
            slug.push('_');
        } else if (c.is_whitespace() || c == '-' || c == '.') && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.trim_matches('-').to_string()
}

/// Extract the trailing path segment of a URL as a stored-form slug.
///
/// The segment is percent-decoded and lowercased, so a permalink always
/// resolves to the slug it was built from. Returns `None` when the input has
/// no path, or when the path is only slashes. Query strings and fragments
/// are ignored.
pub fn extract_slug(raw: &str) -> Option<String> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_BASE).ok()?.join(raw).ok()?
        }
        Err(e) => {
            tracing::debug!(input = raw, "Skipping unparseable URL: {e}");
            return None;
        }
    };

    let path = url.path().trim_matches('/');
    let segment = path.rsplit('/').next().unwrap_or_default();
    let decoded = urlencoding::decode_binary(segment.as_bytes());
    let slug = String::from_utf8_lossy(&decoded).to_lowercase();

    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Derive a display title from a slug: `my-first_post` → `My First Post`.
pub fn title_from_slug(slug: &str) -> String {
    let spaced = slug.replace(['-', '_'], " ");
    let mut title = String::with_capacity(spaced.len());
    let mut at_word_start = true;

    for c in spaced.chars() {
        if at_word_start {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        at_word_start = c.is_whitespace();
    }

    title
}

/// Find a slug for `type_name` that no stored item uses yet, appending `-2`,
/// `-3`, … to `base` as needed.
pub async fn unique_slug(
    store: &dyn ContentStore,
    base: &str,
    type_name: &str,
) -> Result<String, AppError> {
    if base.is_empty() || !store.slug_exists(base, type_name).await? {
        return Ok(base.to_string());
    }

    let mut suffix = 2u32;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !store.slug_exists(&candidate, type_name).await? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_store::MemoryContentStore;
    use crate::db::models::{ContentStatus, NewContent};

    #[test]
    fn test_sanitize_slug() {
        assert_eq!(sanitize_slug("Hello World"), "hello-world");
        assert_eq!(sanitize_slug("  Hello,   World!  "), "hello-world");
        assert_eq!(sanitize_slug("v1.2 release_notes"), "v1-2-release_notes");
        assert_eq!(sanitize_slug("Ünïcode Title"), "ünïcode-title");
        assert_eq!(sanitize_slug("--already-a-slug--"), "already-a-slug");
        assert_eq!(sanitize_slug("!!!"), "");
    }

    #[test]
    fn test_extract_slug_absolute() {
        assert_eq!(extract_slug("https://x.test/about/"), Some("about".to_string()));
        assert_eq!(
            extract_slug("https://x.test/blog/2024/my-post?utm=1#top"),
            Some("my-post".to_string())
        );
    }

    #[test]
    fn test_extract_slug_without_path() {
        assert_eq!(extract_slug("https://x.test/"), None);
        assert_eq!(extract_slug("https://x.test"), None);
        assert_eq!(extract_slug("https://x.test//"), None);
    }

    #[test]
    fn test_extract_slug_relative() {
        assert_eq!(extract_slug("/contact-us/"), Some("contact-us".to_string()));
        assert_eq!(extract_slug("services/web-design"), Some("web-design".to_string()));
    }

    #[test]
    fn test_extract_slug_decodes_and_lowercases() {
        assert_eq!(
            extract_slug("https://x.test/ünïcode-title/"),
            Some("ünïcode-title".to_string())
        );
        assert_eq!(
            extract_slug("https://x.test/%C3%9Cn%C3%AFcode-Title/"),
            Some("ünïcode-title".to_string())
        );
        assert_eq!(extract_slug("/About-Us/"), Some("about-us".to_string()));
    }

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("my-first_post"), "My First Post");
        assert_eq!(title_from_slug("about"), "About");
        assert_eq!(title_from_slug("faq-2024"), "Faq 2024");
    }

    #[tokio::test]
    async fn test_unique_slug() {
        let store = MemoryContentStore::with_default_types();

        assert_eq!(unique_slug(&store, "about", "page").await.unwrap(), "about");

        for _ in 0..2 {
            let slug = unique_slug(&store, "about", "page").await.unwrap();
            store
                .create(NewContent {
                    title: "About".to_string(),
                    slug: Some(slug),
                    type_name: "page".to_string(),
                    status: ContentStatus::Draft,
                })
                .await
                .unwrap();
        }

        assert_eq!(unique_slug(&store, "about", "page").await.unwrap(), "about-3");
        // Other types have their own slug space.
        assert_eq!(unique_slug(&store, "about", "post").await.unwrap(), "about");
    }
}
