use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication state of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    Pending,
    Private,
    Publish,
    Trash,
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentStatus::Draft => write!(f, "draft"),
            ContentStatus::Pending => write!(f, "pending"),
            ContentStatus::Private => write!(f, "private"),
            ContentStatus::Publish => write!(f, "publish"),
            ContentStatus::Trash => write!(f, "trash"),
        }
    }
}

impl ContentStatus {
    /// Normalise a requested creation status. Only `draft` and `publish` may
    /// be requested; anything else falls back to `draft`.
    pub fn for_creation(requested: &str) -> Self {
        match requested {
            "publish" => ContentStatus::Publish,
            _ => ContentStatus::Draft,
        }
    }
}

/// A stored unit of publishable content.
///
/// Stored in the `content_items` collection; `(type_name, slug)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Store-assigned identifier (UUID v4).
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// URL-path identifier.
    pub slug: String,
    /// Name of the content type (e.g. `post`, `page`).
    pub type_name: String,
    pub status: ContentStatus,
    /// Creation timestamp; newer items rank first among equally similar
    /// candidates.
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// A registered content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    /// Type slug (e.g. `page`).
    pub name: String,
    /// Plural display name (e.g. `Pages`).
    pub label: String,
    /// Publicly browsable types are offered in the tools and searched by
    /// unfiltered scans.
    pub public: bool,
}

impl ContentType {
    pub fn new(name: &str, label: &str, public: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            public,
        }
    }

    /// Types registered on install.
    pub fn defaults() -> Vec<ContentType> {
        vec![
            ContentType::new("post", "Posts", true),
            ContentType::new("page", "Pages", true),
        ]
    }
}

/// Input for creating a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub title: String,
    /// Explicit slug; when `None` the store derives one from the title.
    pub slug: Option<String>,
    pub type_name: String,
    pub status: ContentStatus,
}

/// Restricts a lookup to one content type, or to every public type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    AnyPublic,
    Only(String),
}

impl TypeFilter {
    /// Empty and `any` both mean "every public type".
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            None | Some("") | Some("any") => TypeFilter::AnyPublic,
            Some(name) => TypeFilter::Only(name.to_string()),
        }
    }

    /// Whether an item of `type_name` passes, given the public type names.
    pub fn admits(&self, type_name: &str, public_types: &[String]) -> bool {
        match self {
            TypeFilter::AnyPublic => public_types.iter().any(|t| t == type_name),
            TypeFilter::Only(name) => name == type_name,
        }
    }
}

/// A fuzzy slug pattern, in the order the tiers rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugPattern {
    /// Slug starts with the query.
    Prefix(String),
    /// Slug contains the query anywhere.
    Contains(String),
    /// Slug contains each `-`/`_`-separated part of the query, in order,
    /// with anything in between.
    WordParts(Vec<String>),
}

impl SlugPattern {
    /// The three tiers for `query`, best first.
    pub fn tiers(query: &str) -> [SlugPattern; 3] {
        [
            SlugPattern::Prefix(query.to_string()),
            SlugPattern::Contains(query.to_string()),
            SlugPattern::WordParts(
                query
                    .split(['-', '_'])
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        ]
    }

    pub fn matches(&self, slug: &str) -> bool {
        match self {
            SlugPattern::Prefix(query) => slug.starts_with(query.as_str()),
            SlugPattern::Contains(query) => slug.contains(query.as_str()),
            SlugPattern::WordParts(parts) => {
                let mut rest = slug;
                for part in parts {
                    match rest.find(part.as_str()) {
                        Some(pos) => rest = &rest[pos + part.len()..],
                        None => return false,
                    }
                }
                true
            }
        }
    }

    /// Equivalent regular expression, with the query text escaped.
    pub fn to_regex(&self) -> String {
        match self {
            SlugPattern::Prefix(query) => format!("^{}", regex::escape(query)),
            SlugPattern::Contains(query) => regex::escape(query),
            SlugPattern::WordParts(parts) => parts
                .iter()
                .map(|p| regex::escape(p))
                .collect::<Vec<_>>()
                .join(".*"),
        }
    }
}
