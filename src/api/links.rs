use serde::Serialize;

use crate::db::models::{ContentItem, ContentStatus};

/// Builds admin edit links and public view links for content items.
#[derive(Debug, Clone)]
pub struct SiteLinks {
    site_url: String,
    admin_path: String,
}

impl SiteLinks {
    pub fn new(site_url: &str, admin_path: &str) -> Self {
        let admin_path = admin_path.trim_matches('/');
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
            admin_path: if admin_path.is_empty() {
                String::new()
            } else {
                format!("/{}", admin_path)
            },
        }
    }

    pub fn edit_url(&self, item: &ContentItem) -> String {
        format!("{}{}/content/{}/edit", self.site_url, self.admin_path, item.id)
    }

    /// Pretty permalink for published items, id-based preview link otherwise.
    pub fn view_url(&self, item: &ContentItem) -> String {
        if item.status != ContentStatus::Publish {
            return format!("{}/?p={}", self.site_url, item.id);
        }

        match item.type_name.as_str() {
            "post" | "page" => format!("{}/{}/", self.site_url, item.slug),
            other => format!("{}/{}/{}/", self.site_url, other, item.slug),
        }
    }
}

/// Read-only projection of a content item returned by the tools.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRef {
    pub post_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub status: ContentStatus,
    pub edit_url: String,
    pub view_url: String,
}

impl ContentRef {
    pub fn from_item(item: &ContentItem, links: &SiteLinks) -> Self {
        Self {
            post_id: item.id.clone(),
            title: item.title.clone(),
            type_name: item.type_name.clone(),
            status: item.status,
            edit_url: links.edit_url(item),
            view_url: links.view_url(item),
        }
    }
}
