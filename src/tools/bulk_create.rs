use std::collections::HashSet;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::links::{ContentRef, SiteLinks};
use crate::app::AppState;
use crate::auth::models::{AuthenticatedUser, Capability};
use crate::db::content_store::ContentStore;
use crate::db::models::{ContentStatus, NewContent};
use crate::error::AppError;
use crate::slug::{sanitize_slug, unique_slug};

/// Maximum number of non-empty titles accepted in one request.
pub const MAX_TITLES: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateRequest {
    /// Newline-separated titles.
    pub titles: String,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    /// `draft` or `publish`; anything else is treated as `draft`.
    #[serde(default = "default_post_status")]
    pub post_status: String,
    #[serde(default = "default_true")]
    pub skip_empty: bool,
    #[serde(default)]
    pub allow_duplicates: bool,
}

fn default_post_type() -> String {
    "page".to_string()
}

fn default_post_status() -> String {
    "draft".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedEntry {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkCreateResponse {
    pub created: Vec<ContentRef>,
    pub failed: Vec<FailedEntry>,
    /// Lines considered after dropping empty ones (when `skip_empty`).
    pub total: usize,
}

enum LineOutcome {
    Created(ContentRef),
    Failed(FailedEntry),
}

impl LineOutcome {
    fn failed(title: &str, message: &str) -> Self {
        LineOutcome::Failed(FailedEntry {
            title: title.to_string(),
            message: message.to_string(),
        })
    }
}

/// Settings shared by every line of one request.
struct Batch<'a> {
    store: &'a dyn ContentStore,
    links: &'a SiteLinks,
    type_name: &'a str,
    status: ContentStatus,
    allow_duplicates: bool,
}

impl Batch<'_> {
    async fn process_line(&self, title: &str, seen: &mut HashSet<String>) -> LineOutcome {
        if title.is_empty() {
            return LineOutcome::failed(title, "Empty title skipped.");
        }

        if !self.allow_duplicates {
            if !seen.insert(title.to_string()) {
                return LineOutcome::failed(title, "Duplicate title in list.");
            }

            match self.store.find_by_title(title, self.type_name).await {
                Ok(Some(_)) => {
                    return LineOutcome::failed(title, "A post with this title already exists.")
                }
                Ok(None) => {}
                Err(e) => return LineOutcome::failed(title, e.message()),
            }
        }

        let slug = if self.allow_duplicates {
            match unique_slug(self.store, &sanitize_slug(title), self.type_name).await {
                Ok(slug) if !slug.is_empty() => Some(slug),
                Ok(_) => None,
                Err(e) => return LineOutcome::failed(title, e.message()),
            }
        } else {
            None
        };

        let new = NewContent {
            title: title.to_string(),
            slug,
            type_name: self.type_name.to_string(),
            status: self.status,
        };

        match self.store.create(new).await {
            Ok(item) => LineOutcome::Created(ContentRef::from_item(&item, self.links)),
            Err(e) => {
                tracing::debug!(%title, "Bulk create line failed: {e}");
                LineOutcome::failed(title, e.message())
            }
        }
    }
}

/// Create one content item per line of `request.titles`.
///
/// Whole-request errors (validation, permission, cap) are returned before any
/// item is created. Per-line errors land in `failed` and never stop the
/// remaining lines.
pub async fn process_bulk_create(
    store: &dyn ContentStore,
    links: &SiteLinks,
    user: &AuthenticatedUser,
    request: BulkCreateRequest,
) -> Result<BulkCreateResponse, AppError> {
    let raw = request.titles.trim();
    if raw.is_empty() {
        return Err(AppError::BadRequest("No titles provided.".into()));
    }

    let type_name = request.post_type.trim();
    let type_is_public = store
        .list_types()
        .await?
        .iter()
        .any(|t| t.name == type_name && t.public);
    if !type_is_public {
        return Err(AppError::BadRequest("Invalid post type.".into()));
    }

    let status = ContentStatus::for_creation(request.post_status.trim());
    let required = match status {
        ContentStatus::Publish => Capability::PublishPosts,
        _ => Capability::CreatePosts,
    };
    if !user.can(required) {
        tracing::info!(user = %user.user_id, %required, "Bulk create denied");
        return Err(AppError::Forbidden("Permission denied.".into()));
    }

    let mut lines: Vec<&str> = raw.split('\n').map(str::trim).collect();
    let non_empty = lines.iter().filter(|line| !line.is_empty()).count();
    if request.skip_empty {
        lines.retain(|line| !line.is_empty());
    }

    if lines.is_empty() {
        return Err(AppError::BadRequest("No valid titles found.".into()));
    }
    if non_empty > MAX_TITLES {
        return Err(AppError::BadRequest(format!(
            "Please limit your list to {} titles per request.",
            MAX_TITLES
        )));
    }

    let batch = Batch {
        store,
        links,
        type_name,
        status,
        allow_duplicates: request.allow_duplicates,
    };

    let mut seen = HashSet::new();
    let mut created = Vec::new();
    let mut failed = Vec::new();

    for title in &lines {
        match batch.process_line(title, &mut seen).await {
            LineOutcome::Created(item) => created.push(item),
            LineOutcome::Failed(entry) => failed.push(entry),
        }
    }

    tracing::info!(
        user = %user.user_id,
        %type_name,
        %status,
        created = created.len(),
        failed = failed.len(),
        "Bulk create complete"
    );

    Ok(BulkCreateResponse {
        created,
        failed,
        total: lines.len(),
    })
}

/// Axum handler for `POST /api/v1/tools/bulk-create-posts`.
pub async fn bulk_create_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<BulkCreateRequest>,
) -> Result<Json<BulkCreateResponse>, AppError> {
    let response =
        process_bulk_create(state.content_store.as_ref(), &state.links, &user, request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use crate::db::content_store::MockContentStore;
    use crate::db::memory_store::MemoryContentStore;
    use crate::db::models::{ContentItem, ContentType, TypeFilter};

    fn links() -> SiteLinks {
        SiteLinks::new("https://x.test", "admin")
    }

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            role,
        }
    }

    fn request(titles: &str) -> BulkCreateRequest {
        BulkCreateRequest {
            titles: titles.to_string(),
            post_type: "page".to_string(),
            post_status: "draft".to_string(),
            skip_empty: true,
            allow_duplicates: false,
        }
    }

    fn numbered_titles(count: usize) -> String {
        (1..=count)
            .map(|i| format!("Title {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_request_defaults() {
        let req: BulkCreateRequest = serde_json::from_str(r#"{ "titles": "A" }"#).unwrap();
        assert_eq!(req.post_type, "page");
        assert_eq!(req.post_status, "draft");
        assert!(req.skip_empty);
        assert!(!req.allow_duplicates);
    }

    #[tokio::test]
    async fn test_accepts_exactly_twenty() {
        let store = MemoryContentStore::with_default_types();
        let response = process_bulk_create(
            &store,
            &links(),
            &user(Role::Editor),
            request(&numbered_titles(20)),
        )
        .await
        .unwrap();

        assert_eq!(response.created.len(), 20);
        assert_eq!(response.total, 20);
    }

    #[tokio::test]
    async fn test_rejects_twenty_one_without_side_effects() {
        let store = MemoryContentStore::with_default_types();
        let result = process_bulk_create(
            &store,
            &links(),
            &user(Role::Editor),
            request(&numbered_titles(21)),
        )
        .await;

        match result {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "Please limit your list to 20 titles per request.")
            }
            other => panic!("Expected BadRequest error, got: {:?}", other),
        }
        assert!(store.find_by_title("Title 1", "page").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicates_are_case_sensitive() {
        let store = MemoryContentStore::with_default_types();
        let response = process_bulk_create(
            &store,
            &links(),
            &user(Role::Editor),
            request("Foo\nfoo\nFoo"),
        )
        .await
        .unwrap();

        assert_eq!(response.created.len(), 1);
        assert_eq!(response.created[0].title, "Foo");
        assert_eq!(
            response.failed,
            vec![
                // "foo" passes the title checks but collides on the slug.
                FailedEntry {
                    title: "foo".into(),
                    message: "Slug 'foo' is already in use.".into()
                },
                FailedEntry {
                    title: "Foo".into(),
                    message: "Duplicate title in list.".into()
                },
            ]
        );
        assert_eq!(response.total, 3);
    }

    #[tokio::test]
    async fn test_skip_empty_lines() {
        let store = MemoryContentStore::with_default_types();
        let response = process_bulk_create(&store, &links(), &user(Role::Editor), request("A\n\nB"))
            .await
            .unwrap();

        assert_eq!(response.total, 2);
        assert_eq!(response.created.len(), 2);
        assert!(response.failed.is_empty());
    }

    #[tokio::test]
    async fn test_keep_empty_lines_reports_them() {
        let store = MemoryContentStore::with_default_types();
        let mut req = request("A\n\nB");
        req.skip_empty = false;

        let response = process_bulk_create(&store, &links(), &user(Role::Editor), req)
            .await
            .unwrap();

        assert_eq!(response.total, 3);
        assert_eq!(response.created.len(), 2);
        assert_eq!(
            response.failed,
            vec![FailedEntry {
                title: String::new(),
                message: "Empty title skipped.".into()
            }]
        );
    }

    // The cap counts non-empty lines while `total` counts every kept line.
    #[tokio::test]
    async fn test_total_counts_kept_blank_lines_beyond_cap() {
        let store = MemoryContentStore::with_default_types();
        let titles = numbered_titles(20).replace('\n', "\n\n");
        let mut req = request(&titles);
        req.skip_empty = false;

        let response = process_bulk_create(&store, &links(), &user(Role::Editor), req)
            .await
            .unwrap();

        assert_eq!(response.total, 39);
        assert_eq!(response.created.len(), 20);
        assert_eq!(response.failed.len(), 19);
        assert_eq!(response.created.len() + response.failed.len(), response.total);
    }

    #[tokio::test]
    async fn test_existing_title_is_rejected() {
        let store = MemoryContentStore::with_default_types();
        process_bulk_create(&store, &links(), &user(Role::Editor), request("About"))
            .await
            .unwrap();

        let response =
            process_bulk_create(&store, &links(), &user(Role::Editor), request("About\nTeam"))
                .await
                .unwrap();

        assert_eq!(response.created.len(), 1);
        assert_eq!(response.failed[0].message, "A post with this title already exists.");
    }

    #[tokio::test]
    async fn test_allow_duplicates_uses_unique_slugs() {
        let store = MemoryContentStore::with_default_types();
        process_bulk_create(&store, &links(), &user(Role::Editor), request("About"))
            .await
            .unwrap();

        let mut req = request("About\nAbout");
        req.allow_duplicates = true;
        let response = process_bulk_create(&store, &links(), &user(Role::Editor), req)
            .await
            .unwrap();

        assert_eq!(response.created.len(), 2);
        assert!(response.failed.is_empty());

        let filter = TypeFilter::Only("page".into());
        assert!(store.find_by_slug("about-2", &filter).await.unwrap().is_some());
        assert!(store.find_by_slug("about-3", &filter).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_publish_requires_publish_capability() {
        let store = MemoryContentStore::with_default_types();
        let mut req = request("Launch");
        req.post_status = "publish".to_string();

        let contributor = user(Role::Contributor);
        let result = process_bulk_create(&store, &links(), &contributor, req.clone()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(store.find_by_title("Launch", "page").await.unwrap().is_none());

        let response = process_bulk_create(&store, &links(), &user(Role::Author), req)
            .await
            .unwrap();
        assert_eq!(response.created[0].status, ContentStatus::Publish);
    }

    #[tokio::test]
    async fn test_unknown_status_falls_back_to_draft() {
        let store = MemoryContentStore::with_default_types();
        let mut req = request("Secret");
        req.post_status = "private".to_string();

        let response = process_bulk_create(&store, &links(), &user(Role::Contributor), req)
            .await
            .unwrap();
        assert_eq!(response.created[0].status, ContentStatus::Draft);
        assert!(response.created[0].view_url.contains("?p="));
    }

    #[tokio::test]
    async fn test_rejects_blank_input_and_invalid_type() {
        let store = MemoryContentStore::with_default_types();
        store
            .register_type(ContentType::new("revision", "Revisions", false))
            .await
            .unwrap();

        match process_bulk_create(&store, &links(), &user(Role::Editor), request(" \n ")).await {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "No titles provided."),
            other => panic!("Expected BadRequest error, got: {:?}", other),
        }

        for post_type in ["product", "revision"] {
            let mut req = request("A");
            req.post_type = post_type.to_string();
            match process_bulk_create(&store, &links(), &user(Role::Editor), req).await {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid post type."),
                other => panic!("Expected BadRequest error, got: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_per_line() {
        let mut store = MockContentStore::new();
        store
            .expect_list_types()
            .returning(|| Ok(ContentType::defaults()));
        store.expect_find_by_title().returning(|_, _| Ok(None));
        store.expect_create().returning(|new| {
            if new.title == "Bad" {
                return Err(AppError::Database("write timeout".into()));
            }
            Ok(ContentItem {
                id: format!("id-{}", new.title),
                slug: new.title.to_lowercase(),
                title: new.title,
                type_name: new.type_name,
                status: new.status,
                created_at: chrono::Utc::now(),
            })
        });

        let titles = request("Good\nBad\nAlso Good");
        let response = process_bulk_create(&store, &links(), &user(Role::Editor), titles)
            .await
            .unwrap();

        let created: Vec<&str> = response.created.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(created, vec!["Good", "Also Good"]);
        assert_eq!(
            response.failed,
            vec![FailedEntry {
                title: "Bad".into(),
                message: "write timeout".into()
            }]
        );
    }
}
