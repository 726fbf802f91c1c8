use std::collections::HashSet;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::links::{ContentRef, SiteLinks};
use crate::app::AppState;
use crate::db::content_store::ContentStore;
use crate::db::models::{ContentItem, ContentStatus, NewContent, SlugPattern, TypeFilter};
use crate::error::AppError;
use crate::slug::{extract_slug, sanitize_slug, title_from_slug};

/// Maximum number of similar items proposed for a missing slug.
pub const MAX_SIMILAR: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct ScanSlugsRequest {
    /// Newline-separated URLs.
    pub urls: String,
    /// Content type to search, or `any`/empty for every public type.
    #[serde(default)]
    pub post_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundEntry {
    pub url: String,
    pub slug: String,
    #[serde(flatten)]
    pub item: ContentRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarEntry {
    #[serde(flatten)]
    pub item: ContentRef,
    pub slug: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingEntry {
    pub url: String,
    pub slug: String,
    pub similar: Vec<SimilarEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSlugsResponse {
    pub found: Vec<FoundEntry>,
    pub not_found: Vec<MissingEntry>,
    /// Number of non-blank input lines, including the ones without a slug.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostTypeOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostTypesResponse {
    pub post_types: Vec<PostTypeOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub slug: String,
    #[serde(default)]
    pub post_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePostResponse {
    pub post_id: String,
    pub edit_url: String,
    pub message: String,
}

/// Similarity score for a candidate slug. Independent of the tier that
/// surfaced the candidate.
pub fn similarity_score(candidate: &str, query: &str) -> u8 {
    if candidate.starts_with(query) {
        90
    } else if candidate.contains(query) {
        70
    } else {
        50
    }
}

/// Up to [`MAX_SIMILAR`] items resembling `slug`, best tier first.
pub async fn find_similar(
    store: &dyn ContentStore,
    links: &SiteLinks,
    slug: &str,
    filter: &TypeFilter,
) -> Result<Vec<SimilarEntry>, AppError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates: Vec<ContentItem> = Vec::new();

    for pattern in SlugPattern::tiers(slug) {
        if candidates.len() >= MAX_SIMILAR {
            break;
        }
        for item in store.find_by_pattern(&pattern, filter, MAX_SIMILAR).await? {
            if candidates.len() >= MAX_SIMILAR {
                break;
            }
            if seen.insert(item.id.clone()) {
                candidates.push(item);
            }
        }
    }

    Ok(candidates
        .iter()
        .map(|item| SimilarEntry {
            item: ContentRef::from_item(item, links),
            slug: item.slug.clone(),
            score: similarity_score(&item.slug, slug),
        })
        .collect())
}

enum Resolution {
    Found(ContentItem),
    Missing(Vec<SimilarEntry>),
}

async fn resolve(
    store: &dyn ContentStore,
    links: &SiteLinks,
    slug: &str,
    filter: &TypeFilter,
) -> Result<Resolution, AppError> {
    match store.find_by_slug(slug, filter).await? {
        Some(item) => Ok(Resolution::Found(item)),
        None => Ok(Resolution::Missing(
            find_similar(store, links, slug, filter).await?,
        )),
    }
}

/// Resolve every URL in the request against the content store.
///
/// Lines without a usable slug are dropped from both lists but still count
/// towards `total`. A store failure drops that URL and the scan continues.
pub async fn process_scan(
    store: &dyn ContentStore,
    links: &SiteLinks,
    request: ScanSlugsRequest,
) -> Result<ScanSlugsResponse, AppError> {
    if request.urls.trim().is_empty() {
        return Err(AppError::BadRequest("No URLs provided.".into()));
    }

    let filter = TypeFilter::from_param(request.post_type.as_deref());
    let lines: Vec<&str> = request
        .urls
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut found = Vec::new();
    let mut not_found = Vec::new();

    for url in &lines {
        let Some(slug) = extract_slug(url) else {
            continue;
        };

        match resolve(store, links, &slug, &filter).await {
            Ok(Resolution::Found(item)) => found.push(FoundEntry {
                url: url.to_string(),
                slug,
                item: ContentRef::from_item(&item, links),
            }),
            Ok(Resolution::Missing(similar)) => not_found.push(MissingEntry {
                url: url.to_string(),
                slug,
                similar,
            }),
            Err(e) => tracing::warn!(%url, %slug, "Slug lookup failed: {e}"),
        }
    }

    tracing::info!(
        total = lines.len(),
        found = found.len(),
        not_found = not_found.len(),
        "Slug scan complete"
    );

    Ok(ScanSlugsResponse {
        found,
        not_found,
        total: lines.len(),
    })
}

/// Public content types as select options.
pub async fn process_list_post_types(
    store: &dyn ContentStore,
) -> Result<PostTypesResponse, AppError> {
    let post_types = store
        .list_types()
        .await?
        .into_iter()
        .filter(|t| t.public)
        .map(|t| PostTypeOption {
            value: t.name,
            label: t.label,
        })
        .collect();

    Ok(PostTypesResponse { post_types })
}

/// Create a draft for a slug reported missing by a scan.
pub async fn process_create_post(
    store: &dyn ContentStore,
    links: &SiteLinks,
    request: CreatePostRequest,
) -> Result<CreatePostResponse, AppError> {
    let slug = sanitize_slug(&request.slug);
    if slug.is_empty() {
        return Err(AppError::NotFound("No valid slug provided.".into()));
    }

    let type_name = match request.post_type.as_deref().map(str::trim) {
        None | Some("") => "post".to_string(),
        Some(name) => name.to_string(),
    };

    let item = store
        .create(NewContent {
            title: title_from_slug(&slug),
            slug: Some(slug),
            type_name,
            status: ContentStatus::Draft,
        })
        .await?;

    tracing::info!(id = %item.id, slug = %item.slug, "Created draft from slug");

    Ok(CreatePostResponse {
        edit_url: links.edit_url(&item),
        post_id: item.id,
        message: "Post created successfully!".to_string(),
    })
}

/// Axum handler for `POST /api/v1/tools/scan-slugs`.
pub async fn scan_slugs_handler(
    State(state): State<AppState>,
    Json(request): Json<ScanSlugsRequest>,
) -> Result<Json<ScanSlugsResponse>, AppError> {
    let response = process_scan(state.content_store.as_ref(), &state.links, request).await?;
    Ok(Json(response))
}

/// Axum handler for `GET /api/v1/tools/post-types`.
pub async fn post_types_handler(
    State(state): State<AppState>,
) -> Result<Json<PostTypesResponse>, AppError> {
    let response = process_list_post_types(state.content_store.as_ref()).await?;
    Ok(Json(response))
}

/// Axum handler for `POST /api/v1/tools/create-post`.
pub async fn create_post_handler(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<Json<CreatePostResponse>, AppError> {
    let response = process_create_post(state.content_store.as_ref(), &state.links, request).await?;
    Ok(Json(response))
}
