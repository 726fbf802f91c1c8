use async_trait::async_trait;

use crate::db::models::{ContentItem, ContentType, NewContent, SlugPattern, TypeFilter};
use crate::error::AppError;

/// Store for content items and content types.
///
/// Handlers depend on the store only through this trait, so tests can swap
/// in the in-memory store or a mock. Lookups by slug, pattern and title skip
/// trashed items; [`ContentStore::slug_exists`] does not.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All registered content types, in registration order.
    async fn list_types(&self) -> Result<Vec<ContentType>, AppError>;

    /// Register a content type, replacing any type with the same name.
    async fn register_type(&self, content_type: ContentType) -> Result<(), AppError>;

    /// First item (in creation order) whose slug equals `slug`.
    async fn find_by_slug(
        &self,
        slug: &str,
        filter: &TypeFilter,
    ) -> Result<Option<ContentItem>, AppError>;

    /// Items whose slug matches `pattern`, newest first, at most `limit`.
    async fn find_by_pattern(
        &self,
        pattern: &SlugPattern,
        filter: &TypeFilter,
        limit: usize,
    ) -> Result<Vec<ContentItem>, AppError>;

    /// First item of `type_name` whose title is exactly `title`.
    async fn find_by_title(
        &self,
        title: &str,
        type_name: &str,
    ) -> Result<Option<ContentItem>, AppError>;

    /// Whether any item of `type_name`, in any status, uses `slug`.
    async fn slug_exists(&self, slug: &str, type_name: &str) -> Result<bool, AppError>;

    /// Create an item.
    ///
    /// Fails with `BadRequest` for an unknown type or empty title and with
    /// `Conflict` when the slug is already used within the type.
    async fn create(&self, new: NewContent) -> Result<ContentItem, AppError>;
}

/// Check the parts of a creation request every store enforces.
pub(crate) fn validate_new_content(
    new: &NewContent,
    types: &[ContentType],
) -> Result<(), AppError> {
    if new.title.trim().is_empty() {
        return Err(AppError::BadRequest("Content title is empty.".into()));
    }
    if !types.iter().any(|t| t.name == new.type_name) {
        return Err(AppError::BadRequest("Invalid post type.".into()));
    }
    Ok(())
}

/// MongoDB implementation of the ContentStore.
pub struct MongoContentStore {
    items: mongodb::Collection<ContentItem>,
    types: mongodb::Collection<ContentType>,
}

impl MongoContentStore {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            items: db.collection("content_items"),
            types: db.collection("content_types"),
        }
    }

    /// Create the indexes the store relies on. Safe to call on every start.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        let unique = IndexOptions::builder().unique(true).build();

        self.items
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "type_name": 1, "slug": 1 })
                    .options(unique.clone())
                    .build(),
            )
            .await?;

        self.items
            .create_index(IndexModel::builder().keys(doc! { "created_at": -1 }).build())
            .await?;

        self.types
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "name": 1 })
                    .options(unique)
                    .build(),
            )
            .await?;

        Ok(())
    }

    /// Filter document for a type restriction; excludes trashed items.
    async fn visible_filter(
        &self,
        filter: &TypeFilter,
    ) -> Result<mongodb::bson::Document, AppError> {
        use mongodb::bson::doc;

        let mut filter_doc = doc! { "status": { "$ne": "trash" } };

        match filter {
            TypeFilter::Only(name) => {
                filter_doc.insert("type_name", name.as_str());
            }
            TypeFilter::AnyPublic => {
                let public: Vec<String> = self
                    .list_types()
                    .await?
                    .into_iter()
                    .filter(|t| t.public)
                    .map(|t| t.name)
                    .collect();
                filter_doc.insert("type_name", doc! { "$in": public });
            }
        }

        Ok(filter_doc)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[async_trait]
impl ContentStore for MongoContentStore {
    async fn list_types(&self) -> Result<Vec<ContentType>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;

        let cursor = self.types.find(doc! {}).await?;
        let types: Vec<ContentType> = cursor.try_collect().await?;
        Ok(types)
    }

    async fn register_type(&self, content_type: ContentType) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::ReplaceOptions;

        let options = ReplaceOptions::builder().upsert(true).build();

        self.types
            .replace_one(doc! { "name": &content_type.name }, &content_type)
            .with_options(options)
            .await?;

        Ok(())
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        filter: &TypeFilter,
    ) -> Result<Option<ContentItem>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOneOptions;

        let mut query = self.visible_filter(filter).await?;
        query.insert("slug", slug);

        let options = FindOneOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();

        Ok(self.items.find_one(query).with_options(options).await?)
    }

    async fn find_by_pattern(
        &self,
        pattern: &SlugPattern,
        filter: &TypeFilter,
        limit: usize,
    ) -> Result<Vec<ContentItem>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let mut query = self.visible_filter(filter).await?;
        query.insert("slug", doc! { "$regex": pattern.to_regex() });

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit as i64)
            .build();

        let cursor = self.items.find(query).with_options(options).await?;
        let items: Vec<ContentItem> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn find_by_title(
        &self,
        title: &str,
        type_name: &str,
    ) -> Result<Option<ContentItem>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOneOptions;

        let options = FindOneOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();

        Ok(self
            .items
            .find_one(doc! {
                "title": title,
                "type_name": type_name,
                "status": { "$ne": "trash" },
            })
            .with_options(options)
            .await?)
    }

    async fn slug_exists(&self, slug: &str, type_name: &str) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let count = self
            .items
            .count_documents(doc! { "slug": slug, "type_name": type_name })
            .await?;

        Ok(count > 0)
    }

    async fn create(&self, new: NewContent) -> Result<ContentItem, AppError> {
        let types = self.list_types().await?;
        validate_new_content(&new, &types)?;

        let id = uuid::Uuid::new_v4().to_string();
        let slug = match new.slug {
            Some(slug) if !slug.is_empty() => slug,
            _ => crate::slug::sanitize_slug(&new.title),
        };
        let slug = if slug.is_empty() { id.clone() } else { slug };

        let item = ContentItem {
            id,
            title: new.title,
            slug,
            type_name: new.type_name,
            status: new.status,
            created_at: chrono::Utc::now(),
        };

        match self.items.insert_one(&item).await {
            Ok(_) => Ok(item),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(format!(
                "Slug '{}' is already in use.",
                item.slug
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
