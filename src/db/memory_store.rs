use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::db::content_store::{validate_new_content, ContentStore};
use crate::db::models::{
    ContentItem, ContentStatus, ContentType, NewContent, SlugPattern, TypeFilter,
};
use crate::error::AppError;

/// Lock `mutex`, reporting a poisoned lock as an internal error.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex
        .lock()
        .map_err(|_| AppError::Internal("In-memory store lock poisoned".into()))
}

/// In-process content store used for demo mode and tests.
///
/// Items are kept in creation order; "newest first" means later in the vec.
#[derive(Default)]
pub struct MemoryContentStore {
    items: Mutex<Vec<ContentItem>>,
    types: Mutex<Vec<ContentType>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with the install-time content types already registered.
    pub fn with_default_types() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            types: Mutex::new(ContentType::defaults()),
        }
    }

    /// Move an item to the trash. Returns `false` if no item has `id`.
    pub fn trash(&self, id: &str) -> Result<bool, AppError> {
        let mut items = lock(&self.items)?;
        match items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.status = ContentStatus::Trash;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn public_type_names(&self) -> Result<Vec<String>, AppError> {
        Ok(lock(&self.types)?
            .iter()
            .filter(|t| t.public)
            .map(|t| t.name.clone())
            .collect())
    }

    fn visible<'a>(
        item: &'a ContentItem,
        filter: &TypeFilter,
        public_types: &[String],
    ) -> Option<&'a ContentItem> {
        (item.status != ContentStatus::Trash && filter.admits(&item.type_name, public_types))
            .then_some(item)
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn list_types(&self) -> Result<Vec<ContentType>, AppError> {
        Ok(lock(&self.types)?.clone())
    }

    async fn register_type(&self, content_type: ContentType) -> Result<(), AppError> {
        let mut types = lock(&self.types)?;
        match types.iter_mut().find(|t| t.name == content_type.name) {
            Some(existing) => *existing = content_type,
            None => types.push(content_type),
        }
        Ok(())
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        filter: &TypeFilter,
    ) -> Result<Option<ContentItem>, AppError> {
        let public_types = self.public_type_names()?;
        Ok(lock(&self.items)?
            .iter()
            .filter_map(|item| Self::visible(item, filter, &public_types))
            .find(|item| item.slug == slug)
            .cloned())
    }

    async fn find_by_pattern(
        &self,
        pattern: &SlugPattern,
        filter: &TypeFilter,
        limit: usize,
    ) -> Result<Vec<ContentItem>, AppError> {
        let public_types = self.public_type_names()?;
        let items = lock(&self.items)?;

        let mut matches: Vec<&ContentItem> = items
            .iter()
            .filter_map(|item| Self::visible(item, filter, &public_types))
            .filter(|item| pattern.matches(&item.slug))
            .collect();

        // Stable sort keeps later insertions ahead of earlier ones when the
        // timestamps tie.
        matches.reverse();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matches.into_iter().take(limit).cloned().collect())
    }

    async fn find_by_title(
        &self,
        title: &str,
        type_name: &str,
    ) -> Result<Option<ContentItem>, AppError> {
        Ok(lock(&self.items)?
            .iter()
            .find(|item| {
                item.title == title
                    && item.type_name == type_name
                    && item.status != ContentStatus::Trash
            })
            .cloned())
    }

    async fn slug_exists(&self, slug: &str, type_name: &str) -> Result<bool, AppError> {
        Ok(lock(&self.items)?
            .iter()
            .any(|item| item.slug == slug && item.type_name == type_name))
    }

    async fn create(&self, new: NewContent) -> Result<ContentItem, AppError> {
        validate_new_content(&new, &lock(&self.types)?)?;

        let id = uuid::Uuid::new_v4().to_string();
        let slug = match new.slug {
            Some(slug) if !slug.is_empty() => slug,
            _ => crate::slug::sanitize_slug(&new.title),
        };
        let slug = if slug.is_empty() { id.clone() } else { slug };

        let mut items = lock(&self.items)?;
        if items
            .iter()
            .any(|item| item.slug == slug && item.type_name == new.type_name)
        {
            return Err(AppError::Conflict(format!(
                "Slug '{}' is already in use.",
                slug
            )));
        }

        let item = ContentItem {
            id,
            title: new.title,
            slug,
            type_name: new.type_name,
            status: new.status,
            created_at: chrono::Utc::now(),
        };
        items.push(item.clone());
        Ok(item)
    }
}
