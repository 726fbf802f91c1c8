use crate::db::content_store::ContentStore;
use crate::db::models::{ContentStatus, NewContent, TypeFilter};

/// Sample content so the slug scanner has something to find in demo mode.
const DEMO_CONTENT: &[(&str, &str, &str, ContentStatus)] = &[
    ("page", "about", "About", ContentStatus::Publish),
    ("page", "contact", "Contact", ContentStatus::Publish),
    ("page", "services", "Services", ContentStatus::Publish),
    ("page", "web-design", "Web Design", ContentStatus::Publish),
    ("page", "pricing-plans", "Pricing Plans", ContentStatus::Draft),
    ("post", "hello-world", "Hello World", ContentStatus::Publish),
    ("post", "getting-started", "Getting Started", ContentStatus::Publish),
    ("post", "release-notes-2024", "Release Notes 2024", ContentStatus::Publish),
    ("post", "say-hello", "Say Hello", ContentStatus::Draft),
];

/// Insert the sample content, skipping items whose slug already exists.
pub async fn seed_demo_data(store: &dyn ContentStore) {
    tracing::info!("Starting demo data seeding...");

    for &(type_name, slug, title, status) in DEMO_CONTENT {
        let filter = TypeFilter::Only(type_name.to_string());
        match store.find_by_slug(slug, &filter).await {
            Ok(Some(_)) => {
                tracing::info!("Content '{}' already exists, skipping.", slug);
                continue;
            }
            Err(e) => {
                tracing::error!("Failed to check for existing content '{}': {}", slug, e);
                continue;
            }
            Ok(None) => {}
        }

        let new = NewContent {
            title: title.to_string(),
            slug: Some(slug.to_string()),
            type_name: type_name.to_string(),
            status,
        };

        match store.create(new).await {
            Ok(item) => tracing::info!("Inserted demo {} '{}' ({}).", type_name, slug, item.id),
            Err(e) => tracing::error!("Failed to insert demo content '{}': {}", slug, e),
        }
    }

    tracing::info!("Demo data seeding completed.");
}
