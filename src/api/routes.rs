use axum::extract::Request;
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use axum_extra::extract::SignedCookieJar;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::app::AppState;
use crate::auth::demo_auth;
use crate::auth::models::Capability;
use crate::auth::session::require_capability;
use crate::tools::{bulk_create, registry, slug_scanner};

/// Request names exposed by the tools API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetPostTypes,
    ScanSlugs,
    CreatePost,
    BulkCreatePosts,
    ListTools,
    ToggleTool,
}

impl Action {
    fn handler(self) -> MethodRouter<AppState> {
        match self {
            Action::GetPostTypes => get(slug_scanner::post_types_handler),
            Action::ScanSlugs => post(slug_scanner::scan_slugs_handler),
            Action::CreatePost => post(slug_scanner::create_post_handler),
            Action::BulkCreatePosts => post(bulk_create::bulk_create_handler),
            Action::ListTools => get(registry::list_tools_handler),
            Action::ToggleTool => post(registry::toggle_tool_handler),
        }
    }
}

/// One entry of the route table.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub action: Action,
    pub method: Method,
    pub path: &'static str,
    /// Checked before the handler runs. Bulk creation additionally requires
    /// `publish_posts` for published items, checked inside the handler.
    pub capability: Capability,
}

/// Every tool route with the capability it requires.
pub fn route_table() -> Vec<RouteEntry> {
    vec![
        RouteEntry {
            action: Action::GetPostTypes,
            method: Method::GET,
            path: "/api/v1/tools/post-types",
            capability: Capability::ManageOptions,
        },
        RouteEntry {
            action: Action::ScanSlugs,
            method: Method::POST,
            path: "/api/v1/tools/scan-slugs",
            capability: Capability::ManageOptions,
        },
        RouteEntry {
            action: Action::CreatePost,
            method: Method::POST,
            path: "/api/v1/tools/create-post",
            capability: Capability::CreatePosts,
        },
        RouteEntry {
            action: Action::BulkCreatePosts,
            method: Method::POST,
            path: "/api/v1/tools/bulk-create-posts",
            capability: Capability::CreatePosts,
        },
        RouteEntry {
            action: Action::ListTools,
            method: Method::GET,
            path: "/api/v1/tools",
            capability: Capability::ManageOptions,
        },
        RouteEntry {
            action: Action::ToggleTool,
            method: Method::POST,
            path: "/api/v1/tools/toggle",
            capability: Capability::ManageOptions,
        },
    ]
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router: guarded tool routes, session routes and
/// the health probe.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new();

    for entry in route_table() {
        let capability = entry.capability;
        let guard = middleware::from_fn_with_state(
            state.clone(),
            move |jar: SignedCookieJar, request: Request, next: Next| {
                require_capability(capability, jar, request, next)
            },
        );

        tracing::debug!(
            action = ?entry.action,
            method = %entry.method,
            path = entry.path,
            %capability,
            "Registering tool route"
        );
        router = router.route(entry.path, entry.action.handler().route_layer(guard));
    }

    router
        .route("/api/auth/login", post(demo_auth::login_handler))
        .route("/api/auth/me", get(demo_auth::me_handler))
        .route("/api/auth/logout", post(demo_auth::logout_handler))
        .route("/health", get(health_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
