use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::db::settings_repository::SettingsRepository;
use crate::error::AppError;

/// Static description of a tool offered in the directory.
#[derive(Debug, Clone, Copy)]
pub struct ToolDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const AVAILABLE_TOOLS: &[ToolDefinition] = &[
    ToolDefinition {
        id: "slug-scanner",
        title: "Slug Scanner",
        description: "Check whether URL slugs exist as content. Paste a list of URLs to see \
                      which are found and which are missing, then create drafts for the \
                      missing ones.",
        icon: "search",
    },
    ToolDefinition {
        id: "bulk-create-post",
        title: "Bulk Create Post",
        description: "Create multiple posts or pages at once by pasting one title per line.",
        icon: "media-text",
    },
];

pub fn find_tool(id: &str) -> Option<&'static ToolDefinition> {
    AVAILABLE_TOOLS.iter().find(|t| t.id == id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolStatus {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleToolRequest {
    pub tool_id: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToggleToolResponse {
    pub message: String,
    pub enabled_count: usize,
}

/// Every available tool with its enabled flag.
pub async fn process_list_tools(
    settings_repo: &dyn SettingsRepository,
) -> Result<ToolsResponse, AppError> {
    let settings = settings_repo.get_settings().await?;

    let tools = AVAILABLE_TOOLS
        .iter()
        .map(|tool| ToolStatus {
            id: tool.id.to_string(),
            title: tool.title.to_string(),
            description: tool.description.to_string(),
            icon: tool.icon.to_string(),
            enabled: settings.enabled_tools.iter().any(|id| id == tool.id),
        })
        .collect();

    Ok(ToolsResponse { tools })
}

/// Enable or disable one tool and persist the enabled set.
pub async fn process_toggle_tool(
    settings_repo: &dyn SettingsRepository,
    request: ToggleToolRequest,
) -> Result<ToggleToolResponse, AppError> {
    let tool_id = request.tool_id.trim();
    if tool_id.is_empty() || find_tool(tool_id).is_none() {
        return Err(AppError::BadRequest("Invalid tool ID.".into()));
    }

    let mut enabled_tools = settings_repo.get_settings().await?.enabled_tools;

    if request.enabled {
        if !enabled_tools.iter().any(|id| id == tool_id) {
            enabled_tools.push(tool_id.to_string());
        }
    } else {
        enabled_tools.retain(|id| id != tool_id);
    }

    settings_repo.set_enabled_tools(&enabled_tools).await?;

    tracing::info!(%tool_id, enabled = request.enabled, "Tool toggled");

    let message = if request.enabled {
        "Tool enabled successfully."
    } else {
        "Tool disabled successfully."
    };

    Ok(ToggleToolResponse {
        message: message.to_string(),
        enabled_count: enabled_tools.len(),
    })
}

/// Axum handler for `GET /api/v1/tools`.
pub async fn list_tools_handler(
    State(state): State<AppState>,
) -> Result<Json<ToolsResponse>, AppError> {
    let response = process_list_tools(state.settings_repo.as_ref()).await?;
    Ok(Json(response))
}

/// Axum handler for `POST /api/v1/tools/toggle`.
pub async fn toggle_tool_handler(
    State(state): State<AppState>,
    Json(request): Json<ToggleToolRequest>,
) -> Result<Json<ToggleToolResponse>, AppError> {
    let response = process_toggle_tool(state.settings_repo.as_ref(), request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::settings_repository::MemorySettingsRepository;

    fn toggle(tool_id: &str, enabled: bool) -> ToggleToolRequest {
        ToggleToolRequest {
            tool_id: tool_id.to_string(),
            enabled,
        }
    }

    #[tokio::test]
    async fn test_list_tools_defaults_disabled() {
        let repo = MemorySettingsRepository::new();
        let response = process_list_tools(&repo).await.unwrap();

        let ids: Vec<&str> = response.tools.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["slug-scanner", "bulk-create-post"]);
        assert!(response.tools.iter().all(|t| !t.enabled));
    }

    #[tokio::test]
    async fn test_toggle_enable_is_idempotent() {
        let repo = MemorySettingsRepository::new();

        let first = process_toggle_tool(&repo, toggle("slug-scanner", true)).await.unwrap();
        let second = process_toggle_tool(&repo, toggle("slug-scanner", true)).await.unwrap();

        assert_eq!(first.message, "Tool enabled successfully.");
        assert_eq!(second.enabled_count, 1);

        let tools = process_list_tools(&repo).await.unwrap().tools;
        assert!(tools[0].enabled);
        assert!(!tools[1].enabled);
    }

    #[tokio::test]
    async fn test_toggle_disable_keeps_order() {
        let repo = MemorySettingsRepository::new();
        process_toggle_tool(&repo, toggle("bulk-create-post", true)).await.unwrap();
        process_toggle_tool(&repo, toggle("slug-scanner", true)).await.unwrap();

        let response = process_toggle_tool(&repo, toggle("bulk-create-post", false))
            .await
            .unwrap();

        assert_eq!(response.message, "Tool disabled successfully.");
        assert_eq!(response.enabled_count, 1);
        assert_eq!(
            repo.get_settings().await.unwrap().enabled_tools,
            vec!["slug-scanner"]
        );
    }

    #[tokio::test]
    async fn test_toggle_rejects_unknown_tool() {
        let repo = MemorySettingsRepository::new();
        for id in ["", "  ", "time-machine"] {
            match process_toggle_tool(&repo, toggle(id, true)).await {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid tool ID."),
                other => panic!("Expected BadRequest error, got: {:?}", other),
            }
        }
    }
}
