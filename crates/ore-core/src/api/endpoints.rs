//! Typed wrappers for the API calls the Ore front-end makes.
//!
//! Everything here goes through `ApiClient::request`, so each call gets the
//! same session handling and single retry.

use reqwest::Method;
use serde_json::{json, Value};
use tracing::info;

use crate::models::{
    CreatedKey, KeyToCreate, NamedPermission, PaginatedProjects, ProjectQuery, User, Version, VersionUpload,
    Visibility,
};
use crate::utils::slugify;

use super::client::{ApiClient, Body};
use super::transport::FormData;
use super::ApiError;

/// Characters the URL parser treats as path, query or fragment delimiters
const RESERVED_PATH_CHARS: &[char] = &['/', '\\', '?', '#', '%'];

/// Reject values that would not stay a single path segment once parsed.
///
/// Besides delimiters this covers dot segments, which the parser resolves
/// against the preceding path, and control characters, which it strips.
fn path_segment<'a>(what: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} must not be empty", what)));
    }
    if value == "." || value == ".." {
        return Err(ApiError::InvalidInput(format!("{} must not be a dot segment: {}", what, value)));
    }
    if value.contains(RESERVED_PATH_CHARS) || value.chars().any(char::is_control) {
        return Err(ApiError::InvalidInput(format!(
            "{} contains reserved characters: {:?}",
            what, value
        )));
    }
    Ok(value)
}

impl ApiClient {
    // ===== Projects =====

    /// Search projects. Ranking and filtering happen server side.
    pub async fn search_projects(&self, query: &ProjectQuery) -> Result<PaginatedProjects, ApiError> {
        let params = serde_json::to_value(query)
            .map_err(|e| ApiError::InvalidInput(format!("Failed to encode project query: {}", e)))?;
        self.request("projects", Method::GET, params).await
    }

    /// Move a project to another review state. `comment` is shown to the owner.
    pub async fn set_visibility(&self, plugin_id: &str, visibility: Visibility, comment: &str) -> Result<(), ApiError> {
        let plugin_id = path_segment("plugin id", plugin_id)?;
        let body = json!({ "visibility": visibility, "comment": comment });
        self.request::<Value>(&format!("projects/{}/visibility", plugin_id), Method::POST, body)
            .await?;
        info!(plugin_id = plugin_id, visibility = %visibility, "Project visibility changed");
        Ok(())
    }

    /// Permanently delete a project
    pub async fn hard_delete_project(&self, plugin_id: &str) -> Result<(), ApiError> {
        let plugin_id = path_segment("plugin id", plugin_id)?;
        self.request::<Value>(&format!("projects/{}", plugin_id), Method::DELETE, Body::Empty)
            .await?;
        info!(plugin_id = plugin_id, "Project hard deleted");
        Ok(())
    }

    // ===== Pages =====

    /// Create a wiki page named `name`, optionally below `parent`.
    ///
    /// The page starts with a heading of its name. Returns the page path.
    pub async fn create_page(&self, plugin_id: &str, name: &str, parent: Option<&str>) -> Result<String, ApiError> {
        let plugin_id = path_segment("plugin id", plugin_id)?;
        let name = path_segment("page name", name)?;
        let slug = slugify(name);
        let page_path = match parent {
            Some(parent) => format!("{}/{}", path_segment("parent page", parent)?, slug),
            None => slug,
        };

        let body = json!({ "name": name, "content": format!("# {}\n", name) });
        self.request::<Value>(&format!("projects/{}/_pages/{}", plugin_id, page_path), Method::PUT, body)
            .await?;
        info!(plugin_id = plugin_id, page = %page_path, "Page created");
        Ok(page_path)
    }

    // ===== Versions =====

    /// Upload a plugin file as a new version
    pub async fn upload_version(
        &self,
        plugin_id: &str,
        info: &VersionUpload,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Version, ApiError> {
        let plugin_id = path_segment("plugin id", plugin_id)?;
        let plugin_info = serde_json::to_string(info)
            .map_err(|e| ApiError::InvalidInput(format!("Failed to encode version info: {}", e)))?;
        let form = FormData::new()
            .text("plugin-info", plugin_info)
            .file("plugin-file", file_name, Some("application/java-archive"), bytes);

        self.request(&format!("projects/{}/versions", plugin_id), Method::POST, form)
            .await
    }

    // ===== API keys =====

    /// Create an API key. Name and permission list must both be non-empty.
    pub async fn create_key(&self, name: &str, permissions: &[NamedPermission]) -> Result<CreatedKey, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("key name must not be empty".to_string()));
        }
        if permissions.is_empty() {
            return Err(ApiError::InvalidInput("at least one permission is required".to_string()));
        }

        let body = KeyToCreate {
            name: name.to_string(),
            permissions: permissions.to_vec(),
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| ApiError::InvalidInput(format!("Failed to encode key request: {}", e)))?;
        self.request("keys", Method::POST, body).await
    }

    pub async fn delete_key(&self, name: &str) -> Result<(), ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("key name must not be empty".to_string()));
        }
        self.request::<Value>("keys", Method::DELETE, json!({ "name": name }))
            .await?;
        info!(key = name, "API key deleted");
        Ok(())
    }

    // ===== Users =====

    pub async fn show_user(&self, name: &str) -> Result<User, ApiError> {
        let name = path_segment("user name", name)?;
        self.get(&format!("users/{}", name)).await
    }
}
