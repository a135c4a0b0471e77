use serde::{Deserialize, Serialize};

/// `plugin-info` part of a version upload
#[derive(Debug, Clone, Default, Serialize)]
pub struct VersionUpload {
    pub create_forum_post: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: super::Visibility,
}
