use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permissions an API key can be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedPermission {
    ViewPublicInfo,
    EditOwnUserSettings,
    EditApiKeys,
    EditSubjectSettings,
    ManageSubjectMembers,
    IsSubjectOwner,
    IsSubjectMember,
    CreateProject,
    EditPage,
    DeleteProject,
    CreateVersion,
    EditVersion,
    DeleteVersion,
    EditChannel,
    CreateOrganization,
    PostAsOrganization,
    ModNotesAndFlags,
    SeeHidden,
    IsStaff,
    Reviewer,
    ViewHealth,
    ViewIp,
    ViewStats,
    ViewLogs,
    ManualValueChanges,
    HardDeleteProject,
    HardDeleteVersion,
    EditAllUserSettings,
}

impl NamedPermission {
    /// snake_case name used on the wire
    pub fn api_name(&self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }
}

impl fmt::Display for NamedPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.api_name())
    }
}

impl FromStr for NamedPermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown permission: {}", s))
    }
}

/// Body of `POST keys`
#[derive(Debug, Clone, Serialize)]
pub struct KeyToCreate {
    pub name: String,
    pub permissions: Vec<NamedPermission>,
}

/// Response of `POST keys`. The key value is only ever shown once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedKey {
    pub key: String,
    #[serde(default)]
    pub perms: Vec<NamedPermission>,
}

impl CreatedKey {
    /// Comma-separated permission list for display
    pub fn permission_list(&self) -> String {
        self.perms
            .iter()
            .map(NamedPermission::api_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_names() {
        assert_eq!(NamedPermission::EditApiKeys.api_name(), "edit_api_keys");
        assert_eq!(NamedPermission::ViewIp.to_string(), "view_ip");
        assert_eq!(
            "hard_delete_project".parse::<NamedPermission>().unwrap(),
            NamedPermission::HardDeleteProject
        );
        assert!("edit_everything".parse::<NamedPermission>().is_err());
    }

    #[test]
    fn test_created_key_display() {
        let key: CreatedKey = serde_json::from_str(
            r#"{"key":"a1b2c3","perms":["create_version","edit_page"]}"#,
        )
        .expect("Failed to parse created key JSON");
        assert_eq!(key.key, "a1b2c3");
        // No trailing separator
        assert_eq!(key.permission_list(), "create_version, edit_page");
    }
}
