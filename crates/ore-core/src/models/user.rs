use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub title: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub tagline: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub join_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl User {
    pub fn role_titles(&self) -> String {
        if self.roles.is_empty() {
            return "-".to_string();
        }
        self.roles
            .iter()
            .map(|r| r.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
