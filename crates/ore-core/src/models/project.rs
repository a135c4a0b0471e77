use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, SortOption};

/// Projects requested per page when the caller does not say otherwise
pub const PROJECTS_PER_PAGE: u32 = 25;

/// Review state of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    #[default]
    Public,
    New,
    NeedsChanges,
    NeedsApproval,
    SoftDelete,
}

impl Visibility {
    pub fn name(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::New => "new",
            Visibility::NeedsChanges => "needsChanges",
            Visibility::NeedsApproval => "needsApproval",
            Visibility::SoftDelete => "softDelete",
        }
    }

    /// CSS classes a project listing applies for this state
    pub fn css_class(&self) -> &'static str {
        match self {
            Visibility::Public => "",
            Visibility::New => "project-new",
            Visibility::NeedsChanges | Visibility::NeedsApproval => "striped project-needsChanges",
            Visibility::SoftDelete => "striped project-hidden",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "new" => Ok(Visibility::New),
            "needsChanges" => Ok(Visibility::NeedsChanges),
            "needsApproval" => Ok(Visibility::NeedsApproval),
            "softDelete" => Ok(Visibility::SoftDelete),
            other => Err(format!("unknown visibility: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    pub owner: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectStats {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub recent_views: u64,
    #[serde(default)]
    pub recent_downloads: u64,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub watchers: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub plugin_id: String,
    pub name: String,
    pub namespace: Namespace,
    #[serde(default)]
    pub stats: ProjectStats,
    pub category: Category,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub visibility: Visibility,
    pub icon_url: Option<String>,
}

impl Project {
    /// Site path of the project page
    pub fn url_path(&self) -> String {
        format!("/{}/{}", self.namespace.owner, self.namespace.slug)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    pub count: u64,
}

impl Pagination {
    /// 1-based page the offset falls on
    pub fn current_page(&self) -> u32 {
        if self.limit == 0 {
            return 1;
        }
        self.offset / self.limit + 1
    }

    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 1;
        }
        self.count.div_ceil(u64::from(self.limit)).max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedProjects {
    pub pagination: Pagination,
    pub result: Vec<Project>,
}

/// Filters and paging for `GET projects`.
///
/// Serializes to the query parameters of the endpoint; `categories` and
/// `tags` expand to repeated keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub sort: SortOption,
    pub relevance: bool,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ProjectQuery {
    fn default() -> Self {
        Self {
            q: None,
            categories: Vec::new(),
            tags: Vec::new(),
            owner: None,
            sort: SortOption::default(),
            relevance: true,
            limit: PROJECTS_PER_PAGE,
            offset: 0,
        }
    }
}

impl ProjectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text query; blank text clears it
    pub fn query(mut self, q: impl Into<String>) -> Self {
        let q = q.into();
        self.q = if q.trim().is_empty() { None } else { Some(q) };
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    pub fn relevance(mut self, relevance: bool) -> Self {
        self.relevance = relevance;
        self
    }

    /// Select a 1-based page of `per_page` results; pages below 1 clamp to the first
    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.limit = per_page;
        self.offset = page.saturating_sub(1).saturating_mul(per_page);
        self
    }
}
