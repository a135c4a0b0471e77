//! Data models for Ore API entities.
//!
//! - `Project`, `PaginatedProjects`, `ProjectQuery`: project search
//! - `Category`, `Platform`, `SortOption`, `Visibility`: fixed vocabularies
//! - `NamedPermission`, `KeyToCreate`, `CreatedKey`: API key management
//! - `User`, `Version`, `VersionUpload`

pub mod category;
pub mod key;
pub mod project;
pub mod user;
pub mod version;

pub use category::{Category, Platform, SortOption};
pub use key::{CreatedKey, KeyToCreate, NamedPermission};
pub use project::{Namespace, PaginatedProjects, Pagination, Project, ProjectQuery, ProjectStats, Visibility, PROJECTS_PER_PAGE};
pub use user::{Role, User};
pub use version::{Version, VersionUpload};
