use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Project categories, in the order the site lists them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AdminTools,
    Chat,
    DevTools,
    Economy,
    Gameplay,
    Games,
    Protection,
    RolePlaying,
    WorldManagement,
    Misc,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::AdminTools,
        Category::Chat,
        Category::DevTools,
        Category::Economy,
        Category::Gameplay,
        Category::Games,
        Category::Protection,
        Category::RolePlaying,
        Category::WorldManagement,
        Category::Misc,
    ];

    /// API identifier
    pub fn id(&self) -> &'static str {
        match self {
            Category::AdminTools => "admin_tools",
            Category::Chat => "chat",
            Category::DevTools => "dev_tools",
            Category::Economy => "economy",
            Category::Gameplay => "gameplay",
            Category::Games => "games",
            Category::Protection => "protection",
            Category::RolePlaying => "role_playing",
            Category::WorldManagement => "world_management",
            Category::Misc => "misc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::AdminTools => "Admin Tools",
            Category::Chat => "Chat",
            Category::DevTools => "Developer Tools",
            Category::Economy => "Economy",
            Category::Gameplay => "Gameplay",
            Category::Games => "Games",
            Category::Protection => "Protection",
            Category::RolePlaying => "Role Playing",
            Category::WorldManagement => "World Management",
            Category::Misc => "Miscellaneous",
        }
    }

    /// Font Awesome icon name
    pub fn icon(&self) -> &'static str {
        match self {
            Category::AdminTools => "server",
            Category::Chat => "comment",
            Category::DevTools => "wrench",
            Category::Economy => "money-bill-alt",
            Category::Gameplay => "puzzle-piece",
            Category::Games => "gamepad",
            Category::Protection => "lock",
            Category::RolePlaying => "magic",
            Category::WorldManagement => "globe",
            Category::Misc => "asterisk",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Platforms a project can declare as tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    SpongeApi,
    SpongeForge,
    SpongeVanilla,
    SpongeCommon,
    Lantern,
    Forge,
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Platform::SpongeApi,
        Platform::SpongeForge,
        Platform::SpongeVanilla,
        Platform::SpongeCommon,
        Platform::Lantern,
        Platform::Forge,
    ];

    /// Tag name used by the API
    pub fn id(&self) -> &'static str {
        match self {
            Platform::SpongeApi => "spongeapi",
            Platform::SpongeForge => "spongeforge",
            Platform::SpongeVanilla => "spongevanilla",
            Platform::SpongeCommon => "sponge",
            Platform::Lantern => "lantern",
            Platform::Forge => "forge",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Platform::SpongeApi => "Sponge",
            Platform::SpongeForge => "SpongeForge",
            Platform::SpongeVanilla => "SpongeVanilla",
            Platform::SpongeCommon => "SpongeCommon",
            Platform::Lantern => "Lantern",
            Platform::Forge => "Forge",
        }
    }

    /// Top-level platforms group the others in the filter list
    pub fn is_parent(&self) -> bool {
        matches!(self, Platform::SpongeApi | Platform::Forge)
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    /// Check whether a tag name denotes a platform rather than a free-form tag
    pub fn is_platform_tag(tag: &str) -> bool {
        Self::from_id(tag).is_some()
    }
}

/// Result orderings understood by the project search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    Stars,
    Downloads,
    Views,
    Newest,
    #[default]
    Updated,
    OnlyRelevance,
    RecentViews,
    RecentDownloads,
}

impl SortOption {
    pub const ALL: [SortOption; 8] = [
        SortOption::Stars,
        SortOption::Downloads,
        SortOption::Views,
        SortOption::Newest,
        SortOption::Updated,
        SortOption::OnlyRelevance,
        SortOption::RecentViews,
        SortOption::RecentDownloads,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            SortOption::Stars => "stars",
            SortOption::Downloads => "downloads",
            SortOption::Views => "views",
            SortOption::Newest => "newest",
            SortOption::Updated => "updated",
            SortOption::OnlyRelevance => "only_relevance",
            SortOption::RecentViews => "recent_views",
            SortOption::RecentDownloads => "recent_downloads",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Stars => "Most Stars",
            SortOption::Downloads => "Most Downloads",
            SortOption::Views => "Most Views",
            SortOption::Newest => "Newest",
            SortOption::Updated => "Recently updated",
            SortOption::OnlyRelevance => "Only relevance",
            SortOption::RecentViews => "Recent Views",
            SortOption::RecentDownloads => "Recent Downloads",
        }
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.id() == s)
            .ok_or_else(|| format!("unknown sort option: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ids_match_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.id()));
            assert_eq!(Category::from_id(category.id()), Some(category));
        }
        assert_eq!("dev_tools".parse::<Category>().unwrap().display_name(), "Developer Tools");
        assert!("plugins".parse::<Category>().is_err());
    }

    #[test]
    fn test_platform_tags() {
        assert!(Platform::is_platform_tag("spongeforge"));
        assert!(Platform::is_platform_tag("sponge"));
        assert!(!Platform::is_platform_tag("Sponge"));
        assert_eq!(Platform::from_id("sponge"), Some(Platform::SpongeCommon));
        assert!(Platform::Forge.is_parent());
        assert!(!Platform::Lantern.is_parent());
        // The spongeapi tag is shown as plain "Sponge"
        assert_eq!(Platform::SpongeApi.short_name(), "Sponge");
        assert_eq!(Platform::SpongeCommon.short_name(), "SpongeCommon");
    }

    #[test]
    fn test_category_icons() {
        assert_eq!(Category::Economy.icon(), "money-bill-alt");
        assert_eq!(Category::Misc.icon(), "asterisk");
        assert!(Category::ALL.iter().all(|c| !c.icon().is_empty()));
    }

    #[test]
    fn test_sort_option_ids_match_serde() {
        for option in SortOption::ALL {
            let json = serde_json::to_string(&option).unwrap();
            assert_eq!(json, format!("\"{}\"", option.id()));
        }
        assert_eq!("recent_views".parse::<SortOption>().unwrap(), SortOption::RecentViews);
    }
}
