//! Plain-text rendering of API results.

use ore_core::models::{Category, PaginatedProjects, Platform, User, Visibility};
use ore_core::utils::{abbreviate_stat, format_date, truncate_string};

/// Maximum width of the project name column
const NAME_WIDTH: usize = 32;

pub fn print_projects(projects: &PaginatedProjects) {
    if projects.result.is_empty() {
        println!("No projects found");
        return;
    }

    println!(
        "{:<32} {:<24} {:>9} {:>6} {:<18} {}",
        "NAME", "PLUGIN ID", "DOWNLOADS", "STARS", "CATEGORY", "UPDATED"
    );
    for project in &projects.result {
        let mut name = truncate_string(&project.name, NAME_WIDTH);
        if project.visibility != Visibility::Public {
            name = truncate_string(&format!("{} [{}]", project.name, project.visibility), NAME_WIDTH);
        }
        println!(
            "{:<32} {:<24} {:>9} {:>6} {:<18} {}",
            name,
            truncate_string(&project.plugin_id, 24),
            abbreviate_stat(project.stats.downloads),
            abbreviate_stat(project.stats.stars),
            project.category.display_name(),
            format_date(project.last_updated.as_ref()),
        );
    }

    let pagination = &projects.pagination;
    println!(
        "\nPage {} of {} ({} projects)",
        pagination.current_page(),
        pagination.total_pages(),
        pagination.count
    );
}

pub fn print_user(user: &User) {
    println!("Name:    {}", user.name);
    println!("Tagline: {}", user.tagline.as_deref().unwrap_or("-"));
    println!("Joined:  {}", format_date(user.join_date.as_ref()));
    println!("Roles:   {}", user.role_titles());
}

/// List the values accepted by `projects --category` and `--tag`
pub fn print_filters() {
    println!("{:<18} {:<18} {}", "CATEGORY", "NAME", "ICON");
    for category in Category::ALL {
        println!("{:<18} {:<18} {}", category.id(), category.display_name(), category.icon());
    }

    println!("\n{:<18} {}", "PLATFORM TAG", "NAME");
    for platform in Platform::ALL {
        let indent = if platform.is_parent() { "" } else { "  " };
        println!("{:<18} {}{}", platform.id(), indent, platform.short_name());
    }
}
