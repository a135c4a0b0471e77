//! Ore CLI - command-line access to the Ore plugin repository API.
//!
//! Sessions are cached between runs (see `ore_core::config`), so repeated
//! invocations reuse one bearer token until it nears expiry.

mod output;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ore_core::models::{Category, NamedPermission, ProjectQuery, SortOption, VersionUpload, Visibility, PROJECTS_PER_PAGE};
use ore_core::{ApiClient, AuthScheme, Config, StoreKind};

#[derive(Parser, Debug)]
#[command(name = "ore", version, about = "Command-line client for the Ore plugin repository API")]
struct Cli {
    /// Site root of the Ore instance
    #[arg(long, env = "ORE_BASE_URL")]
    base_url: Option<String>,

    /// Use user sessions (requires a logged-in cookie)
    #[arg(long)]
    user: bool,

    #[arg(long, env = "ORE_CSRF_TOKEN")]
    csrf_token: Option<String>,

    /// Cookie header of a logged-in browser session
    #[arg(long, env = "ORE_SESSION_COOKIE")]
    session_cookie: Option<String>,

    /// Session cache: memory, file or keyring
    #[arg(long)]
    store: Option<StoreKind>,

    /// Send `ApiSession <token>` instead of `OreApi session=<token>`
    #[arg(long)]
    legacy_auth: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a valid session token, authenticating if needed
    Session,
    /// Forget the cached session
    Logout,
    /// Search projects
    Projects(ProjectsArgs),
    /// Show a user
    User { name: String },
    /// Manage API keys
    #[command(subcommand)]
    Keys(KeysCommand),
    /// Change the visibility of a project
    Visibility {
        plugin_id: String,
        visibility: Visibility,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Permanently delete a project
    Delete {
        plugin_id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Create a wiki page
    Page {
        plugin_id: String,
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Upload a plugin file as a new version
    Upload {
        plugin_id: String,
        file: PathBuf,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        forum_post: bool,
    },
    /// List project categories and platform tags
    Filters,
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Debug)]
struct ProjectsArgs {
    /// Free-text query
    #[arg(short, long)]
    query: Option<String>,
    #[arg(long = "category")]
    categories: Vec<Category>,
    /// Platform or free-form tag
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    owner: Option<String>,
    #[arg(long, default_value = "updated")]
    sort: SortOption,
    /// Order by sort option only, ignoring query relevance
    #[arg(long)]
    no_relevance: bool,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = PROJECTS_PER_PAGE)]
    per_page: u32,
    /// Print raw JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Create a key; the secret is printed once
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "perm", required = true)]
        permissions: Vec<NamedPermission>,
    },
    /// Delete a key by name
    Delete { name: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ore.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// Apply command-line overrides on top of the stored configuration
fn effective_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(ref base_url) = cli.base_url {
        config.base_url = base_url.clone();
    }
    if cli.csrf_token.is_some() {
        config.csrf_token = cli.csrf_token.clone();
    }
    if cli.session_cookie.is_some() {
        config.session_cookie = cli.session_cookie.clone();
    }
    if let Some(store) = cli.store {
        config.store = store;
    }
    if cli.legacy_auth {
        config.auth_scheme = AuthScheme::ApiSession;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_ref());

    let config = effective_config(&cli)?;
    let client = config.build_client(cli.user)?;
    info!(
        base_url = %client.options().base_url,
        kind = %client.session_kind(),
        auth_scheme = ?client.options().auth_scheme,
        "Ore client ready"
    );

    run(&config, &client, cli.command).await
}

async fn run(config: &Config, client: &ApiClient, command: Command) -> Result<()> {
    match command {
        Command::Config { save } => {
            if save {
                config.save().context("Failed to save configuration")?;
            }
            println!("# {}", Config::config_path()?.display());
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        Command::Filters => output::print_filters(),
        Command::Session => {
            let token = client.get_session().await?;
            println!("{}", token);
        }
        Command::Logout => {
            client.invalidate_session()?;
            println!("Cached {} session removed", client.session_kind());
        }
        Command::Projects(args) => {
            let mut query = ProjectQuery::new()
                .sort(args.sort)
                .relevance(!args.no_relevance)
                .page(args.page, args.per_page);
            if let Some(q) = args.query {
                query = query.query(q);
            }
            if let Some(owner) = args.owner {
                query = query.owner(owner);
            }
            for category in args.categories {
                query = query.category(category);
            }
            for tag in args.tags {
                query = query.tag(tag);
            }

            let projects = client.search_projects(&query).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else {
                output::print_projects(&projects);
            }
        }
        Command::User { name } => {
            let user = client.show_user(&name).await?;
            output::print_user(&user);
        }
        Command::Keys(KeysCommand::Create { name, permissions }) => {
            let key = client.create_key(&name, &permissions).await?;
            println!("Key:         {}", key.key);
            println!("Permissions: {}", key.permission_list());
        }
        Command::Keys(KeysCommand::Delete { name }) => {
            client.delete_key(&name).await?;
            println!("Key {} deleted", name);
        }
        Command::Visibility {
            plugin_id,
            visibility,
            comment,
        } => {
            client.set_visibility(&plugin_id, visibility, &comment).await?;
            println!("{} is now {}", plugin_id, visibility);
        }
        Command::Delete { plugin_id, yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete {} without --yes", plugin_id);
            }
            client.hard_delete_project(&plugin_id).await?;
            println!("{} deleted", plugin_id);
        }
        Command::Page {
            plugin_id,
            name,
            parent,
        } => {
            let path = client.create_page(&plugin_id, &name, parent.as_deref()).await?;
            println!("Created page {}", path);
        }
        Command::Upload {
            plugin_id,
            file,
            description,
            forum_post,
        } => {
            let bytes = std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file.display()))?;
            let info = VersionUpload {
                create_forum_post: forum_post,
                description,
            };
            let version = client.upload_version(&plugin_id, &info, file_name, bytes).await?;
            println!("Uploaded {} {}", plugin_id, version.name);
        }
    }
    Ok(())
}
