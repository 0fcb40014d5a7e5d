use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use mediacat::catalog::{Catalog, CategoryRepository, RequestContext, TracingInterceptor};
use mediacat::config::Config;
use mediacat::error::{CatalogError, DataAccessError};
use mediacat::feed::render_mrss;
use mediacat::storage::{Database, Fixture};
use mediacat::util::{validate_order, validate_page};

/// Get the config directory path (~/.config/mediacat/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("mediacat"))
}

#[derive(Parser, Debug)]
#[command(name = "mediacat", about = "Hierarchical media catalog")]
struct Args {
    /// Config file (defaults to ~/.config/mediacat/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Catalog database, overriding the config file
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load categories and media from a JSON fixture
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the category tree with published counts
    Tree {
        /// Only print this category's subtree
        #[arg(long)]
        slug: Option<String>,
    },
    /// Latest and popular items, optionally within one category
    Index {
        #[arg(long)]
        slug: Option<String>,
    },
    /// One page of a category's items
    More {
        #[arg(long)]
        slug: String,
        /// `latest` or `popular`
        #[arg(long, default_value = "latest")]
        order: String,
        #[arg(long)]
        page: Option<String>,
    },
    /// Media RSS for the newest items
    Feed {
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        limit: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let db_path = args
        .db
        .clone()
        .unwrap_or_else(|| config.database_path_in(&config_dir));
    let db = open_database(&db_path).await?;

    match args.command {
        Command::Import { file } => import(&db, &file).await,
        Command::Tree { slug } => print_tree(&db, slug.as_deref()).await,
        Command::Index { slug } => {
            let catalog = build_catalog(db, &config);
            let view = catalog.index(slug.as_deref()).await;
            print_json(view)
        }
        Command::More { slug, order, page } => {
            let order = validate_order(&order).map_err(CatalogError::from);
            let page = validate_page(page.as_deref()).map_err(CatalogError::from);
            let view = match (order, page) {
                (Ok(order), Ok(page)) => build_catalog(db, &config).more(&slug, order, page).await,
                (Err(e), _) | (_, Err(e)) => Err(e),
            };
            print_json(view)
        }
        Command::Feed { slug, limit } => {
            let catalog = build_catalog(db, &config);
            let response = catalog
                .feed(slug.as_deref(), limit.as_deref())
                .await
                .map_err(report)?;
            let xml = render_mrss(&response, &config.site_url)?;
            println!("{xml}");
            Ok(())
        }
    }
}

async fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;

    match Database::open(path_str).await {
        Ok(db) => Ok(db),
        Err(DataAccessError::Locked) => {
            eprintln!("Error: The catalog database is locked by another process. Try again shortly.");
            std::process::exit(1);
        }
        Err(e) => Err(anyhow::anyhow!("Failed to open database: {}", e)),
    }
}

fn build_catalog(db: Database, config: &Config) -> Catalog<Database> {
    Catalog::new(db)
        .with_options(config.view_options())
        .with_settings(config.clone())
        .with_interceptor(TracingInterceptor)
}

async fn import(db: &Database, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read fixture file: {}", file.display()))?;
    let fixture: Fixture = serde_json::from_str(&content)
        .with_context(|| format!("Fixture is not valid JSON: {}", file.display()))?;

    let summary = db.import(&fixture).await.context("Import failed")?;
    println!(
        "Imported {} categories, {} media, {} category links",
        summary.categories, summary.media, summary.links
    );
    Ok(())
}

async fn print_tree(db: &Database, slug: Option<&str>) -> Result<()> {
    let now = Utc::now();
    let root = match slug {
        Some(slug) => db
            .category_by_slug(slug, now)
            .await
            .context("Failed to look up category")?
            .map(|record| Some(record.category.id))
            .ok_or_else(|| anyhow::anyhow!("Not found: Category not found: {slug}"))?,
        None => None,
    };

    let records = db.categories(now).await.context("Failed to load categories")?;
    let context = RequestContext::build(records, None, now).map_err(report)?;
    if context.tree.is_empty() {
        eprintln!("No categories yet. Load some with `mediacat import FILE`.");
        return Ok(());
    }

    for line in tree_lines(&context, root) {
        println!("{line}");
    }
    tracing::debug!(categories = context.tree.len(), "Printed category tree");
    Ok(())
}

/// Indented tree rows, optionally limited to the subtree under `root`.
///
/// Indentation is relative to `root`, so a subtree always starts flush left.
fn tree_lines(context: &RequestContext, root: Option<i64>) -> Vec<String> {
    let within = root.and_then(|id| context.tree.subtree_ids(id));
    let base_depth = root
        .and_then(|id| context.tree.depth(id))
        .unwrap_or(0);

    context
        .sidebar()
        .into_iter()
        .filter(|entry| within.map_or(true, |ids| ids.contains(&entry.id)))
        .map(|entry| {
            format!(
                "{}{} [{}] ({})",
                "  ".repeat(entry.depth.saturating_sub(base_depth)),
                entry.name,
                entry.slug,
                entry.count
            )
        })
        .collect()
}

fn print_json<T: serde::Serialize>(view: Result<T, CatalogError>) -> Result<()> {
    let view = view.map_err(report)?;
    let json = serde_json::to_string_pretty(&view).context("Failed to serialize response")?;
    println!("{json}");
    Ok(())
}

/// Turn a catalog error into the CLI's error, collapsing the not-found family.
fn report(err: CatalogError) -> anyhow::Error {
    if err.is_not_found() {
        tracing::debug!(error = %err, "Request resolved to not found");
        return anyhow::anyhow!("Not found: {}", err);
    }
    anyhow::Error::new(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediacat::category::{Category, CategoryRecord};

    fn context() -> RequestContext {
        let records = vec![
            CategoryRecord::new(Category::new(1, "Music", "music", None), 1),
            CategoryRecord::new(Category::new(2, "Jazz", "jazz", Some(1)), 2),
            CategoryRecord::new(Category::new(3, "Bebop", "bebop", Some(2)), 4),
            CategoryRecord::new(Category::new(4, "Video", "video", None), 0),
        ];
        RequestContext::build(records, None, Utc::now()).unwrap()
    }

    #[test]
    fn test_tree_lines_full_tree() {
        assert_eq!(
            tree_lines(&context(), None),
            vec![
                "Music [music] (7)",
                "  Jazz [jazz] (6)",
                "    Bebop [bebop] (4)",
                "Video [video] (0)",
            ]
        );
    }

    #[test]
    fn test_tree_lines_subtree_starts_flush_left() {
        assert_eq!(
            tree_lines(&context(), Some(2)),
            vec!["Jazz [jazz] (6)", "  Bebop [bebop] (4)"]
        );
    }
}
