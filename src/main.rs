mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use catalog_core::config::Config;
use catalog_core::{Category, CategoryRepository};
use catalog_db::SqliteCategoryRepository;
use clap::Parser;
use cli::{Cli, Commands};

/// Width whose derivative is shown as the thumbnail in listings.
const THUMBNAIL_WIDTH: u32 = 150;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults based on --verbose.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "catalog=trace,catalog_server=trace,catalog_images=trace,catalog_db=debug,tower_http=debug"
                .to_string()
        } else {
            "catalog=info,catalog_server=info,catalog_images=info,catalog_db=info,tower_http=info"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::List { json } => list_categories(cli.config.as_deref(), json),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("catalog {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load(config_path).context("failed to load configuration")?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting catalog server");
    catalog_server::start(config).await?;
    Ok(())
}

fn list_categories(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = Config::load(config_path).context("failed to load configuration")?;
    let db_path = &config.server.db_path;
    if !db_path.exists() {
        anyhow::bail!("Database does not exist: {}", db_path.display());
    }

    let pool = catalog_db::pool::init_pool(&db_path.to_string_lossy())?;
    let categories = SqliteCategoryRepository::new(pool).list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    if categories.is_empty() {
        println!("No categories.");
        return Ok(());
    }

    let widths = config.uploads.effective_widths();
    let thumb_width = if widths.contains(&THUMBNAIL_WIDTH) {
        THUMBNAIL_WIDTH
    } else {
        widths.first().copied().unwrap_or(THUMBNAIL_WIDTH)
    };

    println!("{:<6} {:<24} {:<52} DESCRIPTION", "ID", "NAME", "IMAGE");
    for category in &categories {
        print_row(category, &config.uploads.public_url(thumb_width, &category.image));
    }
    println!("\n{} categories", categories.len());

    Ok(())
}

fn print_row(category: &Category, thumbnail: &str) {
    println!(
        "{:<6} {:<24} {:<52} {}",
        category.id.get(),
        truncate(&category.name, 24),
        thumbnail,
        truncate(&category.description, 60)
    );
}

/// Shorten `text` to at most `max` characters, marking the cut with `~`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('~');
    short
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            if !p.exists() {
                anyhow::bail!("Config file does not exist: {:?}", p);
            }
            let config = Config::load(Some(p))?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!(
        "  Uploads: {} served at {}",
        config.uploads.dir.display(),
        config.uploads.public_path
    );
    println!("  Widths: {:?}", config.uploads.effective_widths());
    println!("  Max upload: {} bytes", config.uploads.max_upload_bytes);

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}
