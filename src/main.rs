//! Tululu-Scraper main entry point
//!
//! This is the command-line interface for the book catalog crawler and its
//! static site renderer.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tululu_scraper::config::{load_config_or_default, validate, Config};
use tululu_scraper::crawler::crawl;
use tululu_scraper::output::{render_site, serve};
use tracing_subscriber::EnvFilter;

/// Tululu-Scraper: downloads books, their covers and metadata
///
/// Walks a range of catalog pages, downloads the text edition and cover of
/// every book found, and stores the collected metadata as JSON. The `render`
/// and `serve` commands publish that JSON as a paginated static site.
#[derive(Parser, Debug)]
#[command(name = "tululu-scraper")]
#[command(version)]
#[command(about = "Downloads books, covers and metadata from a paginated catalog", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the catalog and download books (default)
    Crawl(CrawlArgs),

    /// Render the JSON record set into paginated HTML pages
    Render(RenderArgs),

    /// Render the pages, then serve them over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct CrawlArgs {
    /// First catalog page to download
    #[arg(long, alias = "start_page")]
    start_page: Option<u32>,

    /// Catalog page to stop at (not downloaded itself)
    #[arg(long, alias = "end_page")]
    end_page: Option<u32>,

    /// Directory for the downloaded books and images
    #[arg(long, alias = "dest_folder")]
    dest_folder: Option<PathBuf>,

    /// Do not download cover images
    #[arg(long, alias = "skip_imgs")]
    skip_imgs: bool,

    /// Do not download book texts
    #[arg(long, alias = "skip_txt")]
    skip_txt: bool,

    /// Path of the JSON file with book metadata
    #[arg(long, alias = "json_path")]
    json_path: Option<PathBuf>,

    /// Re-fetch a page after a connection failure instead of skipping it
    #[arg(long)]
    retry: bool,
}

#[derive(Args, Debug, Default)]
struct RenderArgs {
    /// Path of the JSON file with book metadata
    #[arg(long, alias = "json_path")]
    json_path: Option<PathBuf>,

    /// Directory the HTML pages are written to
    #[arg(long)]
    pages_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    #[command(flatten)]
    render: RenderArgs,

    /// Address to listen on
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Invalid default configuration".to_string(),
        }
    })?;

    let command = cli.command.unwrap_or(Command::Crawl(CrawlArgs::default()));
    let config = configure(config, &command)?;

    match command {
        Command::Crawl(_) => handle_crawl(config).await,
        Command::Render(_) => handle_render(&config),
        Command::Serve(_) => {
            handle_render(&config)?;
            handle_serve(&config).await
        }
    }
}

/// Applies the command's flags on top of the loaded configuration and
/// validates the result
fn configure(mut config: Config, command: &Command) -> anyhow::Result<Config> {
    match command {
        Command::Crawl(args) => apply_crawl_args(&mut config, args),
        Command::Render(args) => apply_render_args(&mut config, args),
        Command::Serve(args) => {
            apply_render_args(&mut config, &args.render);
            if let Some(bind) = args.bind {
                config.render.bind_address = bind.to_string();
            }
        }
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tululu_scraper=info,warn"),
            1 => EnvFilter::new("tululu_scraper=debug,info"),
            2 => EnvFilter::new("tululu_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags win over the configuration file
fn apply_crawl_args(config: &mut Config, args: &CrawlArgs) {
    if let Some(start_page) = args.start_page {
        config.crawler.start_page = start_page;
    }
    if let Some(end_page) = args.end_page {
        config.crawler.end_page = end_page;
    }
    if let Some(dest_folder) = &args.dest_folder {
        config.output.dest_folder = dest_folder.clone();
    }
    if let Some(json_path) = &args.json_path {
        config.output.json_path = json_path.clone();
    }
    config.output.skip_images |= args.skip_imgs;
    config.output.skip_text |= args.skip_txt;
    config.crawler.retry_on_connection_failure |= args.retry;
}

fn apply_render_args(config: &mut Config, args: &RenderArgs) {
    if let Some(json_path) = &args.json_path {
        config.output.json_path = json_path.clone();
    }
    if let Some(pages_dir) = &args.pages_dir {
        config.render.pages_dir = pages_dir.clone();
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Books go to {}, images to {}, metadata to {}",
        config.output.books_dir().display(),
        config.output.images_dir().display(),
        config.output.json_path.display()
    );

    match crawl(config).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed: {} of {} books recorded",
                summary.books_recorded,
                summary.books_discovered
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the render step shared by `render` and `serve`
fn handle_render(config: &Config) -> anyhow::Result<()> {
    let written = render_site(&config.output.json_path, &config.render).with_context(|| {
        format!(
            "Failed to render {} into {}",
            config.output.json_path.display(),
            config.render.pages_dir.display()
        )
    })?;

    println!(
        "✓ Rendered {} pages into {}",
        written.len(),
        config.render.pages_dir.display()
    );
    Ok(())
}

async fn handle_serve(config: &Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .render
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.render.bind_address))?;

    serve(&config.render.serve_root, addr)
        .await
        .with_context(|| format!("Server on {} failed", addr))
}
