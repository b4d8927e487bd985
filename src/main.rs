use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use shelf2html::config::{ApiConfig, CacheConfig, DownloadConfig, DEFAULT_API_BASE};
use shelf2html::pacing::PacingPolicy;
use shelf2html::{CachedApi, Credentials, Downloader, JsonCache, ReaderApi, WebApiClient};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "shelf2html")]
#[command(about = "List your e-reading shelf and save books as single HTML files")]
#[command(version = "0.1.0")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Session cookie header copied from a logged-in browser
    #[arg(long, env = "SHELF2HTML_COOKIE", global = true, hide_env_values = true)]
    cookie: Option<String>,

    /// Read the session cookie from a file (takes precedence over --cookie)
    #[arg(long = "cookie-file", global = true)]
    cookie_file: Option<PathBuf>,

    /// Base URL of the reading service
    #[arg(long = "api-base", global = true, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Request timeout in seconds
    #[arg(short = 't', long = "timeout", global = true, default_value = "30.0", value_parser = parse_timeout)]
    timeout: Duration,

    /// Cache file location
    #[arg(long = "cache", global = true)]
    cache: Option<PathBuf>,

    /// Seconds a cached response stays valid
    #[arg(long = "cache-ttl", global = true, default_value_t = 3600)]
    cache_ttl: u64,

    /// Always ask the service, never the cache
    #[arg(long = "no-cache", global = true)]
    no_cache: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the books on your shelf
    Shelf,
    /// Download all chapters of a book into one HTML file
    Download {
        /// Identifier of the book to download
        book_id: String,

        /// Output file (defaults to <title>_<book id>.html in the output directory)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Directory used for the default output file
        #[arg(long = "out-dir", default_value = ".")]
        out_dir: PathBuf,

        /// Minimum pause between chapters, in milliseconds
        #[arg(long = "min-delay", default_value_t = PacingPolicy::CHAPTER.min_ms())]
        min_delay: u64,

        /// Maximum pause between chapters, in milliseconds
        #[arg(long = "max-delay", default_value_t = PacingPolicy::CHAPTER.max_ms())]
        max_delay: u64,
    },
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let value = s.parse::<f64>().map_err(|_| "Not a number.")?;
    if !value.is_finite() || value <= 0.0 {
        return Err("Must be a positive number.".to_string());
    }
    Duration::try_from_secs_f64(value).map_err(|e| e.to_string())
}

fn load_credentials(args: &Args) -> Result<Credentials> {
    let raw = match (&args.cookie_file, &args.cookie) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cookie file {}", path.display()))?,
        (None, Some(cookie)) => cookie.clone(),
        (None, None) => {
            return Err(anyhow!(
                "No session cookie given; use --cookie, --cookie-file or SHELF2HTML_COOKIE"
            ))
        }
    };
    Credentials::parse(&raw).context("Invalid session cookie")
}

async fn list_shelf<A: ReaderApi>(api: &A, auth: &Credentials) -> Result<()> {
    let books = api.fetch_shelf(auth).await.context("Failed to fetch shelf")?;
    if books.is_empty() {
        info!("Your shelf is empty");
        return Ok(());
    }

    let id_width = books.iter().map(|b| b.book_id.chars().count()).max().unwrap_or(0);
    let title_width = books.iter().map(|b| b.title.chars().count()).max().unwrap_or(0);

    println!(
        "{}  {}  {}",
        format!("{:<id_width$}", "ID").bold(),
        format!("{:<title_width$}", "TITLE").bold(),
        "AUTHOR".bold()
    );
    for book in &books {
        println!(
            "{}  {}  {}",
            format!("{:<id_width$}", book.book_id).cyan(),
            format!("{:<title_width$}", book.title).green(),
            book.author
        );
    }
    info!("{} books on shelf", books.len());
    Ok(())
}

async fn download_book<A: ReaderApi>(
    api: A,
    auth: &Credentials,
    book_id: &str,
    output: Option<PathBuf>,
    config: DownloadConfig,
) -> Result<()> {
    let downloader = Downloader::new(api, config);
    let result = downloader
        .run(book_id, auth, output.as_deref(), |index, total, chapter| {
            let status = if chapter.succeeded() {
                "ok".green()
            } else {
                "failed".red()
            };
            info!("[{}/{}] chapter {} {}", index, total, chapter.chapter_uid, status);
        })
        .await;

    match result {
        Ok(report) => {
            info!("Title:    {}", report.book.title.green());
            info!("Author:   {}", report.book.author);
            info!("Format:   {}", report.book.format);
            info!("Chapters: {}/{}", report.succeeded, report.attempted);
            info!("Saved to: {}", report.output.display().to_string().blue());
            Ok(())
        }
        Err(e) => {
            let (attempted, succeeded) = e.counts();
            error!(
                "Download aborted while {} ({}/{} chapters retrieved)",
                e.stage(),
                succeeded,
                attempted
            );
            Err(e.into())
        }
    }
}

async fn run_command<A: ReaderApi>(api: A, command: Commands, auth: &Credentials) -> Result<()> {
    match command {
        Commands::Shelf => list_shelf(&api, auth).await,
        Commands::Download {
            book_id,
            output,
            out_dir,
            min_delay,
            max_delay,
        } => {
            let pacing = PacingPolicy::new(min_delay, max_delay).ok_or_else(|| {
                anyhow!("--min-delay ({}) must not exceed --max-delay ({})", min_delay, max_delay)
            })?;
            let config = DownloadConfig::new()
                .with_pacing(pacing)
                .with_out_dir(out_dir);
            download_book(api, auth, &book_id, output, config).await
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let auth = load_credentials(&args)?;

    let api_config = ApiConfig {
        base_url: args.api_base.clone(),
        timeout: args.timeout,
        ..ApiConfig::default()
    };
    let client = WebApiClient::new(&api_config).context("Failed to create HTTP client")?;

    let defaults = CacheConfig::default();
    let cache_config = CacheConfig {
        path: args.cache.clone().unwrap_or(defaults.path),
        ttl: Duration::from_secs(args.cache_ttl),
        enabled: !args.no_cache,
    };

    if cache_config.enabled {
        let cache = JsonCache::open(&cache_config.path, cache_config.ttl)
            .await
            .context("Failed to open cache")?;
        run_command(CachedApi::new(client, cache), args.command, &auth).await
    } else {
        run_command(client, args.command, &auth).await
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.verbose {
        "shelf2html=debug"
    } else {
        "shelf2html=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Err(e) = run(args).await {
        error!("{}", format!("Error: {:#}", e).red());
        process::exit(1);
    }
}
