use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use manset::api::ApiClient;
use manset::config::Config;
use manset::store::Store;

/// Get the config directory path (~/.config/manset/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("manset"))
}

#[derive(Parser, Debug)]
#[command(name = "manset", about = "Haber akışı ve yorumlar için terminal istemcisi")]
struct Args {
    /// Config file (default: ~/.config/manset/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// API base URL, overrides the config file
    #[arg(long, value_name = "URL", global = true)]
    api: Option<String>,

    /// Maximum output width in columns
    #[arg(long, default_value_t = 100, global = true)]
    width: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List news, optionally filtered by category or search text
    News {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show the comment thread of an article
    Comments {
        news_id: String,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Post a comment, or a reply with --reply-to
    Comment {
        news_id: String,
        text: String,
        #[arg(long, value_name = "COMMENT_ID")]
        reply_to: Option<String>,
    },
    /// Search as you type: each stdin line is a keystroke's worth of input
    Search {
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so listings on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(api) = &args.api {
        config.api_base_url = api.clone();
    }
    tracing::debug!(config = ?config, "Effective configuration");

    let client = ApiClient::new(&config.api_base_url)
        .context("Failed to create API client")?
        .with_token(config.api_token())
        .with_timeout(config.request_timeout());

    let store = Store::new();
    let notices = cli::spawn_notice_printer(&store);

    let ctx = cli::Context {
        client,
        config,
        store,
        width: args.width,
    };

    let result = match args.command {
        Command::News {
            category,
            search,
            pages,
        } => cli::news(&ctx, category, search, pages).await,
        Command::Comments { news_id, pages } => cli::comments(&ctx, &news_id, pages).await,
        Command::Comment {
            news_id,
            text,
            reply_to,
        } => cli::comment(&ctx, &news_id, &text, reply_to.as_deref()).await,
        Command::Search { category } => cli::search(&ctx, category).await,
    };

    // Let queued notices reach stderr before exiting
    drop(ctx);
    let _ = notices.await;

    result
}
