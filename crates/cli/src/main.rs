use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use config::KbConfig;
use kbase_vector_store::EmbeddingMode;
use std::path::PathBuf;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "kbase")]
#[command(about = "Local knowledge-base retrieval over text and PDF documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./kbase.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Override embedding backend: hash|off
    #[arg(long, global = true)]
    embedding_mode: Option<EmbeddingMode>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from the data directory
    Index(IndexArgs),

    /// Query the knowledge base
    Search(SearchArgs),

    /// Show snapshot statistics
    Stats(StatsArgs),

    /// Deactivate every entry of one source file
    #[command(name = "delete-source")]
    DeleteSource(DeleteSourceArgs),
}

#[derive(Args)]
struct IndexArgs {
    /// Directory with .txt / .pdf documents
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Snapshot file to write
    #[arg(long)]
    store: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Question or keywords
    query: String,

    /// Number of results
    #[arg(short = 'n', long = "top-k")]
    top_k: Option<usize>,

    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    store: Option<PathBuf>,

    /// Skip vector retrieval
    #[arg(long)]
    lexical: bool,

    /// Mark query terms in lexical results
    #[arg(long)]
    highlight: bool,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StatsArgs {
    #[arg(long)]
    store: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DeleteSourceArgs {
    /// Source name as stored in the index (path relative to the data directory)
    source: String,

    #[arg(long)]
    store: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers
    let json_output = match &cli.command {
        Commands::Index(args) => args.json,
        Commands::Search(args) => args.json,
        Commands::Stats(args) => args.json,
        Commands::DeleteSource(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = KbConfig::load(cli.config.as_deref())?;
    if let Some(mode) = cli.embedding_mode {
        config.embedding.mode = mode;
    }

    match cli.command {
        Commands::Index(args) => {
            let request = commands::IndexRequest {
                data_dir: args.data_dir.unwrap_or_else(|| config.data_dir.clone()),
                store: args.store.unwrap_or_else(|| config.store_path.clone()),
                json: args.json,
            };
            commands::run_index(&config, request).await?;
        }
        Commands::Search(args) => {
            let request = commands::SearchRequest {
                query: args.query,
                top_k: args.top_k.unwrap_or(config.search.top_k),
                data_dir: args.data_dir.unwrap_or_else(|| config.data_dir.clone()),
                store: args.store.unwrap_or_else(|| config.store_path.clone()),
                lexical: args.lexical,
                highlight: args.highlight,
                json: args.json,
            };
            commands::run_search(&config, request).await?;
        }
        Commands::Stats(args) => {
            let store = args.store.unwrap_or_else(|| config.store_path.clone());
            commands::run_stats(&store, args.json).await?;
        }
        Commands::DeleteSource(args) => {
            let store = args.store.unwrap_or_else(|| config.store_path.clone());
            commands::run_delete_source(&store, &args.source, args.json).await?;
        }
    }

    Ok(())
}
