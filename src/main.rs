// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use esempeha::utils::logging::{
    format_error, format_index_summary, format_info, format_success, format_warning,
};
use esempeha::{
    Config, Indexer, OpenSearchClient, SchemaManager, SearchBackend, SearchService, Validator,
    open_corpus, web,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "esempeha")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Full-text search over scientific abstracts with LLM summaries", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the configured corpus into the search index
    IndexCorpus {
        #[arg(long, value_name = "NUM")]
        max_docs: Option<usize>,

        #[arg(long)]
        no_progress: bool,
    },

    /// Serve the search page over HTTP
    Serve {
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Search the index and summarize the top hits
    Search {
        /// Search query text
        query: String,

        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long)]
        no_summary: bool,
    },

    Verify {
        #[arg(long)]
        create_index: bool,
    },

    Stats,

    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    esempeha::utils::logging::init_logger(cli.color, cli.verbose);

    info!("ESEMPEHA search");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::default_config()
    };

    match cli.command {
        Commands::IndexCorpus {
            max_docs,
            no_progress,
        } => {
            cmd_index_corpus(&config, max_docs, !no_progress).await?;
        }
        Commands::Serve { bind } => {
            cmd_serve(&config, bind.as_deref()).await?;
        }
        Commands::Search {
            query,
            limit,
            no_summary,
        } => {
            cmd_search(&config, &query, limit, !no_summary).await?;
        }
        Commands::Verify { create_index } => {
            cmd_verify(&config, create_index).await?;
        }
        Commands::Stats => {
            cmd_stats(&config).await?;
        }
        Commands::Reset { confirm } => {
            cmd_reset(&config, confirm).await?;
        }
    }

    Ok(())
}

/// Connects to the search backend, failing the command when it does not answer.
async fn connect(config: &Config) -> Result<Arc<OpenSearchClient>> {
    let client = OpenSearchClient::new(&config.search).context("Failed to create search client")?;

    if !client.ping().await {
        error!("Cannot connect to search backend at {}", client.endpoint());
        eprintln!(
            "{}",
            format_error(&format!(
                "Could not connect to search backend at {}",
                client.endpoint()
            ))
        );
        return Err(anyhow::anyhow!("Search backend connection failed"));
    }

    info!("Connected to search backend at {}", client.endpoint());
    Ok(Arc::new(client))
}

async fn cmd_index_corpus(config: &Config, max_docs: Option<usize>, show_progress: bool) -> Result<()> {
    info!("Starting corpus indexing");

    let backend = connect(config).await?;

    let corpus = open_corpus(&config.corpus, config.summarizer.api_key())
        .context("Failed to open corpus")?;

    let indexer = Indexer::new(backend, config.search.index_name.clone())
        .with_progress_interval(config.indexer.progress_interval)
        .with_progress_bar(show_progress);

    let stats = indexer
        .index_corpus(corpus.as_ref(), max_docs)
        .await
        .context("Indexing failed")?;

    println!("{}", format_index_summary(&config.search.index_name, &stats));

    if stats.failed_upserts > 0 {
        println!(
            "{}",
            format_warning(&format!("{} documents failed to upsert", stats.failed_upserts))
        );
    }

    Ok(())
}

async fn cmd_serve(config: &Config, bind: Option<&str>) -> Result<()> {
    let addr = Validator::parse_bind_address(bind.unwrap_or(config.server.bind.as_str()))
        .context("Invalid bind address")?;

    let backend: Arc<dyn SearchBackend> = Arc::new(
        OpenSearchClient::new(&config.search).context("Failed to create search client")?,
    );

    if !backend.ping().await {
        warn!(
            "Search backend at {} is not reachable yet; queries will report it until it is",
            backend.endpoint()
        );
    }

    let service = SearchService::from_config(config, backend)
        .context("Failed to create search service")?;

    if !service.summarizer().is_enabled() {
        warn!("Summarizer API key missing; summaries are disabled");
    }

    println!("{}", format_info(&format!("Serving on http://{}", addr)));

    web::start_server(addr, Arc::new(service))
        .await
        .context("Server error")?;

    Ok(())
}

async fn cmd_search(config: &Config, query: &str, limit: Option<usize>, summarize: bool) -> Result<()> {
    info!("Searching for: {}", query);

    let backend: Arc<dyn SearchBackend> = Arc::new(
        OpenSearchClient::new(&config.search).context("Failed to create search client")?,
    );

    let mut service = SearchService::from_config(config, backend)
        .context("Failed to create search service")?;
    if let Some(limit) = limit {
        service = service.with_result_size(limit);
    }

    let page = service.run_with(query, summarize).await;

    if let Some(err) = &page.error {
        if page.hits.is_empty() && err == esempeha::service::MSG_NO_RESULTS {
            println!("{}", format_warning(err));
            return Ok(());
        }
        println!("{}", format_error(err));
        return Err(anyhow::anyhow!("Search failed"));
    }

    println!("\nSearch Results for: \"{}\"\n", page.query);
    println!("Found {} result(s)\n", page.hits.len());
    println!("{}", "=".repeat(80));

    for (idx, hit) in page.hits.iter().enumerate() {
        println!("\n{}. {}", idx + 1, hit.format_summary(300));
    }

    println!("{}", "=".repeat(80));

    if let Some(summary) = &page.summary {
        println!("\nSummary:\n{}\n", summary);
    }

    info!("Search complete");
    Ok(())
}

async fn cmd_verify(config: &Config, create_index: bool) -> Result<()> {
    info!("Verifying search backend");

    let backend = connect(config).await?;
    println!("{}", format_success("Search backend connection successful"));

    let schema = SchemaManager::new(backend.as_ref(), &config.search.index_name);

    if schema.verify_index().await? {
        println!(
            "{}",
            format_success(&format!("Index '{}' exists", config.search.index_name))
        );
    } else {
        println!(
            "{}",
            format_warning(&format!("Index '{}' is missing", config.search.index_name))
        );

        if create_index {
            schema
                .ensure_index()
                .await
                .context("Failed to create index")?;
            println!(
                "{}",
                format_success(&format!("Index '{}' created", config.search.index_name))
            );
        } else {
            println!("{}", format_info("Use --create-index to create it"));
        }
    }

    if config.summarizer.api_key().is_none() {
        println!(
            "{}",
            format_warning("Summarizer API key missing; summaries are disabled")
        );
    }

    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    info!("Gathering statistics");

    let backend = connect(config).await?;
    let count = backend
        .count(&config.search.index_name)
        .await
        .context("Failed to count documents")?;

    println!(
        "{}",
        format_info(&format!(
            "Index '{}' holds {} documents",
            config.search.index_name, count
        ))
    );

    Ok(())
}

async fn cmd_reset(config: &Config, confirm: bool) -> Result<()> {
    if !confirm {
        println!(
            "{}",
            format_error("This will delete the index and all documents. Use --confirm to proceed")
        );
        return Ok(());
    }

    warn!("Resetting index '{}' - all documents will be lost", config.search.index_name);

    let backend = connect(config).await?;
    SchemaManager::new(backend.as_ref(), &config.search.index_name)
        .reset_index()
        .await
        .context("Failed to reset index")?;

    println!(
        "{}",
        format_success(&format!(
            "Index '{}' dropped and recreated",
            config.search.index_name
        ))
    );

    Ok(())
}
