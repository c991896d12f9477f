//! topic-unraveler CLI.
//!
//! Usage:
//!   topic-unraveler serve
//!   topic-unraveler plan "quantum computing"
//!   topic-unraveler analyze "vector databases"
//!   topic-unraveler cite --topic "climate policy" --style MLA
//!   topic-unraveler cite --file data.csv
//!   topic-unraveler synthesize --file notes.txt

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use topic_unraveler::config::{self, Config};
use topic_unraveler::http::start_http_server;
use topic_unraveler::request::DEFAULT_CITATION_STYLE;
use topic_unraveler::retry::RetryPolicy;
use topic_unraveler::{FeatureRequest, Pipeline};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "topic-unraveler")]
#[command(about = "Research planning, analysis, citations and synthesis from an LLM", long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to topic_unraveler.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Re-issue the request this many extra times on retryable failures
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the four operations over HTTP
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,
    },
    /// Break a topic into research subtopics
    Plan { topic: String },
    /// Insights, comparisons and visualization ideas for a topic
    Analyze { topic: String },
    /// Formatted citations for a topic or an uploaded file
    Cite {
        #[arg(long, default_value = "")]
        topic: String,
        #[arg(long, default_value = DEFAULT_CITATION_STYLE)]
        style: String,
        /// Text file whose contents are summarized and cited
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Executive summary, insights and recommendations from research notes
    Synthesize {
        #[arg(required_unless_present = "file")]
        context: Option<String>,
        #[arg(long, conflicts_with = "context")]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // The subscriber must exist before config loading so its warnings are visible.
    // .env may carry RUST_LOG, so it is read first.
    config::load_env_file();
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(config::log_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::load_from(cli.config.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let pipeline = Pipeline::from_config(&config)?;
    info!(
        "Gateway {} (model={})",
        config.gateway.base_url, config.gateway.model
    );

    let request = match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or(config.server.http_bind);
            start_http_server(pipeline, bind).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Plan { topic } => FeatureRequest::Planning { topic },
        Commands::Analyze { topic } => FeatureRequest::Analysis { topic },
        Commands::Cite { topic, style, file } => {
            let (file_content, file_name) = match file {
                Some(path) => (Some(read_text(&path)?), file_name(&path)),
                None => (None, None),
            };
            FeatureRequest::Citation {
                topic,
                style,
                file_content,
                file_name,
            }
        }
        Commands::Synthesize { context, file } => {
            let context = match file {
                Some(path) => read_text(&path)?,
                None => context.unwrap_or_default(),
            };
            FeatureRequest::Synthesis { context }
        }
    };

    match RetryPolicy::new(cli.retries).run(&pipeline, &request).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
