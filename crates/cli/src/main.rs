//! # scholarship-rag: operator CLI
//!
//! Runs the one-time ingestion step that populates the document store, and
//! single recommendations from a JSON profile without starting the server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scholarship_rag::{
    ingest::{load_scholarship_documents, store_embeddings},
    UserInput,
};
use scholarship_rag_server::{
    config::get_config,
    state::{build_app_state_with_store, open_store},
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the server configuration file. Defaults to the server's lookup.
    #[arg(long, global = true, env = "SCHOLARSHIP_RAG_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Embed a processed scholarship JSON file into the document store
    Ingest(IngestArgs),
    /// Run one recommendation for a profile stored in a JSON file
    Recommend(RecommendArgs),
}

#[derive(Parser, Debug)]
struct IngestArgs {
    /// A JSON file holding an array of scholarship objects
    #[arg(long)]
    file: PathBuf,
}

#[derive(Parser, Debug)]
struct RecommendArgs {
    /// A JSON file holding the requester's profile object
    #[arg(long)]
    input: PathBuf,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    // Logs go to stderr so `recommend` output on stdout stays pipeable.
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = get_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest(args) => {
            let records = load_scholarship_documents(&args.file)
                .await
                .with_context(|| format!("failed to load '{}'", args.file.display()))?;
            let store = open_store(&config).await?;
            let stored = store_embeddings(&store, &config.embedding, &records).await?;
            info!(stored, db = %config.db_url, "Ingestion finished.");
            println!("Stored {stored} scholarship documents in '{}'.", config.db_url);
        }
        Commands::Recommend(args) => {
            let content = tokio::fs::read_to_string(&args.input)
                .await
                .with_context(|| format!("failed to read '{}'", args.input.display()))?;
            let user_input: UserInput = serde_json::from_str(&content)
                .context("the profile file must contain a JSON object")?;

            let store = open_store(&config).await?;
            let app_state = build_app_state_with_store(config, store)?;
            let result = app_state.pipeline.recommend(&user_input).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.is_invalid_output() {
                std::process::exit(2);
            }
        }
    }

    Ok(())
}
