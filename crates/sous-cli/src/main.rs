//! Sous CLI - Command-line interface
//!
//! Usage:
//!   sous pending [--limit N]
//!   sous predict <text...>
//!   sous stats
//!   sous init-schema
//!
//! Author: sous maintainers

use anyhow::Context;
use clap::{Parser, Subcommand};
use sous_core::config::{AppConfig, StoreBackend};
use sous_core::Predictor;
use sous_graph::SurrealRecordStore;
use sous_tagger::align_columns;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sous")]
#[command(about = "Ingredient NER labeling CLI")]
#[command(version)]
struct Cli {
    /// Print JSON instead of aligned text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List unlabeled ingredients with model predictions
    Pending {
        /// Maximum number of ingredients
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Run the model on a phrase
    Predict {
        /// Ingredient text, split on whitespace
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show labeling progress
    Stats,
    /// Create the SurrealDB tables and edges
    InitSchema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("sous={}", config.logging.level))),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pending { limit } => {
            let store = sous_graph::build_store(&config.database).await?;
            let predictor = sous_tagger::build_predictor(&config.model)?;
            let limit = limit.unwrap_or(config.labeling.batch_size);

            let records = store.fetch_unlabeled(limit).await?;
            if records.is_empty() {
                println!("Nothing left to label.");
            }

            for record in records {
                let words = record.words();
                let preds = predictor.predict(&words).await?;

                if cli.json {
                    let entry = serde_json::json!({
                        "id": record.id,
                        "value": record.value,
                        "words": words,
                        "predictions": preds,
                    });
                    println!("{}", serde_json::to_string(&entry)?);
                } else {
                    println!("[{}]", record.id);
                    print_aligned(&words, &preds)?;
                    println!();
                }
            }
        }
        Commands::Predict { text } => {
            let predictor = sous_tagger::build_predictor(&config.model)?;
            let words: Vec<String> = text
                .iter()
                .flat_map(|t| t.split_whitespace())
                .map(str::to_string)
                .collect();
            let preds = predictor
                .predict(&words)
                .await
                .with_context(|| format!("{} predictor failed", predictor.name()))?;

            if cli.json {
                let entry = serde_json::json!({ "words": words, "predictions": preds });
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                print_aligned(&words, &preds)?;
            }
        }
        Commands::Stats => {
            let store = sous_graph::build_store(&config.database).await?;
            let stats = store.stats().await?;

            if cli.json {
                let entry = serde_json::json!({
                    "total": stats.total,
                    "labeled": stats.labeled,
                    "pending": stats.pending,
                    "completion_rate": stats.completion_rate(),
                });
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                println!("Store:     {}", store.name());
                println!("Total:     {}", stats.total);
                println!("Labeled:   {}", stats.labeled);
                println!("Pending:   {}", stats.pending);
                println!("Complete:  {:.1}%", stats.completion_rate());
            }
        }
        Commands::InitSchema => {
            if config.database.backend != StoreBackend::SurrealDb {
                anyhow::bail!("init-schema needs STORE_BACKEND=surrealdb");
            }
            let store = SurrealRecordStore::new(&config.database).await?;
            store.init_schema().await?;
            println!(
                "Schema ready in {}/{}",
                config.database.surrealdb_namespace, config.database.surrealdb_database
            );
        }
    }

    Ok(())
}

fn print_aligned(words: &[String], preds: &[String]) -> anyhow::Result<()> {
    let rows = align_columns(&[("input", words.to_vec()), ("pred", preds.to_vec())])?;
    for (name, line) in rows {
        println!("{name:<6}{line}");
    }
    Ok(())
}
