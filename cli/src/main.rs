use anyhow::Result;
use clap::{Parser, Subcommand};
use search_cli::{build_engine, load_config, load_documents};
use search_core::nlp::{detect_language, detect_sentiment, keyword_frequencies};
use search_core::{EngineEvent, InboundEvent, SearchFilters, SearchOptions};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "royalty-search")]
#[command(about = "Search royalty, contract and compliance records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or more queries against the documents under --input
    Search {
        /// Input path (file or directory of .json/.jsonl documents)
        #[arg(long)]
        input: PathBuf,
        /// Query text; repeat to run several searches in order
        #[arg(long = "query", short = 'q', required = true)]
        queries: Vec<String>,
        /// Extra documents announced as uploads before searching
        #[arg(long)]
        upload: Option<PathBuf>,
        #[arg(long = "type")]
        doc_type: Option<String>,
        #[arg(long)]
        entity: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        date_from: Option<String>,
        #[arg(long)]
        date_to: Option<String>,
        /// Maximum results printed per query
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Engine configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the queries, then print the analytics snapshot
    Stats {
        #[arg(long)]
        input: PathBuf,
        #[arg(long = "query", short = 'q')]
        queries: Vec<String>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Keyword frequencies, sentiment and language of a piece of text
    Analyze {
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { input, queries, upload, doc_type, entity, status, date_from, date_to, limit, config } => {
            let filters = SearchFilters { doc_type, entity, status, date_from, date_to };
            let options = if filters.is_empty() { SearchOptions::default() } else { SearchOptions::with_filters(filters) };
            let mut engine = build_engine(&input, load_config(config.as_deref())?)?;
            let mut completed = engine.bus().subscribe();

            if let Some(path) = upload {
                for doc in load_documents(&path)? {
                    engine.bus().emit(InboundEvent::DocumentUploaded(doc));
                }
            }

            for query in &queries {
                let mut outcome = engine.perform_semantic_search(query, options.clone()).await?;
                outcome.results.truncate(limit);
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            while let Ok(EngineEvent::SemanticSearchCompleted { search_record, .. }) = completed.try_recv() {
                tracing::info!(search_id = %search_record.id, results = search_record.results_count, "search completed");
            }
        }
        Commands::Stats { input, queries, config } => {
            let mut engine = build_engine(&input, load_config(config.as_deref())?)?;
            for query in &queries {
                engine.search(query, &SearchOptions::default())?;
            }
            println!("{}", serde_json::to_string_pretty(&engine.analytics())?);
        }
        Commands::Analyze { text } => {
            let report = json!({
                "keywords": keyword_frequencies(&text),
                "sentiment": detect_sentiment(&text),
                "language": detect_language(&text),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
