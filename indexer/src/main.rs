use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search_core::ingest::load_documents;
use search_core::{
    process_queries, process_queries_joined, remove_duplicates, Document, DocumentId, DocumentStatus,
    ExecutionPolicy, LogDuration, SearchServer,
};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Index documents in memory and query them with TF-IDF ranking", long_about = None)]
struct Cli {
    /// Input path (JSON/JSONL file or directory)
    #[arg(long, global = true, default_value = "./documents.jsonl")]
    input: PathBuf,
    /// Space-separated stop words
    #[arg(long, global = true, default_value = "")]
    stop_words: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents for each query
    Search {
        /// Remove duplicate documents before searching
        #[arg(long, default_value_t = false)]
        dedup: bool,
        /// Evaluate each query on all cores
        #[arg(long, default_value_t = false)]
        parallel: bool,
        /// Only rank documents with this status
        #[arg(long, value_parser = parse_status, default_value = "ACTUAL")]
        status: DocumentStatus,
        queries: Vec<String>,
    },
    /// Run a file of queries (one per line) as a batch
    Batch {
        #[arg(long)]
        queries: PathBuf,
        /// Print one flat list instead of one list per query
        #[arg(long, default_value_t = false)]
        joined: bool,
    },
    /// Show which query words a document contains
    Match {
        #[arg(long)]
        id: DocumentId,
        query: String,
    },
    /// Remove documents whose word sets repeat an earlier document
    Dedup,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    results: &'a [Document],
}

fn parse_status(s: &str) -> Result<DocumentStatus, String> {
    serde_json::from_value(serde_json::Value::String(s.to_ascii_uppercase()))
        .map_err(|_| format!("unknown status {s:?}"))
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let mut server = SearchServer::from_stop_words_text(&cli.stop_words)?;
    {
        let _timer = LogDuration::new("load_documents");
        load_documents(&mut server, &cli.input)?;
    }

    match cli.command {
        Commands::Search { dedup, parallel, status, queries } => {
            if dedup {
                let removed = remove_duplicates(&mut server);
                tracing::info!(removed = removed.len(), remaining = server.document_count(), "removed duplicates");
            }
            let policy = if parallel { ExecutionPolicy::parallel() } else { ExecutionPolicy::Sequential };
            for query in &queries {
                let results = server.find_top_documents_with(policy, query, status)?;
                println!("{}", serde_json::to_string(&SearchOutput { query, results: &results })?);
            }
        }
        Commands::Batch { queries, joined } => {
            let text = fs::read_to_string(&queries).with_context(|| format!("reading {}", queries.display()))?;
            let queries: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
            if joined {
                let results = process_queries_joined(&server, &queries[..])?;
                println!("{}", serde_json::to_string(&results)?);
            } else {
                for (query, results) in queries.iter().zip(process_queries(&server, &queries[..])?) {
                    println!("{}", serde_json::to_string(&SearchOutput { query, results: &results })?);
                }
            }
        }
        Commands::Match { id, query } => {
            let (words, status) = server.match_document(&query, id)?;
            println!("{}", serde_json::json!({ "document_id": id, "words": words, "status": status }));
        }
        Commands::Dedup => {
            let removed = remove_duplicates(&mut server);
            println!("{}", serde_json::json!({ "removed": removed, "remaining": server.document_count() }));
        }
    }
    Ok(())
}
