use anyhow::Result;
use clap::Parser;
use search_core::ingest::load_documents;
use search_core::{SearchServer, REQUEST_WINDOW};
use search_server::{build_app, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Documents to index at startup (JSON/JSONL file or directory)
    #[arg(long)]
    documents: Option<PathBuf>,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Number of recent requests kept by the request log
    #[arg(long, default_value_t = REQUEST_WINDOW)]
    window: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut server = SearchServer::from_stop_words_text(&args.stop_words)?;
    if let Some(path) = &args.documents {
        load_documents(&mut server, path)?;
    }
    let app = build_app(AppState::new(server, args.window));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
