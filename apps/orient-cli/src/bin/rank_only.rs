//! orient-rank: rank one configured corpus against a query. No model calls.

use std::io;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use orient_core::cache::ChunkStore;
use orient_core::chunker::Chunker;
use orient_core::config::Config;
use orient_core::corpus::FileCorpusSource;
use orient_core::traits::Ranker;
use orient_core::types::ContextBundle;
use orient_rank::TfIdfRanker;

#[derive(Parser, Debug)]
#[command(name = "orient-rank", version, about = "Rank a corpus against a query with TF-IDF")]
struct Args {
    /// Corpus id from the configuration (e.g. fiches-metiers, jobs)
    corpus: String,
    #[arg(required = true)]
    query: Vec<String>,
    /// Number of chunks to keep (defaults to retrieval.top_n)
    #[arg(short = 'n', long)]
    top: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();
    let query = args.query.join(" ");
    let settings = Config::load().context("loading configuration")?.settings()?;
    let source = FileCorpusSource::from_config(&settings.corpora, &settings.corpora.base_dir());
    let path = source
        .path_of(&args.corpus)
        .with_context(|| format!("unknown corpus '{}'", args.corpus))?
        .display()
        .to_string();

    let store = ChunkStore::new(std::sync::Arc::new(source), Chunker::new(settings.chunking)?);
    let chunks = store.try_chunks(&args.corpus)?;
    let ranker = TfIdfRanker::from_config(&settings.retrieval);
    let ranked = ranker.rank(&query, &chunks, args.top.unwrap_or(settings.retrieval.top_n));
    let bundle = ContextBundle::from_ranked(ranked, &chunks);

    let out = json!({
        "corpus": args.corpus,
        "path": path,
        "query": query,
        "chunks": chunks.len(),
        "ranked": bundle.ranked,
        "context": bundle.text,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
