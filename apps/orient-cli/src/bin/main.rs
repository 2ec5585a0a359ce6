//! orient: career-guidance pipeline from the command line.
//!
//! Results go to stdout as pretty JSON; logs go to stderr (`RUST_LOG`).

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use orient_core::cache::CorpusCache;
use orient_core::config::Config;
use orient_llm::get_default_generator;
use orient_pipeline::{AnswerRequest, ApiResponse, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "orient", version, about = "Career-guidance answers grounded in job descriptions and listings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Augment and translate a question, then rank both corpora
    Chunks {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Answer from a JSON request (question, context1, context2, chunks)
    Answer {
        /// Request file, or `-` for stdin
        #[arg(long, default_value = "-")]
        request: String,
    },
    /// Run the full pipeline for one question
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
        /// Language of the final answer
        #[arg(long)]
        language: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn read_request(source: &str) -> anyhow::Result<AnswerRequest> {
    let raw = if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading request from stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("reading request file {source}"))?
    };
    serde_json::from_str(&raw).context("parsing answer request")
}

fn print(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the response; errors still print as `{"error": ...}` and exit 1.
fn emit<T: serde::Serialize>(response: ApiResponse<T>) -> anyhow::Result<ExitCode> {
    let failed = response.is_error();
    print(&serde_json::to_value(response)?)?;
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let settings = Config::load().context("loading configuration")?.settings()?;
    let cache = settings.cache.enabled.then(|| Arc::new(CorpusCache::new()));
    let generator = get_default_generator(&settings.generation)?;
    let pipeline = Pipeline::from_settings(&settings, generator, cache)?;

    match cli.command {
        Command::Chunks { question } => {
            let question = question.join(" ");
            info!(%question, "generating chunks");
            emit(ApiResponse::from(pipeline.generate_chunks(Some(question.as_str()))))
        }
        Command::Answer { request } => {
            let request = read_request(&request)?;
            emit(ApiResponse::from(pipeline.answer_question(&request)))
        }
        Command::Ask { question, language } => {
            let question = question.join(" ");
            emit(ApiResponse::from(pipeline.run(&question, language.as_deref())))
        }
    }
}
