use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use search_core::{DocId, ExecutionMode, Status, MINUTES_IN_DAY};
use searcher::{build_index, load_documents, read_queries, run_batch, run_dedup, run_match, run_search, run_stats};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Rank, match and de-duplicate short documents with TF-IDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Input path (JSON/JSONL file or directory)
    #[arg(long)]
    input: PathBuf,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Irrelevant,
    Banned,
    Removed,
}

impl From<StatusArg> for Status {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => Status::Active,
            StatusArg::Irrelevant => Status::Irrelevant,
            StatusArg::Banned => Status::Banned,
            StatusArg::Removed => Status::Removed,
        }
    }
}

fn mode(parallel: bool) -> ExecutionMode {
    if parallel { ExecutionMode::Parallel } else { ExecutionMode::Sequential }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the top documents for a query
    Search {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        query: String,
        #[arg(long, value_enum, default_value_t = StatusArg::Active)]
        status: StatusArg,
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Print the query words found in each document
    Match {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        query: String,
        /// Documents to match; all when omitted
        #[arg(long = "id")]
        ids: Vec<DocId>,
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Run a file of queries, one per line, in parallel
    Batch {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        queries: PathBuf,
        /// Print one flat list instead of one line per query
        #[arg(long, default_value_t = false)]
        joined: bool,
    },
    /// Remove documents that repeat another document's word set
    Dedup {
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Count requests with no results over a trailing window
    Stats {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        queries: PathBuf,
        #[arg(long, default_value_t = MINUTES_IN_DAY)]
        window: usize,
    },
}

fn load(args: &IndexArgs) -> Result<search_core::InvertedIndex> {
    build_index(&args.stop_words, load_documents(&args.input)?)
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let start = Instant::now();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Search { index, query, status, parallel } => {
            run_search(&load(&index)?, &query, status.into(), mode(parallel), &mut out)?
        }
        Commands::Match { index, query, ids, parallel } => run_match(&load(&index)?, &query, &ids, mode(parallel), &mut out)?,
        Commands::Batch { index, queries, joined } => run_batch(&load(&index)?, &read_queries(&queries)?, joined, &mut out)?,
        Commands::Dedup { index } => run_dedup(&mut load(&index)?, &mut out)?,
        Commands::Stats { index, queries, window } => run_stats(&load(&index)?, &read_queries(&queries)?, window, &mut out)?,
    }
    out.flush()?;

    tracing::info!(took_s = start.elapsed().as_secs_f64(), "done");
    Ok(())
}
