use anyhow::Result;
use clap::Parser;
use engine::QueryEngine;
use search::{answer, open_index, run_session};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Boolean AND/OR/NOT search over a persisted lemma index")]
struct Args {
    /// Index file written by `indexer build`
    #[arg(long, default_value = "./index.json")]
    index: PathBuf,
    /// Answer a single query and exit instead of starting a session
    #[arg(long)]
    query: Option<String>,
    /// Print the compiled postfix form and expression tree before results
    #[arg(long, default_value_t = false)]
    explain: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();
    let index = open_index(&args.index)?;
    let engine = QueryEngine::new(&index);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.query {
        Some(q) => answer(&engine, &q, args.explain, &mut out)?,
        None => {
            run_session(&engine, io::stdin().lock(), &mut out, args.explain)?;
        }
    }
    out.flush()?;
    Ok(())
}
