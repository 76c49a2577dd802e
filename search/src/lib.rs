use anyhow::Result;
use engine::persist::load_index;
use engine::{InvertedIndex, Query, QueryEngine, QueryError, SearchHit};
use std::io::{BufRead, Write};
use std::path::Path;

/// Typing this line ends an interactive session.
pub const SENTINEL: &str = "q";
pub const PROMPT: &str = "query> ";

/// Load the persisted index a session will serve. Failure here is fatal.
pub fn open_index(path: &Path) -> Result<InvertedIndex> {
    let index = load_index(path)?;
    tracing::info!(
        path = %path.display(),
        docs = index.num_docs(),
        terms = index.num_terms(),
        "index ready"
    );
    Ok(index)
}

pub fn write_hits<W: Write>(out: &mut W, hits: &[SearchHit]) -> std::io::Result<()> {
    writeln!(out, "Found {} documents", hits.len())?;
    for hit in hits {
        writeln!(out, "[{}] {}", hit.doc_id, hit.source_name)?;
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, input: &str, err: QueryError) -> std::io::Result<()> {
    tracing::debug!(query = %input, error = %err, "query rejected");
    writeln!(out, "error: {err}")
}

/// Answer one query. Query errors are printed and leave the engine usable;
/// only I/O on `out` can fail.
pub fn answer<W: Write>(
    engine: &QueryEngine,
    input: &str,
    explain: bool,
    out: &mut W,
) -> std::io::Result<()> {
    let query = match Query::parse(input) {
        Ok(query) => query,
        Err(err) => return report(out, input, err),
    };
    if explain {
        if let Ok(Some(expr)) = query.expr() {
            writeln!(out, "postfix: {query}")?;
            writeln!(out, "expr: {expr}")?;
        }
    }
    match engine.hits(&query) {
        Ok(hits) => write_hits(out, &hits),
        Err(err) => report(out, input, err),
    }
}

/// Read queries line by line until EOF or the sentinel. Returns how many
/// queries were answered.
pub fn run_session<R: BufRead, W: Write>(
    engine: &QueryEngine,
    mut input: R,
    out: &mut W,
    explain: bool,
) -> std::io::Result<usize> {
    let mut answered = 0;
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case(SENTINEL) {
            break;
        }
        answer(engine, query, explain, out)?;
        answered += 1;
    }
    tracing::info!(answered, "session closed");
    Ok(answered)
}
