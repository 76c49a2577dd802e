use crate::DocId;
use std::path::PathBuf;

/// A per-document artifact could not be read.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot derive a document id from {0:?}")]
    MalformedId(String),
}

/// Why a document was left out of a batch. Never fatal to the batch itself.
#[derive(thiserror::Error, Debug)]
pub enum Rejection {
    #[error("skipped {source_name}: malformed document id")]
    MalformedIdentifier { source_name: String },
    #[error(
        "skipped {source_name}: duplicate document id {doc_id} already registered to {existing}"
    )]
    DuplicateIdentifier {
        doc_id: DocId,
        source_name: String,
        existing: String,
    },
    #[error("skipped {source_name}: {source}")]
    Unreadable {
        source_name: String,
        #[source]
        source: SourceError,
    },
}

impl Rejection {
    pub fn source_name(&self) -> &str {
        match self {
            Rejection::MalformedIdentifier { source_name }
            | Rejection::DuplicateIdentifier { source_name, .. }
            | Rejection::Unreadable { source_name, .. } => source_name,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CorpusError {
    #[error("cannot list corpus pages in {}: {source}", path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no documents could be loaded ({rejected} rejected)")]
    Empty { rejected: usize },
}

/// A single query failed. The loaded index is unaffected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },
    #[error("unmatched closing parenthesis at offset {offset}")]
    UnmatchedClose { offset: usize },
    #[error("unclosed parenthesis opened at offset {offset}")]
    UnclosedOpen { offset: usize },
    #[error("empty parentheses at offset {offset}")]
    EmptyGroup { offset: usize },
    #[error("operator {operator} at offset {offset} is missing an operand")]
    MissingOperand { operator: &'static str, offset: usize },
    #[error("operand at offset {offset} is not joined by an operator")]
    DanglingOperand { offset: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json encoding of {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("bincode encoding of {}: {source}", path.display())]
    Bincode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },
    #[error("corrupt index {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}
