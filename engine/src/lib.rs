//! Lemma-level inverted index, boolean query evaluation and TF-IDF weighting
//! over a closed corpus of pre-analyzed documents.

pub mod corpus;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod source;
pub mod tfidf;
pub mod tokenizer;

pub use error::{CorpusError, PersistError, QueryError, Rejection, SourceError};
pub use index::{build_index, DocId, IndexBuilder, InvertedIndex};
pub use query::{Query, QueryEngine, SearchHit};
pub use source::{CorpusPaths, Document, LemmaGroup};
