//! Corpus statistics and TF-IDF weights for the token and lemma vocabularies.
//!
//! Document frequencies are counted straight from the per-document artifacts,
//! independently of the inverted index, since the token vocabulary is not the
//! lemma vocabulary. Term frequency is measured against the page's word stream
//! restricted to the document's own vocabulary.

use crate::error::PersistError;
use crate::source::Document;
use crate::DocId;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// `ln(N / (df + 1))`. A term present in every document gets a small negative
/// weight; a term present nowhere gets `ln(N)`.
pub fn inverse_document_frequency(total_docs: usize, df: usize) -> f64 {
    (total_docs as f64 / (df as f64 + 1.0)).ln()
}

#[derive(Debug, Clone, Default)]
pub struct CorpusStatistics {
    pub num_docs: usize,
    pub token_df: HashMap<String, usize>,
    pub lemma_df: HashMap<String, usize>,
}

impl CorpusStatistics {
    pub fn collect(documents: &[Document]) -> Self {
        let mut stats = CorpusStatistics { num_docs: documents.len(), ..Default::default() };
        for doc in documents {
            let tokens: HashSet<&str> = doc.tokens.iter().map(String::as_str).collect();
            for token in tokens {
                *stats.token_df.entry(token.to_string()).or_default() += 1;
            }
            let lemmas: HashSet<&str> = doc.lemma_names().collect();
            for lemma in lemmas {
                *stats.lemma_df.entry(lemma.to_string()).or_default() += 1;
            }
        }
        tracing::info!(
            num_docs = stats.num_docs,
            tokens = stats.token_df.len(),
            lemmas = stats.lemma_df.len(),
            "collected corpus statistics"
        );
        stats
    }

    pub fn token_idf(&self, token: &str) -> f64 {
        inverse_document_frequency(self.num_docs, self.token_df.get(token).copied().unwrap_or(0))
    }

    pub fn lemma_idf(&self, lemma: &str) -> f64 {
        inverse_document_frequency(self.num_docs, self.lemma_df.get(lemma).copied().unwrap_or(0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermWeight {
    pub term: String,
    pub idf: f64,
    pub weight: f64,
}

impl fmt::Display for TermWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.6} {:.6}", self.term, self.idf, self.weight)
    }
}

#[derive(Debug, Clone)]
pub struct DocumentWeights {
    pub doc_id: DocId,
    /// In valid-token list order.
    pub tokens: Vec<TermWeight>,
    /// In lemma first-seen order.
    pub lemmas: Vec<TermWeight>,
}

fn word_counts(words: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for word in words {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }
    counts
}

fn ratio(count: usize, total: usize) -> f64 {
    count as f64 / total.max(1) as f64
}

pub fn token_weights(doc: &Document, stats: &CorpusStatistics) -> Vec<TermWeight> {
    let counts = word_counts(&doc.words);
    let vocabulary: HashSet<&str> = doc.tokens.iter().map(String::as_str).collect();
    let total: usize = vocabulary.iter().filter_map(|t| counts.get(t)).sum();
    doc.tokens
        .iter()
        .map(|token| {
            let tf = ratio(counts.get(token.as_str()).copied().unwrap_or(0), total);
            let idf = stats.token_idf(token);
            TermWeight { term: token.clone(), idf, weight: tf * idf }
        })
        .collect()
}

/// A lemma's count is the number of words equal to any of its forms.
pub fn lemma_weights(doc: &Document, stats: &CorpusStatistics) -> Vec<TermWeight> {
    let counts = word_counts(&doc.words);
    let lemma_counts: Vec<usize> = doc
        .lemmas
        .iter()
        .map(|g| g.forms.iter().filter_map(|form| counts.get(form.as_str())).sum())
        .collect();
    let total: usize = lemma_counts.iter().sum();
    doc.lemmas
        .iter()
        .zip(lemma_counts)
        .map(|(group, count)| {
            let tf = ratio(count, total);
            let idf = stats.lemma_idf(&group.lemma);
            TermWeight { term: group.lemma.clone(), idf, weight: tf * idf }
        })
        .collect()
}

pub fn document_weights(doc: &Document, stats: &CorpusStatistics) -> DocumentWeights {
    DocumentWeights {
        doc_id: doc.doc_id,
        tokens: token_weights(doc, stats),
        lemmas: lemma_weights(doc, stats),
    }
}

/// Weigh every document in parallel; output keeps the input order.
pub fn corpus_weights(documents: &[Document], stats: &CorpusStatistics) -> Vec<DocumentWeights> {
    documents.par_iter().map(|doc| document_weights(doc, stats)).collect()
}

pub struct WeightPaths {
    pub root: PathBuf,
}

impl WeightPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn tokens_dir(&self) -> PathBuf { self.root.join("tokens_tf_idf") }
    pub fn lemmas_dir(&self) -> PathBuf { self.root.join("lemmas_tf_idf") }
    fn file(dir: PathBuf, doc_id: DocId) -> PathBuf { dir.join(format!("tfidf-{doc_id}.txt")) }
    pub fn tokens(&self, doc_id: DocId) -> PathBuf { Self::file(self.tokens_dir(), doc_id) }
    pub fn lemmas(&self, doc_id: DocId) -> PathBuf { Self::file(self.lemmas_dir(), doc_id) }
}

fn write_lines(path: &Path, weights: &[TermWeight]) -> Result<(), PersistError> {
    let io_err = |source| PersistError::Io { path: path.to_path_buf(), source };
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    for w in weights {
        writeln!(out, "{w}").map_err(io_err)?;
    }
    out.flush().map_err(io_err)
}

/// Write `tfidf-<id>.txt` into both output directories.
pub fn write_weights(paths: &WeightPaths, weights: &DocumentWeights) -> Result<(), PersistError> {
    for dir in [paths.tokens_dir(), paths.lemmas_dir()] {
        fs::create_dir_all(&dir).map_err(|source| PersistError::Io { path: dir.clone(), source })?;
    }
    write_lines(&paths.tokens(weights.doc_id), &weights.tokens)?;
    write_lines(&paths.lemmas(weights.doc_id), &weights.lemmas)?;
    Ok(())
}
