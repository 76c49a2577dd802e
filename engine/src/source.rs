//! Reader for the per-document artifacts produced by the external analyzer.
//!
//! A corpus root holds `pages/` (plain text, one file per document, the file
//! name doubling as the registered source name), `tokens/tokens-<id>.txt` and
//! `lemmas/lemmas-<id>.txt`.

use crate::error::SourceError;
use crate::tokenizer::word_stream;
use crate::DocId;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CorpusPaths {
    pub root: PathBuf,
}

impl CorpusPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn pages(&self) -> PathBuf { self.root.join("pages") }
    pub fn tokens_dir(&self) -> PathBuf { self.root.join("tokens") }
    pub fn lemmas_dir(&self) -> PathBuf { self.root.join("lemmas") }
    pub fn page(&self, source_name: &str) -> PathBuf { self.pages().join(source_name) }
    pub fn tokens(&self, doc_id: DocId) -> PathBuf {
        self.tokens_dir().join(format!("tokens-{doc_id}.txt"))
    }
    pub fn lemmas(&self, doc_id: DocId) -> PathBuf {
        self.lemmas_dir().join(format!("lemmas-{doc_id}.txt"))
    }
}

/// A lemma and every surface form that reduces to it. The lemma is always
/// the first form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LemmaGroup {
    pub lemma: String,
    pub forms: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub doc_id: DocId,
    pub source_name: String,
    /// Raw word stream of the page, in reading order.
    pub words: Vec<String>,
    /// Valid surface tokens, in artifact order.
    pub tokens: Vec<String>,
    /// Lemma groups, in first-seen order.
    pub lemmas: Vec<LemmaGroup>,
}

impl Document {
    pub fn lemma_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.lemmas.iter().map(|g| g.lemma.as_str())
    }
}

/// Derive the document id from a source name such as `page_17.txt`: the
/// second `_`/`-` separated field of the stem, which must be a positive integer.
pub fn parse_doc_id(source_name: &str) -> Result<DocId, SourceError> {
    let stem = source_name.split('.').next().unwrap_or_default();
    stem.split(['_', '-'])
        .nth(1)
        .and_then(|field| field.parse::<DocId>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| SourceError::MalformedId(source_name.to_string()))
}

fn read(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Io { path: path.to_path_buf(), source })
}

pub fn parse_token_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse lemma groups. A repeated lemma merges its forms into the first
/// occurrence.
pub fn parse_lemma_groups(text: &str) -> Vec<LemmaGroup> {
    let mut groups: Vec<LemmaGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let Some(lemma) = fields.next() else { continue };
        let idx = *positions.entry(lemma.to_string()).or_insert_with(|| {
            groups.push(LemmaGroup { lemma: lemma.to_string(), forms: vec![lemma.to_string()] });
            groups.len() - 1
        });
        let forms = &mut groups[idx].forms;
        for form in fields {
            if !forms.iter().any(|f| f == form) {
                forms.push(form.to_string());
            }
        }
    }
    groups
}

pub fn read_token_list(path: &Path) -> Result<Vec<String>, SourceError> {
    Ok(parse_token_list(&read(path)?))
}

pub fn read_lemma_groups(path: &Path) -> Result<Vec<LemmaGroup>, SourceError> {
    Ok(parse_lemma_groups(&read(path)?))
}

pub fn read_word_stream(path: &Path) -> Result<Vec<String>, SourceError> {
    Ok(word_stream(&read(path)?))
}

/// Load all three artifacts of one document.
pub fn load_document(
    paths: &CorpusPaths,
    source_name: &str,
    doc_id: DocId,
) -> Result<Document, SourceError> {
    let words = read_word_stream(&paths.page(source_name))?;
    let tokens = read_token_list(&paths.tokens(doc_id))?;
    let lemmas = read_lemma_groups(&paths.lemmas(doc_id))?;
    tracing::debug!(
        doc_id,
        source_name,
        words = words.len(),
        tokens = tokens.len(),
        lemmas = lemmas.len(),
        "loaded document"
    );
    Ok(Document { doc_id, source_name: source_name.to_string(), words, tokens, lemmas })
}

/// Load only the lemma artifact. Indexing needs nothing else, so a document
/// whose page or token list is missing still gets posted.
pub fn load_lemmas(
    paths: &CorpusPaths,
    source_name: &str,
    doc_id: DocId,
) -> Result<Document, SourceError> {
    let lemmas = read_lemma_groups(&paths.lemmas(doc_id))?;
    tracing::debug!(doc_id, source_name, lemmas = lemmas.len(), "loaded lemmas");
    Ok(Document {
        doc_id,
        source_name: source_name.to_string(),
        words: Vec::new(),
        tokens: Vec::new(),
        lemmas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_from_names() {
        assert_eq!(parse_doc_id("page_17.txt").unwrap(), 17);
        assert_eq!(parse_doc_id("tokens-3.txt").unwrap(), 3);
        assert!(parse_doc_id("page.txt").is_err());
        assert!(parse_doc_id("page_x.txt").is_err());
        assert!(parse_doc_id("page_0.txt").is_err());
    }

    #[test]
    fn lemma_is_always_a_form() {
        let groups = parse_lemma_groups("история истории историю\nчисло\n\n");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].forms, vec!["история", "истории", "историю"]);
        assert_eq!(groups[1].forms, vec!["число"]);
    }

    #[test]
    fn repeated_lemma_keeps_first_position() {
        let groups = parse_lemma_groups("год года\nчисло\nгод году года\n");
        let names: Vec<&str> = groups.iter().map(|g| g.lemma.as_str()).collect();
        assert_eq!(names, vec!["год", "число"]);
        assert_eq!(groups[0].forms, vec!["год", "года", "году"]);
    }

    #[test]
    fn token_list_skips_blank_lines() {
        assert_eq!(parse_token_list("а\n\n б \n"), vec!["а", "б"]);
    }
}
