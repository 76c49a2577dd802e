//! Batch pass over a corpus directory: discover pages, assign ids, read the
//! per-document artifacts in parallel, and fold them into an index.

use crate::error::{CorpusError, Rejection, SourceError};
use crate::source::{load_document, load_lemmas, parse_doc_id, CorpusPaths, Document};
use crate::{DocId, IndexBuilder, InvertedIndex};
use rayon::prelude::*;
use std::collections::BTreeMap;
use walkdir::WalkDir;

#[derive(Debug)]
pub struct LoadedCorpus {
    /// Ascending by id.
    pub documents: Vec<Document>,
    pub rejections: Vec<Rejection>,
}

/// Page file names, in lexicographic order.
pub fn discover_pages(paths: &CorpusPaths) -> Result<Vec<String>, CorpusError> {
    let dir = paths.pages();
    let mut names = Vec::new();
    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry =
            entry.map_err(|e| CorpusError::Listing { path: dir.clone(), source: e.into() })?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => names.push(name.to_string()),
            None => {
                tracing::warn!(path = %entry.path().display(), "skipping page with non-UTF-8 name")
            }
        }
    }
    Ok(names)
}

/// Load every page whose id parses and is not already taken, reading all
/// three artifacts. The first page in listing order wins an id.
/// Per-document failures become rejections; the batch only fails when
/// nothing loads.
pub fn load_corpus(paths: &CorpusPaths) -> Result<LoadedCorpus, CorpusError> {
    load_with(paths, load_document)
}

/// Like [`load_corpus`], but reads only each document's lemma artifact.
/// This is the input of the index pass, which must not depend on pages or
/// token lists being present.
pub fn load_index_corpus(paths: &CorpusPaths) -> Result<LoadedCorpus, CorpusError> {
    load_with(paths, load_lemmas)
}

fn load_with<L>(paths: &CorpusPaths, loader: L) -> Result<LoadedCorpus, CorpusError>
where
    L: Fn(&CorpusPaths, &str, DocId) -> Result<Document, SourceError> + Sync,
{
    let pages = discover_pages(paths)?;
    let mut rejections = Vec::new();
    let mut registry: BTreeMap<DocId, String> = BTreeMap::new();
    for source_name in pages {
        let doc_id = match parse_doc_id(&source_name) {
            Ok(id) => id,
            Err(_) => {
                rejections.push(Rejection::MalformedIdentifier { source_name });
                continue;
            }
        };
        if let Some(existing) = registry.get(&doc_id) {
            let existing = existing.clone();
            rejections.push(Rejection::DuplicateIdentifier { doc_id, source_name, existing });
            continue;
        }
        registry.insert(doc_id, source_name);
    }

    let loaded: Vec<Result<Document, Rejection>> = registry
        .into_par_iter()
        .map(|(doc_id, source_name)| {
            loader(paths, &source_name, doc_id)
                .map_err(|source| Rejection::Unreadable { source_name, source })
        })
        .collect();
    let mut documents = Vec::with_capacity(loaded.len());
    for result in loaded {
        match result {
            Ok(doc) => documents.push(doc),
            Err(rejection) => rejections.push(rejection),
        }
    }

    for rejection in &rejections {
        tracing::warn!(%rejection, "document rejected");
    }
    tracing::info!(
        root = %paths.root.display(),
        loaded = documents.len(),
        rejected = rejections.len(),
        "loaded corpus"
    );
    if documents.is_empty() {
        return Err(CorpusError::Empty { rejected: rejections.len() });
    }
    Ok(LoadedCorpus { documents, rejections })
}

/// Build the inverted index from a loaded corpus. Documents are posted in
/// parallel shards and merged by set union.
pub fn index_corpus(corpus: &LoadedCorpus) -> InvertedIndex {
    let index = corpus
        .documents
        .par_iter()
        .fold(IndexBuilder::new, |mut builder, doc| {
            if let Err(rejection) = builder.add_document(&doc.source_name, doc.lemma_names()) {
                tracing::warn!(%rejection, "document rejected");
            }
            builder
        })
        .reduce(IndexBuilder::new, IndexBuilder::merge)
        .finish();
    tracing::info!(docs = index.num_docs(), terms = index.num_terms(), "built inverted index");
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_pages_directory_is_a_listing_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = CorpusPaths::new(dir.path());
        assert!(matches!(load_corpus(&paths), Err(CorpusError::Listing { .. })));
    }

    #[test]
    fn empty_corpus_fails() {
        let dir = tempfile::tempdir().unwrap();
        let paths = CorpusPaths::new(dir.path());
        fs::create_dir_all(paths.pages()).unwrap();
        fs::write(paths.page("notes.txt"), "текст").unwrap();
        assert!(matches!(load_corpus(&paths), Err(CorpusError::Empty { rejected: 1 })));
    }

    #[test]
    fn index_pass_needs_only_lemmas() {
        let dir = tempfile::tempdir().unwrap();
        let paths = CorpusPaths::new(dir.path());
        fs::create_dir_all(paths.pages()).unwrap();
        fs::create_dir_all(paths.tokens_dir()).unwrap();
        fs::create_dir_all(paths.lemmas_dir()).unwrap();
        fs::write(paths.page("page_1.txt"), "история").unwrap();
        fs::write(paths.tokens(1), "история\n").unwrap();
        fs::write(paths.lemmas(1), "история\n").unwrap();
        // No token list for the second document.
        fs::write(paths.page("page_2.txt"), "число").unwrap();
        fs::write(paths.lemmas(2), "число\n").unwrap();

        let full = load_corpus(&paths).unwrap();
        assert_eq!(full.documents.len(), 1);
        assert!(matches!(full.rejections[0], Rejection::Unreadable { .. }));

        let lemmas_only = load_index_corpus(&paths).unwrap();
        assert!(lemmas_only.rejections.is_empty());
        let index = index_corpus(&lemmas_only);
        assert_eq!(index.num_docs(), 2);
        assert_eq!(index.source_name(2), Some("page_2.txt"));
        assert!(index.postings("число").unwrap().contains(&2));
    }
}
