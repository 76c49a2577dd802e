use crate::error::Rejection;
use crate::source::parse_doc_id;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type DocId = u32;

/// Immutable lemma -> posting list mapping plus the document registry.
///
/// Both maps are ordered, so serialization is deterministic: lemmas
/// lexicographic, posting lists ascending and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub inverted_index: BTreeMap<String, BTreeSet<DocId>>,
    pub documents: BTreeMap<DocId, String>,
}

impl InvertedIndex {
    pub fn postings(&self, lemma: &str) -> Option<&BTreeSet<DocId>> {
        self.inverted_index.get(lemma)
    }

    pub fn document_frequency(&self, lemma: &str) -> usize {
        self.postings(lemma).map_or(0, BTreeSet::len)
    }

    /// All registered document ids; the domain of negation.
    pub fn universe(&self) -> BTreeSet<DocId> {
        self.documents.keys().copied().collect()
    }

    pub fn source_name(&self, doc_id: DocId) -> Option<&str> {
        self.documents.get(&doc_id).map(String::as_str)
    }

    pub fn num_docs(&self) -> usize { self.documents.len() }

    pub fn num_terms(&self) -> usize { self.inverted_index.len() }
}

/// Accumulates documents into an [`InvertedIndex`]. Rejections are returned
/// to the caller and never overwrite an existing registry entry.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: InvertedIndex,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    /// Register a document and post each of its lemmas. The id is parsed
    /// from `source_name`.
    pub fn add_document<'a, I>(&mut self, source_name: &str, lemmas: I) -> Result<DocId, Rejection>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let doc_id = parse_doc_id(source_name)
            .map_err(|_| Rejection::MalformedIdentifier { source_name: source_name.to_string() })?;
        if let Some(existing) = self.index.documents.get(&doc_id) {
            return Err(Rejection::DuplicateIdentifier {
                doc_id,
                source_name: source_name.to_string(),
                existing: existing.clone(),
            });
        }
        self.index.documents.insert(doc_id, source_name.to_string());
        for lemma in lemmas.into_iter().filter(|l| !l.is_empty()) {
            self.index.inverted_index.entry(lemma.to_string()).or_default().insert(doc_id);
        }
        Ok(doc_id)
    }

    /// Combine two partial builds by set union. The result does not depend on
    /// merge order; on an id registered by both sides the lexicographically
    /// smaller source name is kept.
    pub fn merge(mut self, other: IndexBuilder) -> IndexBuilder {
        for (doc_id, name) in other.index.documents {
            self.index
                .documents
                .entry(doc_id)
                .and_modify(|existing| {
                    if name < *existing {
                        *existing = name.clone();
                    }
                })
                .or_insert(name);
        }
        for (lemma, ids) in other.index.inverted_index {
            self.index.inverted_index.entry(lemma).or_default().extend(ids);
        }
        self
    }

    pub fn finish(self) -> InvertedIndex { self.index }
}

/// Build an index from `(source_name, lemmas)` pairs in one pass, returning
/// the index together with every rejected input.
pub fn build_index<S, L, T>(
    docs: impl IntoIterator<Item = (S, L)>,
) -> (InvertedIndex, Vec<Rejection>)
where
    S: AsRef<str>,
    L: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut builder = IndexBuilder::new();
    let mut rejections = Vec::new();
    for (source_name, lemmas) in docs {
        let lemmas: Vec<T> = lemmas.into_iter().collect();
        let added = builder.add_document(source_name.as_ref(), lemmas.iter().map(AsRef::as_ref));
        if let Err(rejection) = added {
            tracing::warn!(%rejection, "document rejected");
            rejections.push(rejection);
        }
    }
    (builder.finish(), rejections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InvertedIndex {
        let (index, rejections) = build_index(vec![
            ("page_1.txt", vec!["история"]),
            ("page_2.txt", vec!["число", "история", "история"]),
            ("page_3.txt", vec!["число"]),
        ]);
        assert!(rejections.is_empty());
        index
    }

    #[test]
    fn posting_lists_are_sorted_and_deduplicated() {
        let index = sample();
        let ids: Vec<DocId> = index.postings("история").unwrap().iter().copied().collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(index.document_frequency("число"), 2);
        assert_eq!(index.document_frequency("год"), 0);
    }

    #[test]
    fn duplicate_id_keeps_first_registration() {
        let (index, rejections) = build_index(vec![
            ("page_1.txt", vec!["история"]),
            ("page-1.txt", vec!["число"]),
        ]);
        assert_eq!(rejections.len(), 1);
        assert!(matches!(rejections[0], Rejection::DuplicateIdentifier { doc_id: 1, .. }));
        assert_eq!(index.source_name(1), Some("page_1.txt"));
        assert!(index.postings("число").is_none());
    }

    #[test]
    fn malformed_id_does_not_abort_batch() {
        let (index, rejections) = build_index(vec![
            ("readme.txt", vec!["история"]),
            ("page_4.txt", vec!["год"]),
        ]);
        assert!(matches!(rejections[0], Rejection::MalformedIdentifier { .. }));
        assert_eq!(index.num_docs(), 1);
        assert_eq!(index.num_terms(), 1);
    }

    #[test]
    fn document_without_lemmas_is_registered() {
        let (index, _) = build_index(vec![("page_9.txt", Vec::<&str>::new())]);
        assert_eq!(index.universe().into_iter().collect::<Vec<_>>(), vec![9]);
        assert_eq!(index.num_terms(), 0);
    }

    #[test]
    fn merge_is_order_independent() {
        let mut a = IndexBuilder::new();
        a.add_document("page_1.txt", ["история"]).unwrap();
        let mut b = IndexBuilder::new();
        b.add_document("page_2.txt", ["история", "число"]).unwrap();
        let mut c = IndexBuilder::new();
        c.add_document("page_2.txt", ["история", "число"]).unwrap();
        let mut d = IndexBuilder::new();
        d.add_document("page_1.txt", ["история"]).unwrap();
        assert_eq!(a.merge(b).finish(), c.merge(d).finish());
    }
}
