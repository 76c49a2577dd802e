use engine::{build_index, DocId, InvertedIndex, QueryEngine, QueryError};

/// a = {1, 2}, b = {2, 3}, c = {3, 4}, universe = {1..=5}.
fn fixture() -> InvertedIndex {
    let (index, rejections) = build_index(vec![
        ("page_1.txt", vec!["a"]),
        ("page_2.txt", vec!["a", "b"]),
        ("page_3.txt", vec!["b", "c"]),
        ("page_4.txt", vec!["c"]),
        ("page_5.txt", vec![]),
    ]);
    assert!(rejections.is_empty());
    index
}

fn ids(engine: &QueryEngine, q: &str) -> Vec<DocId> {
    engine.search(q).unwrap().into_iter().map(|h| h.doc_id).collect()
}

#[test]
fn de_morgan() {
    let index = fixture();
    let engine = QueryEngine::new(&index);
    for (x, y) in [("a", "b"), ("b", "c"), ("a", "c")] {
        assert_eq!(
            ids(&engine, &format!("NOT ({x} AND {y})")),
            ids(&engine, &format!("(NOT {x}) OR (NOT {y})"))
        );
        assert_eq!(
            ids(&engine, &format!("NOT ({x} OR {y})")),
            ids(&engine, &format!("NOT {x} AND NOT {y}"))
        );
    }
}

#[test]
fn negating_unknown_term_yields_universe() {
    let index = fixture();
    let engine = QueryEngine::new(&index);
    assert_eq!(ids(&engine, "NOT zzz"), vec![1, 2, 3, 4, 5]);
    assert!(ids(&engine, "zzz").is_empty());
    assert!(ids(&engine, "a AND zzz").is_empty());
}

#[test]
fn conjunction_binds_tighter_than_disjunction() {
    let index = fixture();
    let engine = QueryEngine::new(&index);
    assert_eq!(ids(&engine, "a OR b AND c"), ids(&engine, "a OR (b AND c)"));
    assert_eq!(ids(&engine, "a OR b AND c"), vec![1, 2, 3]);
}

#[test]
fn parentheses_change_the_result() {
    let index = fixture();
    let engine = QueryEngine::new(&index);
    // a and c are disjoint, b and c share 3.
    assert_eq!(ids(&engine, "(a OR b) AND c"), vec![3]);
    assert_ne!(ids(&engine, "(a OR b) AND c"), ids(&engine, "a OR b AND c"));
}

#[test]
fn connectives_are_case_insensitive() {
    let index = fixture();
    let engine = QueryEngine::new(&index);
    assert_eq!(ids(&engine, "A and B"), vec![2]);
    assert_eq!(ids(&engine, "a Or C"), vec![1, 2, 3, 4]);
    assert_eq!(ids(&engine, "nOt a"), vec![3, 4, 5]);
}

#[test]
fn malformed_queries_are_reported_and_engine_survives() {
    let index = fixture();
    let engine = QueryEngine::new(&index);
    assert!(matches!(engine.search("(a AND b"), Err(QueryError::UnclosedOpen { .. })));
    assert!(matches!(engine.search("AND a"), Err(QueryError::MissingOperand { .. })));
    assert!(matches!(engine.search("a AND"), Err(QueryError::MissingOperand { .. })));
    assert!(matches!(engine.search("a))"), Err(QueryError::UnmatchedClose { .. })));
    for misplaced in ["a b AND", "a b OR", "a NOT", "a AND b NOT"] {
        let result = engine.search(misplaced);
        assert!(matches!(result, Err(QueryError::DanglingOperand { .. })), "{misplaced}");
    }
    for leading in ["AND a b", "OR a b"] {
        let result = engine.search(leading);
        assert!(matches!(result, Err(QueryError::MissingOperand { offset: 0, .. })), "{leading}");
    }
    assert_eq!(ids(&engine, "a AND b"), vec![2]);
}

#[test]
fn empty_query_matches_nothing() {
    let index = fixture();
    let engine = QueryEngine::new(&index);
    assert!(ids(&engine, "").is_empty());
    assert!(ids(&engine, "   ").is_empty());
}
