use engine::persist::save_index;
use engine::{build_index, QueryEngine};
use search::{answer, open_index, run_session};
use std::path::Path;
use tempfile::tempdir;

fn build_tiny_index(dir: &Path) -> std::path::PathBuf {
    let (index, _) = build_index(vec![
        ("page_1.txt", vec!["история"]),
        ("page_2.txt", vec!["история", "число"]),
        ("page_3.txt", vec!["число"]),
    ]);
    let path = dir.join("index.json");
    save_index(&path, &index).unwrap();
    path
}

#[test]
fn session_answers_until_sentinel() {
    let dir = tempdir().unwrap();
    let index = open_index(&build_tiny_index(dir.path())).unwrap();
    let engine = QueryEngine::new(&index);

    let input = "история AND число\n\n(история\nNOT история\nQ\nчисло\n";
    let mut out = Vec::new();
    let answered = run_session(&engine, input.as_bytes(), &mut out, false).unwrap();
    assert_eq!(answered, 3);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Found 1 documents\n[2] page_2.txt\n"));
    assert!(text.contains("error: unclosed parenthesis opened at offset 0\n"));
    assert!(text.contains("Found 1 documents\n[3] page_3.txt\n"));
    // Nothing after the sentinel is evaluated.
    assert_eq!(text.matches("Found").count(), 2);
}

#[test]
fn session_ends_on_eof() {
    let dir = tempdir().unwrap();
    let index = open_index(&build_tiny_index(dir.path())).unwrap();
    let engine = QueryEngine::new(&index);
    let mut out = Vec::new();
    let answered = run_session(&engine, "история OR число".as_bytes(), &mut out, false).unwrap();
    assert_eq!(answered, 1);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Found 3 documents\n[1] page_1.txt\n[2] page_2.txt\n[3] page_3.txt\n"));
}

#[test]
fn explain_prints_postfix_and_tree() {
    let dir = tempdir().unwrap();
    let index = open_index(&build_tiny_index(dir.path())).unwrap();
    let engine = QueryEngine::new(&index);
    let mut out = Vec::new();
    answer(&engine, "история OR число AND NOT история", true, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("postfix: история число история NOT AND OR\n"));
    assert!(text.contains("expr: (история OR (число AND NOT история))\n"));
    assert!(text.contains("Found 3 documents\n"));
}

#[test]
fn missing_index_is_fatal() {
    let dir = tempdir().unwrap();
    assert!(open_index(&dir.path().join("absent.json")).is_err());
}
