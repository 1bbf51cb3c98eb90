use search_core::{ExecutionMode, Status};
use searcher::{build_index, load_documents, read_queries, run_batch, run_dedup, run_match, run_search, run_stats};
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

const DOCS: &str = r#"{"id": 1, "text": "funny pet and nasty rat", "ratings": [7, 2, 7]}
{"id": 2, "text": "funny pet with curly hair", "ratings": [1, 2]}

{"id": 3, "text": "funny pet with curly hair", "status": "banned"}
{"id": 4, "text": "nasty rat with cu\u0001rly hair"}
"#;

fn write_docs(dir: &std::path::Path) {
    fs::write(dir.join("docs.jsonl"), DOCS).unwrap();
    fs::write(
        dir.join("more.json"),
        r#"[{"id": 5, "text": "big cat in the city", "status": "active", "ratings": [3]}]"#,
    )
    .unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();
}

fn output(buf: Vec<u8>) -> Vec<String> {
    String::from_utf8(buf).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn loads_json_and_jsonl_and_skips_bad_documents() {
    let dir = tempdir().unwrap();
    write_docs(dir.path());
    let docs = load_documents(dir.path()).unwrap();
    assert_eq!(docs.len(), 5);
    assert_eq!(docs.iter().find(|d| d.id == 3).unwrap().status, Status::Banned);

    let index = build_index("and with in the", docs).unwrap();
    assert_eq!(index.iter().collect::<Vec<_>>(), vec![1, 2, 3, 5]);
}

#[test]
fn search_prints_ranked_json() {
    let dir = tempdir().unwrap();
    write_docs(dir.path());
    let index = build_index("and with in the", load_documents(dir.path()).unwrap()).unwrap();

    let mut buf = Vec::new();
    run_search(&index, "curly -nasty", Status::Active, ExecutionMode::Parallel, &mut buf).unwrap();
    let lines = output(buf);
    assert_eq!(lines.len(), 1);
    let json: Value = serde_json::from_str(&lines[0]).unwrap();
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"].as_i64(), Some(2));
}

#[test]
fn match_covers_every_document_by_default() {
    let dir = tempdir().unwrap();
    write_docs(dir.path());
    let index = build_index("and with in the", load_documents(dir.path()).unwrap()).unwrap();

    let mut buf = Vec::new();
    run_match(&index, "funny rat", &[], ExecutionMode::Sequential, &mut buf).unwrap();
    let lines = output(buf);
    assert_eq!(lines.len(), 4);
    let first: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(first["words"], serde_json::json!(["funny", "rat"]));
    assert!(run_match(&index, "-rat", &[1], ExecutionMode::Sequential, &mut Vec::new()).is_err());
}

#[test]
fn batch_stats_and_dedup() {
    let dir = tempdir().unwrap();
    write_docs(dir.path());
    fs::write(dir.path().join("queries.txt"), "curly hair\n\nparrot\ncat -city\nrat\n").unwrap();
    let queries = read_queries(&dir.path().join("queries.txt")).unwrap();
    assert_eq!(queries.len(), 4);
    let mut index = build_index("and with in the", load_documents(dir.path()).unwrap()).unwrap();

    let mut buf = Vec::new();
    run_batch(&index, &queries, false, &mut buf).unwrap();
    assert_eq!(output(buf).len(), 4);

    let mut buf = Vec::new();
    run_batch(&index, &queries, true, &mut buf).unwrap();
    assert_eq!(output(buf).len(), 2);

    let mut buf = Vec::new();
    run_stats(&index, &queries, 3, &mut buf).unwrap();
    assert_eq!(output(buf), vec!["Total empty requests: 2"]);

    let mut buf = Vec::new();
    run_dedup(&mut index, &mut buf).unwrap();
    assert_eq!(output(buf), vec!["Found duplicate document id 3", "3 documents remain"]);
}
