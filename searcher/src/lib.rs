use anyhow::{Context, Result};
use search_core::{
    process_queries, process_queries_joined, remove_duplicates, DocId, ExecutionMode, InvertedIndex, RequestStats,
    Status,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

#[derive(Debug, Serialize)]
struct MatchLine<'a> {
    id: DocId,
    words: Vec<&'a str>,
    status: Status,
}

#[derive(Debug, Serialize)]
struct QueryLine<'a> {
    query: &'a str,
    results: &'a [search_core::Document],
}

/// `.json`/`.jsonl` files under `input`, or `input` itself when it is a file.
pub fn collect_input_files(input: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

/// Read documents from a JSON array, a single JSON object, or JSONL.
pub fn load_documents(input: &Path) -> Result<Vec<InputDoc>> {
    let mut docs = Vec::new();
    for file in collect_input_files(input) {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            load_jsonl(&file, &mut docs)?;
        } else {
            load_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn load_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed document", file.display(), lineno + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn load_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => tracing::warn!(file = %file.display(), "expected a JSON array or object"),
    }
    Ok(())
}

/// One query per non-empty line.
pub fn read_queries(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path).with_context(|| format!("opening {}", path.display()))?);
    let mut queries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            queries.push(line);
        }
    }
    Ok(queries)
}

/// Index every document. Rejected documents are logged and skipped.
pub fn build_index(stop_words: &str, docs: Vec<InputDoc>) -> Result<InvertedIndex> {
    let mut index = InvertedIndex::from_stop_words_text(stop_words).context("invalid stop words")?;
    let mut skipped = 0usize;
    for doc in docs {
        if let Err(err) = index.add(doc.id, &doc.text, doc.status, &doc.ratings) {
            tracing::warn!(id = doc.id, %err, "skipping document");
            skipped += 1;
        }
    }
    tracing::info!(num_docs = index.document_count(), skipped, "index built");
    Ok(index)
}

pub fn run_search(
    index: &InvertedIndex,
    query: &str,
    status: Status,
    mode: ExecutionMode,
    out: &mut impl Write,
) -> Result<()> {
    let results = index.find_top_documents_with(mode, query, |_, doc_status, _| doc_status == status)?;
    writeln!(out, "{}", serde_json::to_string(&QueryLine { query, results: &results })?)?;
    Ok(())
}

/// Match `query` against `ids`, or against every document when `ids` is empty.
pub fn run_match(
    index: &InvertedIndex,
    query: &str,
    ids: &[DocId],
    mode: ExecutionMode,
    out: &mut impl Write,
) -> Result<()> {
    let targets: Vec<DocId> = if ids.is_empty() { index.iter().collect() } else { ids.to_vec() };
    for id in targets {
        let (words, status) = index.match_document_with(mode, query, id)?;
        writeln!(out, "{}", serde_json::to_string(&MatchLine { id, words, status })?)?;
    }
    Ok(())
}

pub fn run_batch(index: &InvertedIndex, queries: &[String], joined: bool, out: &mut impl Write) -> Result<()> {
    if joined {
        for doc in process_queries_joined(index, queries)? {
            writeln!(out, "{}", serde_json::to_string(&doc)?)?;
        }
    } else {
        for (query, results) in queries.iter().zip(process_queries(index, queries)?) {
            writeln!(out, "{}", serde_json::to_string(&QueryLine { query, results: &results })?)?;
        }
    }
    Ok(())
}

pub fn run_dedup(index: &mut InvertedIndex, out: &mut impl Write) -> Result<()> {
    for id in remove_duplicates(index)? {
        writeln!(out, "Found duplicate document id {id}")?;
    }
    writeln!(out, "{} documents remain", index.document_count())?;
    Ok(())
}

/// Replay queries through a request window and report the empty-result count.
/// A malformed query is logged and not counted.
pub fn run_stats(index: &InvertedIndex, queries: &[String], capacity: usize, out: &mut impl Write) -> Result<()> {
    let mut stats = RequestStats::with_capacity(index, capacity);
    for query in queries {
        if let Err(err) = stats.add_find_request(query) {
            tracing::warn!(%query, %err, "request failed");
        }
    }
    writeln!(out, "Total empty requests: {}", stats.empty_count())?;
    Ok(())
}
