//! Loading helpers shared by the `royalty-search` binary and its tests.

use anyhow::{Context, Result};
use search_core::{Document, EngineConfig, EventBus, SearchEngine};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect `.json` and `.jsonl` files under `input`, or `input` itself when it is a file.
pub fn collect_files(input: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

/// Read every document under `input`. A `.json` file holds one document or an array of
/// them; a `.jsonl` file holds one document per non-blank line.
pub fn load_documents(input: &Path) -> Result<Vec<Document>> {
    let mut docs = Vec::new();
    for file in collect_files(input) {
        let before = docs.len();
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
        tracing::debug!(file = %file.display(), documents = docs.len() - before, "loaded documents");
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: Document = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), n + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => tracing::warn!(file = %file.display(), "skipping file without documents"),
    }
    Ok(())
}

/// Engine configuration from an optional JSON file; defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            Ok(EngineConfig::from_json(&text)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// An initialized engine seeded with the documents under `input`.
pub fn build_engine(input: &Path, config: EngineConfig) -> Result<SearchEngine> {
    let docs = load_documents(input)?;
    tracing::info!(documents = docs.len(), input = %input.display(), "ingested documents");
    let bus = EventBus::new(config.event_capacity);
    let mut engine = SearchEngine::new(config, bus).with_seed_documents(docs);
    engine.init();
    Ok(engine)
}
