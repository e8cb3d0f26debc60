use crate::tokenizer::{extract_unique_words, normalize};
use crate::Document;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    pub document_id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub relevance_score: f64,
    pub document: Arc<Document>,
}

/// Append-only term -> postings map plus the flat list of every indexed document.
///
/// Terms iterate in lexical order so fuzzy scans and suggestions are reproducible.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: BTreeMap<String, Vec<Posting>>,
    documents: Vec<Arc<Document>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Index `doc`: one posting per distinct word of its content. Documents without
    /// content produce no postings but are still listed.
    pub fn add_document(&mut self, doc: Arc<Document>) {
        for word in extract_unique_words(&doc.content) {
            let relevance_score = relevance_score(&word, &doc);
            self.postings.entry(word).or_default().push(Posting {
                document_id: doc.id.clone(),
                doc_type: doc.doc_type().to_string(),
                relevance_score,
                document: Arc::clone(&doc),
            });
        }
        self.documents.push(doc);
    }

    pub fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_term(&self, term: &str) -> bool { self.postings.contains_key(term) }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.postings.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    pub fn documents(&self) -> &[Arc<Document>] { &self.documents }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn num_docs(&self) -> usize { self.documents.len() }

    pub fn clear(&mut self) {
        self.postings.clear();
        self.documents.clear();
    }
}

/// Weight of `word` within `doc`: base 1, boosted when the word also appears in the
/// entity name, type tag or status, plus half a point per occurrence in the content
/// capped at 3.
pub fn relevance_score(word: &str, doc: &Document) -> f64 {
    let mut score = 1.0;
    if doc.entity.as_deref().is_some_and(|e| e.to_lowercase().contains(word)) {
        score += 3.0;
    }
    if doc.doc_type().to_lowercase().contains(word) {
        score += 2.0;
    }
    if doc.status.as_deref().is_some_and(|s| s.to_lowercase().contains(word)) {
        score += 1.5;
    }
    let occurrences = normalize(&doc.content).matches(word).count() as f64;
    score += (occurrences * 0.5).min(3.0);
    score
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub total_records: usize,
    /// Document types seen for this entity, in first-seen order.
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityRecord {
    /// Display name as first inserted.
    pub name: String,
    pub documents: Vec<Arc<Document>>,
    pub metadata: EntityMetadata,
}

pub const MINING_ENTITY: &str = "mining_entity";

/// Secondary index keyed by lowercased entity name, in insertion order.
#[derive(Debug, Default)]
pub struct EntityIndex {
    records: Vec<(String, EntityRecord)>,
    by_key: HashMap<String, usize>,
}

impl EntityIndex {
    pub fn new() -> Self { Self::default() }

    pub fn add_entity(&mut self, name: &str, doc: Arc<Document>) {
        let key = name.to_lowercase();
        let slot = match self.by_key.get(&key) {
            Some(&slot) => slot,
            None => {
                self.records.push((
                    key.clone(),
                    EntityRecord {
                        name: name.to_string(),
                        documents: Vec::new(),
                        metadata: EntityMetadata {
                            entity_type: MINING_ENTITY.to_string(),
                            total_records: 0,
                            categories: Vec::new(),
                        },
                    },
                ));
                self.by_key.insert(key, self.records.len() - 1);
                self.records.len() - 1
            }
        };
        let record = &mut self.records[slot].1;
        let doc_type = doc.doc_type().to_string();
        record.documents.push(doc);
        record.metadata.total_records += 1;
        if !record.metadata.categories.contains(&doc_type) {
            record.metadata.categories.push(doc_type);
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&EntityRecord> {
        self.by_key.get(&name.to_lowercase()).map(|&slot| &self.records[slot].1)
    }

    /// `(normalized key, record)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityRecord)> {
        self.records.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn clear(&mut self) {
        self.records.clear();
        self.by_key.clear();
    }
}
