use crate::analytics::SearchHistory;
use crate::index::{EntityIndex, InvertedIndex};
use crate::ranking::SearchHit;
use crate::retrieval::jaccard_similarity;
use crate::tokenizer::extract_words;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DidYouMean {
    pub original: String,
    pub suggestion: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySuggestion {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    DocumentType,
    Entity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSuggestion {
    #[serde(rename = "type")]
    pub kind: FacetKind,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestions {
    pub did_you_mean: Vec<DidYouMean>,
    pub related_searches: Vec<String>,
    pub entity_suggestions: Vec<EntitySuggestion>,
    pub filters: Vec<FilterSuggestion>,
}

/// Bounds and limits for suggestion generation.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionLimits {
    /// Exclusive lower bound on similarity for a "did you mean" pair.
    pub min_similarity: f64,
    /// Exclusive upper bound; closer pairs are treated as already correct.
    pub max_similarity: f64,
    pub related_searches: usize,
}

pub struct SuggestionGenerator<'a> {
    index: &'a InvertedIndex,
    entities: &'a EntityIndex,
    history: &'a SearchHistory,
    limits: SuggestionLimits,
}

impl<'a> SuggestionGenerator<'a> {
    pub fn new(
        index: &'a InvertedIndex,
        entities: &'a EntityIndex,
        history: &'a SearchHistory,
        limits: SuggestionLimits,
    ) -> Self {
        Self { index, entities, history, limits }
    }

    pub fn generate(&self, query: &str, results: &[SearchHit]) -> Suggestions {
        Suggestions {
            did_you_mean: self.did_you_mean(query),
            related_searches: self.related_searches(query),
            entity_suggestions: self.entity_suggestions(query),
            filters: filter_suggestions(results),
        }
    }

    pub fn did_you_mean(&self, query: &str) -> Vec<DidYouMean> {
        let mut out = Vec::new();
        for word in extract_words(query) {
            for (term, _) in self.index.terms() {
                let similarity = jaccard_similarity(&word, term);
                if similarity > self.limits.min_similarity && similarity < self.limits.max_similarity {
                    out.push(DidYouMean { original: word.clone(), suggestion: term.to_string(), similarity });
                }
            }
        }
        out
    }

    /// Earlier queries, newest first, that share a word with this one.
    pub fn related_searches(&self, query: &str) -> Vec<String> {
        self.history
            .iter()
            .filter(|r| r.query != query)
            .filter(|r| has_common_words(&r.query, query))
            .take(self.limits.related_searches)
            .map(|r| r.query.clone())
            .collect()
    }

    pub fn entity_suggestions(&self, query: &str) -> Vec<EntitySuggestion> {
        let lowered = query.to_lowercase();
        self.entities
            .iter()
            .filter(|(key, record)| !lowered.contains(*key) && !record.documents.is_empty())
            .map(|(_, record)| EntitySuggestion {
                name: record.name.clone(),
                entity_type: record.metadata.entity_type.clone(),
                record_count: record.metadata.total_records,
            })
            .collect()
    }
}

pub fn has_common_words(a: &str, b: &str) -> bool {
    let left: HashSet<String> = extract_words(a).into_iter().collect();
    extract_words(b).iter().any(|w| left.contains(w))
}

/// Facets offered when the result set spans more than one type or entity.
pub fn filter_suggestions(results: &[SearchHit]) -> Vec<FilterSuggestion> {
    let mut types: Vec<String> = Vec::new();
    let mut entities: Vec<String> = Vec::new();
    for hit in results {
        if !types.contains(&hit.doc_type) {
            types.push(hit.doc_type.clone());
        }
        if let Some(entity) = hit.document.entity.as_ref().filter(|e| !e.is_empty()) {
            if !entities.contains(entity) {
                entities.push(entity.clone());
            }
        }
    }
    let mut out = Vec::new();
    if types.len() > 1 {
        out.push(FilterSuggestion { kind: FacetKind::DocumentType, options: types });
    }
    if entities.len() > 1 {
        out.push(FilterSuggestion { kind: FacetKind::Entity, options: entities });
    }
    out
}
