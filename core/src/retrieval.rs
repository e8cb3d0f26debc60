//! Multi-strategy retrieval.
//!
//! Five independent passes (exact, fuzzy, entity, semantic, contextual) produce scored
//! candidates which are then merged per document. The merged score is the maximum over
//! all contributing strategies, never the sum.

use crate::index::{EntityIndex, InvertedIndex, Posting};
use crate::query::{Intent, ProcessedQuery};
use crate::Document;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Boost applied to postings hit by an unexpanded query token.
const EXACT_BOOST: f64 = 2.0;
const ENTITY_WEIGHT: f64 = 3.0;
const ORIGINAL_TERM_BOOST: f64 = 1.5;
const CONTEXTUAL_SCORE: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Exact,
    Fuzzy,
    Entity,
    Semantic,
    Contextual,
}

impl Strategy {
    /// Tie-break priority used when two results score the same.
    pub fn priority(&self) -> u8 {
        match self {
            Strategy::Exact => 4,
            Strategy::Entity => 3,
            Strategy::Semantic => 2,
            Strategy::Fuzzy | Strategy::Contextual => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Exact => "exact",
            Strategy::Fuzzy => "fuzzy",
            Strategy::Entity => "entity",
            Strategy::Semantic => "semantic",
            Strategy::Contextual => "contextual",
        }
    }
}

/// What a single pass knew about its match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MatchDetail {
    Term {
        #[serde(rename = "matchedTerm")]
        matched_term: String,
    },
    Fuzzy {
        #[serde(rename = "matchedTerm")]
        matched_term: String,
        similarity: f64,
    },
    Entity {
        #[serde(rename = "entityName")]
        entity_name: String,
    },
    Contextual { intent: Intent },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyMatch {
    pub strategy: Strategy,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub document_id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub score: f64,
    /// Strategy of the first result seen for this document.
    pub match_type: Strategy,
    pub detail: MatchDetail,
    pub document: Arc<Document>,
    /// Every pass result merged into this candidate, in pass order.
    pub match_strategies: Vec<StrategyMatch>,
}

impl Candidate {
    fn from_posting(posting: &Posting, score: f64, match_type: Strategy, detail: MatchDetail) -> Self {
        Self {
            document_id: posting.document_id.clone(),
            doc_type: posting.doc_type.clone(),
            score,
            match_type,
            detail,
            document: Arc::clone(&posting.document),
            match_strategies: Vec::new(),
        }
    }

    fn from_document(doc: &Arc<Document>, score: f64, match_type: Strategy, detail: MatchDetail) -> Self {
        Self {
            document_id: doc.id.clone(),
            doc_type: doc.doc_type().to_string(),
            score,
            match_type,
            detail,
            document: Arc::clone(doc),
            match_strategies: Vec::new(),
        }
    }

    pub fn matched_by(&self, strategy: Strategy) -> bool {
        self.match_strategies.iter().any(|m| m.strategy == strategy)
    }
}

/// Jaccard similarity of the two strings' character sets (case-insensitive).
/// Two empty strings have similarity 0.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let left: HashSet<char> = a.to_lowercase().chars().collect();
    let right: HashSet<char> = b.to_lowercase().chars().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

pub struct Retriever<'a> {
    index: &'a InvertedIndex,
    entities: &'a EntityIndex,
    fuzzy_threshold: f64,
}

impl<'a> Retriever<'a> {
    pub fn new(index: &'a InvertedIndex, entities: &'a EntityIndex, fuzzy_threshold: f64) -> Self {
        Self { index, entities, fuzzy_threshold }
    }

    /// Run every pass and merge the results per document.
    pub fn retrieve(&self, query: &ProcessedQuery) -> Vec<Candidate> {
        merge(vec![
            (Strategy::Exact, self.exact_matches(query)),
            (Strategy::Fuzzy, self.fuzzy_matches(query)),
            (Strategy::Entity, self.entity_matches(query)),
            (Strategy::Semantic, self.semantic_matches(query)),
            (Strategy::Contextual, self.contextual_matches(query)),
        ])
    }

    pub fn exact_matches(&self, query: &ProcessedQuery) -> Vec<Candidate> {
        let mut out = Vec::new();
        for token in &query.tokens {
            for posting in self.index.postings(token) {
                out.push(Candidate::from_posting(
                    posting,
                    posting.relevance_score * EXACT_BOOST,
                    Strategy::Exact,
                    MatchDetail::Term { matched_term: token.clone() },
                ));
            }
        }
        out
    }

    /// Compares every query token with every indexed term, so cost grows with the
    /// vocabulary size.
    pub fn fuzzy_matches(&self, query: &ProcessedQuery) -> Vec<Candidate> {
        let mut out = Vec::new();
        for token in &query.tokens {
            for (term, postings) in self.index.terms() {
                let similarity = jaccard_similarity(token, term);
                if similarity < self.fuzzy_threshold {
                    continue;
                }
                for posting in postings {
                    out.push(Candidate::from_posting(
                        posting,
                        posting.relevance_score * similarity,
                        Strategy::Fuzzy,
                        MatchDetail::Fuzzy { matched_term: term.to_string(), similarity },
                    ));
                }
            }
        }
        out
    }

    /// Detected minerals and document-type words only contribute when an entity of
    /// that name has been indexed.
    pub fn entity_matches(&self, query: &ProcessedQuery) -> Vec<Candidate> {
        let mut out = Vec::new();
        for entity in &query.entities {
            let Some(record) = self.entities.get(&entity.name) else { continue };
            for doc in &record.documents {
                out.push(Candidate::from_document(
                    doc,
                    entity.confidence * ENTITY_WEIGHT,
                    Strategy::Entity,
                    MatchDetail::Entity { entity_name: entity.name.clone() },
                ));
            }
        }
        out
    }

    pub fn semantic_matches(&self, query: &ProcessedQuery) -> Vec<Candidate> {
        let mut out = Vec::new();
        for term in &query.expanded_terms {
            let multiplier = if query.is_original_token(term) { ORIGINAL_TERM_BOOST } else { 1.0 };
            for posting in self.index.postings(term) {
                out.push(Candidate::from_posting(
                    posting,
                    posting.relevance_score * multiplier,
                    Strategy::Semantic,
                    MatchDetail::Term { matched_term: term.clone() },
                ));
            }
        }
        out
    }

    pub fn contextual_matches(&self, query: &ProcessedQuery) -> Vec<Candidate> {
        let wanted = query.intent.relevant_types();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.index
            .documents()
            .iter()
            .filter(|doc| wanted.iter().any(|t| *t == doc.doc_type()))
            .map(|doc| {
                Candidate::from_document(
                    doc,
                    CONTEXTUAL_SCORE,
                    Strategy::Contextual,
                    MatchDetail::Contextual { intent: query.intent },
                )
            })
            .collect()
    }
}

/// Group pass results by document id in first-seen order. The first result seen for a
/// document provides its fields; its score becomes the running maximum.
pub fn merge(passes: Vec<(Strategy, Vec<Candidate>)>) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for (strategy, results) in passes {
        for result in results {
            let contribution = StrategyMatch { strategy, score: result.score };
            let slot = match slots.get(&result.document_id) {
                Some(&slot) => slot,
                None => {
                    slots.insert(result.document_id.clone(), merged.len());
                    merged.push(result);
                    merged.len() - 1
                }
            };
            let entry = &mut merged[slot];
            entry.score = entry.score.max(contribution.score);
            entry.match_strategies.push(contribution);
        }
    }
    merged
}
