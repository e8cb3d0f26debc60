use crate::retrieval::{Candidate, MatchDetail, Strategy, StrategyMatch};
use crate::Document;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

/// Score that maps to 100%. Fixed, not derived from the result distribution.
const FULL_RELEVANCE_SCORE: f64 = 5.0;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub document_id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub score: f64,
    pub match_type: Strategy,
    pub detail: MatchDetail,
    pub document: Arc<Document>,
    pub match_strategies: Vec<StrategyMatch>,
    /// 1-based position.
    pub rank: usize,
    pub relevance_percentage: u32,
}

impl SearchHit {
    pub fn matched_by(&self, strategy: Strategy) -> bool {
        self.match_strategies.iter().any(|m| m.strategy == strategy)
    }
}

pub fn relevance_percentage(score: f64) -> u32 {
    ((score / FULL_RELEVANCE_SCORE) * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Score descending, then match-type priority descending. The sort is stable so
/// full ties keep retrieval order.
pub fn compare(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.match_type.priority().cmp(&a.match_type.priority()))
}

pub fn rank_results(mut candidates: Vec<Candidate>) -> Vec<SearchHit> {
    candidates.sort_by(compare);
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, c)| SearchHit {
            rank: i + 1,
            relevance_percentage: relevance_percentage(c.score),
            document_id: c.document_id,
            doc_type: c.doc_type,
            score: c.score,
            match_type: c.match_type,
            detail: c.detail,
            document: c.document,
            match_strategies: c.match_strategies,
        })
        .collect()
}
