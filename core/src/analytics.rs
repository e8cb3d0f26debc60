//! Search history and usage counters.

use crate::filter::SearchFilters;
use crate::query::ProcessedQuery;
use crate::ranking::SearchHit;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| "".into())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub id: String,
    pub query: String,
    pub processed_query: ProcessedQuery,
    pub timestamp: String,
    pub results_count: usize,
    pub execution_time_ms: u64,
    pub filters: SearchFilters,
    /// Top results only.
    pub results: Vec<SearchHit>,
}

/// Newest-first, bounded.
#[derive(Debug)]
pub struct SearchHistory {
    records: VecDeque<SearchRecord>,
    limit: usize,
}

impl SearchHistory {
    pub fn new(limit: usize) -> Self {
        Self { records: VecDeque::new(), limit }
    }

    pub fn push(&mut self, record: SearchRecord) {
        self.records.push_front(record);
        self.records.truncate(self.limit);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchRecord> { self.records.iter() }

    pub fn latest(&self) -> Option<&SearchRecord> { self.records.front() }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn clear(&mut self) { self.records.clear(); }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedSearch {
    pub query: String,
    /// Set when the search raised an error rather than returning nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularQuery {
    pub query: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_searches: u64,
    pub average_results_per_query: f64,
    pub popular_queries: Vec<PopularQuery>,
    /// Most recent first.
    pub recent_failures: Vec<FailedSearch>,
    pub failed_searches: usize,
    pub indexed_documents: usize,
    pub indexed_terms: usize,
    pub known_entities: usize,
}

/// Index sizes folded into a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexSizes {
    pub documents: usize,
    pub terms: usize,
    pub entities: usize,
}

#[derive(Debug)]
pub struct SearchAnalytics {
    total_searches: u64,
    popular_queries: HashMap<String, u64>,
    failed_searches: VecDeque<FailedSearch>,
    failed_limit: usize,
    average_results_per_query: f64,
}

impl SearchAnalytics {
    pub fn new(failed_limit: usize) -> Self {
        Self {
            total_searches: 0,
            popular_queries: HashMap::new(),
            failed_searches: VecDeque::new(),
            failed_limit,
            average_results_per_query: 0.0,
        }
    }

    /// Counts a search before it runs.
    pub fn record_query(&mut self, query: &str) {
        self.total_searches += 1;
        *self.popular_queries.entry(query.trim().to_lowercase()).or_insert(0) += 1;
    }

    /// Folds a completed search's result count into the running mean. Searches that
    /// returned an error count toward the total but never reach the mean.
    pub fn record_results(&mut self, count: usize) {
        let total = self.total_searches.max(1) as f64;
        self.average_results_per_query =
            (self.average_results_per_query * (total - 1.0) + count as f64) / total;
    }

    pub fn record_failure(&mut self, query: &str, error: Option<String>) {
        self.failed_searches.push_back(FailedSearch {
            query: query.to_string(),
            error,
            timestamp: now_rfc3339(),
        });
        while self.failed_searches.len() > self.failed_limit {
            self.failed_searches.pop_front();
        }
    }

    pub fn total_searches(&self) -> u64 { self.total_searches }

    pub fn average_results_per_query(&self) -> f64 { self.average_results_per_query }

    pub fn query_count(&self, query: &str) -> u64 {
        self.popular_queries.get(&query.trim().to_lowercase()).copied().unwrap_or(0)
    }

    /// Oldest first.
    pub fn failed_searches(&self) -> impl Iterator<Item = &FailedSearch> { self.failed_searches.iter() }

    pub fn snapshot(&self, top_n: usize, sizes: IndexSizes) -> AnalyticsSnapshot {
        let mut popular: Vec<PopularQuery> = self
            .popular_queries
            .iter()
            .map(|(q, c)| PopularQuery { query: q.clone(), count: *c })
            .collect();
        popular.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.query.cmp(&b.query)));
        popular.truncate(top_n);
        AnalyticsSnapshot {
            total_searches: self.total_searches,
            average_results_per_query: self.average_results_per_query,
            popular_queries: popular,
            recent_failures: self.failed_searches.iter().rev().take(top_n).cloned().collect(),
            failed_searches: self.failed_searches.len(),
            indexed_documents: sizes.documents,
            indexed_terms: sizes.terms,
            known_entities: sizes.entities,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.failed_limit);
    }
}
