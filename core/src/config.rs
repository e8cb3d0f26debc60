use crate::error::Result;
use crate::suggest::SuggestionLimits;
use serde::{Deserialize, Serialize};

/// Engine tuning. Every field has a default, so a partial JSON object is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Search records kept, newest first.
    pub history_limit: usize,
    /// Failed searches kept before the oldest is evicted.
    pub failed_search_limit: usize,
    /// Top results stored on each search record.
    pub stored_results: usize,
    /// Minimum character-set similarity for a fuzzy match.
    pub fuzzy_threshold: f64,
    pub did_you_mean_min: f64,
    pub did_you_mean_max: f64,
    pub related_search_limit: usize,
    /// Entries in the popular-query and recent-failure lists of a snapshot.
    pub analytics_top_n: usize,
    /// Buffered events per channel before slow receivers lag.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            failed_search_limit: 100,
            stored_results: 10,
            fuzzy_threshold: 0.7,
            did_you_mean_min: 0.6,
            did_you_mean_max: 0.95,
            related_search_limit: 5,
            analytics_top_n: 10,
            event_capacity: 64,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn suggestion_limits(&self) -> SuggestionLimits {
        SuggestionLimits {
            min_similarity: self.did_you_mean_min,
            max_similarity: self.did_you_mean_max,
            related_searches: self.related_search_limit,
        }
    }
}
