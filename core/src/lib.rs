//! In-memory document indexing and retrieval for royalty, contract and compliance
//! records.
//!
//! Documents are tokenized into an inverted index and grouped by entity. A search runs
//! five retrieval strategies (exact, fuzzy, entity, synonym-expanded, intent-contextual),
//! merges them per document, ranks the result and derives suggestions, updating usage
//! analytics as it goes.
//!
//! ```no_run
//! use search_core::{Document, DocumentKind, SearchEngine, SearchOptions};
//!
//! let mut engine = SearchEngine::default().with_seed_documents(vec![
//!     Document::new("D1", DocumentKind::Report, "Monthly production report").with_entity("Maloma Colliery"),
//! ]);
//! engine.init();
//! let outcome = engine.search("production", &SearchOptions::default()).unwrap();
//! assert_eq!(outcome.results[0].document_id, "D1");
//! ```

pub mod analytics;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod events;
pub mod filter;
pub mod index;
pub mod nlp;
pub mod query;
pub mod ranking;
pub mod retrieval;
pub mod suggest;
pub mod synonyms;
pub mod tokenizer;

pub use analytics::{AnalyticsSnapshot, FailedSearch, PopularQuery, SearchRecord};
pub use config::EngineConfig;
pub use document::{Document, DocumentKind};
pub use engine::{SearchEngine, SearchOptions, SearchOutcome, SearchSummary};
pub use error::{Error, Result};
pub use events::{EngineEvent, EventBus, InboundEvent, RoyaltyCalculation};
pub use filter::SearchFilters;
pub use index::{EntityIndex, EntityRecord, InvertedIndex, Posting};
pub use query::{DetectedEntity, EntityKind, Intent, ProcessedQuery};
pub use ranking::SearchHit;
pub use retrieval::{MatchDetail, Strategy, StrategyMatch};
pub use suggest::Suggestions;
pub use synonyms::SynonymTable;
pub use tokenizer::extract_words;
