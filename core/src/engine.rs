use crate::analytics::{now_rfc3339, AnalyticsSnapshot, IndexSizes, SearchAnalytics, SearchHistory, SearchRecord};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::events::{EngineEvent, EventBus, InboundEvent, RoyaltyCalculation};
use crate::filter::SearchFilters;
use crate::index::{EntityIndex, InvertedIndex};
use crate::query::QueryProcessor;
use crate::ranking::{rank_results, SearchHit};
use crate::retrieval::Retriever;
use crate::suggest::{SuggestionGenerator, Suggestions};
use crate::synonyms::SynonymTable;
use crate::{Document, DocumentKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(default)]
    pub filters: Option<SearchFilters>,
}

impl SearchOptions {
    pub fn with_filters(filters: SearchFilters) -> Self {
        Self { filters: Some(filters) }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub execution_time_ms: u64,
    pub total_results: usize,
    pub search_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub results: Vec<SearchHit>,
    pub suggestions: Suggestions,
    pub search_record: SearchRecord,
    pub analytics: SearchSummary,
}

/// The search engine. One instance is owned by the application's composition root and
/// passed by reference to whatever needs it.
///
/// Lifecycle: constructed uninitialized, [`init`](Self::init) loads the thesaurus and
/// the seed documents, [`destroy`](Self::destroy) clears everything and detaches from
/// the event bus. Indexes are append-only in between.
pub struct SearchEngine {
    config: EngineConfig,
    bus: EventBus,
    inbound: Option<Receiver<InboundEvent>>,
    initialized: bool,
    seed: Vec<Document>,
    synonyms: SynonymTable,
    index: InvertedIndex,
    entities: EntityIndex,
    history: SearchHistory,
    analytics: SearchAnalytics,
}

impl Default for SearchEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        let bus = EventBus::new(config.event_capacity);
        Self::new(config, bus)
    }
}

impl SearchEngine {
    pub fn new(config: EngineConfig, bus: EventBus) -> Self {
        Self {
            history: SearchHistory::new(config.history_limit),
            analytics: SearchAnalytics::new(config.failed_search_limit),
            config,
            bus,
            inbound: None,
            initialized: false,
            seed: Vec::new(),
            synonyms: SynonymTable::new(),
            index: InvertedIndex::new(),
            entities: EntityIndex::new(),
        }
    }

    /// Documents indexed by every [`init`](Self::init).
    pub fn with_seed_documents(mut self, docs: Vec<Document>) -> Self {
        self.seed = docs;
        self
    }

    /// One-time setup; a no-op when already initialized.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.synonyms = SynonymTable::domain();
        self.add_documents(self.seed.clone());
        self.history.clear();
        self.inbound = Some(self.bus.attach());
        self.initialized = true;
        info!(
            documents = self.index.num_docs(),
            terms = self.index.num_terms(),
            entities = self.entities.len(),
            "semantic search initialized"
        );
    }

    pub fn is_initialized(&self) -> bool { self.initialized }

    /// Clears all in-memory state and detaches from the bus. A later
    /// [`init`](Self::init) rebuilds from the seed documents.
    pub fn destroy(&mut self) {
        info!("destroying semantic search");
        self.index.clear();
        self.entities.clear();
        self.synonyms.clear();
        self.history.clear();
        self.analytics.reset();
        self.inbound = None;
        self.initialized = false;
    }

    /// Index into both the inverted index and, when the document names one, the
    /// entity index.
    pub fn add_documents(&mut self, docs: impl IntoIterator<Item = Document>) {
        for doc in docs {
            let doc = Arc::new(doc);
            self.index.add_document(Arc::clone(&doc));
            if let Some(name) = named_entity(doc.entity.as_deref()).map(str::to_string) {
                self.entities.add_entity(&name, doc);
            }
        }
    }

    pub fn add_to_search_index(&mut self, doc: Document) {
        self.index.add_document(Arc::new(doc));
    }

    pub fn add_entity_to_index(&mut self, name: &str, doc: Document) {
        self.entities.add_entity(name, Arc::new(doc));
    }

    /// Records a royalty calculation against its entity as a synthetic `calculation`
    /// document. Calculations without an entity name are ignored.
    pub fn update_entity_index(&mut self, calc: &RoyaltyCalculation) {
        let Some(entity) = named_entity(calc.entity.as_deref()) else { return };
        let amount = calc.amount.map_or_else(|| "n/a".to_string(), |a| a.to_string());
        let doc = Document::new(
            format!("CALC_{}", unix_millis()),
            DocumentKind::Calculation { amount: calc.amount },
            format!("Royalty calculation for {entity}: {amount}"),
        )
        .with_entity(entity);
        self.add_entity_to_index(entity, doc);
    }

    pub fn handle_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::DocumentUploaded(doc) => {
                debug!(id = %doc.id, "indexing uploaded document");
                self.add_to_search_index(doc);
            }
            InboundEvent::RoyaltyCalculated(calc) => self.update_entity_index(&calc),
        }
    }

    /// Apply every inbound event queued since the last drain. Returns how many were
    /// handled. Does nothing when detached.
    pub fn process_pending_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let Some(rx) = self.inbound.as_mut() else { break };
            match rx.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "inbound event receiver lagged; events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        handled
    }

    /// Async entry point for event-driven callers. Never suspends; the whole pipeline
    /// runs synchronously inside [`search`](Self::search).
    pub async fn perform_semantic_search(&mut self, query: &str, options: SearchOptions) -> Result<SearchOutcome> {
        self.search(query, &options)
    }

    /// Run a search. Errors are recorded as failed searches and returned; no search
    /// record is stored for them.
    pub fn search(&mut self, query: &str, options: &SearchOptions) -> Result<SearchOutcome> {
        if !self.initialized {
            warn!(query, "search on an uninitialized engine");
        }
        self.process_pending_events();
        let start = Instant::now();
        self.analytics.record_query(query);
        match self.run_search(query, options, start) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(query, error = %err, "semantic search failed");
                self.analytics.record_failure(query, Some(err.to_string()));
                Err(err)
            }
        }
    }

    fn run_search(&mut self, query: &str, options: &SearchOptions, start: Instant) -> Result<SearchOutcome> {
        let processed = QueryProcessor::new(&self.synonyms, &self.entities).preprocess(query);
        let mut candidates =
            Retriever::new(&self.index, &self.entities, self.config.fuzzy_threshold).retrieve(&processed);
        if let Some(filters) = &options.filters {
            candidates = filters.apply(candidates)?;
        }
        let results = rank_results(candidates);
        let suggestions =
            SuggestionGenerator::new(&self.index, &self.entities, &self.history, self.config.suggestion_limits())
                .generate(query, &results);

        let record = SearchRecord {
            id: search_id(),
            query: query.to_string(),
            processed_query: processed,
            timestamp: now_rfc3339(),
            results_count: results.len(),
            execution_time_ms: start.elapsed().as_millis() as u64,
            filters: options.filters.clone().unwrap_or_default(),
            results: results.iter().take(self.config.stored_results).cloned().collect(),
        };
        self.history.push(record.clone());
        self.analytics.record_results(results.len());
        if results.is_empty() {
            self.analytics.record_failure(query, None);
        }
        debug!(
            query,
            results = results.len(),
            intent = record.processed_query.intent.as_str(),
            took_ms = record.execution_time_ms,
            "semantic search completed"
        );

        self.bus.publish(EngineEvent::SemanticSearchCompleted {
            search_record: record.clone(),
            suggestions: suggestions.clone(),
        });

        Ok(SearchOutcome {
            analytics: SearchSummary {
                execution_time_ms: record.execution_time_ms,
                total_results: results.len(),
                search_id: record.id.clone(),
            },
            results,
            suggestions,
            search_record: record,
        })
    }

    pub fn analytics(&self) -> AnalyticsSnapshot {
        self.analytics.snapshot(
            self.config.analytics_top_n,
            IndexSizes {
                documents: self.index.num_docs(),
                terms: self.index.num_terms(),
                entities: self.entities.len(),
            },
        )
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn bus(&self) -> &EventBus { &self.bus }

    pub fn search_index(&self) -> &InvertedIndex { &self.index }

    pub fn entity_index(&self) -> &EntityIndex { &self.entities }

    pub fn search_history(&self) -> &SearchHistory { &self.history }

    pub fn documents(&self) -> &[Arc<Document>] { self.index.documents() }

    pub fn synonyms(&self) -> &SynonymTable { &self.synonyms }
}

/// A blank entity name would match every query as a substring.
fn named_entity(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}

fn unix_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0)
}

fn search_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("SEARCH_{}_{}", unix_millis(), &suffix[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_id_shape() {
        let id = search_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SEARCH");
        assert!(parts[1].parse::<u128>().is_ok());
        assert_eq!(parts[2].len(), 6);
    }

    #[test]
    fn calculation_without_entity_is_ignored() {
        let mut engine = SearchEngine::default();
        engine.update_entity_index(&RoyaltyCalculation { entity: None, amount: Some(5.0) });
        assert!(engine.entity_index().is_empty());
    }

    #[test]
    fn calculation_with_blank_entity_is_ignored() {
        let mut engine = SearchEngine::default();
        for name in ["", "   "] {
            engine.update_entity_index(&RoyaltyCalculation { entity: Some(name.into()), amount: Some(5.0) });
        }
        assert!(engine.entity_index().is_empty());
    }

    #[test]
    fn seed_document_with_blank_entity_is_not_an_entity() {
        let doc = Document::new("E1", DocumentKind::Report, "Quarterly summary").with_entity("");
        let mut engine = SearchEngine::default().with_seed_documents(vec![doc]);
        engine.init();
        assert_eq!(engine.documents().len(), 1);
        assert!(engine.entity_index().is_empty());
    }

    #[test]
    fn calculation_is_added_to_entity_index_only() {
        let mut engine = SearchEngine::default();
        engine.update_entity_index(&RoyaltyCalculation { entity: Some("Maloma Colliery".into()), amount: Some(850000.0) });
        let record = engine.entity_index().get("maloma colliery").unwrap();
        assert_eq!(record.documents[0].content, "Royalty calculation for Maloma Colliery: 850000");
        assert_eq!(record.documents[0].doc_type(), "calculation");
        assert!(record.documents[0].id.starts_with("CALC_"));
        assert_eq!(engine.search_index().num_docs(), 0);
    }

    #[test]
    fn uninitialized_engine_searches_empty_structures() {
        let mut engine = SearchEngine::default();
        let outcome = engine.search("coal", &SearchOptions::default()).unwrap();
        assert!(outcome.results.is_empty());
        assert_eq!(engine.analytics().total_searches, 1);
    }
}
