mod common;

use common::{acme_contract, fixture_docs};
use search_core::{
    Document, DocumentKind, EngineConfig, EngineEvent, EventBus, InboundEvent, RoyaltyCalculation,
    SearchEngine, SearchOptions,
};

fn attached_engine(bus: &EventBus) -> SearchEngine {
    let mut engine = SearchEngine::new(EngineConfig::default(), bus.clone()).with_seed_documents(fixture_docs());
    engine.init();
    engine
}

#[tokio::test]
async fn search_completion_is_published() {
    let bus = EventBus::new(8);
    let mut events = bus.subscribe();
    let mut engine = attached_engine(&bus);

    let outcome = engine.perform_semantic_search("coal", SearchOptions::default()).await.unwrap();

    let EngineEvent::SemanticSearchCompleted { search_record, suggestions } = events.recv().await.unwrap();
    assert_eq!(search_record.id, outcome.analytics.search_id);
    assert_eq!(search_record.results_count, outcome.results.len());
    assert_eq!(suggestions, outcome.suggestions);
}

#[tokio::test]
async fn completed_event_wire_shape() {
    let bus = EventBus::new(8);
    let mut events = bus.subscribe();
    let mut engine = attached_engine(&bus);
    engine.perform_semantic_search("gravel", SearchOptions::default()).await.unwrap();

    let json = serde_json::to_value(events.recv().await.unwrap()).unwrap();
    assert_eq!(json["event"], "semanticSearchCompleted");
    assert_eq!(json["detail"]["searchRecord"]["query"], "gravel");
    assert!(json["detail"]["suggestions"]["didYouMean"].is_array());
}

#[tokio::test]
async fn uploaded_documents_are_indexed_before_next_search() {
    let bus = EventBus::new(8);
    let mut engine = attached_engine(&bus);
    let upload = Document::new("UP1", DocumentKind::DocumentFile, "Rehabilitation plan for the lignite pit");
    assert_eq!(bus.emit(InboundEvent::DocumentUploaded(upload)), 1);

    let outcome = engine.perform_semantic_search("rehabilitation", SearchOptions::default()).await.unwrap();
    assert!(outcome.results.iter().any(|h| h.document_id == "UP1"));
    assert_eq!(engine.documents().len(), 11);
}

#[test]
fn royalty_calculations_update_entity_index() {
    let bus = EventBus::new(8);
    let mut engine = attached_engine(&bus);
    bus.emit(InboundEvent::RoyaltyCalculated(RoyaltyCalculation {
        entity: Some("Maloma Colliery".into()),
        amount: Some(850000.0),
    }));
    bus.emit(InboundEvent::RoyaltyCalculated(RoyaltyCalculation { entity: None, amount: Some(1.0) }));
    assert_eq!(engine.process_pending_events(), 2);

    let record = engine.entity_index().get("Maloma Colliery").unwrap();
    assert_eq!(record.metadata.total_records, 6);
    assert!(record.metadata.categories.contains(&"calculation".to_string()));
    // entity index only
    assert_eq!(engine.documents().len(), 10);
}

#[test]
fn destroyed_engine_stops_listening() {
    let bus = EventBus::new(8);
    let mut engine = attached_engine(&bus);
    engine.destroy();
    assert_eq!(bus.emit(InboundEvent::DocumentUploaded(acme_contract())), 0);
    assert_eq!(engine.process_pending_events(), 0);

    engine.init();
    assert_eq!(bus.emit(InboundEvent::DocumentUploaded(acme_contract())), 1);
    assert_eq!(engine.process_pending_events(), 1);
    assert_eq!(engine.documents().len(), 11);
}

#[test]
fn lagging_receiver_keeps_newest_events() {
    let bus = EventBus::new(2);
    let mut engine = attached_engine(&bus);
    for i in 0..5 {
        bus.emit(InboundEvent::DocumentUploaded(Document::new(format!("U{i}"), DocumentKind::Report, "late filing")));
    }
    assert_eq!(engine.process_pending_events(), 2);
    let ids: Vec<&str> = engine.documents()[10..].iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["U3", "U4"]);
}
