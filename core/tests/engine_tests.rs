mod common;

use common::{acme_contract, engine_with, fixture_engine};
use search_core::{
    Document, DocumentKind, EntityKind, Error, Intent, RoyaltyCalculation, SearchFilters,
    SearchOptions, Strategy,
};

fn search(engine: &mut search_core::SearchEngine, q: &str) -> search_core::SearchOutcome {
    engine.search(q, &SearchOptions::default()).expect("search succeeds")
}

fn ids(outcome: &search_core::SearchOutcome) -> Vec<&str> {
    outcome.results.iter().map(|h| h.document_id.as_str()).collect()
}

#[test]
fn exact_match_scenario() {
    let mut engine = engine_with(vec![acme_contract()]);
    let outcome = search(&mut engine, "coal");
    let hit = outcome.results.iter().find(|h| h.document_id == "D1").expect("D1 returned");
    assert!(hit.matched_by(Strategy::Exact));
    assert_eq!(hit.match_type, Strategy::Exact);
    assert!(hit.score > 0.0);
    assert_eq!(hit.rank, 1);
}

#[test]
fn synonym_without_path_returns_nothing() {
    // "extraction" shares a group with "mining", which D1 does not contain.
    let mut engine = engine_with(vec![acme_contract()]);
    let outcome = search(&mut engine, "extraction");
    assert!(outcome.results.is_empty());
}

#[test]
fn synonym_expansion_reaches_group_members() {
    let mining = Document::new(
        "D2",
        DocumentKind::RoyaltyRecord { mineral: None, amount: None, quantity: None },
        "Mining royalty for gravel",
    )
    .with_entity("Kwalini Quarry");
    let mut engine = engine_with(vec![acme_contract(), mining]);
    let outcome = search(&mut engine, "extraction");
    let hit = outcome.results.iter().find(|h| h.document_id == "D2").expect("D2 via synonyms");
    assert!(hit.matched_by(Strategy::Semantic));
    assert!(!hit.matched_by(Strategy::Exact));
    assert!(!ids(&outcome).contains(&"D1"));
}

#[test]
fn entity_detection_scenario() {
    let mut engine = engine_with(vec![acme_contract()]);
    let outcome = search(&mut engine, "Acme Mine payment status");
    let processed = &outcome.search_record.processed_query;
    assert!(processed
        .entities
        .iter()
        .any(|e| e.name == "Acme Mine" && e.kind == EntityKind::MiningEntity));
    assert_eq!(processed.intent, Intent::PaymentInquiry);
    let hit = &outcome.results[0];
    assert_eq!(hit.document_id, "D1");
    assert!(hit.matched_by(Strategy::Entity));
}

#[test]
fn zero_result_scenario() {
    let mut engine = engine_with(vec![acme_contract()]);
    let outcome = search(&mut engine, "zzzqqq");
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.analytics.total_results, 0);
    let snapshot = engine.analytics();
    assert_eq!(snapshot.failed_searches, 1);
    assert_eq!(snapshot.recent_failures[0].query, "zzzqqq");
    assert!(snapshot.recent_failures[0].error.is_none());
    // still recorded in history
    assert_eq!(engine.search_history().len(), 1);
}

#[test]
fn blank_entities_do_not_match_unrelated_queries() {
    let blank = Document::new("E1", DocumentKind::Report, "Quarterly lignite summary").with_entity("");
    let mut engine = engine_with(vec![acme_contract(), blank]);
    engine.update_entity_index(&RoyaltyCalculation { entity: Some(String::new()), amount: Some(10.0) });

    let outcome = search(&mut engine, "zzzqqq");
    assert!(outcome.results.is_empty());
    assert!(outcome.search_record.processed_query.entities.is_empty());
    assert_eq!(engine.analytics().failed_searches, 1);
}

#[test]
fn zero_results_still_offer_did_you_mean() {
    let mut engine = fixture_engine();
    let outcome = engine
        .search("graval", &SearchOptions::with_filters(SearchFilters {
            doc_type: Some("contract".into()),
            ..Default::default()
        }))
        .unwrap();
    assert!(outcome.results.is_empty());
    assert!(outcome.suggestions.did_you_mean.iter().any(|d| d.original == "graval" && d.suggestion == "gravel"));
    assert!(!outcome.suggestions.entity_suggestions.is_empty());
}

#[test]
fn status_boost_puts_overdue_record_first() {
    let mut engine = fixture_engine();
    let outcome = search(&mut engine, "overdue");
    assert_eq!(outcome.results[0].document_id, "ROY002");
    assert_eq!(outcome.results[0].score, 6.0);
    assert_eq!(outcome.results[0].relevance_percentage, 100);
}

#[test]
fn entity_query_returns_every_entity_document() {
    let mut engine = fixture_engine();
    let outcome = search(&mut engine, "Maloma Colliery");
    for id in ["ROY001", "CONT001", "COMP001", "DOC001", "RPT001"] {
        assert!(ids(&outcome).contains(&id), "missing {id}");
    }
    let names: Vec<&str> = outcome.suggestions.entity_suggestions.iter().map(|s| s.name.as_str()).collect();
    assert!(!names.contains(&"Maloma Colliery"));
    assert!(names.contains(&"Ngwenya Mine"));
}

#[test]
fn filters_narrow_results() {
    let mut engine = fixture_engine();
    let filters = SearchFilters { status: Some("overdue".into()), ..Default::default() };
    let outcome = engine.search("royalty", &SearchOptions::with_filters(filters.clone())).unwrap();
    assert_eq!(ids(&outcome), vec!["ROY002"]);
    assert_eq!(outcome.search_record.filters, filters);

    let by_date = SearchFilters { date_from: Some("2024-01-01".into()), ..Default::default() };
    let outcome = engine.search("royalty", &SearchOptions::with_filters(by_date)).unwrap();
    assert!(!outcome.results.is_empty());
    assert!(outcome.results.iter().all(|h| h.document.period.as_deref() == Some("2024-01")));
}

#[test]
fn malformed_filter_fails_and_is_logged() {
    let mut engine = fixture_engine();
    let filters = SearchFilters { date_from: Some("not-a-date".into()), ..Default::default() };
    let err = engine.search("royalty", &SearchOptions::with_filters(filters)).unwrap_err();
    assert!(matches!(err, Error::InvalidFilter { field: "dateFrom", .. }));
    let snapshot = engine.analytics();
    assert_eq!(snapshot.total_searches, 1);
    assert_eq!(snapshot.failed_searches, 1);
    assert!(snapshot.recent_failures[0].error.as_deref().unwrap().contains("not-a-date"));
    assert!(engine.search_history().is_empty());
}

#[test]
fn facets_suggested_for_mixed_results() {
    let mut engine = fixture_engine();
    let outcome = search(&mut engine, "royalty");
    let kinds: Vec<_> = outcome.suggestions.filters.iter().map(|f| f.kind).collect();
    assert_eq!(kinds.len(), 2);
}

#[test]
fn related_searches_come_from_history() {
    let mut engine = fixture_engine();
    search(&mut engine, "coal royalty");
    search(&mut engine, "gravel tons");
    let outcome = search(&mut engine, "coal production");
    assert_eq!(outcome.suggestions.related_searches, vec!["coal royalty"]);
    // the same query is never its own related search
    let outcome = search(&mut engine, "coal production");
    assert_eq!(outcome.suggestions.related_searches, vec!["coal royalty"]);
}

#[test]
fn history_stores_top_results_only() {
    let mut engine = fixture_engine();
    let outcome = search(&mut engine, "january royalty payment");
    assert!(!outcome.results.is_empty());
    let record = engine.search_history().latest().unwrap();
    assert_eq!(record.results_count, outcome.results.len());
    assert!(record.results.len() <= 10);
    assert_eq!(record.id, outcome.analytics.search_id);
}

#[test]
fn analytics_track_every_search() {
    let mut engine = fixture_engine();
    let queries = ["coal", "zzzz", "Coal", "audit compliance", "gravel"];
    let mut counts = Vec::new();
    for q in queries {
        counts.push(search(&mut engine, q).results.len() as f64);
    }
    let snapshot = engine.analytics();
    assert_eq!(snapshot.total_searches, queries.len() as u64);
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    assert!((snapshot.average_results_per_query - mean).abs() < 1e-9);
    assert_eq!(snapshot.popular_queries[0].query, "coal");
    assert_eq!(snapshot.popular_queries[0].count, 2);
    assert_eq!(snapshot.indexed_documents, 10);
    assert_eq!(snapshot.known_entities, 5);
}

#[test]
fn analytics_snapshot_is_idempotent() {
    let mut engine = fixture_engine();
    search(&mut engine, "coal");
    search(&mut engine, "gravel");
    assert_eq!(engine.analytics(), engine.analytics());
}

#[test]
fn add_document_indexes_every_token() {
    let mut engine = fixture_engine();
    let before = engine.documents().len();
    let doc = Document::new("NEW1", DocumentKind::Report, "Quarterly lignite reclamation summary");
    let tokens = search_core::extract_words(&doc.content);
    engine.add_to_search_index(doc);
    assert_eq!(engine.documents().len(), before + 1);
    for t in tokens {
        assert!(engine.search_index().postings(&t).iter().any(|p| p.document_id == "NEW1"), "{t}");
    }
}

#[test]
fn duplicate_ids_are_not_deduplicated() {
    let mut engine = engine_with(vec![acme_contract()]);
    engine.add_to_search_index(acme_contract());
    assert_eq!(engine.search_index().postings("coal").len(), 2);
    // merge still yields one candidate per id
    let outcome = search(&mut engine, "coal");
    assert_eq!(ids(&outcome), vec!["D1"]);
}

#[test]
fn init_is_idempotent_and_destroy_resets() {
    let mut engine = fixture_engine();
    engine.init();
    assert_eq!(engine.documents().len(), 10);
    search(&mut engine, "coal");

    engine.destroy();
    assert!(!engine.is_initialized());
    assert!(engine.documents().is_empty());
    assert!(engine.entity_index().is_empty());
    assert!(engine.synonyms().is_empty());
    assert_eq!(engine.analytics().total_searches, 0);
    assert!(engine.search_history().is_empty());

    engine.init();
    assert!(engine.is_initialized());
    assert_eq!(engine.documents().len(), 10);
    assert!(!engine.synonyms().is_empty());
}
