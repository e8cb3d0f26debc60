#![allow(dead_code)]

use search_core::{Document, DocumentKind, SearchEngine};

pub fn fixture_docs() -> Vec<Document> {
    serde_json::from_str(include_str!("../fixtures/documents.json")).expect("valid fixture")
}

pub fn fixture_engine() -> SearchEngine {
    let mut engine = SearchEngine::default().with_seed_documents(fixture_docs());
    engine.init();
    engine
}

pub fn acme_contract() -> Document {
    Document::new(
        "D1",
        DocumentKind::Contract { mineral: None, start_date: None, end_date: None, value: None, royalty_rate: None },
        "Acme Mine coal contract royalty 15%",
    )
    .with_entity("Acme Mine")
}

pub fn engine_with(docs: Vec<Document>) -> SearchEngine {
    let mut engine = SearchEngine::default().with_seed_documents(docs);
    engine.init();
    engine
}
