//! Query preprocessing: tokenization, synonym expansion, entity detection and intent
//! classification.

use crate::index::EntityIndex;
use crate::synonyms::SynonymTable;
use crate::tokenizer::extract_words;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PaymentInquiry,
    ComplianceInquiry,
    ProductionInquiry,
    ContractInquiry,
    FinancialInquiry,
    GeneralSearch,
}

/// Keyword rules in priority order. The first rule with a keyword contained in the
/// query wins, even when a later rule matches too.
const INTENT_RULES: &[(Intent, &[&str])] = &[
    (Intent::PaymentInquiry, &["pay", "due", "overdue", "owing"]),
    (Intent::ComplianceInquiry, &["compliance", "violation", "audit", "regulation"]),
    (Intent::ProductionInquiry, &["production", "output", "extract", "tons"]),
    (Intent::ContractInquiry, &["contract", "agreement", "license", "permit"]),
    (Intent::FinancialInquiry, &["revenue", "profit", "cost", "financial"]),
];

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::PaymentInquiry => "payment_inquiry",
            Intent::ComplianceInquiry => "compliance_inquiry",
            Intent::ProductionInquiry => "production_inquiry",
            Intent::ContractInquiry => "contract_inquiry",
            Intent::FinancialInquiry => "financial_inquiry",
            Intent::GeneralSearch => "general_search",
        }
    }

    /// Document types a contextual pass pulls in for this intent.
    pub fn relevant_types(&self) -> &'static [&'static str] {
        match self {
            Intent::PaymentInquiry => &["royalty_record", "contract"],
            Intent::ComplianceInquiry => &["compliance_record", "audit_record"],
            Intent::ProductionInquiry => &["royalty_record", "production_report"],
            Intent::ContractInquiry => &["contract", "license"],
            Intent::FinancialInquiry => &["royalty_record", "financial_statement"],
            Intent::GeneralSearch => &[],
        }
    }
}

pub fn detect_intent(query: &str) -> Intent {
    let lowered = query.to_lowercase();
    INTENT_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::GeneralSearch)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    MiningEntity,
    Mineral,
    DocumentType,
}

impl EntityKind {
    pub fn confidence(&self) -> f64 {
        match self {
            EntityKind::MiningEntity => 0.9,
            EntityKind::Mineral => 0.8,
            EntityKind::DocumentType => 0.7,
        }
    }
}

const MINERALS: &[&str] = &["coal", "iron ore", "stone", "gravel", "aggregate"];
const DOCUMENT_TYPES: &[&str] = &["contract", "report", "compliance", "royalty", "payment"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub confidence: f64,
}

impl DetectedEntity {
    fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self { name: name.into(), kind, confidence: kind.confidence() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedQuery {
    pub original: String,
    pub normalized: String,
    pub tokens: Vec<String>,
    pub entities: Vec<DetectedEntity>,
    pub intent: Intent,
    /// Tokens followed by their synonyms, deduplicated in first-seen order.
    pub expanded_terms: Vec<String>,
}

impl ProcessedQuery {
    pub fn is_original_token(&self, term: &str) -> bool {
        self.tokens.iter().any(|t| t == term)
    }
}

pub struct QueryProcessor<'a> {
    synonyms: &'a SynonymTable,
    entities: &'a EntityIndex,
}

impl<'a> QueryProcessor<'a> {
    pub fn new(synonyms: &'a SynonymTable, entities: &'a EntityIndex) -> Self {
        Self { synonyms, entities }
    }

    pub fn preprocess(&self, raw: &str) -> ProcessedQuery {
        let tokens = extract_words(raw);
        let mut expanded_terms: Vec<String> = Vec::new();
        for token in &tokens {
            let expansion = std::iter::once(token).chain(self.synonyms.expand(token));
            for term in expansion {
                if !expanded_terms.contains(term) {
                    expanded_terms.push(term.clone());
                }
            }
        }
        ProcessedQuery {
            original: raw.to_string(),
            normalized: raw.trim().to_lowercase(),
            tokens,
            entities: self.detect_entities(raw),
            intent: detect_intent(raw),
            expanded_terms,
        }
    }

    /// Substring detection of known entities, minerals and document-type words.
    /// Every hit is returned; there is no ranking among them.
    pub fn detect_entities(&self, raw: &str) -> Vec<DetectedEntity> {
        let lowered = raw.to_lowercase();
        let mut found = Vec::new();
        for (key, record) in self.entities.iter() {
            if lowered.contains(key) || lowered.contains(&record.name.to_lowercase()) {
                found.push(DetectedEntity::new(record.name.clone(), EntityKind::MiningEntity));
            }
        }
        for mineral in MINERALS.iter().filter(|m| lowered.contains(*m)) {
            found.push(DetectedEntity::new(*mineral, EntityKind::Mineral));
        }
        for doc_type in DOCUMENT_TYPES.iter().filter(|t| lowered.contains(*t)) {
            found.push(DetectedEntity::new(*doc_type, EntityKind::DocumentType));
        }
        found
    }
}
