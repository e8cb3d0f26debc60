//! Domain thesaurus for query expansion.
//!
//! Every term of a group expands to the whole group, itself included. A term listed in
//! several groups expands to the union of those groups, so the relation is symmetric but
//! not transitive.

use std::collections::HashMap;

/// Head term followed by its equivalents.
pub const DOMAIN_GROUPS: &[(&str, &[&str])] = &[
    // Mining operations
    ("mining", &["extraction", "excavation", "digging", "quarrying"]),
    ("production", &["output", "yield", "extraction rate", "harvest"]),
    ("reserves", &["deposits", "resources", "ore body", "mineral wealth"]),
    // Minerals
    ("coal", &["anthracite", "bituminous", "lignite", "carbon"]),
    ("iron ore", &["hematite", "magnetite", "iron", "ferrous ore"]),
    ("stone", &["aggregate", "crushed stone", "rock", "gravel"]),
    ("quarry", &["stone pit", "rock quarry", "aggregate pit"]),
    // Financial
    ("royalty", &["payment", "fee", "levy", "tribute", "revenue share"]),
    ("revenue", &["income", "earnings", "proceeds", "returns"]),
    ("profit", &["earnings", "net income", "surplus", "gain"]),
    ("expense", &["cost", "expenditure", "outlay", "spending"]),
    // Compliance
    ("compliance", &["conformity", "adherence", "observance", "following rules"]),
    ("violation", &["breach", "infringement", "non-compliance", "offense"]),
    ("regulation", &["rule", "law", "statute", "ordinance", "requirement"]),
    ("audit", &["inspection", "review", "examination", "assessment"]),
    // Environmental
    ("environmental", &["ecological", "green", "sustainability", "eco-friendly"]),
    ("pollution", &["contamination", "emission", "discharge", "waste"]),
    ("restoration", &["rehabilitation", "reclamation", "recovery", "renewal"]),
    // Legal
    ("contract", &["agreement", "deal", "arrangement", "pact"]),
    ("license", &["permit", "authorization", "approval", "certificate"]),
    ("legal", &["lawful", "legitimate", "statutory", "juridical"]),
];

#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    // term -> expansion in group order, deduplicated
    map: HashMap<String, Vec<String>>,
}

impl SynonymTable {
    pub fn new() -> Self { Self::default() }

    /// The mining/financial/legal/compliance thesaurus.
    pub fn domain() -> Self {
        let mut table = Self::new();
        for (head, synonyms) in DOMAIN_GROUPS {
            let group: Vec<&str> = std::iter::once(*head).chain(synonyms.iter().copied()).collect();
            table.add_group(&group);
        }
        table
    }

    pub fn add_group(&mut self, group: &[&str]) {
        let lowered: Vec<String> = group.iter().map(|t| t.to_lowercase()).collect();
        for term in &lowered {
            let expansion = self.map.entry(term.clone()).or_default();
            for synonym in &lowered {
                if !expansion.contains(synonym) {
                    expansion.push(synonym.clone());
                }
            }
        }
    }

    /// Expansion set for `token`; empty when the token is not in any group.
    pub fn expand(&self, token: &str) -> &[String] {
        self.map.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, token: &str) -> bool { self.map.contains_key(token) }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    pub fn clear(&mut self) { self.map.clear(); }
}
