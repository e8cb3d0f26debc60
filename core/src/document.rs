use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An indexable record. The shared base fields are interpreted by the engine;
/// everything type-specific lives in [`DocumentKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDocument", into = "RawDocument")]
pub struct Document {
    pub id: String,
    pub kind: DocumentKind,
    pub entity: Option<String>,
    pub content: String,
    pub title: Option<String>,
    pub status: Option<String>,
    pub period: Option<String>,
    pub created_at: Option<String>,
    /// Fields the engine does not interpret, kept so documents round-trip.
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentKind {
    RoyaltyRecord { mineral: Option<String>, amount: Option<f64>, quantity: Option<f64> },
    Contract {
        mineral: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
        value: Option<f64>,
        royalty_rate: Option<f64>,
    },
    ComplianceRecord {
        category: Option<String>,
        last_audit: Option<String>,
        score: Option<f64>,
        issues: Vec<String>,
    },
    DocumentFile,
    User { username: Option<String> },
    Report,
    Calculation { amount: Option<f64> },
    Other(String),
}

impl DocumentKind {
    /// The `type` tag, e.g. `royalty_record`.
    pub fn tag(&self) -> &str {
        match self {
            DocumentKind::RoyaltyRecord { .. } => "royalty_record",
            DocumentKind::Contract { .. } => "contract",
            DocumentKind::ComplianceRecord { .. } => "compliance_record",
            DocumentKind::DocumentFile => "document_file",
            DocumentKind::User { .. } => "user",
            DocumentKind::Report => "report",
            DocumentKind::Calculation { .. } => "calculation",
            DocumentKind::Other(tag) => tag,
        }
    }

    fn from_fields(tag: &str, fields: &mut Map<String, Value>) -> Self {
        match tag {
            "royalty_record" => DocumentKind::RoyaltyRecord {
                mineral: take_str(fields, "mineral"),
                amount: take_f64(fields, "amount"),
                quantity: take_f64(fields, "quantity"),
            },
            "contract" => DocumentKind::Contract {
                mineral: take_str(fields, "mineral"),
                start_date: take_str(fields, "startDate"),
                end_date: take_str(fields, "endDate"),
                value: take_f64(fields, "value"),
                royalty_rate: take_f64(fields, "royaltyRate"),
            },
            "compliance_record" => DocumentKind::ComplianceRecord {
                category: take_str(fields, "category"),
                last_audit: take_str(fields, "lastAudit"),
                score: take_f64(fields, "score"),
                issues: take_str_list(fields, "issues"),
            },
            "document_file" => DocumentKind::DocumentFile,
            "user" => DocumentKind::User { username: take_str(fields, "username") },
            "report" => DocumentKind::Report,
            "calculation" => DocumentKind::Calculation { amount: take_f64(fields, "amount") },
            other => DocumentKind::Other(other.to_string()),
        }
    }

    fn into_fields(self, fields: &mut Map<String, Value>) {
        match self {
            DocumentKind::RoyaltyRecord { mineral, amount, quantity } => {
                put(fields, "mineral", mineral.map(Value::from));
                put(fields, "amount", amount.map(Value::from));
                put(fields, "quantity", quantity.map(Value::from));
            }
            DocumentKind::Contract { mineral, start_date, end_date, value, royalty_rate } => {
                put(fields, "mineral", mineral.map(Value::from));
                put(fields, "startDate", start_date.map(Value::from));
                put(fields, "endDate", end_date.map(Value::from));
                put(fields, "value", value.map(Value::from));
                put(fields, "royaltyRate", royalty_rate.map(Value::from));
            }
            DocumentKind::ComplianceRecord { category, last_audit, score, issues } => {
                put(fields, "category", category.map(Value::from));
                put(fields, "lastAudit", last_audit.map(Value::from));
                put(fields, "score", score.map(Value::from));
                if !issues.is_empty() {
                    put(fields, "issues", Some(Value::from(issues)));
                }
            }
            DocumentKind::User { username } => put(fields, "username", username.map(Value::from)),
            DocumentKind::Calculation { amount } => put(fields, "amount", amount.map(Value::from)),
            DocumentKind::DocumentFile | DocumentKind::Report | DocumentKind::Other(_) => {}
        }
    }
}

impl Document {
    pub fn new(id: impl Into<String>, kind: DocumentKind, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            entity: None,
            content: content.into(),
            title: None,
            status: None,
            period: None,
            created_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn doc_type(&self) -> &str { self.kind.tag() }

    /// Date used by range filters: `period`, falling back to `created_at`.
    pub fn filter_date(&self) -> Option<&str> {
        self.period.as_deref().or(self.created_at.as_deref())
    }
}

/// Wire shape: a flat JSON object with a `type` tag, as fed by the dashboard.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    id: String,
    #[serde(rename = "type", default = "unknown_type")]
    doc_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entity: Option<String>,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

fn unknown_type() -> String { "unknown".to_string() }

impl From<RawDocument> for Document {
    fn from(mut raw: RawDocument) -> Self {
        let kind = DocumentKind::from_fields(&raw.doc_type, &mut raw.fields);
        Document {
            id: raw.id,
            kind,
            entity: raw.entity,
            content: raw.content,
            title: raw.title,
            status: raw.status,
            period: raw.period,
            created_at: raw.created_at,
            extra: raw.fields,
        }
    }
}

impl From<Document> for RawDocument {
    fn from(doc: Document) -> Self {
        let doc_type = doc.kind.tag().to_string();
        let mut fields = doc.extra;
        doc.kind.into_fields(&mut fields);
        RawDocument {
            id: doc.id,
            doc_type,
            entity: doc.entity,
            content: doc.content,
            title: doc.title,
            status: doc.status,
            period: doc.period,
            created_at: doc.created_at,
            fields,
        }
    }
}

// Typed fields are only taken out of the map when they have the expected shape;
// anything else stays in `extra`.
fn take_str(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(_)) => fields.remove(key).and_then(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}

fn take_f64(fields: &mut Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key) {
        Some(Value::Number(_)) => fields.remove(key).and_then(|v| v.as_f64()),
        _ => None,
    }
}

fn take_str_list(fields: &mut Map<String, Value>, key: &str) -> Vec<String> {
    let is_list = matches!(fields.get(key), Some(Value::Array(items)) if items.iter().all(Value::is_string));
    if !is_list { return Vec::new(); }
    match fields.remove(key) {
        Some(Value::Array(items)) => items.into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        _ => Vec::new(),
    }
}

fn put(fields: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = value { fields.insert(key.to_string(), v); }
}
