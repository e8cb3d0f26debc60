use crate::error::{Error, Result};
use crate::retrieval::Candidate;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Optional post-merge filters. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Inclusive lower bound on `period`, or `createdAt` when there is no period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.doc_type.is_none()
            && self.entity.is_none()
            && self.status.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    /// Keep the candidates that pass every set filter. A date bound that does not parse
    /// is an error; a document date that does not parse excludes the document.
    pub fn apply(&self, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        let from = parse_bound("dateFrom", self.date_from.as_deref())?;
        let to = parse_bound("dateTo", self.date_to.as_deref())?;
        Ok(candidates
            .into_iter()
            .filter(|c| self.doc_type.as_ref().map_or(true, |t| &c.doc_type == t))
            .filter(|c| self.entity.as_ref().map_or(true, |e| c.document.entity.as_ref() == Some(e)))
            .filter(|c| within(c, from, to))
            .filter(|c| self.status.as_ref().map_or(true, |s| c.document.status.as_ref() == Some(s)))
            .collect())
    }
}

fn within(c: &Candidate, from: Option<OffsetDateTime>, to: Option<OffsetDateTime>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(date) = c.document.filter_date().and_then(parse_date) else { return false };
    from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
}

fn parse_bound(field: &'static str, value: Option<&str>) -> Result<Option<OffsetDateTime>> {
    match value {
        None => Ok(None),
        Some(v) => parse_date(v)
            .map(Some)
            .ok_or_else(|| Error::InvalidFilter { field, value: v.to_string() }),
    }
}

/// Accepts `YYYY-MM`, `YYYY-MM-DD` or RFC 3339. Date-only forms mean midnight UTC.
pub fn parse_date(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(ts) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(ts);
    }
    let day = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(value, &day) {
        return Some(date.midnight().assume_utc());
    }
    Date::parse(&format!("{value}-01"), &day)
        .ok()
        .map(|date| date.midnight().assume_utc())
}
