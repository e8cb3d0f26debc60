//! Event plumbing between the engine and the application shell.
//!
//! The shell emits [`InboundEvent`]s; an initialized engine holds a receiver and drains
//! it before every search. The engine publishes [`EngineEvent`]s to any subscriber.
//! Sends never block and an event with no receivers is dropped.

use crate::analytics::SearchRecord;
use crate::suggest::Suggestions;
use crate::Document;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Result of a royalty calculation elsewhere in the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyaltyCalculation {
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "detail", rename_all = "camelCase")]
pub enum InboundEvent {
    DocumentUploaded(Document),
    RoyaltyCalculated(RoyaltyCalculation),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "detail", rename_all = "camelCase")]
pub enum EngineEvent {
    #[serde(rename_all = "camelCase")]
    SemanticSearchCompleted { search_record: SearchRecord, suggestions: Suggestions },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    inbound: broadcast::Sender<InboundEvent>,
    outbound: broadcast::Sender<EngineEvent>,
}

impl Default for EventBus {
    fn default() -> Self { Self::new(64) }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (inbound, _) = broadcast::channel(capacity);
        let (outbound, _) = broadcast::channel(capacity);
        Self { inbound, outbound }
    }

    /// Send an event to attached engines. Returns how many receivers will see it.
    pub fn emit(&self, event: InboundEvent) -> usize {
        self.inbound.send(event).unwrap_or(0)
    }

    /// Receive engine events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> { self.outbound.subscribe() }

    pub(crate) fn attach(&self) -> broadcast::Receiver<InboundEvent> { self.inbound.subscribe() }

    pub(crate) fn publish(&self, event: EngineEvent) -> usize {
        self.outbound.send(event).unwrap_or(0)
    }
}
