//! Fact store adapter.
//!
//! The pipeline only ever sees the [`FactStore`] trait. The bundled
//! [`ContextFactStore`] reads facts out of the request's own `graphContext`
//! snapshot; a graph-database backed store can implement the same trait.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::{FactProperty, FactReference};

/// Provenance tag for facts taken from the request context
pub const FACT_SOURCE: &str = "SPARQL_SELECT";

/// Confidence of facts taken verbatim from context
pub const CONTEXT_FACT_CONFIDENCE: f64 = 1.0;

/// Entity id used when a sub-document carries no `id`
const DEFAULT_ENTITY_ID: &str = "001";

struct FactDomain {
    key: &'static str,
    attributes: &'static [(&'static str, FactProperty)],
}

/// Scan order for fact extraction
const FACT_CATALOGUE: &[FactDomain] = &[
    FactDomain {
        key: "claim",
        attributes: &[
            ("claimType", FactProperty::ClaimType),
            ("claimAmount", FactProperty::ClaimAmount),
            ("claimDate", FactProperty::ClaimDate),
            ("incidentDate", FactProperty::IncidentDate),
        ],
    },
    FactDomain {
        key: "policy",
        attributes: &[
            ("coverageLimit", FactProperty::CoverageLimit),
            ("excess", FactProperty::Excess),
        ],
    },
    FactDomain {
        key: "vehicle",
        attributes: &[
            ("actualCashValue", FactProperty::ActualCashValue),
            ("make", FactProperty::Make),
            ("model", FactProperty::Model),
        ],
    },
];

/// Read-only source of facts for one request
#[async_trait]
pub trait FactStore: Send + Sync {
    async fn retrieve_facts(&self, graph_context: &Map<String, Value>) -> Vec<FactReference>;
}

/// Fact store over the in-memory request snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextFactStore;

#[async_trait]
impl FactStore for ContextFactStore {
    async fn retrieve_facts(&self, graph_context: &Map<String, Value>) -> Vec<FactReference> {
        extract_facts(graph_context)
    }
}

/// Emit one fact per recognized attribute present in the context, in
/// catalogue order.
pub fn extract_facts(graph_context: &Map<String, Value>) -> Vec<FactReference> {
    let mut facts = Vec::new();

    for domain in FACT_CATALOGUE {
        let Some(section) = graph_context.get(domain.key).and_then(Value::as_object) else {
            continue;
        };
        let entity = entity_iri(domain.key, section);

        for (attribute, property) in domain.attributes {
            let Some(value) = section.get(*attribute).and_then(render_value) else {
                continue;
            };
            facts.push(FactReference {
                iri: format!("{entity}#{attribute}"),
                value,
                property: *property,
                source: FACT_SOURCE.to_string(),
                confidence: CONTEXT_FACT_CONFIDENCE,
            });
        }
    }

    debug!(fact_count = facts.len(), "extracted facts from context");
    facts
}

/// Retrieve facts, treating a store that does not answer in time as having
/// found nothing
pub async fn retrieve_with_timeout(
    store: &dyn FactStore,
    graph_context: &Map<String, Value>,
    timeout: Duration,
) -> Vec<FactReference> {
    match tokio::time::timeout(timeout, store.retrieve_facts(graph_context)).await {
        Ok(facts) => facts,
        Err(_) => {
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Fact store timed out, continuing without facts"
            );
            Vec::new()
        }
    }
}

fn entity_iri(domain: &str, section: &Map<String, Value>) -> String {
    let id = match section.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Number(id)) => id.to_string(),
        _ => DEFAULT_ENTITY_ID.to_string(),
    };
    format!("autoins:{domain}_{id}")
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
