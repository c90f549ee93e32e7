use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::tools::{CoverageResult, FraudAssessment, ReserveResult};

/// Tools a grounded request may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolKind {
    SparqlSelect,
    CoverageCalc,
    ReserveCalc,
    FraudScorer,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::SparqlSelect,
        ToolKind::CoverageCalc,
        ToolKind::ReserveCalc,
        ToolKind::FraudScorer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::SparqlSelect => "SPARQL_SELECT",
            ToolKind::CoverageCalc => "COVERAGE_CALC",
            ToolKind::ReserveCalc => "RESERVE_CALC",
            ToolKind::FraudScorer => "FRAUD_SCORER",
        }
    }

    /// Exact, case-sensitive match against the wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    /// Parse the requested tool names, dropping unknown names and repeats
    pub fn parse_all(names: &[String]) -> Vec<ToolKind> {
        let mut tools = Vec::with_capacity(names.len());
        for tool in names.iter().filter_map(|name| Self::from_name(name)) {
            if !tools.contains(&tool) {
                tools.push(tool);
            }
        }
        tools
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incoming grounded-query request.
///
/// Absent and `null` fields decode to their defaults, and non-string tool
/// entries are kept as their JSON text, so that a structurally incomplete body
/// reaches the validator and is reported there instead of being rejected by
/// the decoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundedRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_query: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub graph_context: Map<String, Value>,
    #[serde(default, deserialize_with = "tool_names")]
    pub required_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Tool names as sent; a non-string entry such as `7` becomes `"7"` and is
/// later reported as an unknown tool
fn tool_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(names
        .into_iter()
        .map(|name| match name {
            Value::String(name) => name,
            other => other.to_string(),
        })
        .collect())
}

impl GroundedRequest {
    /// Attribute mapping stored under a top-level context key, if it is an object
    pub fn context_section(&self, key: &str) -> Option<&Map<String, Value>> {
        self.graph_context.get(key).and_then(Value::as_object)
    }
}

/// Graph properties a fact can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactProperty {
    #[serde(rename = "autoins:claimType")]
    ClaimType,
    #[serde(rename = "autoins:claimAmount")]
    ClaimAmount,
    #[serde(rename = "autoins:claimDate")]
    ClaimDate,
    #[serde(rename = "autoins:incidentDate")]
    IncidentDate,
    #[serde(rename = "autoins:coverageLimit")]
    CoverageLimit,
    #[serde(rename = "autoins:excess")]
    Excess,
    #[serde(rename = "autoins:actualCashValue")]
    ActualCashValue,
    #[serde(rename = "autoins:make")]
    Make,
    #[serde(rename = "autoins:model")]
    Model,
}

impl FactProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            FactProperty::ClaimType => "autoins:claimType",
            FactProperty::ClaimAmount => "autoins:claimAmount",
            FactProperty::ClaimDate => "autoins:claimDate",
            FactProperty::IncidentDate => "autoins:incidentDate",
            FactProperty::CoverageLimit => "autoins:coverageLimit",
            FactProperty::Excess => "autoins:excess",
            FactProperty::ActualCashValue => "autoins:actualCashValue",
            FactProperty::Make => "autoins:make",
            FactProperty::Model => "autoins:model",
        }
    }
}

impl fmt::Display for FactProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single fact retrieved from the request context, citable in the answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactReference {
    pub iri: String,
    pub value: String,
    pub property: FactProperty,
    pub source: String,
    pub confidence: f64,
}

impl FactReference {
    /// Numeric reading of the value, if it parses as a number
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok()
    }
}

/// Find the first fact carrying `property`
pub fn find_fact(facts: &[FactReference], property: FactProperty) -> Option<&FactReference> {
    facts.iter().find(|fact| fact.property == property)
}

/// Typed result of a calculation tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalculationResult {
    Reserve(ReserveResult),
    Fraud(FraudAssessment),
    Coverage(CoverageResult),
}

/// Record of one calculation tool run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationReference {
    #[serde(rename = "type")]
    pub kind: ToolKind,
    pub input: Value,
    pub result: CalculationResult,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: String,
    pub message: String,
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationError {
    pub fn error(code: &str, message: impl Into<String>, field: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: "ERROR".to_string(),
            field: Some(field.to_string()),
        }
    }
}

/// Response of the grounded pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundedResponse {
    pub answer: String,
    pub facts_used: Vec<FactReference>,
    pub calculations_performed: Vec<CalculationReference>,
    pub follow_up_needed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_question: Option<String>,
    pub confidence_level: f64,
    /// Wall-clock processing time in nanoseconds
    pub processing_time: u64,
    pub validation_errors: Vec<ValidationError>,
}
