//! Deterministic calculation tools and their dispatch table

pub mod coverage;
pub mod fraud;
pub mod reserve;

pub use coverage::{CoverageResult, calculate_coverage};
pub use fraud::{FraudAssessment, FraudIndicator, FraudScorer, FraudWeights, RiskLevel};
pub use reserve::{
    AcvBand, ClaimData, FALLBACK_LOSS_TYPE, ReserveBand, ReserveCalculator, ReserveModifiers,
    ReserveResult, SeverityTables,
};

use chrono::Utc;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::models::{
    CalculationReference, CalculationResult, FactProperty, FactReference, GroundedRequest,
    ToolKind, find_fact,
};
use crate::tables::ReasoningTables;

/// Everything a tool may read: retrieved facts plus the raw request context
pub struct ToolInputs<'a> {
    pub facts: &'a [FactReference],
    pub request: &'a GroundedRequest,
}

type ToolHandler = fn(&Calculators, &ToolInputs<'_>) -> CalculationReference;

/// Calculation tools and the handler that runs each. `SPARQL_SELECT` has no
/// entry: fact retrieval runs for every request.
const TOOL_HANDLERS: [(ToolKind, ToolHandler); 3] = [
    (ToolKind::ReserveCalc, run_reserve),
    (ToolKind::FraudScorer, run_fraud),
    (ToolKind::CoverageCalc, run_coverage),
];

/// Confidence attached to each tool's result
pub fn calculation_confidence(tool: ToolKind) -> f64 {
    match tool {
        ToolKind::ReserveCalc => 0.95,
        ToolKind::FraudScorer => 0.85,
        ToolKind::CoverageCalc | ToolKind::SparqlSelect => 1.0,
    }
}

fn handler_for(tool: ToolKind) -> Option<ToolHandler> {
    TOOL_HANDLERS
        .iter()
        .find(|(kind, _)| *kind == tool)
        .map(|(_, handler)| *handler)
}

/// Calculators bound to the process-wide tables
#[derive(Debug, Clone)]
pub struct Calculators {
    pub reserve: ReserveCalculator,
    pub fraud: FraudScorer,
}

impl Calculators {
    pub fn new(tables: Arc<ReasoningTables>) -> Self {
        Self {
            reserve: ReserveCalculator::new(tables.clone()),
            fraud: FraudScorer::new(tables),
        }
    }

    /// Run every requested calculation tool in request order
    pub fn dispatch(&self, tools: &[ToolKind], inputs: &ToolInputs<'_>) -> Vec<CalculationReference> {
        tools
            .iter()
            .filter_map(|tool| {
                let handler = handler_for(*tool)?;
                debug!(tool = %tool, "running calculation tool");
                Some(handler(self, inputs))
            })
            .collect()
    }
}

fn reference(kind: ToolKind, input: Value, result: CalculationResult) -> CalculationReference {
    CalculationReference {
        kind,
        input,
        result,
        confidence: calculation_confidence(kind),
        timestamp: Utc::now(),
    }
}

fn run_reserve(calculators: &Calculators, inputs: &ToolInputs<'_>) -> CalculationReference {
    let claim = reserve_claim_data(inputs);
    let input = json!({
        "lossType": claim.loss_type,
        "vehicleACV": claim.vehicle_acv,
        "hasFraudSignals": claim.has_fraud_signals,
        "liabilityUncertain": claim.liability_uncertain,
        "partsBackorder": claim.parts_backorder,
    });
    let result = calculators.reserve.calculate(&claim);
    reference(ToolKind::ReserveCalc, input, CalculationResult::Reserve(result))
}

fn run_fraud(calculators: &Calculators, inputs: &ToolInputs<'_>) -> CalculationReference {
    let indicators = inputs
        .request
        .context_section("fraudIndicators")
        .cloned()
        .unwrap_or_default();
    let assessment = calculators.fraud.assess(&indicators);
    reference(
        ToolKind::FraudScorer,
        Value::Object(indicators),
        CalculationResult::Fraud(assessment),
    )
}

fn run_coverage(_calculators: &Calculators, inputs: &ToolInputs<'_>) -> CalculationReference {
    let claim_amount = numeric_fact(inputs.facts, FactProperty::ClaimAmount);
    let coverage_limit = numeric_fact(inputs.facts, FactProperty::CoverageLimit);
    let result = calculate_coverage(claim_amount, coverage_limit);
    let input = json!({
        "claimAmount": result.claim_amount,
        "coverageLimit": result.coverage_limit,
    });
    reference(ToolKind::CoverageCalc, input, CalculationResult::Coverage(result))
}

/// Reserve input: loss type from the claim-type fact, ACV and risk flags
/// straight from the request context
fn reserve_claim_data(inputs: &ToolInputs<'_>) -> ClaimData {
    let loss_type = find_fact(inputs.facts, FactProperty::ClaimType)
        .map(|fact| fact.value.clone())
        .unwrap_or_default();

    let vehicle_acv = inputs
        .request
        .context_section("vehicle")
        .and_then(|vehicle| vehicle.get("actualCashValue"))
        .and_then(number_from_value);

    let flags = inputs.request.context_section("fraudIndicators");
    let flag = |key: &str| bool_flag(flags, key);

    ClaimData {
        loss_type,
        vehicle_acv,
        has_fraud_signals: flag("hasFraudSignals"),
        liability_uncertain: flag("liabilityUncertain"),
        parts_backorder: flag("partsBackorder"),
    }
}

fn numeric_fact(facts: &[FactReference], property: FactProperty) -> Option<f64> {
    find_fact(facts, property).and_then(FactReference::numeric_value)
}

/// Numbers, or strings holding a number
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bool_flag(section: Option<&Map<String, Value>>, key: &str) -> bool {
    section
        .and_then(|map| map.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
