//! Template-filled answers. Identical inputs always render identical text so
//! answers can be audited against their citations.

use std::fmt::Write as _;

use crate::models::{CalculationReference, CalculationResult, FactReference};

pub const PREAMBLE: &str =
    "Based on the facts retrieved from the knowledge graph and calculations performed:";

pub const CLOSING: &str = "This response is grounded in the insurance ontology graph and \
verified calculations. All facts and calculations are traceable to their sources as listed above.";

pub const VALIDATION_FAILED_ANSWER: &str =
    "Request validation failed. Please correct the errors and try again.";

pub fn synthesize(facts: &[FactReference], calculations: &[CalculationReference]) -> String {
    let mut answer = String::new();
    answer.push_str(PREAMBLE);
    answer.push_str("\n\n");

    if !facts.is_empty() {
        answer.push_str("**Facts Used:**\n");
        for fact in facts {
            let _ = writeln!(answer, "- {}: {} (IRI: {})", fact.property, fact.value, fact.iri);
        }
        answer.push('\n');
    }

    if !calculations.is_empty() {
        answer.push_str("**Calculations Performed:**\n");
        for calculation in calculations {
            let _ = writeln!(answer, "- {}", summarize(calculation));
        }
        answer.push('\n');
    }

    answer.push_str("**Analysis:**\n");
    answer.push_str(CLOSING);
    answer
}

fn summarize(calculation: &CalculationReference) -> String {
    match &calculation.result {
        CalculationResult::Reserve(result) => format!(
            "Reserve Calculation: {} (Band: {})",
            result.breakdown,
            result.reserve_band.label()
        ),
        CalculationResult::Fraud(result) => format!(
            "Fraud Assessment: {} risk (Score: {:.2})",
            result.risk_level, result.risk_score
        ),
        CalculationResult::Coverage(result) => format!(
            "Coverage Analysis: £{:.2} covered of £{:.2} claimed",
            result.covered_amount, result.claim_amount
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FactProperty, ToolKind};
    use crate::tables::ReasoningTables;
    use crate::tools::{ClaimData, FraudScorer, ReserveCalculator, calculate_coverage};
    use chrono::Utc;
    use serde_json::{Map, json};
    use std::sync::Arc;

    fn fact(property: FactProperty, value: &str, iri: &str) -> FactReference {
        FactReference {
            iri: iri.to_string(),
            value: value.to_string(),
            property,
            source: "SPARQL_SELECT".to_string(),
            confidence: 1.0,
        }
    }

    fn calculation(kind: ToolKind, result: CalculationResult) -> CalculationReference {
        CalculationReference {
            kind,
            input: json!({}),
            result,
            confidence: 1.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn renders_facts_and_calculations_in_order() {
        let tables = Arc::new(ReasoningTables::default());
        let reserve = ReserveCalculator::new(tables.clone()).calculate(&ClaimData {
            loss_type: "Collision".to_string(),
            ..Default::default()
        });
        let fraud = FraudScorer::new(tables).assess(&Map::new());

        let facts = vec![
            fact(FactProperty::ClaimType, "Collision", "autoins:claim_001#claimType"),
            fact(FactProperty::ClaimAmount, "8000", "autoins:claim_001#claimAmount"),
        ];
        let calculations = vec![
            calculation(ToolKind::ReserveCalc, CalculationResult::Reserve(reserve)),
            calculation(ToolKind::FraudScorer, CalculationResult::Fraud(fraud)),
            calculation(
                ToolKind::CoverageCalc,
                CalculationResult::Coverage(calculate_coverage(Some(8000.0), Some(5000.0))),
            ),
        ];

        let expected = format!(
            "{PREAMBLE}\n\n\
             **Facts Used:**\n\
             - autoins:claimType: Collision (IRI: autoins:claim_001#claimType)\n\
             - autoins:claimAmount: 8000 (IRI: autoins:claim_001#claimAmount)\n\n\
             **Calculations Performed:**\n\
             - Reserve Calculation: Base Reserve: £4000.00 = Final Reserve: £4000.00 (Band: £2k-5k)\n\
             - Fraud Assessment: MINIMAL risk (Score: 0.00)\n\
             - Coverage Analysis: £5000.00 covered of £8000.00 claimed\n\n\
             **Analysis:**\n{CLOSING}"
        );
        assert_eq!(synthesize(&facts, &calculations), expected);
    }

    #[test]
    fn empty_sections_are_omitted() {
        let answer = synthesize(&[], &[]);
        assert_eq!(answer, format!("{PREAMBLE}\n\n**Analysis:**\n{CLOSING}"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let facts = vec![fact(FactProperty::Make, "Ford", "autoins:vehicle_001#make")];
        assert_eq!(synthesize(&facts, &[]), synthesize(&facts, &[]));
    }
}
