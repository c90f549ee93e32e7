use crate::models::{FactProperty, FactReference, ToolKind, find_fact};

/// Prerequisites checked for every request
const CORE_FACTS: [(FactProperty, &str); 2] = [
    (FactProperty::ClaimType, "claim type"),
    (FactProperty::ClaimAmount, "claim amount"),
];

const COVERAGE_LIMIT: (FactProperty, &str) = (FactProperty::CoverageLimit, "policy coverage limit");

/// Human-readable names of prerequisite facts missing for the requested tools
pub fn find_missing(tools: &[ToolKind], facts: &[FactReference]) -> Vec<String> {
    let mut required: Vec<(FactProperty, &str)> = CORE_FACTS.to_vec();
    if tools.contains(&ToolKind::CoverageCalc) {
        required.push(COVERAGE_LIMIT);
    }

    required
        .into_iter()
        .filter(|(property, _)| find_fact(facts, *property).is_none())
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Single targeted question naming every missing item
pub fn follow_up_question(missing: &[String]) -> Option<String> {
    match missing {
        [] => None,
        [only] => Some(format!(
            "I need additional information to process your request. Could you please provide the {only}?"
        )),
        many => Some(format!(
            "I need additional information to process your request. Could you please provide the following: {}?",
            many.join(", ")
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(property: FactProperty) -> FactReference {
        FactReference {
            iri: format!("autoins:test#{property}"),
            value: "x".to_string(),
            property,
            source: "SPARQL_SELECT".to_string(),
            confidence: 1.0,
        }
    }

    #[test]
    fn core_facts_are_always_checked() {
        assert_eq!(
            find_missing(&[ToolKind::FraudScorer], &[]),
            vec!["claim type", "claim amount"]
        );
    }

    #[test]
    fn coverage_limit_only_checked_for_coverage() {
        let facts = vec![fact(FactProperty::ClaimType), fact(FactProperty::ClaimAmount)];
        assert!(find_missing(&[ToolKind::ReserveCalc], &facts).is_empty());
        assert_eq!(
            find_missing(&[ToolKind::CoverageCalc], &facts),
            vec!["policy coverage limit"]
        );
    }

    #[test]
    fn question_names_the_missing_items() {
        assert_eq!(follow_up_question(&[]), None);
        assert_eq!(
            follow_up_question(&["policy coverage limit".to_string()]).unwrap(),
            "I need additional information to process your request. \
             Could you please provide the policy coverage limit?"
        );
        assert_eq!(
            follow_up_question(&["claim type".to_string(), "claim amount".to_string()]).unwrap(),
            "I need additional information to process your request. \
             Could you please provide the following: claim type, claim amount?"
        );
    }
}
