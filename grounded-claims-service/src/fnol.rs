//! First Notice of Loss (FNOL) completeness check

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields a FNOL submission must carry, in reporting order
const REQUIRED_FIELDS: [(&str, &str); 6] = [
    ("hasIncident", "Incident/accident record"),
    ("relatesToPolicy", "Policy reference"),
    ("claimDate", "Claim date"),
    ("incidentDate", "Incident date"),
    ("claimType", "Claim type"),
    ("claimDescription", "Claim description"),
];

const MIN_DESCRIPTION_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FnolValidationResult {
    pub is_complete: bool,
    pub missing_fields: Vec<String>,
    pub validation_errors: Vec<String>,
    /// Percentage of required fields present
    pub completeness: f64,
    pub recommendations: Vec<String>,
}

pub fn validate_fnol(claim: &Map<String, Value>) -> FnolValidationResult {
    let mut missing_fields = Vec::new();
    let mut validation_errors = Vec::new();
    let mut recommendations = Vec::new();

    for (field, description) in REQUIRED_FIELDS {
        if !claim.contains_key(field) {
            missing_fields.push(field.to_string());
            validation_errors.push(format!(
                "FNOL ERROR: {description} is required for First Notice of Loss processing"
            ));
        }
    }

    if let Some(description) = claim.get("claimDescription").and_then(Value::as_str) {
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            validation_errors.push(format!(
                "FNOL ERROR: Detailed claim description (minimum {MIN_DESCRIPTION_CHARS} characters) is required for processing"
            ));
            recommendations.push("Please provide a more detailed description of the incident".to_string());
        }
    }

    if !claim.contains_key("hasIncident") {
        recommendations.push("Link this claim to the underlying incident/accident record".to_string());
    }
    if !claim.contains_key("relatesToPolicy") {
        recommendations
            .push("Verify and link the claim to the appropriate insurance policy".to_string());
    }

    let total = REQUIRED_FIELDS.len();
    let present = total - missing_fields.len();
    let completeness = present as f64 / total as f64 * 100.0;

    FnolValidationResult {
        is_complete: missing_fields.is_empty() && validation_errors.is_empty(),
        missing_fields,
        validation_errors,
        completeness,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claim(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn complete_submission_passes() {
        let result = validate_fnol(&claim(json!({
            "hasIncident": "autoins:incident_9",
            "relatesToPolicy": "autoins:policy_3",
            "claimDate": "2024-05-02",
            "incidentDate": "2024-05-01",
            "claimType": "Collision",
            "claimDescription": "Rear-ended at a junction while stationary"
        })));

        assert!(result.is_complete);
        assert_eq!(result.completeness, 100.0);
        assert!(result.missing_fields.is_empty());
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn missing_fields_are_reported_in_fixed_order() {
        let result = validate_fnol(&claim(json!({
            "claimType": "Theft",
            "claimDate": "2024-05-02"
        })));

        assert!(!result.is_complete);
        assert_eq!(
            result.missing_fields,
            vec!["hasIncident", "relatesToPolicy", "incidentDate", "claimDescription"]
        );
        assert_eq!(result.validation_errors.len(), 4);
        assert!((result.completeness - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            result.recommendations,
            vec![
                "Link this claim to the underlying incident/accident record",
                "Verify and link the claim to the appropriate insurance policy",
            ]
        );
    }

    #[test]
    fn short_description_is_an_error() {
        let result = validate_fnol(&claim(json!({
            "hasIncident": true,
            "relatesToPolicy": true,
            "claimDate": "2024-05-02",
            "incidentDate": "2024-05-01",
            "claimType": "Fire",
            "claimDescription": "fire"
        })));

        assert!(!result.is_complete);
        assert_eq!(result.completeness, 100.0);
        assert_eq!(result.validation_errors.len(), 1);
        assert_eq!(
            result.recommendations,
            vec!["Please provide a more detailed description of the incident"]
        );
    }
}
