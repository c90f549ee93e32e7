use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageResult {
    pub claim_amount: f64,
    pub coverage_limit: f64,
    pub covered_amount: f64,
    pub is_fully_covered: bool,
    pub shortfall: f64,
}

/// Covered amount and shortfall of a claim against a policy limit.
///
/// Missing, negative or non-finite inputs count as zero.
pub fn calculate_coverage(claim_amount: Option<f64>, coverage_limit: Option<f64>) -> CoverageResult {
    let claim_amount = sanitize(claim_amount);
    let coverage_limit = sanitize(coverage_limit);

    CoverageResult {
        claim_amount,
        coverage_limit,
        covered_amount: claim_amount.min(coverage_limit),
        is_fully_covered: claim_amount <= coverage_limit,
        shortfall: (claim_amount - coverage_limit).max(0.0),
    }
}

fn sanitize(amount: Option<f64>) -> f64 {
    amount.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_within_limit_is_fully_covered() {
        for (claim, limit) in [(0.0, 0.0), (500.0, 500.0), (8_000.0, 20_000.0)] {
            let result = calculate_coverage(Some(claim), Some(limit));
            assert!(result.is_fully_covered);
            assert_eq!(result.shortfall, 0.0);
            assert_eq!(result.covered_amount, claim);
        }
    }

    #[test]
    fn claim_over_limit_is_capped_at_limit() {
        for (claim, limit) in [(10_000.0, 7_500.0), (0.01, 0.0), (1e12, 25_000.0)] {
            let result = calculate_coverage(Some(claim), Some(limit));
            assert!(!result.is_fully_covered);
            assert_eq!(result.covered_amount, limit);
            assert_eq!(result.shortfall, claim - limit);
        }
    }

    #[test]
    fn missing_and_negative_inputs_count_as_zero() {
        let result = calculate_coverage(None, Some(-50.0));
        assert_eq!(result.claim_amount, 0.0);
        assert_eq!(result.coverage_limit, 0.0);
        assert!(result.is_fully_covered);

        let result = calculate_coverage(Some(1_200.0), None);
        assert_eq!(result.covered_amount, 0.0);
        assert_eq!(result.shortfall, 1_200.0);

        let result = calculate_coverage(Some(f64::NAN), Some(f64::INFINITY));
        assert_eq!(result.claim_amount, 0.0);
        assert_eq!(result.coverage_limit, 0.0);
    }
}
