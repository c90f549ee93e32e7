//! Weighted fraud-risk scoring over a fixed indicator table

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::tables::ReasoningTables;

/// Fraud indicators in scoring order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FraudIndicator {
    LateReporting,
    MultipleClaims,
    HighValueClaim,
    InconsistentStory,
    NoPoliceReport,
}

impl FraudIndicator {
    pub const ALL: [FraudIndicator; 5] = [
        FraudIndicator::LateReporting,
        FraudIndicator::MultipleClaims,
        FraudIndicator::HighValueClaim,
        FraudIndicator::InconsistentStory,
        FraudIndicator::NoPoliceReport,
    ];

    /// Name reported in `factors` and used for weight overrides
    pub fn factor_name(self) -> &'static str {
        match self {
            FraudIndicator::LateReporting => "late_reporting",
            FraudIndicator::MultipleClaims => "multiple_claims",
            FraudIndicator::HighValueClaim => "high_value_claim",
            FraudIndicator::InconsistentStory => "inconsistent_story",
            FraudIndicator::NoPoliceReport => "no_police_report",
        }
    }

    /// Key looked up in the incoming indicator map
    pub fn input_key(self) -> &'static str {
        match self {
            FraudIndicator::LateReporting => "late_reporting",
            FraudIndicator::MultipleClaims => "multiple_recent_claims",
            FraudIndicator::HighValueClaim => "high_value_for_type",
            FraudIndicator::InconsistentStory => "story_inconsistencies",
            FraudIndicator::NoPoliceReport => "missing_police_report",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FraudIndicator::LateReporting => "Late claim reporting (>7 days)",
            FraudIndicator::MultipleClaims => "Multiple recent claims",
            FraudIndicator::HighValueClaim => "Unusually high claim value",
            FraudIndicator::InconsistentStory => "Inconsistent incident description",
            FraudIndicator::NoPoliceReport => "No police report for significant incident",
        }
    }

    pub fn default_weight(self) -> f64 {
        match self {
            FraudIndicator::LateReporting => 0.3,
            FraudIndicator::MultipleClaims => 0.4,
            FraudIndicator::HighValueClaim => 0.25,
            FraudIndicator::InconsistentStory => 0.5,
            FraudIndicator::NoPoliceReport => 0.2,
        }
    }

    pub fn from_factor_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.factor_name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Weight per indicator, indexed in [`FraudIndicator::ALL`] order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FraudWeights {
    weights: [f64; FraudIndicator::ALL.len()],
}

impl FraudWeights {
    pub fn weight(&self, indicator: FraudIndicator) -> f64 {
        self.weights[indicator.index()]
    }

    pub fn set(&mut self, indicator: FraudIndicator, weight: f64) {
        self.weights[indicator.index()] = weight;
    }
}

impl Default for FraudWeights {
    fn default() -> Self {
        Self {
            weights: FraudIndicator::ALL.map(FraudIndicator::default_weight),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Thresholds are closed below
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskLevel::High
        } else if score >= 0.5 {
            RiskLevel::Medium
        } else if score >= 0.2 {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Minimal => "MINIMAL",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            RiskLevel::High => {
                "IMMEDIATE INVESTIGATION REQUIRED - Refer to Special Investigation Unit (SIU)"
            }
            RiskLevel::Medium => {
                "ENHANCED REVIEW - Additional documentation and verification required"
            }
            RiskLevel::Low => "STANDARD PROCESSING - Monitor for additional indicators",
            RiskLevel::Minimal => "NORMAL PROCESSING - No additional fraud concerns identified",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudAssessment {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub indicators: Vec<String>,
    pub factors: BTreeMap<String, f64>,
    pub recommendation: String,
}

/// Scores indicator maps against the process-wide fraud weights
#[derive(Debug, Clone)]
pub struct FraudScorer {
    tables: Arc<ReasoningTables>,
}

impl FraudScorer {
    pub fn new(tables: Arc<ReasoningTables>) -> Self {
        Self { tables }
    }

    /// Score the indicators set to `true` in `input`; other keys and
    /// non-boolean values are ignored.
    pub fn assess(&self, input: &Map<String, Value>) -> FraudAssessment {
        let mut total = 0.0;
        let mut indicators = Vec::new();
        let mut factors = BTreeMap::new();

        for indicator in FraudIndicator::ALL {
            let present = input
                .get(indicator.input_key())
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !present {
                continue;
            }

            let weight = self.tables.fraud_weights.weight(indicator);
            total += weight;
            factors.insert(indicator.factor_name().to_string(), weight);
            indicators.push(indicator.description().to_string());
        }

        // classify the rounded score so boundary sums like 0.1 + 0.7 land on 0.8
        let risk_score = (total * 100.0).round() / 100.0;
        let risk_level = RiskLevel::from_score(risk_score);

        FraudAssessment {
            risk_score,
            risk_level,
            indicators,
            factors,
            recommendation: risk_level.recommendation().to_string(),
        }
    }
}
