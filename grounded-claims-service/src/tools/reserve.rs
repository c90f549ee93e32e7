//! Reserve estimation from loss-type severity tables.
//!
//! The base reserve comes from a per-loss-type table bucketed by vehicle
//! actual cash value (ACV). Risk flags add fixed fractions of that base and
//! the final figure is reported as a quantized reserve band. Input ACV bands
//! and output reserve bands are calibrated differently and must not be
//! merged.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::tables::ReasoningTables;

/// Loss type used when the requested one has no table
pub const FALLBACK_LOSS_TYPE: &str = "Other";

/// Vehicle value buckets used to look up the base reserve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcvBand {
    #[serde(rename = "£0-5k")]
    UpTo5k,
    #[serde(rename = "£5k-10k")]
    From5kTo10k,
    #[serde(rename = "£10k-25k")]
    From10kTo25k,
    #[serde(rename = "£25k-50k")]
    From25kTo50k,
    #[serde(rename = "£50k-100k")]
    From50kTo100k,
    #[serde(rename = "£100k+")]
    Over100k,
}

impl AcvBand {
    pub const ALL: [AcvBand; 6] = [
        AcvBand::UpTo5k,
        AcvBand::From5kTo10k,
        AcvBand::From10kTo25k,
        AcvBand::From25kTo50k,
        AcvBand::From50kTo100k,
        AcvBand::Over100k,
    ];

    /// Bucket used when the ACV cannot be bucketed
    pub const DEFAULT: AcvBand = AcvBand::From10kTo25k;

    pub fn label(self) -> &'static str {
        match self {
            AcvBand::UpTo5k => "£0-5k",
            AcvBand::From5kTo10k => "£5k-10k",
            AcvBand::From10kTo25k => "£10k-25k",
            AcvBand::From25kTo50k => "£25k-50k",
            AcvBand::From50kTo100k => "£50k-100k",
            AcvBand::Over100k => "£100k+",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.label() == label)
    }

    /// Bucket an ACV. `None` when the value is absent or NaN; negative values
    /// saturate into the lowest band.
    pub fn for_value(acv: Option<f64>) -> Option<Self> {
        let acv = acv.filter(|v| !v.is_nan())?;
        let band = if acv < 5_000.0 {
            AcvBand::UpTo5k
        } else if acv < 10_000.0 {
            AcvBand::From5kTo10k
        } else if acv < 25_000.0 {
            AcvBand::From10kTo25k
        } else if acv < 50_000.0 {
            AcvBand::From25kTo50k
        } else if acv < 100_000.0 {
            AcvBand::From50kTo100k
        } else {
            AcvBand::Over100k
        };
        Some(band)
    }
}

/// Output bands the final reserve is quantized into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReserveBand {
    #[serde(rename = "£0-2k")]
    Under2k,
    #[serde(rename = "£2k-5k")]
    From2kTo5k,
    #[serde(rename = "£5k-10k")]
    From5kTo10k,
    #[serde(rename = "£10k-25k")]
    From10kTo25k,
    #[serde(rename = "£25k-50k")]
    From25kTo50k,
    #[serde(rename = "£50k+")]
    Over50k,
}

impl ReserveBand {
    pub fn label(self) -> &'static str {
        match self {
            ReserveBand::Under2k => "£0-2k",
            ReserveBand::From2kTo5k => "£2k-5k",
            ReserveBand::From5kTo10k => "£5k-10k",
            ReserveBand::From10kTo25k => "£10k-25k",
            ReserveBand::From25kTo50k => "£25k-50k",
            ReserveBand::Over50k => "£50k+",
        }
    }

    pub fn quantize(amount: f64) -> Self {
        if amount < 2_000.0 {
            ReserveBand::Under2k
        } else if amount < 5_000.0 {
            ReserveBand::From2kTo5k
        } else if amount < 10_000.0 {
            ReserveBand::From5kTo10k
        } else if amount < 25_000.0 {
            ReserveBand::From10kTo25k
        } else if amount < 50_000.0 {
            ReserveBand::From25kTo50k
        } else {
            ReserveBand::Over50k
        }
    }
}

/// Base reserve amounts per loss type and ACV band
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityTables {
    tables: HashMap<String, HashMap<AcvBand, f64>>,
}

impl SeverityTables {
    pub fn new(tables: HashMap<String, HashMap<AcvBand, f64>>) -> Self {
        Self { tables }
    }

    pub fn table(&self, loss_type: &str) -> Option<&HashMap<AcvBand, f64>> {
        self.tables.get(loss_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashMap<AcvBand, f64>)> {
        self.tables.iter().map(|(loss_type, table)| (loss_type.as_str(), table))
    }

    /// Base amount for a loss type and (possibly unbucketable) ACV band
    pub fn base_amount(&self, loss_type: &str, band: Option<AcvBand>) -> f64 {
        let Some(table) = self
            .tables
            .get(loss_type)
            .or_else(|| self.tables.get(FALLBACK_LOSS_TYPE))
        else {
            return 0.0;
        };

        band.and_then(|band| table.get(&band))
            .or_else(|| table.get(&AcvBand::DEFAULT))
            .copied()
            .unwrap_or(0.0)
    }
}

impl Default for SeverityTables {
    fn default() -> Self {
        let rows: [(&str, [f64; 6]); 9] = [
            ("Collision", [1500.0, 2500.0, 4000.0, 6000.0, 8000.0, 12000.0]),
            ("Theft", [3000.0, 5000.0, 8000.0, 12000.0, 18000.0, 25000.0]),
            ("Vandalism", [800.0, 1200.0, 1800.0, 2500.0, 3500.0, 5000.0]),
            ("Fire", [2500.0, 4000.0, 6500.0, 10000.0, 15000.0, 22000.0]),
            ("Flood", [2000.0, 3500.0, 5500.0, 8500.0, 12000.0, 18000.0]),
            ("Glass Damage", [200.0, 300.0, 400.0, 600.0, 800.0, 1200.0]),
            ("Third Party", [5000.0, 7500.0, 12000.0, 18000.0, 25000.0, 35000.0]),
            ("Comprehensive", [1800.0, 2800.0, 4500.0, 7000.0, 10000.0, 15000.0]),
            (FALLBACK_LOSS_TYPE, [1000.0, 1500.0, 2500.0, 4000.0, 6000.0, 8000.0]),
        ];

        let tables = rows
            .into_iter()
            .map(|(loss_type, amounts)| {
                let table = AcvBand::ALL.into_iter().zip(amounts).collect();
                (loss_type.to_string(), table)
            })
            .collect();

        Self { tables }
    }
}

/// Fractions of the base reserve added per risk flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReserveModifiers {
    pub fraud_signals: f64,
    pub liability_uncertain: f64,
    pub parts_backorder: f64,
}

impl Default for ReserveModifiers {
    fn default() -> Self {
        Self {
            fraud_signals: 0.10,
            liability_uncertain: 0.15,
            parts_backorder: 0.05,
        }
    }
}

/// Input of the reserve calculator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimData {
    #[serde(default)]
    pub loss_type: String,
    /// Actual cash value of the vehicle; `None` when unknown
    #[serde(default, rename = "vehicleACV")]
    pub vehicle_acv: Option<f64>,
    #[serde(default)]
    pub has_fraud_signals: bool,
    #[serde(default)]
    pub liability_uncertain: bool,
    #[serde(default)]
    pub parts_backorder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveResult {
    pub base_reserve: f64,
    pub fraud_modifier: f64,
    pub liability_modifier: f64,
    pub parts_modifier: f64,
    pub final_reserve: f64,
    pub reserve_band: ReserveBand,
    pub breakdown: String,
}

/// Calculates reserves against the process-wide severity tables
#[derive(Debug, Clone)]
pub struct ReserveCalculator {
    tables: Arc<ReasoningTables>,
}

impl ReserveCalculator {
    pub fn new(tables: Arc<ReasoningTables>) -> Self {
        Self { tables }
    }

    pub fn calculate(&self, claim: &ClaimData) -> ReserveResult {
        let band = AcvBand::for_value(claim.vehicle_acv);
        let base = self.tables.severity.base_amount(&claim.loss_type, band);
        let modifiers = &self.tables.modifiers;

        let fraud_modifier = if claim.has_fraud_signals {
            modifiers.fraud_signals * base
        } else {
            0.0
        };
        let liability_modifier = if claim.liability_uncertain {
            modifiers.liability_uncertain * base
        } else {
            0.0
        };
        let parts_modifier = if claim.parts_backorder {
            modifiers.parts_backorder * base
        } else {
            0.0
        };

        let final_reserve = base + (fraud_modifier + liability_modifier + parts_modifier);
        let reserve_band = ReserveBand::quantize(final_reserve);
        let breakdown = breakdown(
            base,
            fraud_modifier,
            liability_modifier,
            parts_modifier,
            final_reserve,
        );

        ReserveResult {
            base_reserve: base,
            fraud_modifier,
            liability_modifier,
            parts_modifier,
            final_reserve,
            reserve_band,
            breakdown,
        }
    }
}

fn breakdown(base: f64, fraud: f64, liability: f64, parts: f64, final_reserve: f64) -> String {
    let mut out = format!("Base Reserve: £{base:.2}");
    for (label, amount) in [
        ("Fraud Risk", fraud),
        ("Liability Uncertainty", liability),
        ("Parts Backorder", parts),
    ] {
        if amount > 0.0 {
            let _ = write!(out, " + {label}: £{amount:.2}");
        }
    }
    let _ = write!(out, " = Final Reserve: £{final_reserve:.2}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> ReserveCalculator {
        ReserveCalculator::new(Arc::new(ReasoningTables::default()))
    }

    fn claim(loss_type: &str, acv: Option<f64>) -> ClaimData {
        ClaimData {
            loss_type: loss_type.to_string(),
            vehicle_acv: acv,
            ..Default::default()
        }
    }

    #[test]
    fn acv_bands_are_closed_below() {
        assert_eq!(AcvBand::for_value(Some(4_999.99)), Some(AcvBand::UpTo5k));
        assert_eq!(AcvBand::for_value(Some(5_000.0)), Some(AcvBand::From5kTo10k));
        assert_eq!(AcvBand::for_value(Some(25_000.0)), Some(AcvBand::From25kTo50k));
        assert_eq!(AcvBand::for_value(Some(100_000.0)), Some(AcvBand::Over100k));
        assert_eq!(AcvBand::for_value(Some(f64::INFINITY)), Some(AcvBand::Over100k));
        assert_eq!(AcvBand::for_value(Some(-10.0)), Some(AcvBand::UpTo5k));
        assert_eq!(AcvBand::for_value(Some(f64::NAN)), None);
        assert_eq!(AcvBand::for_value(None), None);
    }

    #[test]
    fn reserve_bands_differ_from_acv_bands() {
        assert_eq!(ReserveBand::quantize(1_999.0), ReserveBand::Under2k);
        assert_eq!(ReserveBand::quantize(2_000.0), ReserveBand::From2kTo5k);
        assert_eq!(ReserveBand::quantize(9_999.0), ReserveBand::From5kTo10k);
        assert_eq!(ReserveBand::quantize(49_999.0), ReserveBand::From25kTo50k);
        assert_eq!(ReserveBand::quantize(50_000.0), ReserveBand::Over50k);
        assert_eq!(ReserveBand::quantize(-1.0), ReserveBand::Under2k);
    }

    #[test]
    fn no_flags_means_final_equals_base() {
        let result = calculator().calculate(&claim("Theft", Some(30_000.0)));
        assert_eq!(result.base_reserve, 12_000.0);
        assert_eq!(result.final_reserve, result.base_reserve);
        assert_eq!(result.reserve_band, ReserveBand::From10kTo25k);
        assert_eq!(
            result.breakdown,
            "Base Reserve: £12000.00 = Final Reserve: £12000.00"
        );
        assert!(!result.breakdown.contains(" + "));
    }

    #[test]
    fn modifiers_sum_against_the_same_base() {
        let data = ClaimData {
            has_fraud_signals: true,
            liability_uncertain: true,
            parts_backorder: true,
            ..claim("Collision", Some(12_000.0))
        };
        let result = calculator().calculate(&data);

        assert_eq!(result.base_reserve, 4_000.0);
        assert!((result.fraud_modifier - 400.0).abs() < 1e-9);
        assert!((result.liability_modifier - 600.0).abs() < 1e-9);
        assert!((result.parts_modifier - 200.0).abs() < 1e-9);
        assert!((result.final_reserve - 5_200.0).abs() < 1e-9);
        assert_eq!(result.reserve_band, ReserveBand::From5kTo10k);
        assert_eq!(
            result.breakdown,
            "Base Reserve: £4000.00 + Fraud Risk: £400.00 + Liability Uncertainty: £600.00 \
             + Parts Backorder: £200.00 = Final Reserve: £5200.00"
        );
    }

    #[test]
    fn unknown_loss_type_uses_other_table() {
        let result = calculator().calculate(&claim("Meteor Strike", Some(7_500.0)));
        assert_eq!(result.base_reserve, 1_500.0);
    }

    #[test]
    fn missing_acv_uses_default_bucket() {
        let result = calculator().calculate(&claim("Collision", None));
        assert_eq!(result.base_reserve, 4_000.0);
    }

    #[test]
    fn missing_band_in_table_falls_back_to_default_bucket() {
        let mut tables = ReasoningTables::default();
        let partial: HashMap<AcvBand, f64> = [(AcvBand::From10kTo25k, 999.0)].into();
        let mut severity: HashMap<String, HashMap<AcvBand, f64>> = HashMap::new();
        severity.insert(FALLBACK_LOSS_TYPE.to_string(), partial);
        tables.severity = SeverityTables::new(severity);

        let result = ReserveCalculator::new(Arc::new(tables)).calculate(&claim("Fire", Some(1.0)));
        assert_eq!(result.base_reserve, 999.0);
    }

    #[test]
    fn calculation_is_idempotent() {
        let data = ClaimData {
            liability_uncertain: true,
            ..claim("Flood", Some(64_000.0))
        };
        let calc = calculator();
        let first = serde_json::to_vec(&calc.calculate(&data)).unwrap();
        let second = serde_json::to_vec(&calc.calculate(&data)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn enabling_a_flag_never_decreases_the_reserve() {
        let calc = calculator();
        for loss_type in ["Collision", "Theft", "Glass Damage", "Unknown"] {
            for acv in [None, Some(0.0), Some(9_000.0), Some(250_000.0)] {
                let base = claim(loss_type, acv);
                let plain = calc.calculate(&base).final_reserve;
                let flagged = [
                    ClaimData { has_fraud_signals: true, ..base.clone() },
                    ClaimData { liability_uncertain: true, ..base.clone() },
                    ClaimData { parts_backorder: true, ..base.clone() },
                ];
                for data in flagged {
                    assert!(calc.calculate(&data).final_reserve >= plain);
                }
            }
        }
    }

    #[test]
    fn claim_data_reads_camel_case_json() {
        let data: ClaimData = serde_json::from_str(
            r#"{"lossType":"Theft","vehicleACV":15000,"hasFraudSignals":true}"#,
        )
        .unwrap();
        assert_eq!(data.loss_type, "Theft");
        assert_eq!(data.vehicle_acv, Some(15_000.0));
        assert!(data.has_fraud_signals);
        assert!(!data.parts_backorder);
    }
}
