//! Static reasoning tables: severity amounts, reserve modifiers and fraud
//! weights.
//!
//! Tables are loaded once at startup, validated, and then shared read-only
//! behind an `Arc` by every calculator. An optional JSON file can override
//! the compiled-in defaults:
//!
//! ```json
//! {
//!   "severity": { "Collision": { "£0-5k": 1500, "£5k-10k": 2500 }, "Other": { ... } },
//!   "modifiers": { "fraudSignals": 0.1, "liabilityUncertain": 0.15, "partsBackorder": 0.05 },
//!   "fraudWeights": { "late_reporting": 0.3 }
//! }
//! ```
//!
//! A `severity` section replaces the default tables wholesale, `fraudWeights`
//! overrides individual weights.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;
use crate::tools::{
    AcvBand, FALLBACK_LOSS_TYPE, FraudIndicator, FraudWeights, ReserveModifiers, SeverityTables,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReasoningTables {
    pub severity: SeverityTables,
    pub modifiers: ReserveModifiers,
    pub fraud_weights: FraudWeights,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TablesFile {
    #[serde(default)]
    severity: Option<BTreeMap<String, BTreeMap<String, f64>>>,
    #[serde(default)]
    modifiers: Option<ReserveModifiers>,
    #[serde(default)]
    fraud_weights: BTreeMap<String, f64>,
}

impl ReasoningTables {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::TablesRead {
            path: path.display().to_string(),
            source,
        })?;
        let tables = Self::from_json(&raw)?;
        info!(path = %path.display(), "Loaded reasoning tables");
        Ok(tables)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let file: TablesFile = serde_json::from_str(raw)?;
        let mut tables = Self::default();

        if let Some(severity) = file.severity {
            let mut parsed = HashMap::with_capacity(severity.len());
            for (loss_type, bands) in severity {
                let mut table = HashMap::with_capacity(bands.len());
                for (label, amount) in bands {
                    let band = AcvBand::from_label(&label).ok_or_else(|| {
                        ConfigError::UnknownAcvBand {
                            loss_type: loss_type.clone(),
                            label: label.clone(),
                        }
                    })?;
                    table.insert(band, amount);
                }
                parsed.insert(loss_type, table);
            }
            tables.severity = SeverityTables::new(parsed);
        }

        if let Some(modifiers) = file.modifiers {
            tables.modifiers = modifiers;
        }

        for (name, weight) in file.fraud_weights {
            let indicator = FraudIndicator::from_factor_name(&name)
                .ok_or_else(|| ConfigError::UnknownFraudIndicator(name.clone()))?;
            tables.fraud_weights.set(indicator, weight);
        }

        tables.validate()?;
        Ok(tables)
    }

    /// Check the invariants the calculators rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fallback = self
            .severity
            .table(FALLBACK_LOSS_TYPE)
            .ok_or(ConfigError::MissingFallbackTable)?;
        if let Some(band) = AcvBand::ALL.into_iter().find(|b| !fallback.contains_key(b)) {
            return Err(ConfigError::IncompleteFallbackTable(band.label()));
        }

        for (name, fraction) in [
            ("fraudSignals", self.modifiers.fraud_signals),
            ("liabilityUncertain", self.modifiers.liability_uncertain),
            ("partsBackorder", self.modifiers.parts_backorder),
        ] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(ConfigError::InvalidModifier { name, fraction });
            }
        }

        // every flag raised must still leave the final reserve finite
        let headroom = 1.0
            + self.modifiers.fraud_signals
            + self.modifiers.liability_uncertain
            + self.modifiers.parts_backorder;

        for (loss_type, table) in self.severity.iter() {
            for (band, amount) in table {
                if *amount < 0.0 || !(amount * headroom).is_finite() {
                    return Err(ConfigError::InvalidAmount {
                        loss_type: loss_type.to_string(),
                        label: band.label(),
                        amount: *amount,
                    });
                }
            }
        }

        for indicator in FraudIndicator::ALL {
            let weight = self.fraud_weights.weight(indicator);
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::InvalidFraudWeight {
                    name: indicator.factor_name(),
                    weight,
                });
            }
        }

        Ok(())
    }
}
