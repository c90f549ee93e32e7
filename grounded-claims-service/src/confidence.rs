use crate::models::{CalculationReference, FactReference};

const FACT_WEIGHT: f64 = 0.6;
const CALCULATION_WEIGHT: f64 = 0.4;

/// Overall confidence of a grounded answer.
///
/// With no facts there is no evidence and the score is zero. A request that
/// ran no calculations is not penalized for it; missing prerequisites are
/// reported through the follow-up question instead.
pub fn aggregate(facts: &[FactReference], calculations: &[CalculationReference]) -> f64 {
    if facts.is_empty() {
        return 0.0;
    }

    let fact_confidence = mean(facts.iter().map(|f| f.confidence));
    let calc_confidence = if calculations.is_empty() {
        1.0
    } else {
        mean(calculations.iter().map(|c| c.confidence))
    };

    (FACT_WEIGHT * fact_confidence + CALCULATION_WEIGHT * calc_confidence).clamp(0.0, 1.0)
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let len = values.len();
    values.sum::<f64>() / len as f64
}
