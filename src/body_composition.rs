//! Body composition resolution
//!
//! This module derives reference weights from the canonical input:
//! - Dry weight (fluid-retention allowances removed)
//! - Percent weight loss and its severity
//! - Ideal body weight (simple and Devine-style) with deviation
//! - Adjusted body weight and the IBW/ABW selection rule
//!
//! All weights are floored at 0 and every ratio is guarded against a zero
//! or missing denominator.

use crate::types::{
    AssessmentInput, BodyComposition, ChangeDuration, Gender, IdealWeightEstimate,
    ReferenceWeight, WeightLossSeverity,
};
use crate::units::finite_or_zero;

/// Deviation above IBW up to which IBW remains the prescribing weight (%)
pub const IBW_DEVIATION_LIMIT_PCT: f64 = 30.0;

/// Weekly weight-loss thresholds (%): above the first is moderate, above the second severe
const WEEKLY_MODERATE_LOSS_PCT: f64 = 1.0;
const WEEKLY_SEVERE_LOSS_PCT: f64 = 2.0;

/// Resolver for computing body composition figures
pub struct BodyCompositionResolver;

impl BodyCompositionResolver {
    /// Resolve body composition from canonical input
    pub fn resolve(input: &AssessmentInput) -> BodyComposition {
        let dry_weight_kg = dry_weight(
            input.current_weight_kg,
            input.ascites_offset_kg,
            input.edema_offset_kg,
        );

        let weight_loss_pct = if input.current_weight_kg > 0.0 {
            weight_loss_pct(input.usual_weight_kg, dry_weight_kg)
        } else {
            0.0
        };
        let weight_loss_severity = weight_loss_severity(weight_loss_pct, input.change_duration);

        let simple = if input.height_cm > 0.0 {
            ideal_weight_estimate(
                dry_weight_kg,
                simple_ibw(input.height_cm),
                input.gender,
            )
        } else {
            IdealWeightEstimate::default()
        };

        let accurate = match input.gender {
            Some(gender) if input.height_cm > 0.0 => ideal_weight_estimate(
                dry_weight_kg,
                accurate_ibw(input.height_cm, gender),
                Some(gender),
            ),
            _ => IdealWeightEstimate::default(),
        };

        BodyComposition {
            dry_weight_kg,
            weight_loss_pct,
            weight_loss_severity,
            simple,
            accurate,
        }
    }
}

/// Measured weight less ascites and edema allowances, floored at 0
pub fn dry_weight(current_weight_kg: f64, ascites_offset_kg: f64, edema_offset_kg: f64) -> f64 {
    finite_or_zero(current_weight_kg - ascites_offset_kg - edema_offset_kg).max(0.0)
}

/// Loss from usual weight as a percentage of usual weight, floored at 0.
/// Returns 0 when no usual weight is recorded.
pub fn weight_loss_pct(usual_weight_kg: f64, weight_kg: f64) -> f64 {
    if usual_weight_kg <= 0.0 {
        return 0.0;
    }
    finite_or_zero((usual_weight_kg - weight_kg) * 100.0 / usual_weight_kg).max(0.0)
}

/// Classify weight loss against the change period.
///
/// A one-week change uses fixed 1% / 2% thresholds. Every other period uses its
/// own code as the threshold: below is no loss, exactly equal is moderate,
/// above is severe.
pub fn weight_loss_severity(
    loss_pct: f64,
    duration: Option<ChangeDuration>,
) -> WeightLossSeverity {
    match duration {
        None => WeightLossSeverity::None,
        Some(ChangeDuration::Week) => {
            if loss_pct > WEEKLY_SEVERE_LOSS_PCT {
                WeightLossSeverity::Severe
            } else if loss_pct > WEEKLY_MODERATE_LOSS_PCT {
                WeightLossSeverity::Moderate
            } else {
                WeightLossSeverity::None
            }
        }
        Some(other) => {
            let threshold = other.code();
            if loss_pct > threshold {
                WeightLossSeverity::Severe
            } else if loss_pct == threshold {
                WeightLossSeverity::Moderate
            } else {
                WeightLossSeverity::None
            }
        }
    }
}

/// IBW = height - 100, floored at 0
pub fn simple_ibw(height_cm: f64) -> f64 {
    finite_or_zero(height_cm - 100.0).max(0.0)
}

/// Devine-style IBW: 50 kg (male) or 45.5 kg (female) plus 0.9 kg per cm over 154 cm
pub fn accurate_ibw(height_cm: f64, gender: Gender) -> f64 {
    let base = match gender {
        Gender::Male => 50.0,
        Gender::Female => 45.5,
    };
    finite_or_zero((height_cm - 154.0) * 0.9 + base).max(0.0)
}

/// Percent of current weight above IBW, floored at 0; `None` without a weight
pub fn ibw_deviation_pct(weight_kg: f64, ibw_kg: f64) -> Option<f64> {
    if weight_kg <= 0.0 {
        return None;
    }
    Some(finite_or_zero((weight_kg - ibw_kg) * 100.0 / weight_kg).max(0.0))
}

/// ABW = (weight - IBW) x multiplier + IBW, floored at 0
pub fn adjusted_body_weight(weight_kg: f64, ibw_kg: f64, gender: Gender) -> f64 {
    let multiplier = match gender {
        Gender::Male => 0.38,
        Gender::Female => 0.32,
    };
    finite_or_zero((weight_kg - ibw_kg) * multiplier + ibw_kg).max(0.0)
}

/// IBW while the deviation stays within the limit, ABW beyond it
pub fn reference_weight(deviation_pct: f64) -> ReferenceWeight {
    if deviation_pct <= IBW_DEVIATION_LIMIT_PCT {
        ReferenceWeight::UseIbw
    } else {
        ReferenceWeight::UseAbw
    }
}

fn ideal_weight_estimate(
    weight_kg: f64,
    ibw_kg: f64,
    gender: Option<Gender>,
) -> IdealWeightEstimate {
    let deviation_pct = ibw_deviation_pct(weight_kg, ibw_kg);
    let abw_kg = match gender {
        Some(gender) if weight_kg > 0.0 => adjusted_body_weight(weight_kg, ibw_kg, gender),
        _ => 0.0,
    };

    IdealWeightEstimate {
        ibw_kg,
        deviation_pct,
        abw_kg,
        reference: deviation_pct.map(reference_weight),
    }
}
