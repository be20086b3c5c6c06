//! Weight-based calorie estimates
//!
//! Flat kcal/kg cross-checks for the BMR-based targets. Each method is
//! reported on its own; disagreement between them is left to the clinician.

use crate::types::{
    ActivityCalorieEstimate, AssessmentInput, BodyComposition, CalorieEstimates, Classification,
    StatusCalorieEstimate, WeightStatus,
};
use crate::units::finite_or_zero;

/// kcal/kg by weight status across sedentary / moderate / heavy activity
pub fn status_rates(status: WeightStatus) -> [f64; 3] {
    match status {
        WeightStatus::Underweight => [35.0, 40.0, 45.0],
        WeightStatus::Normal => [30.0, 35.0, 40.0],
        WeightStatus::Overweight => [20.0, 30.0, 35.0],
    }
}

/// kcal/kg for sedentary / moderate / moderate-high / active
pub const ACTIVITY_RATES: [f64; 4] = [25.0, 30.0, 35.0, 40.0];

/// Estimator for the weight-based calorie methods
pub struct WeightBasedCalorieEstimator;

impl WeightBasedCalorieEstimator {
    /// Run every method. The weight status comes from the selected-weight BMI category.
    pub fn estimate(
        input: &AssessmentInput,
        body: &BodyComposition,
        classification: &Classification,
    ) -> CalorieEstimates {
        let status_estimate = classification.bmi_selected.category.and_then(|category| {
            by_weight_status(input.selected_weight_kg, category.weight_status())
        });

        CalorieEstimates {
            by_weight_status: status_estimate,
            by_activity_actual: by_activity(body.dry_weight_kg),
            by_activity_selected: by_activity(input.selected_weight_kg),
        }
    }
}

/// Weight-status method; `None` without a weight
pub fn by_weight_status(weight_kg: f64, status: WeightStatus) -> Option<StatusCalorieEstimate> {
    if weight_kg <= 0.0 {
        return None;
    }
    let [sedentary, moderate, heavy] = status_rates(status);

    Some(StatusCalorieEstimate {
        status,
        sedentary_kcal: finite_or_zero(weight_kg * sedentary),
        moderate_kcal: finite_or_zero(weight_kg * moderate),
        heavy_kcal: finite_or_zero(weight_kg * heavy),
    })
}

/// Activity-tier method; all zeros without a weight
pub fn by_activity(weight_kg: f64) -> ActivityCalorieEstimate {
    let weight_kg = weight_kg.max(0.0);
    let [sedentary, moderate, moderate_high, active] = ACTIVITY_RATES;

    ActivityCalorieEstimate {
        sedentary_kcal: finite_or_zero(weight_kg * sedentary),
        moderate_kcal: finite_or_zero(weight_kg * moderate),
        moderate_high_kcal: finite_or_zero(weight_kg * moderate_high),
        active_kcal: finite_or_zero(weight_kg * active),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body_composition::BodyCompositionResolver;
    use crate::classification::ClassificationEngine;
    use crate::types::Gender;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_rows() {
        let underweight = by_weight_status(50.0, WeightStatus::Underweight).unwrap();
        assert_eq!(underweight.sedentary_kcal, 1750.0);
        assert_eq!(underweight.moderate_kcal, 2000.0);
        assert_eq!(underweight.heavy_kcal, 2250.0);

        let overweight = by_weight_status(100.0, WeightStatus::Overweight).unwrap();
        assert_eq!(overweight.sedentary_kcal, 2000.0);
        assert_eq!(overweight.heavy_kcal, 3500.0);
    }

    #[test]
    fn test_no_weight_no_status_estimate() {
        assert_eq!(by_weight_status(0.0, WeightStatus::Normal), None);
    }

    #[test]
    fn test_activity_tiers() {
        assert_eq!(
            by_activity(60.0),
            ActivityCalorieEstimate {
                sedentary_kcal: 1500.0,
                moderate_kcal: 1800.0,
                moderate_high_kcal: 2100.0,
                active_kcal: 2400.0,
            }
        );
        assert_eq!(by_activity(0.0), ActivityCalorieEstimate::default());
    }

    #[test]
    fn test_status_follows_selected_weight_bmi() {
        let input = AssessmentInput {
            gender: Some(Gender::Female),
            height_cm: 160.0,
            current_weight_kg: 90.0,
            // BMI 19.5 at 50 kg: normal
            selected_weight_kg: 50.0,
            ..Default::default()
        };
        let body = BodyCompositionResolver::resolve(&input);
        let classification = ClassificationEngine::classify(&input, &body);
        let estimates = WeightBasedCalorieEstimator::estimate(&input, &body, &classification);

        let status = estimates.by_weight_status.unwrap();
        assert_eq!(status.status, WeightStatus::Normal);
        assert_eq!(status.sedentary_kcal, 1500.0);

        assert_eq!(estimates.by_activity_actual.sedentary_kcal, 2250.0);
        assert_eq!(estimates.by_activity_selected.active_kcal, 2000.0);
    }

    #[test]
    fn test_missing_height_blanks_status_estimate() {
        let input = AssessmentInput {
            selected_weight_kg: 70.0,
            ..Default::default()
        };
        let body = BodyCompositionResolver::resolve(&input);
        let classification = ClassificationEngine::classify(&input, &body);
        let estimates = WeightBasedCalorieEstimator::estimate(&input, &body, &classification);

        assert_eq!(estimates.by_weight_status, None);
        assert_eq!(estimates.by_activity_selected.moderate_kcal, 2100.0);
    }
}
