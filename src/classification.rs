//! Clinical classification
//!
//! This module maps numeric metrics onto ordered clinical categories:
//! - BMI for the current (dry) weight and for the selected weight
//! - Adult waist circumference risk (gender-specific bands)
//! - Pediatric waist percentile reference (ages 2-18)

use crate::pediatric;
use crate::types::{
    AssessmentInput, BmiCategory, BmiReading, BodyComposition, Classification, Gender, WaistRisk,
};
use crate::units::finite_or_zero;

/// Classification engine for labelling computed metrics
pub struct ClassificationEngine;

impl ClassificationEngine {
    /// Classify the input and its resolved body composition
    pub fn classify(input: &AssessmentInput, body: &BodyComposition) -> Classification {
        let bmi_current = bmi_reading(body.dry_weight_kg, input.height_cm);
        let bmi_selected = bmi_reading(input.selected_weight_kg, input.height_cm);

        let waist_risk = match input.gender {
            Some(gender) if input.waist_cm > 0.0 => Some(classify_waist(input.waist_cm, gender)),
            _ => None,
        };
        let waist_label = match (waist_risk, input.gender) {
            (Some(risk), Some(gender)) => risk.label(gender).to_string(),
            _ => String::new(),
        };

        let pediatric_waist = input
            .gender
            .and_then(|gender| pediatric::waist_reference(gender, input.age_years, input.waist_cm));

        Classification {
            bmi_current,
            bmi_selected,
            waist_risk,
            waist_label,
            pediatric_waist,
        }
    }
}

/// BMI = weight / height(m)^2; 0 when either input is missing
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    finite_or_zero(weight_kg / (height_m * height_m))
}

/// Classify a BMI value into its band
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 16.0 {
        BmiCategory::PemIii
    } else if bmi < 17.0 {
        BmiCategory::PemIi
    } else if bmi < 18.5 {
        BmiCategory::PemI
    } else if bmi < 25.0 {
        BmiCategory::NormalWeight
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else if bmi < 35.0 {
        BmiCategory::ObesityI
    } else if bmi < 40.0 {
        BmiCategory::ObesityII
    } else {
        BmiCategory::ExtremeObesity
    }
}

/// BMI with category, or an empty reading when it cannot be computed
pub fn bmi_reading(weight_kg: f64, height_cm: f64) -> BmiReading {
    let value = bmi(weight_kg, height_cm);
    BmiReading {
        value,
        category: (value > 0.0).then(|| classify_bmi(value)),
    }
}

/// Adult waist circumference risk; band limits are inclusive on the lower-risk side
pub fn classify_waist(waist_cm: f64, gender: Gender) -> WaistRisk {
    let (normal_min, normal_max, overweight_max) = match gender {
        Gender::Male => (78.0, 94.0, 102.0),
        Gender::Female => (64.0, 80.0, 88.0),
    };

    if waist_cm < normal_min {
        WaistRisk::BelowNormal
    } else if waist_cm <= normal_max {
        WaistRisk::Normal
    } else if waist_cm <= overweight_max {
        WaistRisk::Overweight
    } else {
        WaistRisk::Obese
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body_composition::BodyCompositionResolver;

    fn classify(input: &AssessmentInput) -> Classification {
        let body = BodyCompositionResolver::resolve(input);
        ClassificationEngine::classify(input, &body)
    }

    #[test]
    fn test_bmi_boundary_pem_i() {
        let reading = bmi_reading(58.5, 180.0);
        assert!((reading.value - 18.0556).abs() < 0.001);
        assert_eq!(reading.category, Some(BmiCategory::PemI));
        assert_eq!(reading.category.unwrap().label(), "PEM I");
    }

    #[test]
    fn test_bmi_boundary_normal() {
        let reading = bmi_reading(60.0, 180.0);
        assert!((reading.value - 18.5185).abs() < 0.001);
        assert_eq!(reading.category.unwrap().label(), "Normal Weight");
    }

    #[test]
    fn test_bmi_bands_lower_bound_inclusive() {
        assert_eq!(classify_bmi(15.99), BmiCategory::PemIii);
        assert_eq!(classify_bmi(16.0), BmiCategory::PemIi);
        assert_eq!(classify_bmi(17.0), BmiCategory::PemI);
        assert_eq!(classify_bmi(18.5), BmiCategory::NormalWeight);
        assert_eq!(classify_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(classify_bmi(30.0), BmiCategory::ObesityI);
        assert_eq!(classify_bmi(35.0), BmiCategory::ObesityII);
        assert_eq!(classify_bmi(40.0), BmiCategory::ExtremeObesity);
    }

    #[test]
    fn test_bmi_missing_inputs() {
        assert_eq!(bmi_reading(70.0, 0.0), BmiReading::default());
        assert_eq!(bmi_reading(0.0, 170.0), BmiReading::default());
    }

    #[test]
    fn test_bmi_overflow_is_blank() {
        assert_eq!(bmi(70.0, 1e-160), 0.0);
        assert_eq!(bmi(1e308, 1e-3), 0.0);
        assert_eq!(bmi_reading(70.0, 1e-160), BmiReading::default());
    }

    #[test]
    fn test_male_waist_bands() {
        assert_eq!(classify_waist(77.9, Gender::Male), WaistRisk::BelowNormal);
        assert_eq!(classify_waist(78.0, Gender::Male), WaistRisk::Normal);
        assert_eq!(
            classify_waist(94.0, Gender::Male).label(Gender::Male),
            "Normal range (78-94)"
        );
        assert_eq!(
            classify_waist(95.0, Gender::Male).label(Gender::Male),
            "Overweight (94-102)"
        );
        assert_eq!(classify_waist(102.0, Gender::Male), WaistRisk::Overweight);
        assert_eq!(classify_waist(102.5, Gender::Male), WaistRisk::Obese);
    }

    #[test]
    fn test_female_waist_bands() {
        assert_eq!(classify_waist(63.0, Gender::Female), WaistRisk::BelowNormal);
        assert_eq!(classify_waist(80.0, Gender::Female), WaistRisk::Normal);
        assert_eq!(classify_waist(85.0, Gender::Female), WaistRisk::Overweight);
        assert_eq!(
            classify_waist(89.0, Gender::Female).label(Gender::Female),
            "Obese (>88)"
        );
    }

    #[test]
    fn test_classify_uses_dry_weight_for_current_bmi() {
        let input = AssessmentInput {
            gender: Some(Gender::Male),
            height_cm: 180.0,
            current_weight_kg: 65.0,
            ascites_offset_kg: 6.0,
            selected_weight_kg: 60.0,
            ..Default::default()
        };
        let classification = classify(&input);

        // Dry weight 59 kg
        assert!((classification.bmi_current.value - 18.2099).abs() < 0.001);
        assert_eq!(classification.bmi_current.category, Some(BmiCategory::PemI));
        assert_eq!(
            classification.bmi_selected.category,
            Some(BmiCategory::NormalWeight)
        );
    }

    #[test]
    fn test_waist_label_blank_without_gender() {
        let input = AssessmentInput {
            waist_cm: 100.0,
            ..Default::default()
        };
        let classification = classify(&input);

        assert_eq!(classification.waist_risk, None);
        assert_eq!(classification.waist_label, "");
        assert_eq!(classification.pediatric_waist, None);
    }

    #[test]
    fn test_child_gets_pediatric_reference() {
        let input = AssessmentInput {
            gender: Some(Gender::Female),
            age_years: 9.0,
            waist_cm: 75.0,
            ..Default::default()
        };
        let reference = classify(&input).pediatric_waist.unwrap();

        assert_eq!(reference.age_years, 9);
        assert!(reference.elevated);
    }
}
