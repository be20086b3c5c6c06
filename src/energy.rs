//! Energy expenditure
//!
//! This module estimates energy needs with two predictive BMR equations, each
//! evaluated for the actual (dry) weight and the clinician-selected weight:
//! - BMR from the equation
//! - TEE = BMR x activity factor
//! - Calorie target = TEE - calorie deficit (a negative deficit adds calories)
//!
//! The equations are reported side by side; neither is preferred.

use crate::types::{
    ActivityFactor, AssessmentInput, BodyComposition, EnergyEstimate, EnergyExpenditure,
    EquationResult, Gender,
};
use crate::units::finite_or_zero;

/// A predictive basal metabolic rate equation
pub trait BmrEquation {
    /// Name reported alongside the results
    fn name(&self) -> &'static str;

    /// Raw equation value in kcal/day
    fn evaluate(&self, gender: Gender, weight_kg: f64, height_cm: f64, age_years: f64) -> f64;
}

/// Harris-Benedict (1919)
pub struct HarrisBenedict;

impl BmrEquation for HarrisBenedict {
    fn name(&self) -> &'static str {
        "harris_benedict"
    }

    fn evaluate(&self, gender: Gender, weight_kg: f64, height_cm: f64, age_years: f64) -> f64 {
        match gender {
            Gender::Male => 66.5 + 13.75 * weight_kg + 5.003 * height_cm - 6.75 * age_years,
            Gender::Female => 655.1 + 9.563 * weight_kg + 1.850 * height_cm - 4.676 * age_years,
        }
    }
}

/// Mifflin-St Jeor (1990)
pub struct MifflinStJeor;

impl BmrEquation for MifflinStJeor {
    fn name(&self) -> &'static str {
        "mifflin_st_jeor"
    }

    fn evaluate(&self, gender: Gender, weight_kg: f64, height_cm: f64, age_years: f64) -> f64 {
        let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years;
        match gender {
            Gender::Male => base + 5.0,
            Gender::Female => base - 161.0,
        }
    }
}

/// Energy expenditure engine
pub struct EnergyExpenditureEngine;

impl EnergyExpenditureEngine {
    /// Evaluate both equations against both weight bases
    pub fn compute(input: &AssessmentInput, body: &BodyComposition) -> EnergyExpenditure {
        EnergyExpenditure {
            harris_benedict: evaluate_equation(&HarrisBenedict, input, body),
            mifflin_st_jeor: evaluate_equation(&MifflinStJeor, input, body),
        }
    }
}

/// Evaluate one equation for the dry weight and the selected weight
pub fn evaluate_equation(
    equation: &dyn BmrEquation,
    input: &AssessmentInput,
    body: &BodyComposition,
) -> EquationResult {
    EquationResult {
        equation: equation.name().to_string(),
        actual: energy_estimate(equation, input, body.dry_weight_kg),
        selected: energy_estimate(equation, input, input.selected_weight_kg),
    }
}

/// BMR, TEE and target for one weight
pub fn energy_estimate(
    equation: &dyn BmrEquation,
    input: &AssessmentInput,
    weight_kg: f64,
) -> EnergyEstimate {
    let bmr_kcal = basal_metabolic_rate(
        equation,
        input.gender,
        weight_kg,
        input.height_cm,
        input.age_years,
    );
    let tee_kcal = total_energy_expenditure(bmr_kcal, input.activity_factor);
    let target_kcal = calorie_target(tee_kcal, input.calorie_deficit_kcal);

    EnergyEstimate {
        bmr_kcal,
        tee_kcal,
        target_kcal,
    }
}

/// BMR in kcal/day; 0 when gender, weight or height is missing
pub fn basal_metabolic_rate(
    equation: &dyn BmrEquation,
    gender: Option<Gender>,
    weight_kg: f64,
    height_cm: f64,
    age_years: f64,
) -> f64 {
    match gender {
        Some(gender) if weight_kg > 0.0 && height_cm > 0.0 => {
            finite_or_zero(equation.evaluate(gender, weight_kg, height_cm, age_years)).max(0.0)
        }
        _ => 0.0,
    }
}

/// TEE = BMR x activity factor; 0 when either is missing
pub fn total_energy_expenditure(bmr_kcal: f64, activity_factor: ActivityFactor) -> f64 {
    if bmr_kcal <= 0.0 || !activity_factor.is_set() {
        return 0.0;
    }
    finite_or_zero(bmr_kcal * activity_factor.multiplier())
}

/// TEE less the deficit; 0 when there is no TEE
pub fn calorie_target(tee_kcal: f64, calorie_deficit_kcal: f64) -> f64 {
    if tee_kcal <= 0.0 {
        return 0.0;
    }
    finite_or_zero(tee_kcal - calorie_deficit_kcal)
}
