//! Input normalization
//!
//! This module coerces raw form/API input into a canonical `AssessmentInput`.
//! - Units reconciled to kg, cm and years
//! - Blank, unparseable and negative values collapsed to 0 ("not provided")
//! - Enumerated fields matched against their fixed value sets
//!
//! Nothing here fails. Every problem is reported as an `InputNotice` and the
//! affected field degrades to its unset value.

use crate::schema::{RawAssessmentInput, RawValue};
use crate::types::{
    ActivityFactor, AssessmentInput, ChangeDuration, FluidRetention, Gender, InputField,
    InputNotice, NoticeKind, NormalizedInput,
};
use crate::units::{LengthUnit, WeightUnit};

/// Tolerance when matching numeric codes against their enumerated values
const CODE_TOLERANCE: f64 = 1e-6;

/// Normalizer for converting raw input into canonical input
pub struct Normalizer;

impl Normalizer {
    /// Normalize raw input
    pub fn normalize(raw: &RawAssessmentInput) -> NormalizedInput {
        let mut notices = Vec::new();

        let weight_unit = parse_unit::<WeightUnit>(
            raw.weight_unit.as_deref(),
            InputField::WeightUnit,
            &mut notices,
        );
        let length_unit = parse_unit::<LengthUnit>(
            raw.length_unit.as_deref(),
            InputField::LengthUnit,
            &mut notices,
        );

        let gender = normalize_gender(raw.gender.as_ref(), &mut notices);

        let age_years = read_quantity(raw.age_years.as_ref(), InputField::AgeYears, true, &mut notices);
        let to_cm = |v: f64| length_unit.to_cm(v);
        let to_kg = |v: f64| weight_unit.to_kg(v);

        let height_cm = read_converted(
            raw.height_cm.as_ref(),
            InputField::HeightCm,
            true,
            to_cm,
            &mut notices,
        );
        let waist_cm = read_converted(
            raw.waist_cm.as_ref(),
            InputField::WaistCm,
            false,
            to_cm,
            &mut notices,
        );

        let current_weight_kg = read_converted(
            raw.current_weight_kg.as_ref(),
            InputField::CurrentWeightKg,
            true,
            to_kg,
            &mut notices,
        );
        let usual_weight_kg = read_converted(
            raw.usual_weight_kg.as_ref(),
            InputField::UsualWeightKg,
            false,
            to_kg,
            &mut notices,
        );
        let selected_weight_kg = read_converted(
            raw.selected_weight_kg.as_ref(),
            InputField::SelectedWeightKg,
            false,
            to_kg,
            &mut notices,
        );

        let activity_factor = normalize_activity_factor(raw.activity_factor.as_ref(), &mut notices);
        let change_duration = normalize_change_duration(raw.change_duration.as_ref(), &mut notices);

        let ascites_offset_kg = read_fluid_offset(
            raw.ascites_offset_kg.as_ref(),
            InputField::AscitesOffsetKg,
            weight_unit,
            FluidRetention::ascites_kg,
            &mut notices,
        );
        let edema_offset_kg = read_fluid_offset(
            raw.edema_offset_kg.as_ref(),
            InputField::EdemaOffsetKg,
            weight_unit,
            FluidRetention::edema_kg,
            &mut notices,
        );

        let calorie_deficit_kcal = read_signed(
            raw.calorie_deficit_kcal.as_ref(),
            InputField::CalorieDeficitKcal,
            &mut notices,
        );

        if !notices.is_empty() {
            tracing::debug!(
                id = raw.id.as_deref().unwrap_or(""),
                count = notices.len(),
                "input normalized with notices"
            );
        }

        NormalizedInput {
            input: AssessmentInput {
                gender,
                age_years,
                height_cm,
                waist_cm,
                current_weight_kg,
                usual_weight_kg,
                selected_weight_kg,
                activity_factor,
                change_duration,
                ascites_offset_kg,
                edema_offset_kg,
                calorie_deficit_kcal,
            },
            notices,
        }
    }
}

/// Present, non-blank value or `None`
fn present(value: Option<&RawValue>) -> Option<&RawValue> {
    value.filter(|v| !v.is_blank())
}

/// Read a non-negative physical quantity; 0 when absent or invalid
fn read_quantity(
    value: Option<&RawValue>,
    field: InputField,
    required: bool,
    notices: &mut Vec<InputNotice>,
) -> f64 {
    let Some(value) = present(value) else {
        if required {
            notices.push(InputNotice::new(field, NoticeKind::Missing));
        }
        return 0.0;
    };

    match value.as_f64() {
        Some(n) if !n.is_finite() => {
            notices.push(InputNotice::new(field, NoticeKind::Unparseable));
            0.0
        }
        Some(n) if n < 0.0 => {
            notices.push(InputNotice::new(field, NoticeKind::NegativeClamped));
            0.0
        }
        Some(n) => {
            if required && n == 0.0 {
                notices.push(InputNotice::new(field, NoticeKind::Missing));
            }
            n
        }
        None => {
            notices.push(InputNotice::new(field, NoticeKind::Unparseable));
            0.0
        }
    }
}

/// Read a quantity and convert it to canonical units; 0 when the converted value overflows
fn read_converted(
    value: Option<&RawValue>,
    field: InputField,
    required: bool,
    convert: impl Fn(f64) -> f64,
    notices: &mut Vec<InputNotice>,
) -> f64 {
    let converted = convert(read_quantity(value, field, required, notices));
    if converted.is_finite() {
        converted
    } else {
        notices.push(InputNotice::new(field, NoticeKind::OutOfRange));
        0.0
    }
}

/// Read a signed quantity; 0 when absent or invalid
fn read_signed(value: Option<&RawValue>, field: InputField, notices: &mut Vec<InputNotice>) -> f64 {
    match present(value).map(RawValue::as_f64) {
        None => 0.0,
        Some(Some(n)) if n.is_finite() => n,
        Some(_) => {
            notices.push(InputNotice::new(field, NoticeKind::Unparseable));
            0.0
        }
    }
}

fn read_fluid_offset(
    value: Option<&RawValue>,
    field: InputField,
    weight_unit: WeightUnit,
    level_kg: fn(&FluidRetention) -> f64,
    notices: &mut Vec<InputNotice>,
) -> f64 {
    let Some(value) = present(value) else {
        return 0.0;
    };

    if value.as_f64().is_none() {
        if let Some(level) = value.as_str().and_then(|s| s.parse::<FluidRetention>().ok()) {
            return level_kg(&level);
        }
    }

    read_converted(Some(value), field, false, |v| weight_unit.to_kg(v), notices)
}

fn parse_unit<U>(value: Option<&str>, field: InputField, notices: &mut Vec<InputNotice>) -> U
where
    U: std::str::FromStr + Default,
{
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => U::default(),
        Some(s) => s.parse().unwrap_or_else(|_| {
            notices.push(InputNotice::new(field, NoticeKind::Unrecognized));
            U::default()
        }),
    }
}

fn normalize_gender(value: Option<&RawValue>, notices: &mut Vec<InputNotice>) -> Option<Gender> {
    let Some(value) = present(value) else {
        notices.push(InputNotice::new(InputField::Gender, NoticeKind::Missing));
        return None;
    };

    match value.as_str().unwrap_or_default().trim().to_lowercase().as_str() {
        "male" | "m" | "man" | "boy" => Some(Gender::Male),
        "female" | "f" | "woman" | "girl" => Some(Gender::Female),
        _ => {
            notices.push(InputNotice::new(InputField::Gender, NoticeKind::Unrecognized));
            None
        }
    }
}

fn normalize_activity_factor(
    value: Option<&RawValue>,
    notices: &mut Vec<InputNotice>,
) -> ActivityFactor {
    let Some(value) = present(value) else {
        return ActivityFactor::Unset;
    };

    let matched = match value.as_f64() {
        Some(n) if n == 0.0 => Some(ActivityFactor::Unset),
        Some(n) => ActivityFactor::ALL
            .into_iter()
            .find(|f| (f.multiplier() - n).abs() < CODE_TOLERANCE),
        None => value.as_str().and_then(|s| match s.trim().to_lowercase().as_str() {
            "unset" | "none" => Some(ActivityFactor::Unset),
            "light" | "lightly_active" => Some(ActivityFactor::Light),
            "moderate" => Some(ActivityFactor::Moderate),
            "moderately_active" => Some(ActivityFactor::ModeratelyActive),
            "very_active" => Some(ActivityFactor::VeryActive),
            "extra_active" => Some(ActivityFactor::ExtraActive),
            _ => None,
        }),
    };

    matched.unwrap_or_else(|| {
        notices.push(InputNotice::new(InputField::ActivityFactor, NoticeKind::Unrecognized));
        ActivityFactor::Unset
    })
}

fn normalize_change_duration(
    value: Option<&RawValue>,
    notices: &mut Vec<InputNotice>,
) -> Option<ChangeDuration> {
    let value = present(value)?;

    let matched = match value.as_f64() {
        Some(n) if n == 0.0 => return None,
        Some(n) => ChangeDuration::ALL
            .into_iter()
            .find(|d| (d.code() - n).abs() < CODE_TOLERANCE),
        None => value.as_str().and_then(|s| match s.trim().to_lowercase().as_str() {
            "week" | "1w" => Some(ChangeDuration::Week),
            "1mo" | "month" => Some(ChangeDuration::OneMonth),
            "3mo" => Some(ChangeDuration::ThreeMonths),
            "6mo" => Some(ChangeDuration::SixMonths),
            "1yr" | "year" => Some(ChangeDuration::OneYear),
            _ => None,
        }),
    };

    if matched.is_none() {
        notices.push(InputNotice::new(InputField::ChangeDuration, NoticeKind::Unrecognized));
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete_raw() -> RawAssessmentInput {
        RawAssessmentInput {
            id: Some("patient-1".to_string()),
            gender: Some("Male".into()),
            age_years: Some(30.0.into()),
            height_cm: Some("175".into()),
            waist_cm: Some(90.0.into()),
            current_weight_kg: Some(80.0.into()),
            usual_weight_kg: Some(84.0.into()),
            selected_weight_kg: Some(72.0.into()),
            activity_factor: Some(1.55.into()),
            change_duration: Some("1mo".into()),
            ascites_offset_kg: Some("minimal".into()),
            edema_offset_kg: Some(0.0.into()),
            calorie_deficit_kcal: Some((-250.0).into()),
            weight_unit: None,
            length_unit: None,
        }
    }

    #[test]
    fn test_normalize_complete_input() {
        let normalized = Normalizer::normalize(&complete_raw());

        assert_eq!(normalized.notices, vec![]);
        assert_eq!(
            normalized.input,
            AssessmentInput {
                gender: Some(Gender::Male),
                age_years: 30.0,
                height_cm: 175.0,
                waist_cm: 90.0,
                current_weight_kg: 80.0,
                usual_weight_kg: 84.0,
                selected_weight_kg: 72.0,
                activity_factor: ActivityFactor::ModeratelyActive,
                change_duration: Some(ChangeDuration::OneMonth),
                ascites_offset_kg: 2.2,
                edema_offset_kg: 0.0,
                calorie_deficit_kcal: -250.0,
            }
        );
    }

    #[test]
    fn test_empty_input_reports_required_fields() {
        let normalized = Normalizer::normalize(&RawAssessmentInput::default());

        assert_eq!(normalized.input, AssessmentInput::default());
        for field in [
            InputField::Gender,
            InputField::AgeYears,
            InputField::HeightCm,
            InputField::CurrentWeightKg,
        ] {
            assert!(normalized
                .notices
                .contains(&InputNotice::new(field, NoticeKind::Missing)));
        }
        assert_eq!(normalized.notices.len(), 4);
    }

    #[test]
    fn test_blank_and_invalid_values_degrade_to_zero() {
        let raw = RawAssessmentInput {
            height_cm: Some("".into()),
            current_weight_kg: Some("heavy".into()),
            waist_cm: Some((-5.0).into()),
            usual_weight_kg: Some("NaN".into()),
            ..complete_raw()
        };
        let normalized = Normalizer::normalize(&raw);

        assert_eq!(normalized.input.height_cm, 0.0);
        assert_eq!(normalized.input.current_weight_kg, 0.0);
        assert_eq!(normalized.input.waist_cm, 0.0);
        assert_eq!(normalized.input.usual_weight_kg, 0.0);

        let notices = &normalized.notices;
        assert!(notices.contains(&InputNotice::new(InputField::HeightCm, NoticeKind::Missing)));
        assert!(notices.contains(&InputNotice::new(
            InputField::CurrentWeightKg,
            NoticeKind::Unparseable
        )));
        assert!(notices.contains(&InputNotice::new(
            InputField::WaistCm,
            NoticeKind::NegativeClamped
        )));
        assert!(notices.contains(&InputNotice::new(
            InputField::UsualWeightKg,
            NoticeKind::Unparseable
        )));
    }

    #[test]
    fn test_imperial_units_are_converted() {
        let raw = RawAssessmentInput {
            weight_unit: Some("lb".to_string()),
            length_unit: Some("in".to_string()),
            height_cm: Some(70.0.into()),
            current_weight_kg: Some(176.0.into()),
            ascites_offset_kg: Some("moderate".into()),
            ..complete_raw()
        };
        let input = Normalizer::normalize(&raw).input;

        assert!((input.height_cm - 177.8).abs() < 1e-9);
        assert!((input.current_weight_kg - 79.832).abs() < 0.001);
        // Severity levels are already in kilograms
        assert_eq!(input.ascites_offset_kg, 6.0);
    }

    #[test]
    fn test_unknown_unit_falls_back_to_metric() {
        let raw = RawAssessmentInput {
            weight_unit: Some("grain".to_string()),
            ..complete_raw()
        };
        let normalized = Normalizer::normalize(&raw);

        assert_eq!(normalized.input.current_weight_kg, 80.0);
        assert_eq!(
            normalized.notices,
            vec![InputNotice::new(InputField::WeightUnit, NoticeKind::Unrecognized)]
        );
    }

    #[test]
    fn test_activity_factor_matching() {
        let cases: [(RawValue, ActivityFactor); 6] = [
            (1.375.into(), ActivityFactor::Light),
            ("1.5".into(), ActivityFactor::Moderate),
            (1.725.into(), ActivityFactor::VeryActive),
            ("extra_active".into(), ActivityFactor::ExtraActive),
            (0.0.into(), ActivityFactor::Unset),
            (1.2.into(), ActivityFactor::Unset),
        ];

        for (value, expected) in cases {
            let raw = RawAssessmentInput {
                activity_factor: Some(value),
                ..complete_raw()
            };
            assert_eq!(Normalizer::normalize(&raw).input.activity_factor, expected);
        }

        let raw = RawAssessmentInput {
            activity_factor: Some(1.2.into()),
            ..complete_raw()
        };
        assert_eq!(
            Normalizer::normalize(&raw).notices,
            vec![InputNotice::new(InputField::ActivityFactor, NoticeKind::Unrecognized)]
        );
    }

    #[test]
    fn test_change_duration_matching() {
        let cases: [(RawValue, Option<ChangeDuration>); 5] = [
            (2.0.into(), Some(ChangeDuration::Week)),
            (7.5.into(), Some(ChangeDuration::ThreeMonths)),
            ("20".into(), Some(ChangeDuration::OneYear)),
            ("6mo".into(), Some(ChangeDuration::SixMonths)),
            (0.0.into(), None),
        ];

        for (value, expected) in cases {
            let raw = RawAssessmentInput {
                change_duration: Some(value),
                ..complete_raw()
            };
            assert_eq!(Normalizer::normalize(&raw).input.change_duration, expected);
        }

        let raw = RawAssessmentInput {
            change_duration: Some(3.0.into()),
            ..complete_raw()
        };
        let normalized = Normalizer::normalize(&raw);
        assert_eq!(normalized.input.change_duration, None);
        assert_eq!(
            normalized.notices,
            vec![InputNotice::new(InputField::ChangeDuration, NoticeKind::Unrecognized)]
        );
    }

    #[test]
    fn test_unrecognized_gender() {
        let raw = RawAssessmentInput {
            gender: Some("unknown".into()),
            ..complete_raw()
        };
        let normalized = Normalizer::normalize(&raw);

        assert_eq!(normalized.input.gender, None);
        assert_eq!(
            normalized.notices,
            vec![InputNotice::new(InputField::Gender, NoticeKind::Unrecognized)]
        );
    }

    #[test]
    fn test_numeric_gender_degrades_to_notice() {
        let raw: RawAssessmentInput =
            serde_json::from_str(r#"{"gender": 1, "age_years": 30, "height_cm": 175, "current_weight_kg": 70}"#)
                .unwrap();
        let normalized = Normalizer::normalize(&raw);

        assert_eq!(normalized.input.gender, None);
        assert_eq!(normalized.input.height_cm, 175.0);
        assert_eq!(
            normalized.notices,
            vec![InputNotice::new(InputField::Gender, NoticeKind::Unrecognized)]
        );
    }

    #[test]
    fn test_overflowing_conversion_is_out_of_range() {
        let raw = RawAssessmentInput {
            current_weight_kg: Some(1e308.into()),
            waist_cm: Some(1e308.into()),
            edema_offset_kg: Some(1e308.into()),
            weight_unit: Some("st".to_string()),
            length_unit: Some("in".to_string()),
            ..complete_raw()
        };
        let normalized = Normalizer::normalize(&raw);

        assert_eq!(normalized.input.current_weight_kg, 0.0);
        assert_eq!(normalized.input.waist_cm, 0.0);
        assert_eq!(normalized.input.edema_offset_kg, 0.0);
        for field in [
            InputField::CurrentWeightKg,
            InputField::WaistCm,
            InputField::EdemaOffsetKg,
        ] {
            assert!(normalized
                .notices
                .contains(&InputNotice::new(field, NoticeKind::OutOfRange)));
        }
    }

    #[test]
    fn test_fluid_offsets_accept_kilograms_and_levels() {
        let raw = RawAssessmentInput {
            ascites_offset_kg: Some("severe".into()),
            edema_offset_kg: Some("3.5".into()),
            ..complete_raw()
        };
        let input = Normalizer::normalize(&raw).input;

        assert_eq!(input.ascites_offset_kg, 14.0);
        assert_eq!(input.edema_offset_kg, 3.5);
    }
}
