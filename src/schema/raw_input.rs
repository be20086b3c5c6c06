//! Raw assessment input as submitted by a form or an API client
//!
//! Every field is optional. Numeric fields accept either JSON numbers or
//! strings, because form collaborators commonly submit text boxes verbatim
//! (including empty strings for fields the clinician has not filled in yet).

use serde::{Deserialize, Serialize};

/// Identifier of the raw input schema
pub const SCHEMA_VERSION: &str = "nutri.assessment_input.v1";

/// Loosely-typed field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl RawValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s.as_str()),
            RawValue::Number(_) => None,
        }
    }

    /// Blank text counts as "not provided"
    pub fn is_blank(&self) -> bool {
        matches!(self, RawValue::Text(s) if s.trim().is_empty())
    }
}

/// Raw assessment input (`nutri.assessment_input.v1`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAssessmentInput {
    /// Caller-supplied correlation id, echoed into the report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Text value; anything else degrades to a notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<RawValue>,

    #[serde(alias = "ageYears", skip_serializing_if = "Option::is_none")]
    pub age_years: Option<RawValue>,

    #[serde(alias = "heightCm", alias = "height", skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<RawValue>,

    #[serde(alias = "waistCm", alias = "waist", skip_serializing_if = "Option::is_none")]
    pub waist_cm: Option<RawValue>,

    #[serde(
        alias = "currentWeightKg",
        alias = "current_weight",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_weight_kg: Option<RawValue>,

    #[serde(
        alias = "usualWeightKg",
        alias = "usual_weight",
        skip_serializing_if = "Option::is_none"
    )]
    pub usual_weight_kg: Option<RawValue>,

    #[serde(
        alias = "selectedWeightKg",
        alias = "selected_weight",
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_weight_kg: Option<RawValue>,

    /// Numeric factor (1.375, 1.5, 1.55, 1.725, 1.9, 0) or level name
    #[serde(alias = "activityFactor", skip_serializing_if = "Option::is_none")]
    pub activity_factor: Option<RawValue>,

    /// Numeric code (2, 5, 7.5, 10, 20) or name (week, 1mo, 3mo, 6mo, 1yr)
    #[serde(
        alias = "changeDurationCode",
        alias = "change_duration_code",
        skip_serializing_if = "Option::is_none"
    )]
    pub change_duration: Option<RawValue>,

    /// Kilograms or severity name (none, minimal, moderate, severe)
    #[serde(alias = "ascitesOffsetKg", alias = "ascites", skip_serializing_if = "Option::is_none")]
    pub ascites_offset_kg: Option<RawValue>,

    /// Kilograms or severity name (none, minimal, moderate, severe)
    #[serde(alias = "edemaOffsetKg", alias = "edema", skip_serializing_if = "Option::is_none")]
    pub edema_offset_kg: Option<RawValue>,

    #[serde(alias = "calorieDeficitKcal", skip_serializing_if = "Option::is_none")]
    pub calorie_deficit_kcal: Option<RawValue>,

    /// kg (default), lb or st; applies to every weight field and fluid offset
    #[serde(alias = "weightUnit", skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,

    /// cm (default) or in; applies to height and waist
    #[serde(alias = "lengthUnit", skip_serializing_if = "Option::is_none")]
    pub length_unit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_number_and_text_fields() {
        let raw: RawAssessmentInput = serde_json::from_str(
            r#"{"gender": "male", "age_years": "30", "height_cm": 175, "waist_cm": ""}"#,
        )
        .unwrap();

        assert_eq!(raw.gender.as_ref().and_then(RawValue::as_str), Some("male"));
        assert_eq!(raw.age_years.as_ref().and_then(RawValue::as_f64), Some(30.0));
        assert_eq!(raw.height_cm, Some(RawValue::Number(175.0)));
        assert!(raw.waist_cm.as_ref().unwrap().is_blank());
        assert!(raw.current_weight_kg.is_none());
    }

    #[test]
    fn test_camel_case_aliases() {
        let raw: RawAssessmentInput = serde_json::from_str(
            r#"{"heightCm": 180, "currentWeightKg": 60, "changeDurationCode": 5}"#,
        )
        .unwrap();

        assert_eq!(raw.height_cm, Some(RawValue::Number(180.0)));
        assert_eq!(raw.current_weight_kg, Some(RawValue::Number(60.0)));
        assert_eq!(raw.change_duration, Some(RawValue::Number(5.0)));
    }

    #[test]
    fn test_empty_object_is_valid() {
        let raw: RawAssessmentInput = serde_json::from_str("{}").unwrap();
        assert_eq!(raw, RawAssessmentInput::default());
    }

    #[test]
    fn test_raw_value_text_parsing() {
        assert_eq!(RawValue::from(" 72.5 ").as_f64(), Some(72.5));
        assert_eq!(RawValue::from("seventy").as_f64(), None);
        assert_eq!(RawValue::from(1.5).as_str(), None);
    }
}
