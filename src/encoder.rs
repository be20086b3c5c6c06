//! Report encoding
//!
//! This module wraps an `Assessment` into a versioned report envelope and
//! renders every metric as a display string for presentation collaborators.
//! Blank metrics render as an empty string, or "0%" for percentages.

use crate::error::ComputeError;
use crate::types::{
    ActivityCalorieEstimate, Assessment, AssessmentReport, BmiReading, EnergyEstimate,
    IdealWeightEstimate, ReportProducer,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for assessment reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode an assessment into a report
    pub fn encode(&self, assessment: &Assessment) -> AssessmentReport {
        AssessmentReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            id: assessment.id.clone(),
            input: assessment.input.clone(),
            notices: assessment.notices.clone(),
            result: assessment.result.clone(),
            display: display_fields(assessment),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(&self, assessment: &Assessment) -> Result<String, ComputeError> {
        let report = self.encode(assessment);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}

/// Display strings for every metric, keyed by a stable name
pub fn display_fields(assessment: &Assessment) -> BTreeMap<String, String> {
    let result = &assessment.result;
    let body = &result.body_composition;
    let classification = &result.classification;
    let mut display = BTreeMap::new();

    let mut put = |key: &str, value: String| {
        display.insert(key.to_string(), value);
    };

    put("dry_weight_kg", weight(body.dry_weight_kg));
    put("weight_loss_pct", percent(body.weight_loss_pct));
    put(
        "weight_loss_severity",
        body.weight_loss_severity.label().to_string(),
    );
    put_ideal_weight(&mut put, "ibw_simple", &body.simple);
    put_ideal_weight(&mut put, "ibw_accurate", &body.accurate);

    put_bmi(&mut put, "bmi_current", &classification.bmi_current);
    put_bmi(&mut put, "bmi_selected", &classification.bmi_selected);
    put("waist_risk", classification.waist_label.clone());
    match &classification.pediatric_waist {
        Some(reference) => {
            put("pediatric_waist_p10_cm", length(reference.p10_cm));
            put("pediatric_waist_p50_cm", length(reference.p50_cm));
            put("pediatric_waist_p90_cm", length(reference.p90_cm));
            put(
                "pediatric_waist_risk",
                if reference.elevated {
                    "Above 90th percentile".to_string()
                } else {
                    String::new()
                },
            );
        }
        None => {
            for key in [
                "pediatric_waist_p10_cm",
                "pediatric_waist_p50_cm",
                "pediatric_waist_p90_cm",
                "pediatric_waist_risk",
            ] {
                put(key, String::new());
            }
        }
    }

    for equation in [&result.energy.harris_benedict, &result.energy.mifflin_st_jeor] {
        put_energy(&mut put, &format!("{}_actual", equation.equation), &equation.actual);
        put_energy(&mut put, &format!("{}_selected", equation.equation), &equation.selected);
    }

    let estimates = &result.calorie_estimates;
    match &estimates.by_weight_status {
        Some(status) => {
            put("status_kcal_weight_status", status.status.as_str().to_string());
            put("status_kcal_sedentary", kcal(status.sedentary_kcal));
            put("status_kcal_moderate", kcal(status.moderate_kcal));
            put("status_kcal_heavy", kcal(status.heavy_kcal));
        }
        None => {
            for key in [
                "status_kcal_weight_status",
                "status_kcal_sedentary",
                "status_kcal_moderate",
                "status_kcal_heavy",
            ] {
                put(key, String::new());
            }
        }
    }
    put_activity(&mut put, "activity_kcal_actual", &estimates.by_activity_actual);
    put_activity(&mut put, "activity_kcal_selected", &estimates.by_activity_selected);

    display
}

fn put_ideal_weight(put: &mut impl FnMut(&str, String), prefix: &str, estimate: &IdealWeightEstimate) {
    put(&format!("{prefix}_kg"), weight(estimate.ibw_kg));
    put(
        &format!("{prefix}_deviation_pct"),
        estimate.deviation_pct.map(percent).unwrap_or_default(),
    );
    put(&format!("{prefix}_abw_kg"), weight(estimate.abw_kg));
    put(
        &format!("{prefix}_reference"),
        estimate
            .reference
            .map(|r| r.label().to_string())
            .unwrap_or_default(),
    );
}

fn put_bmi(put: &mut impl FnMut(&str, String), prefix: &str, reading: &BmiReading) {
    put(
        prefix,
        if reading.value > 0.0 {
            format!("{:.1}", reading.value)
        } else {
            String::new()
        },
    );
    put(
        &format!("{prefix}_category"),
        reading
            .category
            .map(|c| c.label().to_string())
            .unwrap_or_default(),
    );
}

fn put_energy(put: &mut impl FnMut(&str, String), prefix: &str, estimate: &EnergyEstimate) {
    put(&format!("{prefix}_bmr_kcal"), kcal(estimate.bmr_kcal));
    put(&format!("{prefix}_tee_kcal"), kcal(estimate.tee_kcal));
    put(
        &format!("{prefix}_target_kcal"),
        if estimate.tee_kcal > 0.0 {
            format!("{:.0}", estimate.target_kcal)
        } else {
            String::new()
        },
    );
}

fn put_activity(put: &mut impl FnMut(&str, String), prefix: &str, estimate: &ActivityCalorieEstimate) {
    put(&format!("{prefix}_sedentary"), kcal(estimate.sedentary_kcal));
    put(&format!("{prefix}_moderate"), kcal(estimate.moderate_kcal));
    put(&format!("{prefix}_moderate_high"), kcal(estimate.moderate_high_kcal));
    put(&format!("{prefix}_active"), kcal(estimate.active_kcal));
}

fn weight(kg: f64) -> String {
    if kg > 0.0 {
        format!("{kg:.1}")
    } else {
        String::new()
    }
}

fn length(cm: f64) -> String {
    weight(cm)
}

fn kcal(value: f64) -> String {
    if value > 0.0 {
        format!("{value:.0}")
    } else {
        String::new()
    }
}

fn percent(value: f64) -> String {
    if value > 0.0 {
        format!("{value:.1}%")
    } else {
        "0%".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compute_assessment;
    use crate::types::{ActivityFactor, AssessmentInput, Gender};
    use pretty_assertions::assert_eq;

    fn assessment(input: AssessmentInput) -> Assessment {
        Assessment {
            id: Some("record-7".to_string()),
            result: compute_assessment(&input),
            input,
            notices: Vec::new(),
        }
    }

    fn sample_input() -> AssessmentInput {
        AssessmentInput {
            gender: Some(Gender::Male),
            age_years: 30.0,
            height_cm: 170.0,
            waist_cm: 95.0,
            current_weight_kg: 80.0,
            selected_weight_kg: 70.0,
            activity_factor: ActivityFactor::Light,
            ..Default::default()
        }
    }

    #[test]
    fn test_report_envelope() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(&assessment(sample_input()));

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.id.as_deref(), Some("record-7"));
        assert!(chrono::DateTime::parse_from_rfc3339(&report.computed_at_utc).is_ok());
    }

    #[test]
    fn test_display_values() {
        let display = display_fields(&assessment(sample_input()));

        assert_eq!(display["ibw_simple_kg"], "70.0");
        assert_eq!(display["ibw_simple_abw_kg"], "73.8");
        assert_eq!(display["ibw_simple_deviation_pct"], "12.5%");
        assert_eq!(display["ibw_simple_reference"], "Use IBW");
        assert_eq!(display["bmi_current"], "27.7");
        assert_eq!(display["bmi_current_category"], "Overweight");
        assert_eq!(display["waist_risk"], "Overweight (94-102)");
        assert_eq!(display["weight_loss_pct"], "0%");
        assert_eq!(display["weight_loss_severity"], "");
        assert_eq!(display["status_kcal_weight_status"], "normal");
        assert_eq!(display["activity_kcal_selected_active"], "2800");
    }

    #[test]
    fn test_all_zero_input_renders_blank() {
        let display = display_fields(&assessment(AssessmentInput::default()));

        for (key, value) in &display {
            assert!(
                value.is_empty() || value == "0%",
                "{key} should be blank but was {value:?}"
            );
        }
        assert_eq!(display["weight_loss_pct"], "0%");
        assert_eq!(display["harris_benedict_actual_bmr_kcal"], "");
    }

    #[test]
    fn test_display_keys_stable_across_inputs() {
        let full = display_fields(&assessment(sample_input()));
        let empty = display_fields(&assessment(AssessmentInput::default()));

        let full_keys: Vec<_> = full.keys().collect();
        let empty_keys: Vec<_> = empty.keys().collect();
        assert_eq!(full_keys, empty_keys);
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::new();
        let json = encoder.encode_to_json(&assessment(sample_input())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["input"]["gender"], "male");
        assert_eq!(value["input"]["activity_factor"], "light");
        assert_eq!(
            value["result"]["classification"]["bmi_current"]["category"],
            "overweight"
        );
    }
}
