//! Core types for the Nutri-Assess engine
//!
//! This module defines the data structures that flow through each stage of the
//! assessment: the canonical input snapshot, normalizer notices, and the
//! per-stage result groups that make up an `AssessmentResult`.

use serde::{Deserialize, Serialize};

/// Gender used by the sex-specific formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Activity factor applied to BMR. `Unset` carries a multiplier of 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityFactor {
    #[default]
    Unset,
    /// 1.375
    Light,
    /// 1.5
    Moderate,
    /// 1.55
    ModeratelyActive,
    /// 1.725
    VeryActive,
    /// 1.9
    ExtraActive,
}

impl ActivityFactor {
    /// Every selectable factor, in ascending order
    pub const ALL: [ActivityFactor; 5] = [
        ActivityFactor::Light,
        ActivityFactor::Moderate,
        ActivityFactor::ModeratelyActive,
        ActivityFactor::VeryActive,
        ActivityFactor::ExtraActive,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityFactor::Unset => 0.0,
            ActivityFactor::Light => 1.375,
            ActivityFactor::Moderate => 1.5,
            ActivityFactor::ModeratelyActive => 1.55,
            ActivityFactor::VeryActive => 1.725,
            ActivityFactor::ExtraActive => 1.9,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, ActivityFactor::Unset)
    }
}

/// Period over which the usual-to-current weight change happened.
///
/// The code is a unitless divisor, not a number of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeDuration {
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1yr")]
    OneYear,
}

impl ChangeDuration {
    pub const ALL: [ChangeDuration; 5] = [
        ChangeDuration::Week,
        ChangeDuration::OneMonth,
        ChangeDuration::ThreeMonths,
        ChangeDuration::SixMonths,
        ChangeDuration::OneYear,
    ];

    pub fn code(&self) -> f64 {
        match self {
            ChangeDuration::Week => 2.0,
            ChangeDuration::OneMonth => 5.0,
            ChangeDuration::ThreeMonths => 7.5,
            ChangeDuration::SixMonths => 10.0,
            ChangeDuration::OneYear => 20.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeDuration::Week => "week",
            ChangeDuration::OneMonth => "1mo",
            ChangeDuration::ThreeMonths => "3mo",
            ChangeDuration::SixMonths => "6mo",
            ChangeDuration::OneYear => "1yr",
        }
    }
}

/// Discrete fluid-retention severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidRetention {
    None,
    Minimal,
    Moderate,
    Severe,
}

impl FluidRetention {
    /// Weight attributed to ascites at this level (kg)
    pub fn ascites_kg(&self) -> f64 {
        match self {
            FluidRetention::None => 0.0,
            FluidRetention::Minimal => 2.2,
            FluidRetention::Moderate => 6.0,
            FluidRetention::Severe => 14.0,
        }
    }

    /// Weight attributed to peripheral edema at this level (kg)
    pub fn edema_kg(&self) -> f64 {
        match self {
            FluidRetention::None => 0.0,
            FluidRetention::Minimal => 1.0,
            FluidRetention::Moderate => 5.0,
            FluidRetention::Severe => 10.0,
        }
    }
}

impl std::str::FromStr for FluidRetention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "absent" => Ok(FluidRetention::None),
            "minimal" | "mild" => Ok(FluidRetention::Minimal),
            "moderate" => Ok(FluidRetention::Moderate),
            "severe" => Ok(FluidRetention::Severe),
            _ => Err(format!("Unknown fluid retention level: {}", s)),
        }
    }
}

/// Canonical assessment input in kg, cm and years.
///
/// Zero means "not provided" for every physical quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentInput {
    pub gender: Option<Gender>,
    pub age_years: f64,
    pub height_cm: f64,
    pub waist_cm: f64,
    pub current_weight_kg: f64,
    pub usual_weight_kg: f64,
    /// Clinician-chosen reference weight, independent of current weight
    pub selected_weight_kg: f64,
    pub activity_factor: ActivityFactor,
    pub change_duration: Option<ChangeDuration>,
    pub ascites_offset_kg: f64,
    pub edema_offset_kg: f64,
    /// Subtracted from TEE; negative values add calories
    pub calorie_deficit_kcal: f64,
}

/// Input field a notice refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Gender,
    AgeYears,
    HeightCm,
    WaistCm,
    CurrentWeightKg,
    UsualWeightKg,
    SelectedWeightKg,
    ActivityFactor,
    ChangeDuration,
    AscitesOffsetKg,
    EdemaOffsetKg,
    CalorieDeficitKcal,
    WeightUnit,
    LengthUnit,
}

/// What the normalizer did with a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Field absent or blank; downstream metrics depending on it are blank
    Missing,
    /// Value could not be read as a number
    Unparseable,
    /// Negative physical quantity replaced by 0
    NegativeClamped,
    /// Value outside the enumerated set for this field
    Unrecognized,
    /// Value overflows once converted to kg or cm; replaced by 0
    OutOfRange,
}

/// Non-fatal report produced while normalizing raw input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputNotice {
    pub field: InputField,
    pub kind: NoticeKind,
}

impl InputNotice {
    pub fn new(field: InputField, kind: NoticeKind) -> Self {
        Self { field, kind }
    }
}

/// Normalized input together with the notices raised while producing it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInput {
    pub input: AssessmentInput,
    pub notices: Vec<InputNotice>,
}

// ============================================================================
// Body composition
// ============================================================================

/// Severity of recent weight loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightLossSeverity {
    #[default]
    None,
    Moderate,
    Severe,
}

impl WeightLossSeverity {
    /// Display label; no loss renders as blank
    pub fn label(&self) -> &'static str {
        match self {
            WeightLossSeverity::None => "",
            WeightLossSeverity::Moderate => "Moderate",
            WeightLossSeverity::Severe => "Severe",
        }
    }
}

/// Which reference weight the clinician should prescribe against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceWeight {
    UseIbw,
    UseAbw,
}

impl ReferenceWeight {
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceWeight::UseIbw => "Use IBW",
            ReferenceWeight::UseAbw => "Use ABW",
        }
    }
}

/// One ideal body weight formula with its deviation and adjusted weight
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdealWeightEstimate {
    pub ibw_kg: f64,
    /// Percent above IBW; `None` when there is no weight or height to compare
    pub deviation_pct: Option<f64>,
    pub abw_kg: f64,
    pub reference: Option<ReferenceWeight>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyComposition {
    pub dry_weight_kg: f64,
    pub weight_loss_pct: f64,
    pub weight_loss_severity: WeightLossSeverity,
    /// Height minus 100
    pub simple: IdealWeightEstimate,
    /// Devine-style, sex-specific
    pub accurate: IdealWeightEstimate,
}

// ============================================================================
// Classification
// ============================================================================

/// BMI category bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    PemIii,
    PemIi,
    PemI,
    NormalWeight,
    Overweight,
    ObesityI,
    ObesityII,
    ExtremeObesity,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::PemIii => "PEM III",
            BmiCategory::PemIi => "PEM II",
            BmiCategory::PemI => "PEM I",
            BmiCategory::NormalWeight => "Normal Weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObesityI => "Obesity I",
            BmiCategory::ObesityII => "Obesity II",
            BmiCategory::ExtremeObesity => "Extreme Obesity",
        }
    }

    /// Coarse weight status used to pick a kcal/kg row
    pub fn weight_status(&self) -> WeightStatus {
        match self {
            BmiCategory::PemIii | BmiCategory::PemIi | BmiCategory::PemI => {
                WeightStatus::Underweight
            }
            BmiCategory::NormalWeight => WeightStatus::Normal,
            _ => WeightStatus::Overweight,
        }
    }
}

/// BMI value with its category; value 0 and no category when inputs are missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BmiReading {
    pub value: f64,
    pub category: Option<BmiCategory>,
}

/// Adult waist circumference risk bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaistRisk {
    BelowNormal,
    Normal,
    Overweight,
    Obese,
}

impl WaistRisk {
    /// Display label, including the band limits for the given gender
    pub fn label(&self, gender: Gender) -> &'static str {
        match (gender, self) {
            (Gender::Male, WaistRisk::BelowNormal) => "Below normal (<78)",
            (Gender::Male, WaistRisk::Normal) => "Normal range (78-94)",
            (Gender::Male, WaistRisk::Overweight) => "Overweight (94-102)",
            (Gender::Male, WaistRisk::Obese) => "Obese (>102)",
            (Gender::Female, WaistRisk::BelowNormal) => "Below normal (<64)",
            (Gender::Female, WaistRisk::Normal) => "Normal range (64-80)",
            (Gender::Female, WaistRisk::Overweight) => "Overweight (80-88)",
            (Gender::Female, WaistRisk::Obese) => "Obese (>88)",
        }
    }
}

/// Pediatric waist percentile row for the child's age and gender
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PediatricWaistReference {
    pub age_years: u8,
    pub p10_cm: f64,
    pub p50_cm: f64,
    pub p90_cm: f64,
    /// Measured waist above the 90th percentile
    pub elevated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub bmi_current: BmiReading,
    pub bmi_selected: BmiReading,
    pub waist_risk: Option<WaistRisk>,
    pub waist_label: String,
    pub pediatric_waist: Option<PediatricWaistReference>,
}

// ============================================================================
// Energy expenditure
// ============================================================================

/// BMR, TEE and calorie target for one weight basis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    pub bmr_kcal: f64,
    pub tee_kcal: f64,
    pub target_kcal: f64,
}

/// One predictive equation evaluated against both weight bases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquationResult {
    pub equation: String,
    /// Against dry weight
    pub actual: EnergyEstimate,
    /// Against the clinician-selected weight
    pub selected: EnergyEstimate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyExpenditure {
    pub harris_benedict: EquationResult,
    pub mifflin_st_jeor: EquationResult,
}

// ============================================================================
// Weight-based calorie estimates
// ============================================================================

/// Weight status axis of the kcal/kg lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightStatus {
    Underweight,
    Normal,
    Overweight,
}

impl WeightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightStatus::Underweight => "underweight",
            WeightStatus::Normal => "normal",
            WeightStatus::Overweight => "overweight",
        }
    }
}

/// Weight-status kcal/kg estimate across three activity tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusCalorieEstimate {
    pub status: WeightStatus,
    pub sedentary_kcal: f64,
    pub moderate_kcal: f64,
    pub heavy_kcal: f64,
}

/// Activity-tier kcal/kg estimate across four tiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityCalorieEstimate {
    pub sedentary_kcal: f64,
    pub moderate_kcal: f64,
    pub moderate_high_kcal: f64,
    pub active_kcal: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalorieEstimates {
    /// Selected weight, row chosen by the selected-weight BMI category
    pub by_weight_status: Option<StatusCalorieEstimate>,
    pub by_activity_actual: ActivityCalorieEstimate,
    pub by_activity_selected: ActivityCalorieEstimate,
}

/// Every computed metric for one input snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub body_composition: BodyComposition,
    pub classification: Classification,
    pub energy: EnergyExpenditure,
    pub calorie_estimates: CalorieEstimates,
}

/// One assessed record: canonical input, notices and the computed result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub input: AssessmentInput,
    pub notices: Vec<InputNotice>,
    pub result: AssessmentResult,
}

// ============================================================================
// Report envelope
// ============================================================================

/// Report producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Complete assessment report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub input: AssessmentInput,
    pub notices: Vec<InputNotice>,
    pub result: AssessmentResult,
    /// Display strings keyed by metric; blank metrics render as "" or "0%"
    pub display: std::collections::BTreeMap<String, String>,
}
