//! Unit handling at the input boundary
//!
//! Every formula works in kg and cm. Imperial inputs are converted once by the
//! normalizer and never reach the calculation stages.

use serde::{Deserialize, Serialize};
use std::fmt;

const KG_PER_LB: f64 = 0.453_592_37;
const KG_PER_STONE: f64 = 6.350_293_18;
const CM_PER_INCH: f64 = 2.54;

/// Collapse a non-finite result to 0, the "not available" value
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Weight unit of the raw input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
    St,
}

impl WeightUnit {
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lb => value * KG_PER_LB,
            WeightUnit::St => value * KG_PER_STONE,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
            WeightUnit::St => "st",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lb),
            "st" | "stone" | "stones" => Ok(WeightUnit::St),
            _ => Err(format!("Unknown weight unit: {}", s)),
        }
    }
}

/// Length unit of the raw input (height and waist)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Cm,
    In,
}

impl LengthUnit {
    pub fn to_cm(&self, value: f64) -> f64 {
        match self {
            LengthUnit::Cm => value,
            LengthUnit::In => value * CM_PER_INCH,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            LengthUnit::Cm => "cm",
            LengthUnit::In => "in",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => Ok(LengthUnit::Cm),
            "in" | "inch" | "inches" => Ok(LengthUnit::In),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}
