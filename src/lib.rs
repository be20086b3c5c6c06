//! Nutri-Assess - Clinical nutrition assessment engine
//!
//! Nutri-Assess turns a loosely-typed patient record into nutrition metrics
//! through a deterministic pipeline: normalization → body composition →
//! classification → energy expenditure → weight-based calorie estimates →
//! report encoding.
//!
//! ## Modules
//!
//! - **Body composition**: dry weight, weight-loss severity, ideal and adjusted body weight
//! - **Classification**: BMI categories, adult waist risk, pediatric waist percentiles
//! - **Energy**: Harris-Benedict and Mifflin-St Jeor BMR, TEE and calorie targets
//! - **Calorie methods**: kcal/kg estimates by weight status and activity tier

pub mod body_composition;
pub mod calorie_methods;
pub mod classification;
pub mod encoder;
pub mod energy;
pub mod error;
pub mod normalizer;
pub mod pediatric;
pub mod pipeline;
pub mod schema;
pub mod types;
pub mod units;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::ComputeError;
pub use normalizer::Normalizer;
pub use pipeline::{assess, assess_json, assess_ndjson, compute_assessment, AssessmentProcessor};

// Schema exports
pub use schema::{InputReader, RawAssessmentInput, RawValue, SCHEMA_VERSION};

pub use types::{AssessmentInput, AssessmentReport, AssessmentResult};

/// Engine version embedded in all reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "nutri-assess";

/// Normalize a raw record into canonical input plus notices
pub fn normalize(raw: &RawAssessmentInput) -> types::NormalizedInput {
    Normalizer::normalize(raw)
}
