//! Pipeline orchestration
//!
//! This module provides the public API for Nutri-Assess. It runs the stages in
//! order and offers JSON entry points for transport collaborators.
//!
//! Every function here is pure with respect to its input: the same input
//! always produces the same `AssessmentResult`, and nothing is remembered
//! between calls.

use crate::body_composition::BodyCompositionResolver;
use crate::calorie_methods::WeightBasedCalorieEstimator;
use crate::classification::ClassificationEngine;
use crate::encoder::ReportEncoder;
use crate::energy::EnergyExpenditureEngine;
use crate::error::ComputeError;
use crate::normalizer::Normalizer;
use crate::schema::{InputReader, RawAssessmentInput};
use crate::types::{Assessment, AssessmentInput, AssessmentReport, AssessmentResult};

/// Compute every metric for a canonical input.
///
/// Stages:
/// 1. BodyCompositionResolver - dry weight, weight loss, IBW/ABW
/// 2. ClassificationEngine - BMI, waist risk, pediatric reference
/// 3. EnergyExpenditureEngine - BMR/TEE/target for both equations and weights
/// 4. WeightBasedCalorieEstimator - kcal/kg cross-checks
pub fn compute_assessment(input: &AssessmentInput) -> AssessmentResult {
    let body_composition = BodyCompositionResolver::resolve(input);
    let classification = ClassificationEngine::classify(input, &body_composition);
    let energy = EnergyExpenditureEngine::compute(input, &body_composition);
    let calorie_estimates =
        WeightBasedCalorieEstimator::estimate(input, &body_composition, &classification);

    AssessmentResult {
        body_composition,
        classification,
        energy,
        calorie_estimates,
    }
}

/// Normalize raw input and compute the assessment
pub fn assess(raw: &RawAssessmentInput) -> Assessment {
    let normalized = Normalizer::normalize(raw);
    let result = compute_assessment(&normalized.input);

    tracing::debug!(
        id = raw.id.as_deref().unwrap_or(""),
        notices = normalized.notices.len(),
        dry_weight_kg = result.body_composition.dry_weight_kg,
        "assessment computed"
    );

    Assessment {
        id: raw.id.clone(),
        input: normalized.input,
        notices: normalized.notices,
        result,
    }
}

/// Convert one raw input JSON object into a report JSON object.
///
/// # Example
/// ```ignore
/// let report = assess_json(r#"{"gender": "male", "height_cm": 175}"#.to_string())?;
/// ```
pub fn assess_json(raw_json: String) -> Result<String, ComputeError> {
    let raw = InputReader::parse_one(&raw_json)?;
    ReportEncoder::new().encode_to_json(&assess(&raw))
}

/// Convert an NDJSON stream of raw inputs into one compact report JSON line per record
pub fn assess_ndjson(ndjson: &str) -> Result<Vec<String>, ComputeError> {
    let processor = AssessmentProcessor::new();
    processor
        .process_ndjson(ndjson)?
        .iter()
        .map(|report| processor.to_json(report))
        .collect()
}

/// Processor holding a report encoder, for callers producing many reports.
///
/// The processor keeps no assessment state; reports from one processor share
/// a producer instance id.
pub struct AssessmentProcessor {
    encoder: ReportEncoder,
}

impl Default for AssessmentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentProcessor {
    /// Create a new processor with a fresh instance id
    pub fn new() -> Self {
        Self {
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a processor with a specific instance id
    pub fn with_instance_id(instance_id: String) -> Self {
        Self {
            encoder: ReportEncoder::with_instance_id(instance_id),
        }
    }

    /// Assess one raw record into a report
    pub fn process(&self, raw: &RawAssessmentInput) -> AssessmentReport {
        self.encoder.encode(&assess(raw))
    }

    /// Assess every record of a JSON document (one object or an array)
    pub fn process_json(&self, json: &str) -> Result<Vec<AssessmentReport>, ComputeError> {
        let records = InputReader::parse_document(json)?;
        self.process_batch(&records)
    }

    /// Assess every record of an NDJSON stream
    pub fn process_ndjson(&self, ndjson: &str) -> Result<Vec<AssessmentReport>, ComputeError> {
        let records = InputReader::parse_ndjson(ndjson)?;
        self.process_batch(&records)
    }

    fn process_batch(
        &self,
        records: &[RawAssessmentInput],
    ) -> Result<Vec<AssessmentReport>, ComputeError> {
        if records.is_empty() {
            return Err(ComputeError::EmptyBatch);
        }
        Ok(records.iter().map(|raw| self.process(raw)).collect())
    }

    /// Serialize a report as compact JSON
    pub fn to_json(&self, report: &AssessmentReport) -> Result<String, ComputeError> {
        serde_json::to_string(report).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}
