//! Readers for single records, JSON arrays and NDJSON streams of raw input

use crate::error::ComputeError;
use crate::schema::raw_input::RawAssessmentInput;

/// Reader for raw assessment input documents
pub struct InputReader;

impl InputReader {
    /// Parse one JSON object
    pub fn parse_one(json: &str) -> Result<RawAssessmentInput, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON array of objects
    pub fn parse_array(json: &str) -> Result<Vec<RawAssessmentInput>, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON document that is either one object or an array of objects
    pub fn parse_document(json: &str) -> Result<Vec<RawAssessmentInput>, ComputeError> {
        if json.trim_start().starts_with('[') {
            Self::parse_array(json)
        } else {
            Ok(vec![Self::parse_one(json)?])
        }
    }

    /// Parse NDJSON (one object per line, blank lines skipped)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawAssessmentInput>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawAssessmentInput>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }
}
