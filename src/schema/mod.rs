//! Raw input schema (`nutri.assessment_input.v1`)
//!
//! This module defines the loosely-typed input accepted from form and API
//! collaborators, and readers for single records, arrays and NDJSON streams.

mod raw_input;
mod reader;

pub use raw_input::*;
pub use reader::*;
