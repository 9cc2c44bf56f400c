//! JSON export of a result set.

use serde::{Deserialize, Serialize};

use crup_common::{Hypothesis, Result};

/// Download name offered for exports.
pub const EXPORT_FILE_NAME: &str = "crup_results.json";

/// The exported document: `{ "results": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExportDocument {
    pub results: Vec<Hypothesis>,
}

impl ExportDocument {
    pub fn new(results: Vec<Hypothesis>) -> Self {
        Self { results }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
