use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Metadata for an uploaded medical report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalReport {
    #[serde(default)]
    pub id: String,
    pub patient_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub uploaded_by: String,
    #[serde(with = "crate::clock::timestamp")]
    pub uploaded_at: NaiveDateTime,
    pub report_type: String,
    #[serde(default)]
    pub description: String,
    /// `data:` URL of the file contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
}

impl Record for MedicalReport {
    const ENTITY: &'static str = "Report";
    const KEY_FIELD: &'static str = "id";
    const KEY_PREFIX: &'static str = "report_";

    fn key(&self) -> &str {
        &self.id
    }

    fn init_new(&mut self, key: String, now: NaiveDateTime) {
        self.id = key;
        self.uploaded_at = now;
    }
}
