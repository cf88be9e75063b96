use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(default)]
    pub id: String,
    pub appointment_id: String,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub medicines: Vec<Medicine>,
    #[serde(default)]
    pub instructions: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::clock::timestamp::option"
    )]
    pub created_at: Option<NaiveDateTime>,
}

impl Record for Prescription {
    const ENTITY: &'static str = "Prescription";
    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> &str {
        &self.id
    }

    fn init_new(&mut self, key: String, now: NaiveDateTime) {
        self.id = key;
        self.created_at = Some(now);
    }
}
