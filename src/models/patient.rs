use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Clinical side of a patient. Contact details live on the linked `User`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default)]
    pub user_id: String,
    pub date_of_birth: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub blood_group: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::clock::timestamp::option"
    )]
    pub created_at: Option<NaiveDateTime>,
}

impl Patient {
    /// Age in whole years on `on`.
    pub fn age_on(&self, on: NaiveDate) -> Option<u32> {
        on.years_since(self.date_of_birth)
    }
}

impl Record for Patient {
    const ENTITY: &'static str = "Patient";
    const KEY_FIELD: &'static str = "userId";

    fn key(&self) -> &str {
        &self.user_id
    }

    // Patients are keyed by their user; a key is only generated when the
    // form did not link one.
    fn init_new(&mut self, key: String, now: NaiveDateTime) {
        if self.user_id.trim().is_empty() {
            self.user_id = key;
        }
        self.created_at = Some(now);
    }
}
