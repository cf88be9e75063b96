use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;
use crate::clock::parse_timestamp;
use crate::store::Record;

fn default_kind() -> String {
    "consultation".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    /// Kept raw: records with a missing or malformed time still load,
    /// they just never show up in date-based views.
    #[serde(default)]
    pub date_time: String,
    pub status: AppointmentStatus,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::clock::timestamp::option"
    )]
    pub created_at: Option<NaiveDateTime>,
}

impl Appointment {
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.date_time)
    }
}

impl Record for Appointment {
    const ENTITY: &'static str = "Appointment";
    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> &str {
        &self.id
    }

    fn init_new(&mut self, key: String, now: NaiveDateTime) {
        self.id = key;
        self.status = AppointmentStatus::Scheduled;
        self.created_at = Some(now);
    }
}
