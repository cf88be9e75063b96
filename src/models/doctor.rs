use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::Weekday;
use crate::store::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub available: bool,
    #[serde(default)]
    pub slots: Vec<String>,
}

pub type WeeklyAvailability = BTreeMap<Weekday, DayAvailability>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(default)]
    pub user_id: String,
    pub specialization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    pub consultation_fee: f64,
    #[serde(default)]
    pub availability: WeeklyAvailability,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::clock::timestamp::option"
    )]
    pub created_at: Option<NaiveDateTime>,
}

impl Doctor {
    /// Bookable slots on `day`; empty when the doctor is off.
    pub fn slots_on(&self, day: Weekday) -> &[String] {
        match self.availability.get(&day) {
            Some(d) if d.available => &d.slots,
            _ => &[],
        }
    }
}

impl Record for Doctor {
    const ENTITY: &'static str = "Doctor";
    const KEY_FIELD: &'static str = "userId";

    fn key(&self) -> &str {
        &self.user_id
    }

    fn init_new(&mut self, key: String, now: NaiveDateTime) {
        if self.user_id.trim().is_empty() {
            self.user_id = key;
        }
        self.created_at = Some(now);
    }
}
