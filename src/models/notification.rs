use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::appointment::Appointment;
use super::enums::{NotificationType, Priority};
use crate::clock::parse_timestamp;
use crate::store::Record;

/// Ids of notifications derived from appointments start with this.
pub const SYNTHESIZED_PREFIX: &str = "apt-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub time: String,
    #[serde(default)]
    pub read: bool,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recurring: bool,
    /// Source appointment, present only on synthesized reminders.
    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Appointment>,
}

impl Notification {
    pub fn occurs_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.time)
    }

    pub fn is_synthesized(&self) -> bool {
        self.appointment.is_some()
    }
}

impl Record for Notification {
    const ENTITY: &'static str = "Notification";
    const KEY_FIELD: &'static str = "id";
    const KEY_PREFIX: &'static str = "reminder-";

    fn key(&self) -> &str {
        &self.id
    }

    fn init_new(&mut self, key: String, _now: NaiveDateTime) {
        self.id = key;
        self.read = false;
    }
}

/// Per-user notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub appointments: bool,
    pub reminders: bool,
    pub system: bool,
    pub email: bool,
    pub push: bool,
    /// Minutes before an appointment to remind.
    pub reminder_time: u32,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            appointments: true,
            reminders: true,
            system: true,
            email: false,
            push: true,
            reminder_time: 30,
        }
    }
}
