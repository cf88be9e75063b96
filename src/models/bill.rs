use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::BillStatus;
use crate::store::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(default)]
    pub id: String,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: BillStatus,
    #[serde(with = "crate::clock::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "crate::clock::timestamp::option")]
    pub paid_at: Option<NaiveDateTime>,
}

impl Bill {
    /// Amount as shown in the bill table, e.g. `$150.00`.
    pub fn display_amount(&self) -> String {
        format!("${:.2}", self.amount)
    }
}

impl Record for Bill {
    const ENTITY: &'static str = "Bill";
    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> &str {
        &self.id
    }

    fn init_new(&mut self, key: String, now: NaiveDateTime) {
        self.id = key;
        self.status = BillStatus::Pending;
        self.created_at = now;
        self.paid_at = None;
    }
}
