use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::UserRole;
use crate::store::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::clock::timestamp::option"
    )]
    pub created_at: Option<NaiveDateTime>,
}

impl Record for User {
    const ENTITY: &'static str = "User";
    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> &str {
        &self.id
    }

    fn init_new(&mut self, key: String, now: NaiveDateTime) {
        self.id = key;
        self.created_at = Some(now);
    }
}
