//! In-memory entity stores.
//!
//! One generic [`EntityStore`] per collection, plus per-entity query
//! methods in the sibling modules. Stores sleep for their configured
//! latency before touching data, then hold the lock only for the
//! synchronous read or mutation.

pub mod appointments;
pub mod bills;
pub mod doctors;
pub mod entity_store;
pub mod prescriptions;
pub mod seed;
pub mod users;

pub use bills::{sort_bills, BillSortField, SortDirection};
pub use entity_store::{EntityStore, IdGenerator, StoreContext};
pub use prescriptions::matches_query;
pub use seed::{SeedData, SeedError};

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::reports::UploadError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} already exists: {id}")]
    Duplicate { entity: &'static str, id: String },

    #[error("Invalid {entity} patch: {reason}")]
    InvalidPatch { entity: &'static str, reason: String },

    #[error("Notification {id} is derived from an appointment and cannot be changed")]
    ReadOnly { id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl StoreError {
    pub fn not_found<T: Record>(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: T::ENTITY,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A record that can live in an [`EntityStore`].
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name used in errors and logs.
    const ENTITY: &'static str;
    /// Serialized name of the key field. Patches never overwrite it.
    const KEY_FIELD: &'static str;
    /// Prefix for generated keys.
    const KEY_PREFIX: &'static str = "";

    fn key(&self) -> &str;

    /// Prepare a freshly created record: take the generated key and stamp
    /// entity defaults (creation time, initial status).
    fn init_new(&mut self, key: String, now: NaiveDateTime);
}
