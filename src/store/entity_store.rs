use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{Record, StoreError};
use crate::clock::Clock;
use crate::config::LatencyProfile;

// ═══════════════════════════════════════════════════════════
// IdGenerator
// ═══════════════════════════════════════════════════════════

/// Time-derived keys: milliseconds since the epoch, bumped so that two
/// calls in the same millisecond still differ.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, now: NaiveDateTime) -> i64 {
        let candidate = now.and_utc().timestamp_millis();
        let mut prev = self.last.load(Ordering::Acquire);
        loop {
            let next = candidate.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// StoreContext: shared by every store of one CoreState
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct StoreContext {
    pub latency: LatencyProfile,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<IdGenerator>,
}

impl StoreContext {
    pub fn new(latency: LatencyProfile, clock: Arc<dyn Clock>) -> Self {
        Self {
            latency,
            clock,
            ids: Arc::new(IdGenerator::new()),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

// ═══════════════════════════════════════════════════════════
// EntityStore
// ═══════════════════════════════════════════════════════════

/// Ordered in-memory collection with CRUD and artificial latency.
///
/// Reads return owned clones. Concurrent writers to one key are not
/// serialized beyond the lock: whichever finishes its delay last wins.
pub struct EntityStore<T: Record> {
    records: RwLock<Vec<T>>,
    ctx: StoreContext,
}

impl<T: Record> EntityStore<T> {
    pub fn new(ctx: StoreContext) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            ctx,
        }
    }

    /// Build a store from seed records. Keys must be unique.
    pub fn with_records(records: Vec<T>, ctx: StoreContext) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.key().to_string()) {
                return Err(StoreError::Duplicate {
                    entity: T::ENTITY,
                    id: record.key().to_string(),
                });
            }
        }
        tracing::debug!(entity = T::ENTITY, count = records.len(), "Store seeded");
        Ok(Self {
            records: RwLock::new(records),
            ctx,
        })
    }

    pub fn context(&self) -> &StoreContext {
        &self.ctx
    }

    pub fn latency(&self) -> &LatencyProfile {
        &self.ctx.latency
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, Vec<T>>, StoreError> {
        self.records.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, Vec<T>>, StoreError> {
        self.records.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Current contents without any delay.
    pub fn snapshot(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.read_lock()?.clone())
    }

    // ── CRUD ───────────────────────────────────────────────

    pub async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        self.ctx.pause(self.ctx.latency.read_all).await;
        let records = self.read_lock()?;
        tracing::debug!(entity = T::ENTITY, count = records.len(), "get_all");
        Ok(records.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.ctx.pause(self.ctx.latency.read_one).await;
        let records = self.read_lock()?;
        Ok(records.iter().find(|r| r.key() == id).cloned())
    }

    /// Assign a key, stamp defaults, append.
    pub async fn create(&self, mut record: T) -> Result<T, StoreError> {
        self.ctx.pause(self.ctx.latency.create).await;

        let now = self.ctx.now();
        let key = format!("{}{}", T::KEY_PREFIX, self.ctx.ids.next(now));
        record.init_new(key, now);

        let mut records = self.write_lock()?;
        if records.iter().any(|r| r.key() == record.key()) {
            return Err(StoreError::Duplicate {
                entity: T::ENTITY,
                id: record.key().to_string(),
            });
        }
        records.push(record.clone());
        tracing::info!(entity = T::ENTITY, id = record.key(), "Record created");
        Ok(record)
    }

    /// Shallow-merge a JSON object onto the record with key `id`.
    ///
    /// Top-level fields in `patch` replace the stored ones; the key field
    /// is ignored. On any error the store is left untouched.
    pub async fn update(&self, id: &str, patch: Value) -> Result<T, StoreError> {
        self.ctx.pause(self.ctx.latency.update).await;

        let mut records = self.write_lock()?;
        let Some(index) = records.iter().position(|r| r.key() == id) else {
            tracing::warn!(entity = T::ENTITY, id, "Update on missing record");
            return Err(StoreError::not_found::<T>(id));
        };

        let merged = merge_patch(&records[index], &patch)?;
        records[index] = merged.clone();
        tracing::debug!(entity = T::ENTITY, id, "Record updated");
        Ok(merged)
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.ctx.pause(self.ctx.latency.remove).await;

        let mut records = self.write_lock()?;
        let Some(index) = records.iter().position(|r| r.key() == id) else {
            tracing::warn!(entity = T::ENTITY, id, "Delete on missing record");
            return Err(StoreError::not_found::<T>(id));
        };
        records.remove(index);
        tracing::info!(entity = T::ENTITY, id, "Record deleted");
        Ok(())
    }

    // ── Building blocks for entity-specific queries ─────────

    pub(crate) async fn select<F>(&self, delay: Duration, pred: F) -> Result<Vec<T>, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        self.ctx.pause(delay).await;
        let records = self.read_lock()?;
        Ok(records.iter().filter(|r| pred(r)).cloned().collect())
    }

    pub(crate) async fn count_where<F>(&self, delay: Duration, pred: F) -> Result<usize, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        self.ctx.pause(delay).await;
        let records = self.read_lock()?;
        Ok(records.iter().filter(|r| pred(r)).count())
    }

    /// In-place typed mutation of one record.
    pub(crate) async fn modify<F>(&self, id: &str, delay: Duration, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut T),
    {
        self.ctx.pause(delay).await;
        let mut records = self.write_lock()?;
        let record = records
            .iter_mut()
            .find(|r| r.key() == id)
            .ok_or_else(|| StoreError::not_found::<T>(id))?;
        f(record);
        Ok(record.clone())
    }

    pub(crate) async fn modify_all<F>(&self, delay: Duration, mut f: F) -> Result<Vec<T>, StoreError>
    where
        F: FnMut(&mut T),
    {
        self.ctx.pause(delay).await;
        let mut records = self.write_lock()?;
        records.iter_mut().for_each(&mut f);
        Ok(records.clone())
    }
}

fn merge_patch<T: Record>(current: &T, patch: &Value) -> Result<T, StoreError> {
    shallow_merge(current, patch, T::ENTITY, Some(T::KEY_FIELD))
}

/// Overlay the top-level fields of `patch` onto `current`, skipping
/// `protected`, and type-check the result.
pub(crate) fn shallow_merge<T>(
    current: &T,
    patch: &Value,
    entity: &'static str,
    protected: Option<&str>,
) -> Result<T, StoreError>
where
    T: Serialize + DeserializeOwned,
{
    let invalid = |reason: String| StoreError::InvalidPatch { entity, reason };

    let Value::Object(fields) = patch else {
        return Err(invalid("patch must be a JSON object".into()));
    };

    let mut merged = serde_json::to_value(current).map_err(|e| invalid(e.to_string()))?;
    let Some(target) = merged.as_object_mut() else {
        return Err(invalid("record does not serialize to an object".into()));
    };

    for (field, value) in fields {
        if protected == Some(field.as_str()) {
            continue;
        }
        target.insert(field.clone(), value.clone());
    }

    serde_json::from_value(merged).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bill, BillStatus, Patient};
    use crate::test_support::{bill, instant_context, patient};
    use serde_json::json;

    fn bill_store(bills: Vec<Bill>) -> EntityStore<Bill> {
        EntityStore::with_records(bills, instant_context()).unwrap()
    }

    #[test]
    fn id_generator_is_strictly_increasing_within_a_millisecond() {
        let ids = IdGenerator::new();
        let now = crate::test_support::at(2024, 1, 15, 9, 0);
        let a = ids.next(now);
        let b = ids.next(now);
        let c = ids.next(now);
        assert_eq!(a, now.and_utc().timestamp_millis());
        assert!(a < b && b < c);
    }

    #[test]
    fn seeding_rejects_duplicate_keys() {
        let result = EntityStore::with_records(
            vec![bill("B1", 10.0, BillStatus::Pending), bill("B1", 20.0, BillStatus::Paid)],
            instant_context(),
        );
        assert!(matches!(result, Err(StoreError::Duplicate { id, .. }) if id == "B1"));
    }

    #[tokio::test]
    async fn get_all_returns_insertion_order() {
        let store = bill_store(vec![
            bill("B2", 10.0, BillStatus::Pending),
            bill("B1", 20.0, BillStatus::Paid),
        ]);
        let all = store.get_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["B2", "B1"]);
    }

    #[tokio::test]
    async fn get_by_id_hit_and_miss() {
        let store = bill_store(vec![bill("B1", 20.0, BillStatus::Paid)]);
        assert_eq!(store.get_by_id("B1").await.unwrap().unwrap().amount, 20.0);
        assert!(store.get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn returned_records_are_copies() {
        let store = bill_store(vec![bill("B1", 20.0, BillStatus::Pending)]);
        let mut all = store.get_all().await.unwrap();
        all[0].amount = 999.0;
        assert_eq!(store.get_by_id("B1").await.unwrap().unwrap().amount, 20.0);
    }

    #[tokio::test]
    async fn create_assigns_time_derived_unique_ids() {
        let store = bill_store(vec![]);
        let a = store.create(bill("", 10.0, BillStatus::Paid)).await.unwrap();
        let b = store.create(bill("", 15.0, BillStatus::Paid)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.parse::<i64>().is_ok());
        // New bills always start pending, whatever the form sent.
        assert_eq!(a.status, BillStatus::Pending);
        assert_eq!(store.snapshot().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_keeps_supplied_user_key_and_rejects_duplicates() {
        let store = EntityStore::with_records(vec![patient("P001")], instant_context()).unwrap();
        let created = store.create(patient("P002")).await.unwrap();
        assert_eq!(created.user_id, "P002");
        assert!(created.created_at.is_some());

        let err = store.create(patient("P001")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { entity: "Patient", .. }));

        let generated: Patient = store.create(patient("")).await.unwrap();
        assert!(!generated.user_id.is_empty());
    }

    #[tokio::test]
    async fn update_accepts_utc_timestamps() {
        let store = bill_store(vec![bill("B1", 20.0, BillStatus::Pending)]);
        let updated = store
            .update("B1", json!({ "paidAt": "2024-01-16T12:00:00.000Z" }))
            .await
            .unwrap();
        assert_eq!(
            updated.paid_at,
            crate::clock::parse_timestamp("2024-01-16T12:00:00Z")
        );
    }

    #[tokio::test]
    async fn update_shallow_merges() {
        let store = bill_store(vec![bill("B1", 20.0, BillStatus::Pending)]);
        let updated = store
            .update("B1", json!({ "amount": 45.5, "description": "X-ray" }))
            .await
            .unwrap();
        assert_eq!(updated.amount, 45.5);
        assert_eq!(updated.description.as_deref(), Some("X-ray"));
        assert_eq!(updated.status, BillStatus::Pending);
        assert_eq!(store.snapshot().unwrap()[0], updated);
    }

    #[tokio::test]
    async fn update_replaces_nested_values_wholesale() {
        let store = EntityStore::with_records(vec![patient("P001")], instant_context()).unwrap();
        let updated = store
            .update("P001", json!({ "allergies": ["Latex"] }))
            .await
            .unwrap();
        assert_eq!(updated.allergies, ["Latex"]);
    }

    #[tokio::test]
    async fn update_never_changes_the_key() {
        let store = bill_store(vec![bill("B1", 20.0, BillStatus::Pending)]);
        let updated = store.update("B1", json!({ "id": "B9", "amount": 1.0 })).await.unwrap();
        assert_eq!(updated.id, "B1");
        assert!(store.get_by_id("B9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_id_fails_without_mutation() {
        let store = bill_store(vec![bill("B1", 20.0, BillStatus::Pending)]);
        let before = store.snapshot().unwrap();
        let err = store.update("B404", json!({ "amount": 1.0 })).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.snapshot().unwrap(), before);
    }

    #[tokio::test]
    async fn invalid_patch_leaves_store_untouched() {
        let store = bill_store(vec![bill("B1", 20.0, BillStatus::Pending)]);
        let before = store.snapshot().unwrap();

        let err = store.update("B1", json!({ "status": "refunded" })).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPatch { entity: "Bill", .. }));

        let err = store.update("B1", json!(["not", "an", "object"])).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPatch { .. }));

        assert_eq!(store.snapshot().unwrap(), before);
    }

    #[tokio::test]
    async fn delete_twice_fails_the_second_time() {
        let store = bill_store(vec![bill("B1", 20.0, BillStatus::Pending)]);
        store.delete("B1").await.unwrap();
        let err = store.delete("B1").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Bill", ref id } if id == "B1"));
        assert!(store.snapshot().unwrap().is_empty());
    }

    #[tokio::test]
    async fn modify_reports_missing_record() {
        let store = bill_store(vec![]);
        let err = store
            .modify("B1", Duration::ZERO, |b| b.amount = 0.0)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn latency_is_applied_before_reads() {
        let mut ctx = instant_context();
        ctx.latency.read_all = Duration::from_millis(30);
        let store: EntityStore<Bill> = EntityStore::new(ctx);
        let started = std::time::Instant::now();
        store.get_all().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = StoreError::not_found::<crate::models::Appointment>("A9");
        assert_eq!(err.to_string(), "Appointment not found: A9");
    }
}
