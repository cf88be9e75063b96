use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{EntityStore, StoreError};
use crate::models::{Bill, BillStatus};

impl EntityStore<Bill> {
    pub async fn by_patient(&self, patient_id: &str) -> Result<Vec<Bill>, StoreError> {
        self.select(self.latency().query, |b| b.patient_id == patient_id)
            .await
    }

    pub async fn by_status(&self, status: BillStatus) -> Result<Vec<Bill>, StoreError> {
        self.select(self.latency().query, |b| b.status == status).await
    }

    pub async fn pending(&self) -> Result<Vec<Bill>, StoreError> {
        self.select(self.latency().read_one, |b| b.status == BillStatus::Pending)
            .await
    }

    /// Set the status. Marking paid stamps `paid_at`; any other status
    /// clears it.
    pub async fn update_status(&self, id: &str, status: BillStatus) -> Result<Bill, StoreError> {
        let ctx = self.context();
        let updated = self
            .modify(id, self.latency().status, |b| {
                b.status = status;
                b.paid_at = (status == BillStatus::Paid).then(|| ctx.now());
            })
            .await?;
        tracing::info!(bill = id, status = status.as_str(), "Bill status changed");
        Ok(updated)
    }
}

// ═══════════════════════════════════════════
// Bill table sorting
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BillSortField {
    CreatedAt,
    Amount,
    Status,
    Patient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Stable sort of a bill table by one column.
pub fn sort_bills(bills: &mut [Bill], field: BillSortField, direction: SortDirection) {
    bills.sort_by(|a, b| {
        let ord = compare_by(a, b, field);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn compare_by(a: &Bill, b: &Bill, field: BillSortField) -> Ordering {
    match field {
        BillSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        BillSortField::Amount => a.amount.total_cmp(&b.amount),
        BillSortField::Status => a.status.as_str().cmp(b.status.as_str()),
        BillSortField::Patient => a
            .patient_name
            .as_deref()
            .unwrap_or(a.patient_id.as_str())
            .cmp(b.patient_name.as_deref().unwrap_or(b.patient_id.as_str())),
    }
}
