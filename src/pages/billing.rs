use std::sync::{Arc, Mutex};

use super::{toast_outcome, PageController, PageState};
use crate::core_state::{CoreError, CoreState};
use crate::models::{Bill, BillStatus};
use crate::store::{sort_bills, BillSortField, SortDirection};

/// Active column and direction of the bill table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillSort {
    pub field: BillSortField,
    pub direction: SortDirection,
}

impl Default for BillSort {
    fn default() -> Self {
        Self {
            field: BillSortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl BillSort {
    /// Clicking the active column flips direction; a new column starts
    /// ascending.
    pub fn clicked(self, field: BillSortField) -> Self {
        if self.field == field {
            Self {
                field,
                direction: self.direction.toggled(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Asc,
            }
        }
    }
}

pub struct BillingPage {
    core: Arc<CoreState>,
    controller: PageController<Vec<Bill>>,
    sort: Mutex<BillSort>,
}

impl BillingPage {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            controller: PageController::new("bills"),
            sort: Mutex::new(BillSort::default()),
        }
    }

    /// Loaded bills, already in table order.
    pub fn state(&self) -> PageState<Vec<Bill>> {
        self.controller.state()
    }

    pub fn sort(&self) -> BillSort {
        self.sort.lock().map(|s| *s).unwrap_or_default()
    }

    pub async fn mount(&self) -> bool {
        self.load().await
    }

    async fn load(&self) -> bool {
        let store = &self.core.bills;
        self.controller
            .run(self.core.toasts(), async {
                let mut bills = store.get_all().await?;
                // Sort after the fetch; the column may change while it runs.
                let sort = self.sort();
                sort_bills(&mut bills, sort.field, sort.direction);
                Ok::<_, CoreError>(bills)
            })
            .await
    }

    /// Explicit refresh button.
    pub async fn refresh(&self) -> bool {
        let applied = self.load().await;
        if applied && self.state().error().is_none() {
            self.core.toasts().success("Bills refreshed");
        }
        applied
    }

    pub fn sort_by(&self, field: BillSortField) -> BillSort {
        let next = match self.sort.lock() {
            Ok(mut sort) => {
                *sort = sort.clicked(field);
                *sort
            }
            Err(_) => BillSort::default().clicked(field),
        };
        self.controller
            .patch(|bills| sort_bills(bills, next.field, next.direction));
        next
    }

    pub async fn update_status(&self, id: &str, status: BillStatus) -> Result<Bill, CoreError> {
        let result = self
            .core
            .bills
            .update_status(id, status)
            .await
            .map_err(CoreError::from);
        let updated = toast_outcome(
            self.core.toasts(),
            result,
            |b| format!("Bill marked as {}", b.status),
            "Failed to update bill status",
        )?;

        let sort = self.sort();
        self.controller.patch(|bills| {
            if let Some(slot) = bills.iter_mut().find(|b| b.id == updated.id) {
                *slot = updated.clone();
            }
            sort_bills(bills, sort.field, sort.direction);
        });
        Ok(updated)
    }
}
