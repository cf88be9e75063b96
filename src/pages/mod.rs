//! Page controllers.
//!
//! Each page owns a [`PageController`] driving
//! `Idle → Loading → {Error | Empty | Loaded}`. Every load trigger (mount,
//! refresh, search) takes a fresh [`LoadTicket`]; when a load completes,
//! its result is applied only if no newer trigger has been issued since.

pub mod appointments;
pub mod billing;
pub mod dashboard;
pub mod doctors;
pub mod notifications;
pub mod patients;
pub mod prescriptions;

pub use appointments::AppointmentsPage;
pub use billing::BillingPage;
pub use dashboard::DashboardPage;
pub use doctors::DoctorsPage;
pub use notifications::NotificationsPage;
pub use patients::PatientsPage;
pub use prescriptions::PrescriptionsPage;

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::core_state::{CoreError, ToastLog};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum PageState<T> {
    Idle,
    Loading,
    Error(String),
    Empty,
    Loaded(T),
}

impl<T> PageState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Whether loaded data should render as the empty state.
pub trait Emptiness {
    fn is_empty_view(&self) -> bool;
}

impl<T> Emptiness for Vec<T> {
    fn is_empty_view(&self) -> bool {
        self.is_empty()
    }
}

/// Generation number of one load trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

struct Slot<T> {
    state: PageState<T>,
    latest: u64,
}

pub struct PageController<T> {
    page: &'static str,
    slot: Mutex<Slot<T>>,
}

impl<T: Clone + Emptiness> PageController<T> {
    pub fn new(page: &'static str) -> Self {
        Self {
            page,
            slot: Mutex::new(Slot {
                state: PageState::Idle,
                latest: 0,
            }),
        }
    }

    pub fn page(&self) -> &'static str {
        self.page
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn state(&self) -> PageState<T> {
        self.lock().state.clone()
    }

    /// Issue a new ticket and enter `Loading`. Any ticket issued earlier
    /// is now stale.
    pub fn begin(&self) -> LoadTicket {
        let mut slot = self.lock();
        slot.latest += 1;
        slot.state = PageState::Loading;
        LoadTicket(slot.latest)
    }

    /// Apply a load result. Returns `false` when `ticket` is stale and the
    /// result was dropped.
    pub fn complete(&self, ticket: LoadTicket, result: Result<T, CoreError>, toasts: &ToastLog) -> bool {
        let mut slot = self.lock();
        if ticket.0 != slot.latest {
            tracing::debug!(page = self.page, ticket = ticket.0, latest = slot.latest, "Stale load dropped");
            return false;
        }

        slot.state = match result {
            Ok(data) if data.is_empty_view() => PageState::Empty,
            Ok(data) => PageState::Loaded(data),
            Err(e) => {
                tracing::warn!(page = self.page, error = %e, "Page load failed");
                toasts.error(format!("Failed to load {}", self.page));
                PageState::Error(e.to_string())
            }
        };
        true
    }

    /// `begin`, await `load`, `complete`.
    pub async fn run<F>(&self, toasts: &ToastLog, load: F) -> bool
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        let ticket = self.begin();
        let result = load.await;
        self.complete(ticket, result, toasts)
    }

    /// Edit loaded data in place after a successful mutation. No-op in any
    /// other state. An edit that empties the data moves to `Empty`.
    pub fn patch<F>(&self, edit: F)
    where
        F: FnOnce(&mut T),
    {
        let mut slot = self.lock();
        let emptied = match &mut slot.state {
            PageState::Loaded(data) => {
                edit(data);
                data.is_empty_view()
            }
            _ => false,
        };
        if emptied {
            slot.state = PageState::Empty;
        }
    }
}

/// Push the toast for a mutation outcome and pass the result through.
/// Form errors toast their own summary; anything else toasts `failure`.
pub(crate) fn toast_outcome<T>(
    toasts: &ToastLog,
    result: Result<T, CoreError>,
    success: impl FnOnce(&T) -> String,
    failure: &str,
) -> Result<T, CoreError> {
    match &result {
        Ok(value) => toasts.success(success(value)),
        Err(CoreError::Validation(errors)) => toasts.error(errors.to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "{failure}");
            toasts.error(failure);
        }
    }
    result
}
