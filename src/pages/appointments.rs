use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use super::{toast_outcome, PageController, PageState};
use crate::core_state::{CoreError, CoreState};
use crate::models::{Appointment, AppointmentStatus};
use crate::validation::AppointmentForm;

pub struct AppointmentsPage {
    core: Arc<CoreState>,
    controller: PageController<Vec<Appointment>>,
    selected_date: Mutex<Option<NaiveDate>>,
}

impl AppointmentsPage {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            controller: PageController::new("appointments"),
            selected_date: Mutex::new(None),
        }
    }

    pub fn state(&self) -> PageState<Vec<Appointment>> {
        self.controller.state()
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date.lock().ok().and_then(|d| *d)
    }

    pub async fn mount(&self) -> bool {
        self.refresh().await
    }

    /// All appointments, or only the selected day's.
    pub async fn refresh(&self) -> bool {
        let date = self.selected_date();
        let store = &self.core.appointments;
        self.controller
            .run(self.core.toasts(), async {
                let loaded = match date {
                    Some(date) => store.by_date(date).await,
                    None => store.get_all().await,
                };
                loaded.map_err(CoreError::from)
            })
            .await
    }

    pub async fn select_date(&self, date: Option<NaiveDate>) -> bool {
        if let Ok(mut selected) = self.selected_date.lock() {
            *selected = date;
        }
        self.refresh().await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, CoreError> {
        let result = self
            .core
            .appointments
            .update_status(id, status)
            .await
            .map_err(CoreError::from);
        let updated = toast_outcome(
            self.core.toasts(),
            result,
            |a| format!("Appointment {} successfully", a.status),
            "Failed to update appointment",
        )?;

        self.controller.patch(|list| {
            if let Some(slot) = list.iter_mut().find(|a| a.id == updated.id) {
                *slot = updated.clone();
            }
        });
        Ok(updated)
    }

    pub async fn create(&self, form: &AppointmentForm) -> Result<Appointment, CoreError> {
        let result = self.core.book_appointment(form).await;
        let result = toast_outcome(
            self.core.toasts(),
            result,
            |_| "Appointment created successfully".to_string(),
            "Failed to create appointment",
        );
        if result.is_ok() {
            self.refresh().await;
        }
        result
    }

    /// Month grid for the calendar view. Not tracked by the page state.
    pub async fn calendar(
        &self,
        year: i32,
        month: u32,
    ) -> Result<BTreeMap<NaiveDate, Vec<Appointment>>, CoreError> {
        match self.core.appointments.calendar_month(year, month).await {
            Ok(grid) => Ok(grid),
            Err(e) => {
                self.core.toasts().error("Failed to load appointments");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, seeded_core};

    fn page() -> AppointmentsPage {
        AppointmentsPage::new(seeded_core(2024, 1, 14, 9, 0))
    }

    #[tokio::test]
    async fn selected_date_narrows_the_list() {
        let page = page();
        page.mount().await;
        assert_eq!(page.state().data().unwrap().len(), 5);

        page.select_date(Some(date(2024, 1, 22))).await;
        let state = page.state();
        let day = state.data().unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].id, "A004");

        page.select_date(Some(date(2024, 1, 1))).await;
        assert_eq!(page.state(), PageState::Empty);

        page.select_date(None).await;
        assert_eq!(page.state().data().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn status_update_patches_and_toasts() {
        let page = page();
        page.mount().await;
        page.update_status("A004", AppointmentStatus::Cancelled)
            .await
            .unwrap();

        let state = page.state();
        let a004 = state.data().unwrap().iter().find(|a| a.id == "A004").unwrap();
        assert_eq!(a004.status, AppointmentStatus::Cancelled);
        assert_eq!(
            page.core.toasts().last().unwrap().message,
            "Appointment cancelled successfully"
        );

        assert!(page.update_status("A404", AppointmentStatus::Completed).await.is_err());
        assert_eq!(
            page.core.toasts().last().unwrap().message,
            "Failed to update appointment"
        );
    }

    #[tokio::test]
    async fn create_reloads_list() {
        let page = page();
        page.mount().await;
        let form = AppointmentForm {
            patient_id: "P002".into(),
            doctor_id: "D003".into(),
            date: "2024-01-19".into(),
            time: "09:30".into(),
            ..Default::default()
        };
        let created = page.create(&form).await.unwrap();
        assert_eq!(created.patient_name.as_deref(), Some("Ben Okafor"));
        assert_eq!(page.state().data().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn calendar_groups_month() {
        let page = page();
        let grid = page.calendar(2024, 1).await.unwrap();
        assert_eq!(grid.values().map(Vec::len).sum::<usize>(), 5);
        assert!(grid.contains_key(&date(2024, 1, 15)));
    }
}
