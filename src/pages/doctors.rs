use std::sync::{Arc, Mutex};

use super::{toast_outcome, PageController, PageState};
use crate::core_state::{CoreError, CoreState};
use crate::directory::{search_doctors, DoctorProfile};
use crate::models::WeeklyAvailability;
use crate::validation::DoctorForm;

pub struct DoctorsPage {
    core: Arc<CoreState>,
    controller: PageController<Vec<DoctorProfile>>,
    specialization: Mutex<String>,
}

impl DoctorsPage {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            controller: PageController::new("doctors"),
            specialization: Mutex::new(String::new()),
        }
    }

    pub fn state(&self) -> PageState<Vec<DoctorProfile>> {
        self.controller.state()
    }

    pub async fn mount(&self) -> bool {
        self.refresh().await
    }

    pub async fn refresh(&self) -> bool {
        let specialization = self
            .specialization
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        let core = &self.core;
        self.controller
            .run(core.toasts(), async {
                search_doctors(&core.doctors, &core.users, &specialization)
                    .await
                    .map_err(CoreError::from)
            })
            .await
    }

    pub async fn search(&self, specialization: &str) -> bool {
        if let Ok(mut s) = self.specialization.lock() {
            *s = specialization.to_string();
        }
        self.refresh().await
    }

    pub async fn add(&self, form: &DoctorForm) -> Result<DoctorProfile, CoreError> {
        let result = self.core.add_doctor(form).await;
        let result = toast_outcome(
            self.core.toasts(),
            result,
            |_| "Doctor added successfully".to_string(),
            "Failed to add doctor",
        );
        if result.is_ok() {
            self.refresh().await;
        }
        result
    }

    pub async fn update_availability(
        &self,
        user_id: &str,
        availability: WeeklyAvailability,
    ) -> Result<(), CoreError> {
        let result = self
            .core
            .doctors
            .update_availability(user_id, availability)
            .await
            .map_err(CoreError::from);
        let updated = toast_outcome(
            self.core.toasts(),
            result,
            |_| "Availability updated".to_string(),
            "Failed to update availability",
        )?;

        self.controller.patch(|profiles| {
            if let Some(profile) = profiles.iter_mut().find(|p| p.doctor.user_id == user_id) {
                profile.doctor = updated;
            }
        });
        Ok(())
    }
}
