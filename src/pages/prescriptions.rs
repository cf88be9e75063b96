use std::sync::{Arc, Mutex};

use super::{toast_outcome, PageController, PageState};
use crate::core_state::{CoreError, CoreState};
use crate::models::Prescription;
use crate::store::matches_query;
use crate::validation::PrescriptionForm;

/// Holds the full list; the search box filters it client-side.
pub struct PrescriptionsPage {
    core: Arc<CoreState>,
    controller: PageController<Vec<Prescription>>,
    query: Mutex<String>,
}

impl PrescriptionsPage {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            controller: PageController::new("prescriptions"),
            query: Mutex::new(String::new()),
        }
    }

    pub fn state(&self) -> PageState<Vec<Prescription>> {
        self.controller.state()
    }

    pub async fn mount(&self) -> bool {
        self.refresh().await
    }

    pub async fn refresh(&self) -> bool {
        let store = &self.core.prescriptions;
        self.controller
            .run(self.core.toasts(), async {
                store.get_all().await.map_err(CoreError::from)
            })
            .await
    }

    pub fn set_query(&self, query: &str) {
        if let Ok(mut q) = self.query.lock() {
            *q = query.to_string();
        }
    }

    /// Loaded prescriptions matching the search box.
    pub fn visible(&self) -> Vec<Prescription> {
        let query = self.query.lock().map(|q| q.clone()).unwrap_or_default();
        match self.state() {
            PageState::Loaded(all) => all
                .into_iter()
                .filter(|p| matches_query(p, &query))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub async fn create(&self, form: &PrescriptionForm) -> Result<Prescription, CoreError> {
        let result = self.core.write_prescription(form).await;
        let result = toast_outcome(
            self.core.toasts(),
            result,
            |_| "Prescription created successfully".to_string(),
            "Failed to create prescription",
        );
        if result.is_ok() {
            self.refresh().await;
        }
        result
    }

    pub fn download(&self, prescription: &Prescription) {
        let patient = prescription.patient_name.as_deref().unwrap_or("patient");
        self.core
            .toasts()
            .success(format!("Downloading prescription for {patient}"));
    }
}
