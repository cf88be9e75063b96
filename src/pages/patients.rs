use std::sync::{Arc, Mutex};

use super::{toast_outcome, PageController, PageState};
use crate::core_state::{CoreError, CoreState};
use crate::directory::{patient_profiles, search_patients, PatientProfile};
use crate::models::MedicalReport;
use crate::reports::{ReportMetadata, UploadFile};
use crate::validation::PatientForm;

/// Result of a multi-file upload.
#[derive(Debug, Default)]
pub struct UploadSummary {
    pub uploaded: Vec<MedicalReport>,
    /// File name and reason for each rejected file.
    pub failed: Vec<(String, String)>,
}

pub struct PatientsPage {
    core: Arc<CoreState>,
    controller: PageController<Vec<PatientProfile>>,
    query: Mutex<String>,
}

impl PatientsPage {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            controller: PageController::new("patients"),
            query: Mutex::new(String::new()),
        }
    }

    pub fn state(&self) -> PageState<Vec<PatientProfile>> {
        self.controller.state()
    }

    pub fn query(&self) -> String {
        self.query.lock().map(|q| q.clone()).unwrap_or_default()
    }

    pub async fn mount(&self) -> bool {
        self.refresh().await
    }

    /// Reload, keeping the current search.
    pub async fn refresh(&self) -> bool {
        let query = self.query();
        let core = &self.core;
        self.controller
            .run(core.toasts(), async {
                let profiles = patient_profiles(&core.patients, &core.users).await?;
                Ok::<_, CoreError>(search_patients(&profiles, &query))
            })
            .await
    }

    pub async fn search(&self, query: &str) -> bool {
        if let Ok(mut q) = self.query.lock() {
            *q = query.to_string();
        }
        self.refresh().await
    }

    pub async fn register(&self, form: &PatientForm) -> Result<PatientProfile, CoreError> {
        let result = self.core.register_patient(form).await;
        let result = toast_outcome(
            self.core.toasts(),
            result,
            |_| "Patient registered successfully".to_string(),
            "Failed to register patient",
        );
        if result.is_ok() {
            self.refresh().await;
        }
        result
    }

    /// Upload each file independently; one rejection does not stop the rest.
    pub async fn upload_reports(
        &self,
        patient_id: &str,
        files: &[UploadFile],
        metadata: ReportMetadata,
    ) -> UploadSummary {
        let toasts = self.core.toasts();
        let mut summary = UploadSummary::default();
        if files.is_empty() {
            toasts.error("Please select files to upload");
            return summary;
        }

        for file in files {
            match self.core.reports.upload(patient_id, file, metadata.clone()).await {
                Ok(report) => summary.uploaded.push(report),
                Err(e) => {
                    toasts.error(format!("Failed to upload {}: {e}", file.name));
                    summary.failed.push((file.name.clone(), e.to_string()));
                }
            }
        }

        if summary.failed.is_empty() {
            toasts.success(format!("Successfully uploaded {} file(s)", summary.uploaded.len()));
        } else {
            toasts.error("Some files failed to upload");
        }
        tracing::info!(
            patient = patient_id,
            uploaded = summary.uploaded.len(),
            failed = summary.failed.len(),
            "Report upload finished"
        );
        summary
    }
}
