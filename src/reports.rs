//! Medical report attachments: upload validation, storage, download.
//!
//! Files never touch disk. The bytes are embedded in the report record as
//! a base64 `data:` URL, which doubles as the download link.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MAX_UPLOAD_BYTES;
use crate::models::MedicalReport;
use crate::store::{EntityStore, StoreError};

/// MIME types a report may have.
pub const ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/jpg",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("{file_name}: file type {mime} not supported. Please upload PDF, DOC, DOCX, or image files.")]
    UnsupportedType { file_name: String, mime: String },

    #[error("{file_name}: file size must be less than 10MB.")]
    TooLarge { file_name: String, size: u64 },
}

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    /// Declared content type; guessed from the extension when absent.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn mime(&self) -> String {
        match &self.content_type {
            Some(ct) if !ct.trim().is_empty() => ct.trim().to_ascii_lowercase(),
            _ => mime_guess::from_path(&self.name)
                .first_raw()
                .unwrap_or("application/octet-stream")
                .to_string(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime(), STANDARD.encode(&self.bytes))
    }
}

/// Optional details entered alongside an upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub uploaded_by: Option<String>,
    pub report_type: Option<String>,
    pub description: Option<String>,
}

/// A report plus the link to fetch its contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDownload {
    #[serde(flatten)]
    pub report: MedicalReport,
    pub download_url: String,
}

pub fn validate_file(file: &UploadFile) -> Result<(), UploadError> {
    let mime = file.mime();
    if !ALLOWED_TYPES.contains(&mime.as_str()) {
        return Err(UploadError::UnsupportedType {
            file_name: file.name.clone(),
            mime,
        });
    }
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            file_name: file.name.clone(),
            size: file.size(),
        });
    }
    Ok(())
}

/// Human-readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

impl EntityStore<MedicalReport> {
    pub async fn by_patient(&self, patient_id: &str) -> Result<Vec<MedicalReport>, StoreError> {
        self.select(self.latency().query, |r| r.patient_id == patient_id)
            .await
    }

    pub async fn count_for_patient(&self, patient_id: &str) -> Result<usize, StoreError> {
        self.count_where(self.latency().count, |r| r.patient_id == patient_id)
            .await
    }

    /// Validate, encode and store one file.
    pub async fn upload(
        &self,
        patient_id: &str,
        file: &UploadFile,
        metadata: ReportMetadata,
    ) -> Result<MedicalReport, StoreError> {
        if let Err(e) = validate_file(file) {
            tracing::warn!(file = %file.name, error = %e, "Upload rejected");
            return Err(e.into());
        }

        self.context().pause(self.latency().upload).await;

        let report = MedicalReport {
            id: String::new(),
            patient_id: patient_id.to_string(),
            file_name: file.name.clone(),
            file_type: file.mime(),
            file_size: file.size(),
            uploaded_by: metadata
                .uploaded_by
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Unknown Doctor".to_string()),
            uploaded_at: self.context().now(),
            report_type: metadata
                .report_type
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "General".to_string()),
            description: metadata.description.unwrap_or_default(),
            file_data: Some(file.data_url()),
        };

        self.create(report).await
    }

    pub async fn download(&self, report_id: &str) -> Result<ReportDownload, StoreError> {
        let report = self
            .get_by_id(report_id)
            .await?
            .ok_or_else(|| StoreError::not_found::<MedicalReport>(report_id))?;
        let download_url = report.file_data.clone().unwrap_or_else(|| "#".to_string());
        Ok(ReportDownload {
            report,
            download_url,
        })
    }
}
