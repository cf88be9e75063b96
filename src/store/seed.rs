//! Seed fixtures.
//!
//! Every collection ships as a bundled JSON file. A seed directory can
//! override any of them with its own `<collection>.json`; collections
//! without an override fall back to the bundled copy.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::StoreError;
use crate::models::{
    Appointment, Bill, Doctor, MedicalReport, Notification, Patient, Prescription, User,
};

const USERS: &str = include_str!("../../fixtures/users.json");
const PATIENTS: &str = include_str!("../../fixtures/patients.json");
const DOCTORS: &str = include_str!("../../fixtures/doctors.json");
const APPOINTMENTS: &str = include_str!("../../fixtures/appointments.json");
const BILLS: &str = include_str!("../../fixtures/bills.json");
const PRESCRIPTIONS: &str = include_str!("../../fixtures/prescriptions.json");
const NOTIFICATIONS: &str = include_str!("../../fixtures/notifications.json");
const REPORTS: &str = include_str!("../../fixtures/reports.json");

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Cannot read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed fixture {file}: {source}")]
    Parse {
        file: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// All collections a `CoreState` starts from.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub users: Vec<User>,
    pub patients: Vec<Patient>,
    pub doctors: Vec<Doctor>,
    pub appointments: Vec<Appointment>,
    pub bills: Vec<Bill>,
    pub prescriptions: Vec<Prescription>,
    pub notifications: Vec<Notification>,
    pub reports: Vec<MedicalReport>,
}

impl SeedData {
    /// The fixtures compiled into the binary.
    pub fn bundled() -> Result<Self, SeedError> {
        Self::load(None)
    }

    /// Bundled fixtures, with per-collection overrides from `dir`.
    pub fn load(dir: Option<&Path>) -> Result<Self, SeedError> {
        let seed = Self {
            users: collection("users", USERS, dir)?,
            patients: collection("patients", PATIENTS, dir)?,
            doctors: collection("doctors", DOCTORS, dir)?,
            appointments: collection("appointments", APPOINTMENTS, dir)?,
            bills: collection("bills", BILLS, dir)?,
            prescriptions: collection("prescriptions", PRESCRIPTIONS, dir)?,
            notifications: collection("notifications", NOTIFICATIONS, dir)?,
            reports: collection("reports", REPORTS, dir)?,
        };
        tracing::info!(
            users = seed.users.len(),
            patients = seed.patients.len(),
            doctors = seed.doctors.len(),
            appointments = seed.appointments.len(),
            bills = seed.bills.len(),
            prescriptions = seed.prescriptions.len(),
            notifications = seed.notifications.len(),
            reports = seed.reports.len(),
            overrides = ?dir,
            "Seed data loaded"
        );
        Ok(seed)
    }
}

fn collection<T: DeserializeOwned>(
    name: &str,
    bundled: &str,
    dir: Option<&Path>,
) -> Result<Vec<T>, SeedError> {
    let file = format!("{name}.json");

    if let Some(dir) = dir {
        let path = dir.join(&file);
        if path.is_file() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|source| SeedError::Io { path: path.clone(), source })?;
            tracing::debug!(path = %path.display(), "Using fixture override");
            return serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
                file: path.display().to_string(),
                source,
            });
        }
    }

    serde_json::from_str(bundled).map_err(|source| SeedError::Parse { file, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_fixtures_parse() {
        let seed = SeedData::bundled().unwrap();
        assert!(!seed.users.is_empty());
        assert!(!seed.patients.is_empty());
        assert!(!seed.doctors.is_empty());
        assert!(!seed.appointments.is_empty());
        assert!(!seed.bills.is_empty());
        assert!(!seed.prescriptions.is_empty());
        assert!(!seed.notifications.is_empty());
        assert!(!seed.reports.is_empty());
    }

    #[test]
    fn bundled_patients_and_doctors_link_to_users() {
        let seed = SeedData::bundled().unwrap();
        for p in &seed.patients {
            assert!(seed.users.iter().any(|u| u.id == p.user_id), "{}", p.user_id);
        }
        for d in &seed.doctors {
            assert!(seed.users.iter().any(|u| u.id == d.user_id), "{}", d.user_id);
        }
    }

    #[test]
    fn override_directory_replaces_only_present_collections() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bills.json"),
            r#"[{"id":"B900","patientId":"P001","amount":12.5,"status":"overdue","createdAt":"2024-02-01T08:00:00"}]"#,
        )
        .unwrap();

        let seed = SeedData::load(Some(dir.path())).unwrap();
        assert_eq!(seed.bills.len(), 1);
        assert_eq!(seed.bills[0].id, "B900");
        assert_eq!(seed.users.len(), SeedData::bundled().unwrap().users.len());
    }

    #[test]
    fn override_accepts_utc_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bills.json"),
            r#"[{"id":"B901","patientId":"P001","amount":40.0,"status":"paid","createdAt":"2024-01-15T09:45:00.000Z","paidAt":"2024-01-16T12:00:00.000Z"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("users.json"),
            r#"[{"id":"U900","name":"Ana Lopez","email":"ana@example.com","phone":"+1-555-0100","role":"patient","createdAt":"2024-01-10T08:00:00Z"}]"#,
        )
        .unwrap();

        let seed = SeedData::load(Some(dir.path())).unwrap();
        let bill = &seed.bills[0];
        assert_eq!(bill.created_at, crate::clock::parse_timestamp("2024-01-15T09:45:00Z").unwrap());
        assert_eq!(bill.paid_at, crate::clock::parse_timestamp("2024-01-16T12:00:00Z"));
        assert!(seed.users[0].created_at.is_some());
    }

    #[test]
    fn malformed_override_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.json"), "{ not json").unwrap();

        let err = SeedData::load(Some(dir.path())).unwrap_err();
        match err {
            SeedError::Parse { file, .. } => assert!(file.ends_with("users.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
