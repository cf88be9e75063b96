//! Patient and doctor directories: clinical records joined with the
//! contact details of their linked user.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Doctor, Patient, User};
use crate::store::{EntityStore, StoreError};

const UNKNOWN_NAME: &str = "Unknown";
const NO_EMAIL: &str = "No email";
const NO_PHONE: &str = "No phone";

/// Contact details copied from the linked user, with display defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    fn from_user(user: Option<&User>) -> Self {
        match user {
            Some(u) => Self {
                name: u.name.clone(),
                email: u.email.clone(),
                phone: u.phone.clone(),
            },
            None => Self {
                name: UNKNOWN_NAME.into(),
                email: NO_EMAIL.into(),
                phone: NO_PHONE.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(flatten)]
    pub patient: Patient,
    #[serde(flatten)]
    pub contact: Contact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    #[serde(flatten)]
    pub doctor: Doctor,
    #[serde(flatten)]
    pub contact: Contact,
}

fn users_by_id(users: &[User]) -> HashMap<&str, &User> {
    users.iter().map(|u| (u.id.as_str(), u)).collect()
}

pub fn join_patients(patients: Vec<Patient>, users: &[User]) -> Vec<PatientProfile> {
    let index = users_by_id(users);
    patients
        .into_iter()
        .map(|patient| {
            let contact = Contact::from_user(index.get(patient.user_id.as_str()).copied());
            PatientProfile { patient, contact }
        })
        .collect()
}

pub fn join_doctors(doctors: Vec<Doctor>, users: &[User]) -> Vec<DoctorProfile> {
    let index = users_by_id(users);
    doctors
        .into_iter()
        .map(|doctor| {
            let contact = Contact::from_user(index.get(doctor.user_id.as_str()).copied());
            DoctorProfile { doctor, contact }
        })
        .collect()
}

/// Case-insensitive on name and email, plain substring on phone.
/// A blank query matches everyone.
pub fn search_patients(profiles: &[PatientProfile], query: &str) -> Vec<PatientProfile> {
    let query = query.trim();
    if query.is_empty() {
        return profiles.to_vec();
    }
    let needle = query.to_lowercase();
    profiles
        .iter()
        .filter(|p| {
            p.contact.name.to_lowercase().contains(&needle)
                || p.contact.email.to_lowercase().contains(&needle)
                || p.contact.phone.contains(query)
        })
        .cloned()
        .collect()
}

pub async fn patient_profiles(
    patients: &EntityStore<Patient>,
    users: &EntityStore<User>,
) -> Result<Vec<PatientProfile>, StoreError> {
    let (patients, users) = tokio::try_join!(patients.get_all(), users.get_all())?;
    let profiles = join_patients(patients, &users);
    tracing::debug!(count = profiles.len(), "Patient profiles joined");
    Ok(profiles)
}

pub async fn doctor_profiles(
    doctors: &EntityStore<Doctor>,
    users: &EntityStore<User>,
) -> Result<Vec<DoctorProfile>, StoreError> {
    let (doctors, users) = tokio::try_join!(doctors.get_all(), users.get_all())?;
    Ok(join_doctors(doctors, &users))
}

/// Doctors whose specialization contains `specialization`; all of them
/// when it is blank.
pub async fn search_doctors(
    doctors: &EntityStore<Doctor>,
    users: &EntityStore<User>,
    specialization: &str,
) -> Result<Vec<DoctorProfile>, StoreError> {
    if specialization.trim().is_empty() {
        return doctor_profiles(doctors, users).await;
    }
    let (matched, users) =
        tokio::try_join!(doctors.by_specialization(specialization), users.get_all())?;
    Ok(join_doctors(matched, &users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::test_support::{doctor, instant_context, patient, user};

    fn users() -> Vec<User> {
        vec![
            user("P001", "Jane Smith", UserRole::Patient),
            user("P002", "Omar Haddad", UserRole::Patient),
            user("D001", "Dr. Rivera", UserRole::Doctor),
        ]
    }

    #[test]
    fn missing_user_gets_defaults() {
        let profiles = join_patients(vec![patient("P001"), patient("P999")], &users());
        assert_eq!(profiles[0].contact.name, "Jane Smith");
        assert_eq!(profiles[1].contact.name, "Unknown");
        assert_eq!(profiles[1].contact.email, "No email");
        assert_eq!(profiles[1].contact.phone, "No phone");
    }

    #[test]
    fn profile_serializes_flat() {
        let profiles = join_patients(vec![patient("P001")], &users());
        let json = serde_json::to_value(&profiles[0]).unwrap();
        assert_eq!(json["userId"], "P001");
        assert_eq!(json["name"], "Jane Smith");
        assert_eq!(json["bloodGroup"], "O+");
    }

    #[test]
    fn search_matches_name_email_and_phone() {
        let profiles = join_patients(vec![patient("P001"), patient("P002")], &users());

        let by_name = search_patients(&profiles, "JANE");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].patient.user_id, "P001");

        let by_email = search_patients(&profiles, "omarhaddad@");
        assert_eq!(by_email[0].patient.user_id, "P002");

        let by_phone = search_patients(&profiles, "555-002");
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].patient.user_id, "P002");

        assert_eq!(search_patients(&profiles, "  ").len(), 2);
        assert!(search_patients(&profiles, "nobody").is_empty());
    }

    #[tokio::test]
    async fn loads_and_joins_concurrently() {
        let ctx = instant_context();
        let patients = EntityStore::with_records(vec![patient("P001")], ctx.clone()).unwrap();
        let doctors = EntityStore::with_records(
            vec![doctor("D001", "Cardiology", 150.0), doctor("D002", "Dermatology", 90.0)],
            ctx.clone(),
        )
        .unwrap();
        let users = EntityStore::with_records(users(), ctx).unwrap();

        let p = patient_profiles(&patients, &users).await.unwrap();
        assert_eq!(p[0].contact.name, "Jane Smith");

        let d = search_doctors(&doctors, &users, "cardio").await.unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].contact.name, "Dr. Rivera");

        let all = search_doctors(&doctors, &users, "").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].contact.name, "Unknown");
    }
}
