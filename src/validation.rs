//! Form rules for the create dialogs.
//!
//! Each form validates every field at once and, when clean, yields the
//! record drafts the stores expect. Keys and timestamps are left for the
//! stores to fill in.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::parse_timestamp;
use crate::models::{
    Appointment, AppointmentStatus, DayAvailability, Doctor, Medicine, Patient, Prescription,
    User, UserRole, WeeklyAvailability, Weekday,
};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

const WEEKDAY_SLOTS: &[&str] = &["09:00", "10:00", "11:00", "14:00", "15:00", "16:00"];
const SATURDAY_SLOTS: &[&str] = &["09:00", "10:00", "11:00"];
const MAX_EXPERIENCE_YEARS: i64 = 50;

/// Field name (camelCase, as the form names it) to message.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("Please fix the form errors: {}", field_list(.fields))]
pub struct ValidationErrors {
    pub fields: BTreeMap<&'static str, String>,
}

fn field_list(fields: &BTreeMap<&'static str, String>) -> String {
    fields.keys().copied().collect::<Vec<_>>().join(", ")
}

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn check_contact(errors: &mut ValidationErrors, name: &str, email: &str, phone: &str) {
    if blank(name) {
        errors.add("name", "Name is required");
    }
    if blank(email) {
        errors.add("email", "Email is required");
    } else if !EMAIL_PATTERN.is_match(email) {
        errors.add("email", "Email format is invalid");
    }
    if blank(phone) {
        errors.add("phone", "Phone number is required");
    }
}

fn contact_user(name: &str, email: &str, phone: &str, role: UserRole) -> User {
    User {
        id: String::new(),
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        phone: phone.trim().to_string(),
        role,
        created_at: None,
    }
}

fn non_blank(s: &str) -> Option<String> {
    (!blank(s)).then(|| s.trim().to_string())
}

// ═══════════════════════════════════════════════════════════
// Patient
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    pub address: String,
    pub emergency_contact: String,
}

impl PatientForm {
    pub fn validate(&self) -> Result<(User, Patient), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_contact(&mut errors, &self.name, &self.email, &self.phone);

        let dob = if blank(&self.date_of_birth) {
            errors.add("dateOfBirth", "Date of birth is required");
            None
        } else {
            let parsed = NaiveDate::parse_from_str(self.date_of_birth.trim(), "%Y-%m-%d").ok();
            if parsed.is_none() {
                errors.add("dateOfBirth", "Date of birth is invalid");
            }
            parsed
        };

        if blank(&self.gender) {
            errors.add("gender", "Gender is required");
        }

        let Some(date_of_birth) = dob else {
            return Err(errors);
        };
        errors.into_result(|| {
            let user = contact_user(&self.name, &self.email, &self.phone, UserRole::Patient);
            let patient = Patient {
                user_id: String::new(),
                date_of_birth,
                gender: non_blank(&self.gender),
                blood_group: "Unknown".into(),
                allergies: Vec::new(),
                emergency_contact: self.emergency_contact.trim().to_string(),
                address: non_blank(&self.address),
                created_at: None,
            };
            (user, patient)
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Doctor
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub qualifications: String,
    pub experience: Option<i64>,
    pub consultation_fee: Option<f64>,
}

/// New doctors start on weekday office hours plus Saturday mornings.
pub fn default_availability() -> WeeklyAvailability {
    Weekday::ALL
        .iter()
        .map(|&day| {
            let slots: &[&str] = match day {
                Weekday::Saturday => SATURDAY_SLOTS,
                Weekday::Sunday => &[],
                _ => WEEKDAY_SLOTS,
            };
            let availability = DayAvailability {
                available: !slots.is_empty(),
                slots: slots.iter().map(|s| s.to_string()).collect(),
            };
            (day, availability)
        })
        .collect()
}

impl DoctorForm {
    pub fn validate(&self) -> Result<(User, Doctor), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_contact(&mut errors, &self.name, &self.email, &self.phone);

        if blank(&self.specialization) {
            errors.add("specialization", "Specialization is required");
        }
        if blank(&self.qualifications) {
            errors.add("qualifications", "Qualifications are required");
        }

        let experience = match self.experience {
            None => {
                errors.add("experience", "Experience is required");
                None
            }
            Some(years) if years < 0 => {
                errors.add("experience", "Experience cannot be negative");
                None
            }
            Some(years) if years > MAX_EXPERIENCE_YEARS => {
                errors.add("experience", "Please enter a valid experience");
                None
            }
            Some(years) => u32::try_from(years).ok(),
        };

        let fee = match self.consultation_fee {
            None => {
                errors.add("consultationFee", "Consultation fee is required");
                0.0
            }
            Some(fee) if !fee.is_finite() || fee <= 0.0 => {
                errors.add("consultationFee", "Consultation fee must be greater than 0");
                0.0
            }
            Some(fee) => fee,
        };

        errors.into_result(|| {
            let user = contact_user(&self.name, &self.email, &self.phone, UserRole::Doctor);
            let doctor = Doctor {
                user_id: String::new(),
                specialization: self.specialization.trim().to_string(),
                qualifications: non_blank(&self.qualifications),
                experience,
                consultation_fee: fee,
                availability: default_availability(),
                created_at: None,
            };
            (user, doctor)
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Appointment
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentForm {
    pub patient_id: String,
    pub doctor_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: String,
}

impl Default for AppointmentForm {
    fn default() -> Self {
        Self {
            patient_id: String::new(),
            doctor_id: String::new(),
            date: String::new(),
            time: String::new(),
            kind: "consultation".into(),
            notes: String::new(),
        }
    }
}

impl AppointmentForm {
    pub fn date_time(&self) -> String {
        format!("{}T{}:00", self.date.trim(), self.time.trim())
    }

    pub fn validate(&self) -> Result<Appointment, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if blank(&self.patient_id) {
            errors.add("patientId", "Please select a patient");
        }
        if blank(&self.doctor_id) {
            errors.add("doctorId", "Please select a doctor");
        }
        if blank(&self.date) {
            errors.add("date", "Please select a date");
        }
        if blank(&self.time) {
            errors.add("time", "Please select a time");
        }

        let date_time = self.date_time();
        if errors.is_empty() && parse_timestamp(&date_time).is_none() {
            errors.add("date", "Please select a valid date and time");
        }

        errors.into_result(|| Appointment {
            id: String::new(),
            patient_id: self.patient_id.trim().to_string(),
            doctor_id: self.doctor_id.trim().to_string(),
            date_time,
            status: AppointmentStatus::Scheduled,
            kind: non_blank(&self.kind).unwrap_or_else(|| "consultation".into()),
            notes: self.notes.clone(),
            patient_name: None,
            doctor_name: None,
            created_at: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Prescription
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrescriptionForm {
    pub appointment_id: String,
    pub patient_id: String,
    pub medicines: Vec<Medicine>,
    pub instructions: String,
}

impl PrescriptionForm {
    /// Blank medicine rows are dropped; at least one named medicine must
    /// remain.
    pub fn validate(&self) -> Result<Prescription, ValidationErrors> {
        let medicines: Vec<Medicine> = self
            .medicines
            .iter()
            .filter(|m| !blank(&m.name))
            .cloned()
            .collect();

        let mut errors = ValidationErrors::default();
        if medicines.is_empty() {
            errors.add("medicines", "Please add at least one medicine");
        }

        errors.into_result(|| Prescription {
            id: String::new(),
            appointment_id: self.appointment_id.clone(),
            patient_id: self.patient_id.clone(),
            patient_name: None,
            doctor_name: None,
            medicines,
            instructions: self.instructions.clone(),
            created_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient_form() -> PatientForm {
        PatientForm {
            name: "Jane Smith".into(),
            email: "jane@example.com".into(),
            phone: "+1-555-0101".into(),
            date_of_birth: "1990-04-12".into(),
            gender: "female".into(),
            ..Default::default()
        }
    }

    fn doctor_form() -> DoctorForm {
        DoctorForm {
            name: "Dr. Rivera".into(),
            email: "rivera@clinic.org".into(),
            phone: "+1-555-0200".into(),
            specialization: "Cardiology".into(),
            qualifications: "MD, FACC".into(),
            experience: Some(12),
            consultation_fee: Some(150.0),
        }
    }

    #[test]
    fn valid_patient_form_builds_drafts() {
        let (user, patient) = patient_form().validate().unwrap();
        assert_eq!(user.role, UserRole::Patient);
        assert_eq!(user.name, "Jane Smith");
        assert_eq!(patient.date_of_birth, NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());
        assert_eq!(patient.blood_group, "Unknown");
        assert!(patient.address.is_none());
    }

    #[test]
    fn empty_patient_form_reports_every_field() {
        let errors = PatientForm::default().validate().unwrap_err();
        for field in ["name", "email", "phone", "dateOfBirth", "gender"] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn email_pattern_is_enforced() {
        let mut form = patient_form();
        form.email = "jane.example.com".into();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Email format is invalid"));
        assert_eq!(errors.fields.len(), 1);
        assert!(errors.to_string().contains("email"));
    }

    #[test]
    fn bad_date_of_birth_is_reported() {
        let mut form = patient_form();
        form.date_of_birth = "12/04/1990".into();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("dateOfBirth"), Some("Date of birth is invalid"));
    }

    #[test]
    fn doctor_form_numeric_rules() {
        let mut form = doctor_form();
        form.experience = Some(-1);
        form.consultation_fee = Some(0.0);
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("experience"), Some("Experience cannot be negative"));
        assert_eq!(
            errors.get("consultationFee"),
            Some("Consultation fee must be greater than 0")
        );

        let mut zero_experience = doctor_form();
        zero_experience.experience = Some(0);
        let (_, doctor) = zero_experience.validate().unwrap();
        assert_eq!(doctor.experience, Some(0));
    }

    #[test]
    fn doctor_gets_default_availability() {
        let (user, doctor) = doctor_form().validate().unwrap();
        assert_eq!(user.role, UserRole::Doctor);
        assert_eq!(doctor.slots_on(Weekday::Monday).len(), 6);
        assert_eq!(doctor.slots_on(Weekday::Friday)[3], "14:00");
        assert_eq!(doctor.slots_on(Weekday::Saturday), ["09:00", "10:00", "11:00"]);
        assert!(doctor.slots_on(Weekday::Sunday).is_empty());
        assert!(!doctor.availability[&Weekday::Sunday].available);
    }

    #[test]
    fn appointment_form_combines_date_and_time() {
        let form = AppointmentForm {
            patient_id: "P001".into(),
            doctor_id: "D001".into(),
            date: "2024-03-05".into(),
            time: "14:30".into(),
            ..Default::default()
        };
        let apt = form.validate().unwrap();
        assert_eq!(apt.date_time, "2024-03-05T14:30:00");
        assert_eq!(apt.status, AppointmentStatus::Scheduled);
        assert_eq!(apt.kind, "consultation");
    }

    #[test]
    fn appointment_form_requires_selections() {
        let errors = AppointmentForm::default().validate().unwrap_err();
        assert_eq!(errors.get("patientId"), Some("Please select a patient"));
        assert_eq!(errors.get("doctorId"), Some("Please select a doctor"));
        assert_eq!(errors.get("date"), Some("Please select a date"));
        assert_eq!(errors.get("time"), Some("Please select a time"));

        let garbled = AppointmentForm {
            patient_id: "P001".into(),
            doctor_id: "D001".into(),
            date: "2024-02-30".into(),
            time: "14:30".into(),
            ..Default::default()
        };
        assert!(garbled.validate().unwrap_err().get("date").is_some());
    }

    #[test]
    fn prescription_drops_blank_rows() {
        let named = Medicine {
            name: "Amoxicillin".into(),
            dosage: "500mg".into(),
            frequency: "3x daily".into(),
            duration: "7 days".into(),
            instructions: String::new(),
        };
        let blank_row = Medicine {
            name: "   ".into(),
            ..named.clone()
        };
        let form = PrescriptionForm {
            appointment_id: "A001".into(),
            patient_id: "P001".into(),
            medicines: vec![blank_row.clone(), named],
            instructions: "Take with food".into(),
        };
        let rx = form.validate().unwrap();
        assert_eq!(rx.medicines.len(), 1);
        assert_eq!(rx.medicines[0].name, "Amoxicillin");

        let empty = PrescriptionForm {
            medicines: vec![blank_row],
            ..Default::default()
        };
        assert_eq!(
            empty.validate().unwrap_err().get("medicines"),
            Some("Please add at least one medicine")
        );
    }
}
