//! Builders shared by the unit tests.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::clock::{FixedClock, SystemClock};
use crate::config::LatencyProfile;
use crate::core_state::CoreState;
use crate::models::{
    Appointment, AppointmentStatus, Bill, BillStatus, Doctor, Medicine, Notification,
    NotificationType, Patient, Prescription, Priority, User, UserRole, WeeklyAvailability,
};
use crate::store::{SeedData, StoreContext};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
}

pub fn instant_context() -> StoreContext {
    StoreContext::new(LatencyProfile::instant(), Arc::new(SystemClock))
}

pub fn context_at(y: i32, m: u32, d: u32, h: u32, min: u32) -> StoreContext {
    StoreContext::new(
        LatencyProfile::instant(),
        Arc::new(FixedClock::new(at(y, m, d, h, min))),
    )
}

pub fn user(id: &str, name: &str, role: UserRole) -> User {
    let handle = name.to_lowercase().replace(['.', ' '], "");
    User {
        id: id.into(),
        name: name.into(),
        email: format!("{handle}@example.com"),
        phone: format!("+1-555-{}", &id[1..]),
        role,
        created_at: None,
    }
}

pub fn patient(user_id: &str) -> Patient {
    Patient {
        user_id: user_id.into(),
        date_of_birth: date(1988, 5, 17),
        gender: Some("female".into()),
        blood_group: "O+".into(),
        allergies: vec!["Penicillin".into()],
        emergency_contact: "Next of kin +1-555-0000".into(),
        address: None,
        created_at: None,
    }
}

pub fn doctor(user_id: &str, specialization: &str, fee: f64) -> Doctor {
    Doctor {
        user_id: user_id.into(),
        specialization: specialization.into(),
        qualifications: Some("MD".into()),
        experience: Some(10),
        consultation_fee: fee,
        availability: WeeklyAvailability::new(),
        created_at: None,
    }
}

pub fn appointment(id: &str, patient_id: &str, doctor_id: &str, date_time: &str) -> Appointment {
    Appointment {
        id: id.into(),
        patient_id: patient_id.into(),
        doctor_id: doctor_id.into(),
        date_time: date_time.into(),
        status: AppointmentStatus::Scheduled,
        kind: "consultation".into(),
        notes: String::new(),
        patient_name: None,
        doctor_name: None,
        created_at: None,
    }
}

pub fn bill(id: &str, amount: f64, status: BillStatus) -> Bill {
    Bill {
        id: id.into(),
        patient_id: "P001".into(),
        patient_name: None,
        amount,
        description: None,
        status,
        created_at: at(2024, 1, 15, 9, 0),
        paid_at: None,
    }
}

pub fn prescription(id: &str, appointment_id: &str, patient_id: &str, medicines: &[&str]) -> Prescription {
    Prescription {
        id: id.into(),
        appointment_id: appointment_id.into(),
        patient_id: patient_id.into(),
        patient_name: None,
        doctor_name: None,
        medicines: medicines
            .iter()
            .map(|name| Medicine {
                name: (*name).into(),
                dosage: "1 tablet".into(),
                frequency: "Twice daily".into(),
                duration: "7 days".into(),
                instructions: String::new(),
            })
            .collect(),
        instructions: String::new(),
        created_at: None,
    }
}

pub fn notification(id: &str, time: &str, read: bool) -> Notification {
    Notification {
        id: id.into(),
        kind: NotificationType::System,
        title: format!("Notice {id}"),
        message: "Body".into(),
        time: time.into(),
        read,
        priority: Priority::Low,
        recurring: false,
        appointment: None,
    }
}

/// Core seeded from the bundled fixtures, clock pinned at the given time.
pub fn seeded_core(y: i32, m: u32, d: u32, h: u32, min: u32) -> Arc<CoreState> {
    let seed = SeedData::bundled().unwrap();
    Arc::new(CoreState::from_seed(seed, context_at(y, m, d, h, min)).unwrap())
}
