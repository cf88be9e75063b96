//! Shared application state.
//!
//! `CoreState` owns every entity store, the notification center, the
//! clock and the toast log. Pages hold it behind an `Arc` and never keep
//! a store of their own.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::config::{AppConfig, LatencyProfile};
use crate::directory::{Contact, DoctorProfile, PatientProfile};
use crate::models::{
    Appointment, Bill, Doctor, MedicalReport, Notification, Patient, Prescription, User,
};
use crate::notifications::NotificationCenter;
use crate::store::{EntityStore, SeedData, SeedError, StoreContext, StoreError};
use crate::validation::{
    AppointmentForm, DoctorForm, PatientForm, PrescriptionForm, ValidationErrors,
};

/// Toasts kept before the oldest are dropped.
const TOAST_CAPACITY: usize = 100;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Seed(#[from] SeedError),
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub users: EntityStore<User>,
    pub patients: EntityStore<Patient>,
    pub doctors: EntityStore<Doctor>,
    /// Shared with the notification center, which reads it on every feed.
    pub appointments: Arc<EntityStore<Appointment>>,
    pub bills: EntityStore<Bill>,
    pub prescriptions: EntityStore<Prescription>,
    pub reports: EntityStore<MedicalReport>,
    pub notifications: NotificationCenter,
    ctx: StoreContext,
    toasts: ToastLog,
}

impl CoreState {
    /// Seeded from the bundled fixtures (plus overrides), on the system clock.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let seed = SeedData::load(config.seed_dir.as_deref())?;
        let ctx = StoreContext::new(config.latency, Arc::new(SystemClock));
        Self::from_seed(seed, ctx)
    }

    pub fn from_seed(seed: SeedData, ctx: StoreContext) -> Result<Self, CoreError> {
        let appointments = Arc::new(EntityStore::with_records(seed.appointments, ctx.clone())?);
        let notifications = NotificationCenter::new(
            EntityStore::with_records(seed.notifications, ctx.clone())?,
            Arc::clone(&appointments),
        );

        Ok(Self {
            users: EntityStore::with_records(seed.users, ctx.clone())?,
            patients: EntityStore::with_records(seed.patients, ctx.clone())?,
            doctors: EntityStore::with_records(seed.doctors, ctx.clone())?,
            appointments,
            bills: EntityStore::with_records(seed.bills, ctx.clone())?,
            prescriptions: EntityStore::with_records(seed.prescriptions, ctx.clone())?,
            reports: EntityStore::with_records(seed.reports, ctx.clone())?,
            notifications,
            ctx,
            toasts: ToastLog::new(),
        })
    }

    /// No records at all.
    pub fn empty(latency: LatencyProfile, clock: Arc<dyn Clock>) -> Self {
        let ctx = StoreContext::new(latency, clock);
        let appointments = Arc::new(EntityStore::new(ctx.clone()));
        Self {
            users: EntityStore::new(ctx.clone()),
            patients: EntityStore::new(ctx.clone()),
            doctors: EntityStore::new(ctx.clone()),
            notifications: NotificationCenter::new(
                EntityStore::new(ctx.clone()),
                Arc::clone(&appointments),
            ),
            appointments,
            bills: EntityStore::new(ctx.clone()),
            prescriptions: EntityStore::new(ctx.clone()),
            reports: EntityStore::new(ctx.clone()),
            ctx,
            toasts: ToastLog::new(),
        }
    }

    pub fn context(&self) -> &StoreContext {
        &self.ctx
    }

    pub fn now(&self) -> NaiveDateTime {
        self.ctx.now()
    }

    pub fn toasts(&self) -> &ToastLog {
        &self.toasts
    }

    fn user_name(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .users
            .snapshot()?
            .into_iter()
            .find(|u| u.id == id)
            .map(|u| u.name))
    }

    // ── Create flows ───────────────────────────────────────

    /// Creates the user account first, then the patient record linked to it.
    pub async fn register_patient(&self, form: &PatientForm) -> Result<PatientProfile, CoreError> {
        let (user, mut patient) = form.validate()?;
        let user = self.users.create(user).await?;
        patient.user_id = user.id.clone();
        let patient = self.patients.create(patient).await?;
        tracing::info!(patient = %patient.user_id, "Patient registered");
        Ok(PatientProfile {
            patient,
            contact: contact_of(user),
        })
    }

    pub async fn add_doctor(&self, form: &DoctorForm) -> Result<DoctorProfile, CoreError> {
        let (user, mut doctor) = form.validate()?;
        let user = self.users.create(user).await?;
        doctor.user_id = user.id.clone();
        let doctor = self.doctors.create(doctor).await?;
        tracing::info!(doctor = %doctor.user_id, "Doctor added");
        Ok(DoctorProfile {
            doctor,
            contact: contact_of(user),
        })
    }

    /// Validates the form and books it, copying display names from users.
    pub async fn book_appointment(&self, form: &AppointmentForm) -> Result<Appointment, CoreError> {
        let mut appointment = form.validate()?;
        appointment.patient_name = self.user_name(&appointment.patient_id)?;
        appointment.doctor_name = self.user_name(&appointment.doctor_id)?;
        let appointment = self.appointments.create(appointment).await?;
        tracing::info!(
            appointment = %appointment.id,
            date_time = %appointment.date_time,
            "Appointment booked"
        );
        Ok(appointment)
    }

    pub async fn write_prescription(&self, form: &PrescriptionForm) -> Result<Prescription, CoreError> {
        let mut prescription = form.validate()?;
        prescription.patient_name = self.user_name(&prescription.patient_id)?;

        let doctor_id = self
            .appointments
            .snapshot()?
            .into_iter()
            .find(|a| a.id == prescription.appointment_id)
            .map(|a| a.doctor_id);
        if let Some(doctor_id) = doctor_id {
            prescription.doctor_name = self.user_name(&doctor_id)?;
        }

        let prescription = self.prescriptions.create(prescription).await?;
        tracing::info!(prescription = %prescription.id, "Prescription written");
        Ok(prescription)
    }

    /// Unread feed entries, synthesized reminders included.
    pub async fn unread_notifications(&self) -> Result<Vec<Notification>, CoreError> {
        let feed = self.notifications.get_notifications().await?;
        Ok(feed.into_iter().filter(|n| !n.read).collect())
    }
}

fn contact_of(user: User) -> Contact {
    Contact {
        name: user.name,
        email: user.email,
        phone: user.phone,
    }
}

// ═══════════════════════════════════════════════════════════
// Toasts
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Bounded in-memory toast buffer.
pub struct ToastLog {
    buffer: Mutex<VecDeque<Toast>>,
}

impl ToastLog {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(TOAST_CAPACITY)),
        }
    }

    pub fn push(&self, level: ToastLevel, message: impl Into<String>) {
        let toast = Toast {
            level,
            message: message.into(),
        };
        match level {
            ToastLevel::Error => tracing::warn!(message = %toast.message, "Error toast"),
            _ => tracing::debug!(message = %toast.message, "Toast"),
        }
        if let Ok(mut buf) = self.buffer.lock() {
            if buf.len() >= TOAST_CAPACITY {
                buf.pop_front();
            }
            buf.push_back(toast);
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message);
    }

    pub fn entries(&self) -> Vec<Toast> {
        self.buffer
            .lock()
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn drain(&self) -> Vec<Toast> {
        self.buffer
            .lock()
            .map(|mut buf| buf.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Toast> {
        self.buffer.lock().ok().and_then(|buf| buf.back().cloned())
    }
}

impl Default for ToastLog {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
