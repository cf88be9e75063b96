use serde::{Deserialize, Serialize};

use crate::models::{Appointment, Bill, Doctor, Patient};
use crate::store::{EntityStore, StoreError};

/// Headline counts for the dashboard cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_appointments: usize,
    pub total_patients: usize,
    pub total_doctors: usize,
    pub pending_bills: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub today_appointments: Vec<Appointment>,
}

pub async fn load_dashboard(
    appointments: &EntityStore<Appointment>,
    patients: &EntityStore<Patient>,
    doctors: &EntityStore<Doctor>,
    bills: &EntityStore<Bill>,
) -> Result<DashboardData, StoreError> {
    let (all, patients, doctors, pending, today) = tokio::try_join!(
        appointments.get_all(),
        patients.get_all(),
        doctors.get_all(),
        bills.pending(),
        appointments.todays(),
    )?;

    let stats = DashboardStats {
        today_appointments: today.len(),
        total_patients: patients.len(),
        total_doctors: doctors.len(),
        pending_bills: pending.len(),
    };
    tracing::info!(
        appointments = all.len(),
        today = stats.today_appointments,
        patients = stats.total_patients,
        doctors = stats.total_doctors,
        pending_bills = stats.pending_bills,
        "Dashboard loaded"
    );

    Ok(DashboardData {
        stats,
        today_appointments: today,
    })
}
