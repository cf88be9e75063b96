use super::{EntityStore, StoreError};
use crate::models::Prescription;

impl EntityStore<Prescription> {
    pub async fn by_appointment(&self, appointment_id: &str) -> Result<Vec<Prescription>, StoreError> {
        self.select(self.latency().query, |p| p.appointment_id == appointment_id)
            .await
    }

    pub async fn by_patient(&self, patient_id: &str) -> Result<Vec<Prescription>, StoreError> {
        self.select(self.latency().query, |p| p.patient_id == patient_id)
            .await
    }
}

/// Prescription page filter: patient name, doctor name or any medicine name
/// contains `query`, case-insensitively. A blank query matches everything.
pub fn matches_query(prescription: &Prescription, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let has = |s: &Option<String>| s.as_deref().is_some_and(|v| v.to_lowercase().contains(&needle));

    has(&prescription.patient_name)
        || has(&prescription.doctor_name)
        || prescription
            .medicines
            .iter()
            .any(|m| m.name.to_lowercase().contains(&needle))
}
