use super::{EntityStore, StoreError};
use crate::models::{Doctor, WeeklyAvailability};

impl EntityStore<Doctor> {
    /// Case-insensitive substring match on specialization.
    pub async fn by_specialization(&self, query: &str) -> Result<Vec<Doctor>, StoreError> {
        let needle = query.trim().to_lowercase();
        self.select(self.latency().query, |d| {
            d.specialization.to_lowercase().contains(&needle)
        })
        .await
    }

    pub async fn update_availability(
        &self,
        user_id: &str,
        availability: WeeklyAvailability,
    ) -> Result<Doctor, StoreError> {
        let updated = self
            .modify(user_id, self.latency().status, |d| d.availability = availability)
            .await?;
        tracing::info!(doctor = user_id, "Availability updated");
        Ok(updated)
    }
}
