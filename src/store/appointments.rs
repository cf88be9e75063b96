use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::{EntityStore, StoreError};
use crate::models::{Appointment, AppointmentStatus};

impl EntityStore<Appointment> {
    pub async fn by_patient(&self, patient_id: &str) -> Result<Vec<Appointment>, StoreError> {
        self.select(self.latency().query, |a| a.patient_id == patient_id)
            .await
    }

    pub async fn by_doctor(&self, doctor_id: &str) -> Result<Vec<Appointment>, StoreError> {
        self.select(self.latency().query, |a| a.doctor_id == doctor_id)
            .await
    }

    /// Appointments on the calendar day `date`. Unparseable times never match.
    pub async fn by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        self.select(self.latency().query, |a| {
            a.scheduled_at().is_some_and(|at| at.date() == date)
        })
        .await
    }

    pub async fn todays(&self) -> Result<Vec<Appointment>, StoreError> {
        let today = self.context().now().date();
        self.select(self.latency().read_one, |a| {
            a.scheduled_at().is_some_and(|at| at.date() == today)
        })
        .await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, StoreError> {
        let updated = self
            .modify(id, self.latency().status, |a| a.status = status)
            .await?;
        tracing::info!(appointment = id, status = status.as_str(), "Appointment status changed");
        Ok(updated)
    }

    /// Calendar view: the month's appointments grouped by day, each day in
    /// time order.
    pub async fn calendar_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<BTreeMap<NaiveDate, Vec<Appointment>>, StoreError> {
        let in_month = self
            .select(self.latency().read_all, |a| {
                a.scheduled_at()
                    .is_some_and(|at| at.year() == year && at.month() == month)
            })
            .await?;

        let mut days: BTreeMap<NaiveDate, Vec<Appointment>> = BTreeMap::new();
        for apt in in_month {
            if let Some(at) = apt.scheduled_at() {
                days.entry(at.date()).or_default().push(apt);
            }
        }
        for day in days.values_mut() {
            day.sort_by_key(|a| a.scheduled_at());
        }
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;
    use crate::test_support::{appointment, context_at, date};

    fn store() -> EntityStore<Appointment> {
        EntityStore::with_records(
            vec![
                appointment("A1", "P001", "D001", "2024-03-04T14:00:00"),
                appointment("A2", "P002", "D001", "2024-03-04T09:30:00"),
                appointment("A3", "P001", "D002", "2024-03-06T11:00:00"),
                appointment("A4", "P003", "D002", "2024-04-01T10:00:00"),
                appointment("A5", "P003", "D002", "not a date"),
            ],
            context_at(2024, 3, 4, 8, 0),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn foreign_key_lookups() {
        let store = store();
        assert_eq!(store.by_patient("P001").await.unwrap().len(), 2);
        assert_eq!(store.by_doctor("D002").await.unwrap().len(), 3);
        assert!(store.by_patient("P404").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn by_date_and_todays_skip_invalid_times() {
        let store = store();
        let on_the_6th = store.by_date(date(2024, 3, 6)).await.unwrap();
        assert_eq!(on_the_6th.len(), 1);
        assert_eq!(on_the_6th[0].id, "A3");

        let today = store.todays().await.unwrap();
        let ids: Vec<_> = today.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["A1", "A2"]);
    }

    #[tokio::test]
    async fn update_status_changes_only_status() {
        let store = store();
        let updated = store
            .update_status("A1", AppointmentStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Cancelled);
        assert_eq!(updated.id, "A1");
        assert_eq!(updated.date_time, "2024-03-04T14:00:00");

        let err = store
            .update_status("A404", AppointmentStatus::Completed)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn calendar_groups_by_day_in_time_order() {
        let month = store().calendar_month(2024, 3).await.unwrap();
        assert_eq!(month.len(), 2);
        let fourth: Vec<_> = month[&date(2024, 3, 4)].iter().map(|a| a.id.as_str()).collect();
        assert_eq!(fourth, ["A2", "A1"]);
        assert_eq!(month[&date(2024, 3, 6)].len(), 1);
    }
}
