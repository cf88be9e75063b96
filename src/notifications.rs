//! Notification feed: persisted notifications merged with reminders
//! synthesized from upcoming appointments.

use std::sync::{Arc, RwLock};

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::{format_clock_time, parse_timestamp};
use crate::config::REMINDER_WINDOW_DAYS;
use crate::models::notification::SYNTHESIZED_PREFIX;
use crate::models::{Appointment, Notification, NotificationPreferences, NotificationType, Priority};
use crate::store::entity_store::shallow_merge;
use crate::store::{EntityStore, StoreContext, StoreError};

/// Input for a user-created reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDraft {
    pub title: String,
    pub message: String,
    pub time: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub recurring: bool,
}

pub struct NotificationCenter {
    store: EntityStore<Notification>,
    appointments: Arc<EntityStore<Appointment>>,
    preferences: RwLock<NotificationPreferences>,
}

impl NotificationCenter {
    pub fn new(store: EntityStore<Notification>, appointments: Arc<EntityStore<Appointment>>) -> Self {
        Self {
            store,
            appointments,
            preferences: RwLock::new(NotificationPreferences::default()),
        }
    }

    pub fn store(&self) -> &EntityStore<Notification> {
        &self.store
    }

    fn ctx(&self) -> &StoreContext {
        self.store.context()
    }

    /// The merged feed, newest first.
    pub async fn get_notifications(&self) -> Result<Vec<Notification>, StoreError> {
        self.ctx().pause(self.ctx().latency.read_all).await;

        let synthesized = match self.appointments.get_all().await {
            Ok(appointments) => upcoming_appointment_notifications(&appointments, self.ctx().now()),
            Err(e) => {
                tracing::warn!(error = %e, "Appointment fetch failed, serving persisted notifications only");
                Vec::new()
            }
        };
        // Read after the fetch so changes made while it ran are included.
        let persisted = self.store.snapshot()?;

        let feed = merge_feed(persisted, synthesized);
        tracing::debug!(count = feed.len(), "Notification feed assembled");
        Ok(feed)
    }

    pub async fn unread_count(&self) -> Result<usize, StoreError> {
        self.ctx().pause(self.ctx().latency.read_one).await;
        let feed = self.get_notifications().await?;
        Ok(feed.iter().filter(|n| !n.read).count())
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<Notification, StoreError> {
        let delay = self.ctx().latency.read_one;
        self.store
            .modify(id, delay, |n| n.read = true)
            .await
            .map_err(|e| read_only_if_synthesized(e, id))
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store
            .delete(id)
            .await
            .map_err(|e| read_only_if_synthesized(e, id))
    }

    /// Marks every persisted notification read. Returns the persisted set.
    pub async fn mark_all_as_read(&self) -> Result<Vec<Notification>, StoreError> {
        let updated = self
            .store
            .modify_all(self.ctx().latency.status, |n| n.read = true)
            .await?;
        tracing::info!(count = updated.len(), "All notifications marked read");
        Ok(updated)
    }

    pub async fn preferences(&self) -> Result<NotificationPreferences, StoreError> {
        self.ctx().pause(self.ctx().latency.read_one).await;
        let prefs = self.preferences.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(prefs.clone())
    }

    pub async fn update_preferences(&self, patch: Value) -> Result<NotificationPreferences, StoreError> {
        self.ctx().pause(self.ctx().latency.status).await;
        let mut prefs = self.preferences.write().map_err(|_| StoreError::LockPoisoned)?;
        let merged = shallow_merge(&*prefs, &patch, "NotificationPreferences", None)?;
        *prefs = merged.clone();
        tracing::info!("Notification preferences updated");
        Ok(merged)
    }

    pub async fn create_reminder(&self, draft: ReminderDraft) -> Result<Notification, StoreError> {
        let reminder = Notification {
            id: String::new(),
            kind: NotificationType::Reminder,
            title: draft.title,
            message: draft.message,
            time: draft.time,
            read: false,
            priority: draft.priority.unwrap_or(Priority::Medium),
            recurring: draft.recurring,
            appointment: None,
        };
        self.store.create(reminder).await
    }
}

fn read_only_if_synthesized(err: StoreError, id: &str) -> StoreError {
    if err.is_not_found() && id.starts_with(SYNTHESIZED_PREFIX) {
        StoreError::ReadOnly { id: id.to_string() }
    } else {
        err
    }
}

// ═══════════════════════════════════════════════════════════
// Feed assembly
// ═══════════════════════════════════════════════════════════

/// One reminder per appointment scheduled within
/// `[now, now + REMINDER_WINDOW_DAYS]`. Unparseable times are skipped.
pub fn upcoming_appointment_notifications(
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> Vec<Notification> {
    let horizon = now + Duration::days(REMINDER_WINDOW_DAYS);

    appointments
        .iter()
        .filter_map(|apt| {
            let Some(at) = apt.scheduled_at() else {
                tracing::debug!(id = %apt.id, date_time = %apt.date_time, "Skipping appointment with invalid time");
                return None;
            };
            if at < now || at > horizon {
                return None;
            }

            let patient = apt
                .patient_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or("Patient");
            let priority = if at.date() == now.date() {
                Priority::High
            } else {
                Priority::Medium
            };

            Some(Notification {
                id: format!("{SYNTHESIZED_PREFIX}{}", apt.id),
                kind: NotificationType::Appointment,
                title: "Upcoming Appointment".into(),
                message: format!("{patient} - {}", format_clock_time(&at)),
                time: apt.date_time.clone(),
                read: false,
                priority,
                recurring: false,
                appointment: Some(apt.clone()),
            })
        })
        .collect()
}

/// Concatenate and sort descending by time. Unparseable times go last;
/// ties keep their input order.
pub fn merge_feed(persisted: Vec<Notification>, synthesized: Vec<Notification>) -> Vec<Notification> {
    let mut feed = persisted;
    feed.extend(synthesized);
    feed.sort_by(|a, b| b.occurs_at().cmp(&a.occurs_at()));
    feed
}

/// "Today at 2:30 PM", "Tomorrow at 9:00 AM" or "Mar 7, 9:00 AM".
pub fn format_notification_time(time: &str, now: NaiveDateTime) -> Option<String> {
    let at = parse_timestamp(time)?;
    let today = now.date();
    let clock = format_clock_time(&at);

    let label = if at.date() == today {
        format!("Today at {clock}")
    } else if today.succ_opt() == Some(at.date()) {
        format!("Tomorrow at {clock}")
    } else {
        format!("{}, {clock}", at.format("%b %-d"))
    };
    Some(label)
}
