use std::sync::Arc;

use serde_json::Value;

use super::{toast_outcome, PageController, PageState};
use crate::core_state::{CoreError, CoreState};
use crate::models::{Notification, NotificationPreferences};
use crate::notifications::format_notification_time;

/// The header notification dropdown.
pub struct NotificationsPage {
    core: Arc<CoreState>,
    controller: PageController<Vec<Notification>>,
}

impl NotificationsPage {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            controller: PageController::new("notifications"),
        }
    }

    pub fn state(&self) -> PageState<Vec<Notification>> {
        self.controller.state()
    }

    pub async fn mount(&self) -> bool {
        self.refresh().await
    }

    pub async fn refresh(&self) -> bool {
        let center = &self.core.notifications;
        self.controller
            .run(self.core.toasts(), async {
                center.get_notifications().await.map_err(CoreError::from)
            })
            .await
    }

    /// Badge count over what is currently shown.
    pub fn unread_count(&self) -> usize {
        self.state()
            .data()
            .map(|feed| feed.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    /// "Today at 2:30 PM" style label, or the raw time when unparseable.
    pub fn time_label(&self, notification: &Notification) -> String {
        format_notification_time(&notification.time, self.core.now())
            .unwrap_or_else(|| notification.time.clone())
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<(), CoreError> {
        let result = self
            .core
            .notifications
            .mark_as_read(id)
            .await
            .map_err(CoreError::from);
        toast_outcome(
            self.core.toasts(),
            result,
            |_| "Notification marked as read".to_string(),
            "Failed to mark notification as read",
        )?;

        self.controller.patch(|feed| {
            if let Some(n) = feed.iter_mut().find(|n| n.id == id) {
                n.read = true;
            }
        });
        Ok(())
    }

    pub async fn mark_all_as_read(&self) -> Result<(), CoreError> {
        let result = self
            .core
            .notifications
            .mark_all_as_read()
            .await
            .map_err(CoreError::from);
        toast_outcome(
            self.core.toasts(),
            result,
            |_| "All notifications marked as read".to_string(),
            "Failed to mark all notifications as read",
        )?;

        // Appointment reminders are not stored and stay unread.
        self.controller.patch(|feed| {
            feed.iter_mut()
                .filter(|n| !n.is_synthesized())
                .for_each(|n| n.read = true)
        });
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        let result = self
            .core
            .notifications
            .delete(id)
            .await
            .map_err(CoreError::from);
        toast_outcome(
            self.core.toasts(),
            result,
            |_| "Notification deleted".to_string(),
            "Failed to delete notification",
        )?;

        self.controller.patch(|feed| feed.retain(|n| n.id != id));
        Ok(())
    }

    pub async fn preferences(&self) -> Result<NotificationPreferences, CoreError> {
        Ok(self.core.notifications.preferences().await?)
    }

    pub async fn update_preferences(&self, patch: Value) -> Result<NotificationPreferences, CoreError> {
        let result = self
            .core
            .notifications
            .update_preferences(patch)
            .await
            .map_err(CoreError::from);
        toast_outcome(
            self.core.toasts(),
            result,
            |_| "Notification preferences updated".to_string(),
            "Failed to update preferences",
        )
    }
}
