pub mod clock;
pub mod config;
pub mod core_state;
pub mod dashboard;
pub mod directory;
pub mod models;
pub mod notifications;
pub mod pages;
pub mod reports;
pub mod store;
pub mod validation;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::core_state::{CoreError, CoreState};
use crate::pages::{DashboardPage, NotificationsPage};

/// Seed the core, mount the dashboard and the notification dropdown, and
/// print what they loaded as JSON.
pub async fn run() -> Result<(), CoreError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = AppConfig::from_env();
    let core = Arc::new(CoreState::from_config(&app_config)?);

    let dashboard = DashboardPage::new(Arc::clone(&core));
    let notifications = NotificationsPage::new(Arc::clone(&core));
    tokio::join!(dashboard.mount(), notifications.mount());

    let summary = json!({
        "app": config::APP_NAME,
        "version": config::APP_VERSION,
        "now": core.now(),
        "dashboard": dashboard.state(),
        "notifications": {
            "unread": notifications.unread_count(),
            "feed": notifications.state(),
        },
        "toasts": core.toasts().entries(),
    });
    println!("{summary:#}");

    Ok(())
}
