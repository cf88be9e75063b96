use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "MediFlow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upcoming appointments within this many days become feed reminders.
pub const REMINDER_WINDOW_DAYS: i64 = 7;

/// Largest accepted medical report upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Env var selecting the latency profile: `instant` or `standard`.
pub const LATENCY_ENV: &str = "MEDIFLOW_LATENCY";

/// Env var pointing at a directory of fixture overrides.
pub const SEED_DIR_ENV: &str = "MEDIFLOW_SEED_DIR";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    "mediflow_lib=info,mediflow=info,warn".to_string()
}

// ═══════════════════════════════════════════
// Latency
// ═══════════════════════════════════════════

/// Artificial delays applied before each store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub read_all: Duration,
    pub read_one: Duration,
    pub query: Duration,
    pub create: Duration,
    pub update: Duration,
    pub status: Duration,
    pub remove: Duration,
    pub upload: Duration,
    pub count: Duration,
}

impl LatencyProfile {
    /// The delays the dashboard was designed around.
    pub fn standard() -> Self {
        Self {
            read_all: Duration::from_millis(300),
            read_one: Duration::from_millis(200),
            query: Duration::from_millis(250),
            create: Duration::from_millis(400),
            update: Duration::from_millis(350),
            status: Duration::from_millis(300),
            remove: Duration::from_millis(300),
            upload: Duration::from_millis(1000),
            count: Duration::from_millis(150),
        }
    }

    /// No delays at all. Used by tests and tooling.
    pub fn instant() -> Self {
        Self {
            read_all: Duration::ZERO,
            read_one: Duration::ZERO,
            query: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            status: Duration::ZERO,
            remove: Duration::ZERO,
            upload: Duration::ZERO,
            count: Duration::ZERO,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "instant" | "none" | "0" => Some(Self::instant()),
            "standard" | "default" => Some(Self::standard()),
            _ => None,
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self::standard()
    }
}

// ═══════════════════════════════════════════
// AppConfig
// ═══════════════════════════════════════════

/// Runtime configuration for a `CoreState`.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub latency: LatencyProfile,
    /// Directory whose `<collection>.json` files replace the bundled fixtures.
    pub seed_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads `MEDIFLOW_LATENCY` and `MEDIFLOW_SEED_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let latency = match lookup(LATENCY_ENV) {
            Some(raw) => LatencyProfile::from_name(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown latency profile, using standard");
                LatencyProfile::standard()
            }),
            None => LatencyProfile::standard(),
        };

        let seed_dir = lookup(SEED_DIR_ENV)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Self { latency, seed_dir }
    }

    /// Zero-latency, bundled fixtures.
    pub fn instant() -> Self {
        Self {
            latency: LatencyProfile::instant(),
            seed_dir: None,
        }
    }
}
