use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub reference: ReferenceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let draft_path = env::var("DV_DRAFT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("dv_draft.json"));

        let debounce_ms = env::var("DV_DEBOUNCE_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidDebounce)?;

        let countries_csv = env::var("DV_COUNTRIES_CSV").ok().map(PathBuf::from);

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                draft_path,
                debounce_ms,
            },
            reference: ReferenceConfig { countries_csv },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Settings for the persistent draft store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub draft_path: PathBuf,
    pub debounce_ms: u64,
}

/// Optional overrides for externally supplied reference data.
#[derive(Debug, Clone)]
pub struct ReferenceConfig {
    pub countries_csv: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidDebounce,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDebounce => {
                write!(f, "DV_DEBOUNCE_MS must be a valid non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
