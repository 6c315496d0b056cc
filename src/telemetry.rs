//! Tracing setup for the wizard CLI.
//!
//! Step transitions, draft flushes, and submission outcomes are emitted from
//! the wizard modules with their module path as the target, so a filter like
//! `dv_entry::wizard=debug` isolates wizard activity. The `DV_LOG` variable
//! overrides the configured level for a single run.

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before the configured log level.
pub const LOG_FILTER_ENV: &str = "DV_LOG";

#[derive(Debug)]
pub enum TelemetryError {
    Filter { directive: String, source: ParseError },
    Init(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directive, .. } => {
                write!(f, "invalid log filter directive '{directive}'")
            }
            TelemetryError::Init(err) => write!(f, "failed to install subscriber: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Init(err) => Some(&**err),
        }
    }
}

fn build_filter(
    override_directive: Option<String>,
    config: &TelemetryConfig,
) -> Result<EnvFilter, TelemetryError> {
    let directive = override_directive.unwrap_or_else(|| config.log_level.clone());
    EnvFilter::try_new(&directive).map_err(|source| TelemetryError::Filter { directive, source })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(std::env::var(LOG_FILTER_ENV).ok(), config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Init)
}
