use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Crates whose events follow the configured level; everything else logs warnings only.
const ROSTER_TARGETS: [&str; 2] = ["crew_roster", "crew_roster_api"];

#[derive(Debug)]
pub enum TelemetryError {
    LogFilter { directive: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::LogFilter { directive, .. } => {
                write!(f, "invalid roster log filter '{directive}'")
            }
            TelemetryError::Subscriber(err) => write!(f, "failed to install roster logging: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::LogFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over the configured level.
///
/// Slot decisions log at debug, run summaries at info; the per-event fields (vehicle, position,
/// person, scores) are kept so a run can be followed line by line.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => roster_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

/// `warn` globally, `level` for the roster crates.
pub fn roster_directive(level: &str) -> String {
    let level = level.trim();
    let mut directive = String::from("warn");
    for target in ROSTER_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

fn roster_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    let directive = roster_directive(level);
    EnvFilter::try_new(&directive).map_err(|source| TelemetryError::LogFilter { directive, source })
}
