use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Failures while installing the process-wide log subscriber.
#[derive(Debug)]
pub enum TelemetryError {
    /// `APP_LOG_LEVEL` is not a valid filter directive.
    EnvFilter { value: String, source: ParseError },
    /// A global subscriber was already installed.
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "invalid APP_LOG_LEVEL filter '{value}'")
            }
            TelemetryError::Subscriber(err) => {
                write!(f, "unable to install log subscriber: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Route triage logs (flagging, claims, rescoring, detector hits) to stderr.
///
/// A set `RUST_LOG` takes precedence over `APP_LOG_LEVEL`. Case reports and `--json`
/// output own stdout.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn configured_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(level).map_err(|source| TelemetryError::EnvFilter {
        value: level.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn configured_level_builds_a_filter() {
        assert!(configured_filter("info").is_ok());
        assert!(configured_filter("case_triage=debug,warn").is_ok());
    }

    #[test]
    fn malformed_level_names_the_offending_value() {
        let err = configured_filter("case_triage=loudest").unwrap_err();
        assert!(matches!(err, TelemetryError::EnvFilter { ref value, .. }
            if value == "case_triage=loudest"));
        assert_eq!(
            err.to_string(),
            "invalid APP_LOG_LEVEL filter 'case_triage=loudest'"
        );
        assert!(err.source().is_some());
    }
}
