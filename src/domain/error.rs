//! Domain error types.

/// Top-level error type for momentum-watch.
///
/// The first four variants are per-entry failures: they degrade a single
/// symbol, sector or console line and never abort a monitoring cycle.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("insufficient history for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("malformed input '{input}': {reason}")]
    MalformedInput { input: String, reason: String },

    #[error("failed to render {path}: {reason}")]
    RenderFailure { path: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        MonitorError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        MonitorError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&MonitorError> for std::process::ExitCode {
    fn from(err: &MonitorError) -> Self {
        let code: u8 = match err {
            MonitorError::Io(_) => 1,
            MonitorError::ConfigParse { .. }
            | MonitorError::ConfigMissing { .. }
            | MonitorError::ConfigInvalid { .. } => 2,
            MonitorError::DataUnavailable { .. } | MonitorError::InsufficientHistory { .. } => 3,
            MonitorError::MalformedInput { .. } => 4,
            MonitorError::RenderFailure { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_data_unavailable() {
        let err = MonitorError::unavailable("SOFI", "HTTP 404");
        assert_eq!(err.to_string(), "data unavailable for SOFI: HTTP 404");
    }

    #[test]
    fn display_insufficient_history() {
        let err = MonitorError::InsufficientHistory {
            symbol: "RIVN".into(),
            bars: 12,
            minimum: 50,
        };
        assert_eq!(
            err.to_string(),
            "insufficient history for RIVN: have 12 bars, need 50"
        );
    }

    #[test]
    fn display_config_invalid() {
        let err = MonitorError::invalid("breakout", "rsi_max", "must be in (0, 100]");
        assert_eq!(
            err.to_string(),
            "invalid config value [breakout] rsi_max: must be in (0, 100]"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::other("disk full");
        let err: MonitorError = io.into();
        assert!(matches!(err, MonitorError::Io(_)));
    }
}
