//! Crate error type
//!
//! Nothing here is fatal to a run: callers log these and fall back to
//! built-in data or defaults.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A static data file could not be fetched
    Fetch { url: String, reason: String },
    /// The equation table parsed, but no row was usable
    NoEquations,
    /// Tuning JSON did not parse
    TuningJson(serde_json::Error),
    /// Tuning parsed but a value is out of range
    InvalidTuning(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Fetch { url, reason } => write!(f, "failed to fetch {url}: {reason}"),
            Error::NoEquations => write!(f, "equation table has no usable rows"),
            Error::TuningJson(e) => write!(f, "tuning is not valid JSON: {e}"),
            Error::InvalidTuning(msg) => write!(f, "invalid tuning: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::TuningJson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::TuningJson(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = Error::Fetch {
            url: "equations.csv".into(),
            reason: "404".into(),
        };
        assert_eq!(err.to_string(), "failed to fetch equations.csv: 404");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_json_error_is_source() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, Error::TuningJson(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
