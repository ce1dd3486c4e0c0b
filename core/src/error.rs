use std::path::PathBuf;

use thiserror::Error;

/// Why a single persisted line was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    #[error("blank line")]
    Blank,

    #[error("expected at least 4 fields, got {found}")]
    MissingFields { found: usize },

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("invalid latitude: {0}")]
    InvalidLatitude(String),

    #[error("invalid longitude: {0}")]
    InvalidLongitude(String),
}

/// Error type for waypoint storage backends.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage not configured")]
    NotConfigured,
}

/// Failures reported by the platform sensor adapter.
#[derive(Error, Debug, Clone, PartialEq, uniffi::Error)]
pub enum SensorError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("provider unavailable: {provider}")]
    ProviderUnavailable { provider: String },

    #[error("sensor not present")]
    SensorMissing,

    #[error("platform error: {message}")]
    Platform { message: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for SensorError {
    fn from(err: uniffi::UnexpectedUniFFICallbackError) -> Self {
        SensorError::Platform {
            message: err.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_error_display() {
        let err = LineError::MissingFields { found: 2 };
        assert_eq!(err.to_string(), "expected at least 4 fields, got 2");

        let err = LineError::InvalidLatitude("north".to_string());
        assert_eq!(err.to_string(), "invalid latitude: north");

        assert_eq!(LineError::Blank.to_string(), "blank line");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Read {
            path: PathBuf::from("/data/waypoints.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to read /data/waypoints.txt: denied");
        assert!(std::error::Error::source(&err).is_some());

        assert_eq!(StoreError::NotConfigured.to_string(), "storage not configured");
    }

    #[test]
    fn test_sensor_error_display() {
        let err = SensorError::ProviderUnavailable {
            provider: "network".to_string(),
        };
        assert_eq!(err.to_string(), "provider unavailable: network");
    }

    #[test]
    fn test_sensor_error_from_callback_failure() {
        let err = SensorError::from(uniffi::UnexpectedUniFFICallbackError {
            reason: "SecurityException".to_string(),
        });
        assert_eq!(err.to_string(), "platform error: SecurityException");
    }
}
