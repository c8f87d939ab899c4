//! WolfDeploy Error Types

use thiserror::Error;

/// Result type alias for WolfDeploy operations
pub type Result<T> = std::result::Result<T, Error>;

/// WolfDeploy error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Deployment spec errors
    #[error("instance size is invalid: {0}. instance family should be M or R")]
    InvalidInstanceSize(String),

    #[error("{path}: desired declares {desired} entries but observed reports {observed}")]
    TopologyMismatch {
        path: String,
        desired: usize,
        observed: usize,
    },

    // Governance errors
    #[error("Invalid resource version {value:?}: {source}")]
    InvalidVersion {
        value: String,
        #[source]
        source: semver::Error,
    },

    // Document errors
    #[error("Invalid deployment document: {0}")]
    Json(#[from] serde_json::Error),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error stems from the declared resource itself, as opposed
    /// to the environment the planner runs in
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Error::InvalidInstanceSize(_)
                | Error::InvalidVersion { .. }
                | Error::TopologyMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_size_message_names_families() {
        let err = Error::InvalidInstanceSize("\"S10\"".into());
        assert!(err.to_string().ends_with("instance family should be M or R"));
        assert!(err.is_user_correctable());
    }

    #[test]
    fn test_environment_errors_are_not_user_correctable() {
        let err = Error::Config("operator.version cannot be empty".into());
        assert!(!err.is_user_correctable());
    }
}
