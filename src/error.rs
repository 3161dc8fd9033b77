use thiserror::Error;

/// Errors raised by the relay service and its upstream transport
#[derive(Error, Debug)]
pub enum SymptomCheckerError {
    #[error("All required fields must be provided.")]
    MissingFields { fields: Vec<&'static str> },

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Upstream answered with a non-success status. `message` is the upstream's
    /// own error message when its body carried one.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Failed to parse upstream response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored with the request URL stripped, see the `From` impl below
    #[error(transparent)]
    Http(reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SymptomCheckerError {
    /// Client errors are the caller's fault and never reach the upstream API.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFields { .. } | Self::InvalidField { .. } | Self::MalformedBody(_)
        )
    }
}

impl From<reqwest::Error> for SymptomCheckerError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

pub type Result<T> = std::result::Result<T, SymptomCheckerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_is_fixed() {
        let err = SymptomCheckerError::MissingFields {
            fields: vec!["symptoms", "duration"],
        };
        assert_eq!(err.to_string(), "All required fields must be provided.");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_upstream_error_displays_upstream_message() {
        let err = SymptomCheckerError::Upstream {
            status: 403,
            message: "API key not valid. Please pass a valid API key.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API key not valid. Please pass a valid API key."
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_config_and_io_are_server_side() {
        let err = SymptomCheckerError::Config("invalid bind address".to_string());
        assert_eq!(err.to_string(), "Configuration error: invalid bind address");
        assert!(!err.is_client_error());

        let err: SymptomCheckerError =
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use").into();
        assert!(matches!(err, SymptomCheckerError::Io(_)));
        assert_eq!(err.to_string(), "address in use");
    }
}
