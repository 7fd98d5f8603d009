use thiserror::Error;

/// Failure of a calendar fetch, surfaced as a single message in the render model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No user id from the platform context or launch parameters
    #[error("Could not determine the user (open the calendar from the chat app or pass --user-id)")]
    UserUnresolved,

    /// API base address is empty
    #[error("API address is not configured")]
    ApiUnconfigured,

    /// Connection refused, DNS failure, timeout
    #[error("No connection to the server. Is the bot running? Is the tunnel up?")]
    TransportUnreachable,

    /// Response content type was not JSON (usually a tunnel or proxy page)
    #[error("Server did not return JSON. Check that the bot is running and the tunnel is active. {preview}")]
    NonJsonResponse { preview: String },

    /// Non-2xx status
    #[error("Error {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Error: {0}")]
    Unknown(String),
}

/// habitcal error types
#[derive(Error, Debug)]
pub enum HabitcalError {
    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Calendar fetch failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Result type alias for habitcal
pub type Result<T> = std::result::Result<T, HabitcalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HabitcalError::Config("bad url".into());
        assert_eq!(err.to_string(), "config error: bad url");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HabitcalError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }

    #[test]
    fn test_fetch_error_conversion() {
        let err: HabitcalError = FetchError::TransportUnreachable.into();
        assert!(err.to_string().starts_with("fetch error: No connection"));
    }

    #[test]
    fn test_http_error_display() {
        let err = FetchError::Http {
            status: 502,
            reason: "Bad Gateway".into(),
        };
        assert_eq!(err.to_string(), "Error 502: Bad Gateway");
    }

    #[test]
    fn test_non_json_display_includes_preview() {
        let err = FetchError::NonJsonResponse {
            preview: "<html> tunnel offline…".into(),
        };
        assert!(err.to_string().ends_with("<html> tunnel offline…"));
    }
}
