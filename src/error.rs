//! Errors reported by directions backends.
//!
//! The resolver treats every variant as a failed attempt for one mode and
//! moves on to the next fallback step; none of them escape to callers of
//! `build_path`.

use std::fmt;

#[derive(Debug)]
pub enum DirectionsError {
    /// Transport-level failure (connect, TLS, body read).
    Http(reqwest::Error),
    /// The request exceeded the client timeout.
    Timeout,
    /// Non-2xx response.
    Status(u16),
    /// The backend answered but reported an error code.
    Service { code: String, message: String },
    /// The body did not have the expected shape.
    Malformed(String),
}

impl fmt::Display for DirectionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionsError::Http(err) => write!(f, "directions request failed: {}", err),
            DirectionsError::Timeout => write!(f, "directions request timed out"),
            DirectionsError::Status(status) => {
                write!(f, "directions service returned status {}", status)
            }
            DirectionsError::Service { code, message } => {
                write!(f, "directions service error {}: {}", code, message)
            }
            DirectionsError::Malformed(detail) => {
                write!(f, "malformed directions response: {}", detail)
            }
        }
    }
}

impl std::error::Error for DirectionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DirectionsError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DirectionsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DirectionsError::Timeout
        } else if let Some(status) = err.status() {
            DirectionsError::Status(status.as_u16())
        } else if err.is_decode() {
            DirectionsError::Malformed(err.to_string())
        } else {
            DirectionsError::Http(err)
        }
    }
}
