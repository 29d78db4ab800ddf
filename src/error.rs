use thiserror::Error;

/// Failures raised by the external service layer. These never escape to the
/// overlay model: callers fall back to placeholder or original values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Quota exhausted ({used}/{total} minutes)")]
    QuotaExhausted { used: u32, total: u32 },
    #[error("Worker disconnected")]
    Disconnected,
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::MalformedResponse(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
