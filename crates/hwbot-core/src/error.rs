use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("endpoint unreachable: {0}")]
    Transport(String),

    #[error("endpoint returned HTTP {status_code}")]
    Remote { status_code: u16 },

    #[error("unexpected API response: {0}")]
    InvalidResponse(String),

    #[error("API response is missing '{0}'")]
    MissingField(String),

    #[error("unknown homework status '{0}'")]
    UnknownStatus(String),

    #[error("failed to deliver message: {0}")]
    Delivery(String),

    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, WatchError>;
