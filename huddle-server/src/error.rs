use huddle_core::CoreError;
use thiserror::Error;

/// Failures of the message store or room lookup collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Failures while handling one client event. Scoped to the sending connection.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("message content must not be empty")]
    EmptyMessage,

    #[error("failed to persist message: {0}")]
    Persistence(#[from] StoreError),
}

impl RelayError {
    /// Text of the `error` notice delivered to the sender.
    pub fn notice(&self) -> String {
        match self {
            RelayError::EmptyMessage => "Message content must not be empty".to_owned(),
            RelayError::Persistence(_) => "Failed to send message".to_owned(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
