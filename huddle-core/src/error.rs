use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid connection id '{0}'")]
    InvalidConnectionId(String),

    #[error("nickname must not be empty")]
    EmptyNickname,

    #[error("nickname is longer than {max} characters")]
    NicknameTooLong { max: usize },

    #[error("room slug must be between 1 and {max} characters")]
    InvalidSlug { max: usize },
}
