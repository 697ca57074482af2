use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    InvalidArguments {
        code: &'static str,
        message: String,
    },
    #[error("invalid request: {message}")]
    InvalidRequest {
        code: &'static str,
        message: &'static str,
    },
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn invalid_arguments(code: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_request(code: &'static str, message: &'static str) -> Self {
        Self::InvalidRequest { code, message }
    }
}
