use thiserror::Error;

/// Machine-readable failure code carried by [`ChatApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Timeout,
    NetworkError,
    HttpError,
    InvalidResponse,
    EmptyResponse,
    UnknownError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::HttpError => "HTTP_ERROR",
            ErrorCode::InvalidResponse => "INVALID_RESPONSE",
            ErrorCode::EmptyResponse => "EMPTY_RESPONSE",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Transport-level failures that are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::Timeout | ErrorCode::NetworkError)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejections produced by the input sanitizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid input: message must be a non-empty string")]
    Empty,

    #[error("Invalid input: message cannot be empty after sanitization")]
    EmptyAfterSanitization,

    #[error("Invalid input: message too long (max {max} characters)")]
    TooLong { max: usize },
}

/// Errors talking to the webhook bot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Request timeout: Server took too long to respond")]
    Timeout,

    #[error("Connection error: Unable to reach chat server ({0})")]
    Network(String),

    #[error("Server error: {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Invalid response format")]
    InvalidResponse,

    #[error("No valid message in response")]
    EmptyResponse,

    /// The payload is diagnostic detail for logs; it is not part of the message.
    #[error("Unexpected error occurred")]
    Unknown(String),
}

impl ChatApiError {
    /// `None` for validation errors, which carry no code.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ChatApiError::Validation(_) => None,
            ChatApiError::Timeout => Some(ErrorCode::Timeout),
            ChatApiError::Network(_) => Some(ErrorCode::NetworkError),
            ChatApiError::Http { .. } => Some(ErrorCode::HttpError),
            ChatApiError::InvalidResponse => Some(ErrorCode::InvalidResponse),
            ChatApiError::EmptyResponse => Some(ErrorCode::EmptyResponse),
            ChatApiError::Unknown(_) => Some(ErrorCode::UnknownError),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ChatApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_some_and(|code| code.is_retryable())
    }
}
