use serde::Serialize;
use thiserror::Error;

/// Application-wide error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("This email has already been registered for an API key.")]
    DuplicateRegistration,

    #[error("Registration is currently closed.")]
    RegistrationClosed,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Upstream key service error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    pub fn upstream<S: Into<String>>(status: Option<u16>, msg: S) -> Self {
        Self::Upstream {
            status,
            message: msg.into(),
        }
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Transport failures talking to the key service are upstream errors too.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// JSON body for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Convert AppError to HTTP status codes for web responses
impl AppError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateRegistration => StatusCode::BAD_REQUEST,
            Self::RegistrationClosed => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Io(_) | Self::Json(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Split into the client-facing summary and the optional detail.
    pub fn to_body(&self) -> ErrorBody {
        let (message, error) = match self {
            Self::Upstream { message, .. } => (
                "Request to the key service failed".to_string(),
                Some(message.clone()),
            ),
            Self::Io(_) | Self::Json(_) | Self::Internal(_) => {
                ("Internal server error".to_string(), Some(self.to_string()))
            }
            _ => (self.to_string(), None),
        };

        ErrorBody {
            success: false,
            message,
            error,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, axum::Json(self.to_body())).into_response()
    }
}
