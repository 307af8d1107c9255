use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures talking to the task backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("base URL cannot carry a task id: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Response body suitable for showing to the user, if the backend sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => {
                let body = body.trim();
                (!body.is_empty()).then_some(body)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_exposed_only_when_present() {
        let err = ApiError::status(StatusCode::BAD_REQUEST, " Name is required. \n");
        assert_eq!(err.body(), Some("Name is required."));

        let empty = ApiError::status(StatusCode::INTERNAL_SERVER_ERROR, "   ");
        assert_eq!(empty.body(), None);

        let invalid = ApiError::InvalidBaseUrl("data:text".to_string());
        assert_eq!(invalid.body(), None);
    }
}
