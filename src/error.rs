use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

/// A non-2xx response from the backend.
///
/// `field_errors` is only populated for `400 Bad Request` responses whose body
/// is a mapping of field name to a message or list of messages; every other
/// failure carries an empty list and a transport-style `message`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub field_errors: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, field_errors: Vec<String>) -> Self {
        Self {
            status,
            message: format!("Request failed with status code {}", status.as_u16()),
            field_errors,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Api(ApiError),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0}")]
    NotFound(String),

    #[error("Feature disabled: {0}")]
    FeatureDisabled(&'static str),
}

impl Error {
    /// Server-reported field messages, in the order the backend sent them.
    pub fn field_errors(&self) -> &[String] {
        match self {
            Error::Api(err) => &err.field_errors,
            _ => &[],
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(err) => Some(err.status),
            Error::Http(err) => err.status(),
            _ => None,
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_names_the_status() {
        let err = ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, vec![]);
        assert_eq!(err.message, "Request failed with status code 500");
        assert_eq!(Error::from(err).to_string(), "Request failed with status code 500");
    }

    #[test]
    fn only_api_errors_carry_field_messages() {
        let api = Error::from(ApiError::new(
            StatusCode::BAD_REQUEST,
            vec!["No candidate found".to_string()],
        ));
        assert_eq!(api.field_errors(), ["No candidate found".to_string()]);
        assert_eq!(api.status(), Some(StatusCode::BAD_REQUEST));

        let missing = Error::NotFound("Resume download URL not found".into());
        assert!(missing.field_errors().is_empty());
        assert_eq!(missing.to_string(), "Resume download URL not found");
    }
}
