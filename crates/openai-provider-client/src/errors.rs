/// Errors returned by the OpenAI client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Missing or invalid provider configuration (keys, base URL).
    #[error("config error: {0}")]
    Config(String),
    /// Request could not be sent or the response body could not be read.
    #[error("transport error: {0}")]
    Transport(String),
    /// API answered with a non-success status.
    #[error("OpenAI API error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// Local file access failed (uploads).
    #[error("io error: {0}")]
    Io(String),
}

impl ClientError {
    /// Creates an API-level error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_carries_status_for_classification() {
        let err = ClientError::api(404, "No file found with id 'file-1'.");
        assert!(err.is_not_found());
        assert!(openai_provider_core::is_not_yet_visible(&err.to_string()));

        let err = ClientError::api(429, "Rate limit exceeded");
        assert!(!err.is_not_found());
        assert!(!openai_provider_core::is_not_yet_visible(&err.to_string()));
    }
}
