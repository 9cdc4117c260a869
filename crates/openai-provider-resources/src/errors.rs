use openai_provider_client::ClientError;
use openai_provider_core::RetryError;

use crate::diagnostics::Diagnostics;

/// Errors returned by resource and data source operations.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// No resource or data source registered under this type name.
    #[error("unknown type: {0}")]
    UnknownType(String),
    /// Configuration failed to parse or violates a constraint.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// Stored state failed to parse.
    #[error("invalid state: {0}")]
    State(String),
    #[error(transparent)]
    Client(#[from] ClientError),
    /// An eventually consistent read did not settle.
    #[error(transparent)]
    Retry(#[from] RetryError<ClientError>),
    /// The resource cannot perform this operation in place.
    #[error("{0} is not supported")]
    Unsupported(String),
    /// The operation failed after recording warnings the caller should see.
    #[error("{error}")]
    WithDiagnostics {
        error: Box<ResourceError>,
        diagnostics: Diagnostics,
    },
}

impl ResourceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Attaches diagnostics gathered before the failure; a no-op when there are none.
    pub fn with_diagnostics(self, diagnostics: Diagnostics) -> Self {
        if diagnostics.is_empty() {
            return self;
        }
        match self {
            Self::WithDiagnostics {
                error,
                diagnostics: mut earlier,
            } => {
                earlier.extend(diagnostics);
                Self::WithDiagnostics {
                    error,
                    diagnostics: earlier,
                }
            }
            error => Self::WithDiagnostics {
                error: Box::new(error),
                diagnostics,
            },
        }
    }

    /// The underlying error, without attached diagnostics.
    pub fn root(&self) -> &ResourceError {
        match self {
            Self::WithDiagnostics { error, .. } => error.root(),
            other => other,
        }
    }

    /// Diagnostics recorded before the failure.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::WithDiagnostics { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}
