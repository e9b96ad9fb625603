use gate_auth::TokenError;
use gate_schema::ValidationError;
use serde::Serialize;
use thiserror::Error;

/// Failure reported through an invocation's completion.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
    #[error("handler dropped its completion without calling succeed or fail")]
    Abandoned,
}

impl InvocationError {
    /// Stable error code reported to the host.
    pub fn code(&self) -> &'static str {
        match self {
            InvocationError::Validation(_) => "ValidationError",
            InvocationError::Token(err) => err.code(),
            InvocationError::Handler(_) => "HandlerError",
            InvocationError::Abandoned => "Abandoned",
        }
    }

    /// Whether the gate rejected the event before the handler ran.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            InvocationError::Validation(_) | InvocationError::Token(_)
        )
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            InvocationError::Validation(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&TokenError> {
        match self {
            InvocationError::Token(err) => Some(err),
            _ => None,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error_type: self.code(),
            error_message: self.to_string(),
        }
    }
}

/// Serialized failure, shaped like a serverless runtime error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_type: &'static str,
    pub error_message: String,
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("event must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}
