use thiserror::Error;

pub type TokenResult<T> = Result<T, TokenError>;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token missing from field '{0}'")]
    MissingToken(String),
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("jwt {0} is not configured")]
    NotConfigured(&'static str),
    #[error("unsupported jwt algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("failed to parse verification key for {algorithm}: {message}")]
    KeyParse { algorithm: String, message: String },
    #[error("token verification failed: {0}")]
    Verification(#[from] jsonwebtoken::errors::Error),
}

/// Coarse classification of a [`TokenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenErrorKind {
    /// No token in the event or the stage-variable fallback.
    MissingToken,
    /// A token was found but could not be accepted.
    InvalidToken,
}

impl TokenError {
    pub fn kind(&self) -> TokenErrorKind {
        match self {
            TokenError::MissingToken(_) => TokenErrorKind::MissingToken,
            TokenError::Malformed(_)
            | TokenError::NotConfigured(_)
            | TokenError::UnsupportedAlgorithm(_)
            | TokenError::KeyParse { .. }
            | TokenError::Verification(_) => TokenErrorKind::InvalidToken,
        }
    }

    /// Stable error code reported to the host.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            TokenErrorKind::MissingToken => "MissingToken",
            TokenErrorKind::InvalidToken => "InvalidToken",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_classified_separately() {
        let err = TokenError::MissingToken("jwt".into());
        assert_eq!(err.kind(), TokenErrorKind::MissingToken);
        assert_eq!(err.code(), "MissingToken");
        assert_eq!(err.to_string(), "token missing from field 'jwt'");
    }

    #[test]
    fn configuration_problems_count_as_invalid_token() {
        let err = TokenError::NotConfigured("key");
        assert_eq!(err.kind(), TokenErrorKind::InvalidToken);
        assert_eq!(err.code(), "InvalidToken");
        assert_eq!(err.to_string(), "jwt key is not configured");
    }
}
