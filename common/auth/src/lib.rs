pub mod claims;
pub mod config;
pub mod error;
pub mod stage;
pub mod verifier;

pub use claims::Claims;
pub use config::{JwtConfig, JwtConfigStore, JwtOptions, DEFAULT_TOKEN_NAME};
pub use error::{TokenError, TokenErrorKind, TokenResult};
pub use stage::{StageVariables, STAGE_JWT_ALGORITHM, STAGE_JWT_SECRET, STAGE_JWT_TOKEN_NAME};
pub use verifier::TokenVerifier;
