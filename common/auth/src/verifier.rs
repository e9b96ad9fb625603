use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::debug;

use crate::claims::Claims;
use crate::config::JwtConfig;
use crate::error::{TokenError, TokenResult};
use crate::stage::{StageVariables, STAGE_JWT_ALGORITHM, STAGE_JWT_SECRET, STAGE_JWT_TOKEN_NAME};

/// Locates and verifies the token carried by an event.
///
/// Built per invocation from the stored [`JwtConfig`] and, when stage
/// variables are enabled, the overrides delivered with the invocation.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    config: JwtConfig,
}

impl TokenVerifier {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Apply stage-variable overrides on top of `config`.
    pub fn resolve(config: &JwtConfig, stage: Option<&StageVariables>) -> Self {
        let mut effective = config.clone();
        if let Some(vars) = stage.filter(|_| config.stage_vars) {
            if let Some(algorithm) = vars.get(STAGE_JWT_ALGORITHM) {
                effective.algorithm = Some(algorithm.to_string());
            }
            if let Some(secret) = vars.get(STAGE_JWT_SECRET) {
                effective.key = Some(secret.to_string());
            }
            if let Some(token_name) = vars.get(STAGE_JWT_TOKEN_NAME) {
                effective.token_name = token_name.to_string();
            }
        }
        Self { config: effective }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn token_name(&self) -> &str {
        &self.config.token_name
    }

    /// Find the raw token: the event field first, then the stage variable of
    /// the same name when stage variables are enabled. `null` and blank
    /// strings count as no token.
    pub fn locate<'a>(
        &self,
        event: &'a Map<String, Value>,
        stage: Option<&'a StageVariables>,
    ) -> TokenResult<&'a str> {
        let name = self.token_name();
        let from_event = match event.get(name) {
            Some(Value::String(token)) => Some(token.trim()),
            Some(Value::Null) | None => None,
            Some(other) => {
                return Err(TokenError::Malformed(format!(
                    "field '{name}' holds {} instead of a string",
                    value_kind(other)
                )))
            }
        };

        if let Some(token) = from_event.filter(|token| !token.is_empty()) {
            return Ok(token);
        }

        let fallback = stage
            .filter(|_| self.config.stage_vars)
            .and_then(|vars| vars.get(name))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| TokenError::MissingToken(name.to_string()))?;
        debug!(field = name, "token taken from stage variables");
        Ok(fallback)
    }

    pub fn verify_token(&self, token: &str) -> TokenResult<Claims> {
        let name = self
            .config
            .algorithm
            .as_deref()
            .ok_or(TokenError::NotConfigured("algorithm"))?;
        let algorithm = parse_algorithm(name)?;
        let secret = self
            .config
            .key
            .as_deref()
            .ok_or(TokenError::NotConfigured("key"))?;
        let key = decoding_key(algorithm, secret)?;

        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.leeway = self.config.leeway_seconds.into();

        let token_data = decode::<Value>(token, &key, &validation)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(algorithm = name, "verified JWT successfully");
        Ok(claims)
    }

    /// Locate the token in `event` (or `stage`) and verify it.
    pub fn verify(
        &self,
        event: &Map<String, Value>,
        stage: Option<&StageVariables>,
    ) -> TokenResult<Claims> {
        let token = self.locate(event, stage)?;
        self.verify_token(token)
    }
}

fn parse_algorithm(name: &str) -> TokenResult<Algorithm> {
    name.trim()
        .parse::<Algorithm>()
        .map_err(|_| TokenError::UnsupportedAlgorithm(name.to_string()))
}

fn decoding_key(algorithm: Algorithm, material: &str) -> TokenResult<DecodingKey> {
    let parsed = match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            return Ok(DecodingKey::from_secret(material.as_bytes()))
        }
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => DecodingKey::from_rsa_pem(material.as_bytes()),
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(material.as_bytes()),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(material.as_bytes()),
    };

    parsed.map_err(|err| TokenError::KeyParse {
        algorithm: format!("{algorithm:?}"),
        message: err.to_string(),
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
