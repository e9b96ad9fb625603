use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;

/// Event field that carries the token unless configured otherwise.
pub const DEFAULT_TOKEN_NAME: &str = "jwt";

/// Runtime configuration for JWT verification.
#[derive(Clone, PartialEq, Eq)]
pub struct JwtConfig {
    /// Shared secret (HMAC) or PEM-encoded public key.
    pub key: Option<String>,
    /// Algorithm identifier such as `HS256`.
    pub algorithm: Option<String>,
    /// Event field holding the token.
    pub token_name: String,
    /// Consult stage variables for overrides and as a fallback token source.
    pub stage_vars: bool,
    /// Allowable clock skew in seconds when validating exp/nbf.
    pub leeway_seconds: u32,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            key: None,
            algorithm: None,
            token_name: DEFAULT_TOKEN_NAME.to_string(),
            stage_vars: true,
            leeway_seconds: 0,
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("algorithm", &self.algorithm)
            .field("token_name", &self.token_name)
            .field("stage_vars", &self.stage_vars)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl JwtConfig {
    /// Merge `options` into this record.
    ///
    /// Any explicit algorithm, secret or token name turns stage variables off
    /// unless the options also carry `stage_vars`. Leeway alone leaves the
    /// flag untouched.
    pub fn merge(&mut self, options: JwtOptions) {
        let explicit = options.algorithm.is_some()
            || options.secret.is_some()
            || options.token_name.is_some();

        if let Some(algorithm) = options.algorithm {
            self.algorithm = Some(algorithm);
        }
        if let Some(secret) = options.secret {
            self.key = Some(secret);
        }
        if let Some(token_name) = options.token_name {
            self.token_name = token_name;
        }
        if let Some(leeway) = options.leeway_seconds {
            self.leeway_seconds = leeway;
        }

        match options.stage_vars {
            Some(flag) => self.stage_vars = flag,
            None if explicit => self.stage_vars = false,
            None => {}
        }
    }
}

/// Partial update accepted by [`JwtConfigStore::configure`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JwtOptions {
    pub algorithm: Option<String>,
    pub secret: Option<String>,
    pub token_name: Option<String>,
    pub stage_vars: Option<bool>,
    pub leeway_seconds: Option<u32>,
}

impl JwtOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn token_name(mut self, token_name: impl Into<String>) -> Self {
        self.token_name = Some(token_name.into());
        self
    }

    pub fn stage_vars(mut self, enabled: bool) -> Self {
        self.stage_vars = Some(enabled);
        self
    }

    pub fn leeway_seconds(mut self, seconds: u32) -> Self {
        self.leeway_seconds = Some(seconds);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Shared, cumulative store for [`JwtConfig`]. Clones observe the same record.
#[derive(Clone, Default)]
pub struct JwtConfigStore {
    inner: Arc<RwLock<JwtConfig>>,
}

impl JwtConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: JwtConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Snapshot of the current record.
    pub fn configuration(&self) -> JwtConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merge `options` into the stored record and return the result.
    pub fn configure(&self, options: JwtOptions) -> JwtConfig {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.merge(options);
        tracing::debug!(config = ?*guard, "jwt configuration updated");
        guard.clone()
    }

    pub fn reset(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = JwtConfig::default();
    }
}

impl fmt::Debug for JwtConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JwtConfigStore")
            .field(&self.configuration())
            .finish()
    }
}
