use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Stage variable overriding the configured secret.
pub const STAGE_JWT_SECRET: &str = "JWT_SECRET";
/// Stage variable overriding the configured algorithm.
pub const STAGE_JWT_ALGORITHM: &str = "JWT_ALGORITHM";
/// Stage variable overriding the configured token field name.
pub const STAGE_JWT_TOKEN_NAME: &str = "JWT_TOKEN_NAME";

/// Host-provided key/value side channel delivered alongside an invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageVariables(HashMap<String, String>);

impl StageVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StageVariables
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
