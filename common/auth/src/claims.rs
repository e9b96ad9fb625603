use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{TokenError, TokenResult};

/// Verified token payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claims {
    raw: Map<String, Value>,
}

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.raw.get("sub").and_then(Value::as_str)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("exp")
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("iat")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.raw)
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        let seconds = self.raw.get(name)?.as_i64()?;
        Utc.timestamp_opt(seconds, 0).single()
    }
}

impl TryFrom<Value> for Claims {
    type Error = TokenError;

    fn try_from(value: Value) -> TokenResult<Self> {
        match value {
            Value::Object(raw) => Ok(Self { raw }),
            _ => Err(TokenError::Malformed(
                "claims payload is not a JSON object".to_string(),
            )),
        }
    }
}
