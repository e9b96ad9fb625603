use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Violation;

/// String field. Bounds apply to the length in characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringRule {
    pub required: bool,
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl StringRule {
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min(mut self, length: usize) -> Self {
        self.min = Some(length);
        self
    }

    pub fn max(mut self, length: usize) -> Self {
        self.max = Some(length);
        self
    }

    fn check(&self, value: &Value) -> Result<(), Violation> {
        let text = value.as_str().ok_or_else(|| wrong_type("a string", value))?;
        let length = text.chars().count();
        if let Some(min) = self.min.filter(|min| length < *min) {
            return Err(Violation::TooShort { min });
        }
        if let Some(max) = self.max.filter(|max| length > *max) {
            return Err(Violation::TooLong { max });
        }
        Ok(())
    }
}

/// Numeric field with optional inclusive bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberRule {
    pub required: bool,
    pub integer: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberRule {
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    pub fn min(mut self, bound: impl Into<f64>) -> Self {
        self.min = Some(bound.into());
        self
    }

    pub fn max(mut self, bound: impl Into<f64>) -> Self {
        self.max = Some(bound.into());
        self
    }

    fn check(&self, value: &Value) -> Result<(), Violation> {
        let number = value.as_f64().ok_or_else(|| wrong_type("a number", value))?;
        if self.integer && number.fract() != 0.0 {
            return Err(Violation::NotInteger);
        }
        if let Some(min) = self.min.filter(|min| number < *min) {
            return Err(Violation::BelowMinimum { min });
        }
        if let Some(max) = self.max.filter(|max| number > *max) {
            return Err(Violation::AboveMaximum { max });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BooleanRule {
    pub required: bool,
}

impl BooleanRule {
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Accepts any value, including `null`. Only presence can be enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnyRule {
    pub required: bool,
}

impl AnyRule {
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Constraint attached to one schema field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Rule {
    String(StringRule),
    Number(NumberRule),
    Boolean(BooleanRule),
    Any(AnyRule),
}

impl Rule {
    pub fn is_required(&self) -> bool {
        match self {
            Rule::String(rule) => rule.required,
            Rule::Number(rule) => rule.required,
            Rule::Boolean(rule) => rule.required,
            Rule::Any(rule) => rule.required,
        }
    }

    /// Check `value`, where `None` means the field is absent from the event.
    pub fn evaluate(&self, value: Option<&Value>) -> Result<(), Violation> {
        let Some(value) = value else {
            return if self.is_required() {
                Err(Violation::Missing)
            } else {
                Ok(())
            };
        };

        match self {
            Rule::String(rule) => rule.check(value),
            Rule::Number(rule) => rule.check(value),
            Rule::Boolean(_) => value
                .as_bool()
                .map(|_| ())
                .ok_or_else(|| wrong_type("a boolean", value)),
            Rule::Any(_) => Ok(()),
        }
    }
}

impl From<StringRule> for Rule {
    fn from(rule: StringRule) -> Self {
        Rule::String(rule)
    }
}

impl From<NumberRule> for Rule {
    fn from(rule: NumberRule) -> Self {
        Rule::Number(rule)
    }
}

impl From<BooleanRule> for Rule {
    fn from(rule: BooleanRule) -> Self {
        Rule::Boolean(rule)
    }
}

impl From<AnyRule> for Rule {
    fn from(rule: AnyRule) -> Self {
        Rule::Any(rule)
    }
}

fn wrong_type(expected: &'static str, value: &Value) -> Violation {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    Violation::WrongType { expected, found }
}
