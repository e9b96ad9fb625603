use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{FieldViolation, ValidationError};
use crate::rule::Rule;

/// Field name to [`Rule`] mapping. Declaring a field twice replaces the
/// earlier rule.
///
/// Deserializes from a JSON object, keeping the document's field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<(String, Rule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: impl Into<Rule>) -> Self {
        self.insert(name, rule);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, rule: impl Into<Rule>) {
        let name = name.into();
        let rule = rule.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(slot) => slot.1 = rule,
            None => self.fields.push((name, rule)),
        }
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, rule)| rule)
    }

    /// Whether the schema has a rule for `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.rule(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Check every declared field of `event`, collecting all violations.
    pub fn validate(&self, event: &Map<String, Value>) -> Result<(), ValidationError> {
        let violations = self
            .fields
            .iter()
            .filter_map(|(field, rule)| {
                rule.evaluate(event.get(field))
                    .err()
                    .map(|violation| FieldViolation {
                        field: field.clone(),
                        violation,
                    })
            })
            .collect::<Vec<_>>();

        trace!(
            fields = self.fields.len(),
            violations = violations.len(),
            "schema evaluated"
        );

        match ValidationError::from_violations(violations) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<K, R> FromIterator<(K, R)> for Schema
where
    K: Into<String>,
    R: Into<Rule>,
{
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, rule) in iter {
            schema.insert(name, rule);
        }
        schema
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to rules")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Schema, A::Error> {
                let mut schema = Schema::new();
                while let Some((name, rule)) = access.next_entry::<String, Rule>()? {
                    schema.insert(name, rule);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Violation;
    use crate::types::{any, number, string};
    use serde_json::json;

    fn person_schema() -> Schema {
        Schema::new()
            .field("name", string().required())
            .field("age", number().min(0).max(120).required())
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn empty_schema_accepts_anything() {
        let schema = Schema::new();
        assert!(schema.is_empty());
        assert_eq!(schema.validate(&object(json!({ "x": 1 }))), Ok(()));
        assert_eq!(schema.validate(&Map::new()), Ok(()));
    }

    #[test]
    fn valid_event_passes_and_extra_fields_are_ignored() {
        let event = object(json!({ "name": "fred", "age": 16, "extra": [1, 2, 3] }));
        assert_eq!(person_schema().validate(&event), Ok(()));
    }

    #[test]
    fn missing_required_field_fails() {
        let err = person_schema()
            .validate(&object(json!({ "name": "fred" })))
            .expect_err("age missing");
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violation_for("age"), Some(&Violation::Missing));
    }

    #[test]
    fn every_violation_is_reported_in_declaration_order() {
        let err = person_schema()
            .validate(&object(json!({ "name": 7, "age": 200 })))
            .expect_err("two violations");
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(
            err.violation_for("age"),
            Some(&Violation::AboveMaximum { max: 120.0 })
        );
    }

    #[test]
    fn redeclaring_a_field_replaces_its_rule() {
        let schema = person_schema().field("age", any());
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.validate(&object(json!({ "name": "fred" }))), Ok(()));
        assert_eq!(
            schema.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["name", "age"]
        );
    }

    #[test]
    fn declares_reports_known_fields() {
        let schema = person_schema().field("jwt", any());
        assert!(schema.declares("jwt"));
        assert!(!schema.declares("token"));
    }

    #[test]
    fn schema_deserializes_from_json_object() {
        let schema: Schema = serde_json::from_value(json!({
            "name": { "type": "string", "required": true },
            "age": { "type": "number", "min": 0, "max": 120, "required": true },
            "jwt": { "type": "any" }
        }))
        .expect("schema");

        assert_eq!(schema.len(), 3);
        assert!(schema.declares("jwt"));
        assert!(schema.rule("age").is_some_and(Rule::is_required));
        let err = schema
            .validate(&object(json!({ "name": "fred" })))
            .expect_err("age missing");
        assert_eq!(err.violation_for("age"), Some(&Violation::Missing));
    }

    #[test]
    fn deserialized_schema_reports_in_document_order() {
        let source = r#"{
            "zeta": { "type": "string", "required": true },
            "alpha": { "type": "number", "required": true }
        }"#;
        let from_text: Schema = serde_json::from_str(source).expect("schema");
        let from_value: Schema =
            serde_json::from_value(serde_json::from_str::<Value>(source).expect("json"))
                .expect("schema");

        for schema in [from_text, from_value] {
            let err = schema.validate(&Map::new()).expect_err("both missing");
            assert_eq!(err.fields().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        }
    }
}
