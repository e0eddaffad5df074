//! Declarative request/response schemas.
//!
//! A [`Schema`] is a static table of fields and constraints. The same table
//! validates incoming JSON, gates model output and is rendered as the JSON
//! Schema handed to the model for structured output.

mod types;

pub use types::*;

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

impl Schema {
    /// Checks `value` against every field rule, stopping at the first violation.
    pub fn validate(&self, value: &Value) -> Result<()> {
        let object = value.as_object().ok_or_else(|| {
            Error::validation(
                "$",
                "object",
                format!("{} must be a JSON object", self.name),
            )
        })?;

        for field in self.fields {
            match object.get(field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(Error::validation(
                            field.name,
                            "required",
                            format!("{} is required", field.name),
                        ));
                    }
                }
                Some(value) => field.check(value)?,
            }
        }

        Ok(())
    }

    /// Validates and then deserializes into the typed value.
    pub fn parse<T: DeserializeOwned>(&self, value: &Value) -> Result<T> {
        self.validate(value)?;
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in self.fields {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(field.kind.json_type()));
            property.insert("description".to_string(), json!(field.description));
            for constraint in field.constraints {
                match constraint {
                    Constraint::MinLength { min, .. } => {
                        property.insert("minLength".to_string(), json!(min));
                    }
                    Constraint::Pattern { regex, .. } => {
                        property.insert("pattern".to_string(), json!(regex.as_str()));
                    }
                }
            }
            properties.insert(field.name.to_string(), Value::Object(property));
            if field.required {
                required.push(json!(field.name));
            }
        }

        json!({
            "type": "object",
            "description": self.description,
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

impl Field {
    fn check(&self, value: &Value) -> Result<()> {
        let text = match (self.kind, value) {
            (FieldKind::String, Value::String(text)) => text,
            (FieldKind::Boolean, Value::Bool(_)) => return Ok(()),
            _ => {
                return Err(Error::validation(
                    self.name,
                    "type",
                    format!("{} must be a {}", self.name, self.kind),
                ));
            }
        };

        match self
            .constraints
            .iter()
            .find(|constraint| !constraint.is_satisfied_by(text))
        {
            Some(violated) => Err(Error::validation(
                self.name,
                violated.name(),
                violated.message(),
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regex::Regex;
    use std::sync::LazyLock;

    static HEX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[0-9a-f]+$").expect("invalid hex regex"));

    static SAMPLE: Schema = Schema {
        name: "Sample",
        description: "A sample shape",
        fields: &[
            Field {
                name: "id",
                kind: FieldKind::String,
                required: true,
                description: "Hex identifier",
                constraints: &[
                    Constraint::MinLength {
                        min: 1,
                        message: "id cannot be empty",
                    },
                    Constraint::Pattern {
                        regex: &HEX,
                        message: "id must be hex",
                    },
                ],
            },
            Field {
                name: "flag",
                kind: FieldKind::Boolean,
                required: false,
                description: "Optional flag",
                constraints: &[],
            },
        ],
    };

    fn violation(value: Value) -> (String, String, String) {
        match SAMPLE.validate(&value) {
            Err(Error::Validation {
                field,
                constraint,
                message,
            }) => (field, constraint, message),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_valid_object() {
        assert!(SAMPLE.validate(&json!({"id": "beef", "flag": true})).is_ok());
        assert!(SAMPLE.validate(&json!({"id": "beef"})).is_ok());
    }

    #[test]
    fn test_optional_null_is_absent() {
        assert!(SAMPLE.validate(&json!({"id": "beef", "flag": null})).is_ok());
    }

    #[test]
    fn test_rejects_non_object_root() {
        let (field, constraint, _) = violation(json!(["beef"]));
        assert_eq!(field, "$");
        assert_eq!(constraint, "object");
    }

    #[test]
    fn test_missing_required_field() {
        let (field, constraint, message) = violation(json!({"flag": false}));
        assert_eq!(field, "id");
        assert_eq!(constraint, "required");
        assert_eq!(message, "id is required");
    }

    #[test]
    fn test_constraints_checked_in_declared_order() {
        let (_, constraint, message) = violation(json!({"id": ""}));
        assert_eq!(constraint, "min_length");
        assert_eq!(message, "id cannot be empty");

        let (_, constraint, message) = violation(json!({"id": "xyz"}));
        assert_eq!(constraint, "pattern");
        assert_eq!(message, "id must be hex");
    }

    #[test]
    fn test_wrong_kind() {
        let (field, constraint, message) = violation(json!({"id": "beef", "flag": "yes"}));
        assert_eq!(field, "flag");
        assert_eq!(constraint, "type");
        assert_eq!(message, "flag must be a boolean");
    }

    #[test]
    fn test_json_schema_rendering() {
        let rendered = SAMPLE.to_json_schema();
        assert_eq!(
            rendered,
            json!({
                "type": "object",
                "description": "A sample shape",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "Hex identifier",
                        "minLength": 1,
                        "pattern": "^[0-9a-f]+$"
                    },
                    "flag": {
                        "type": "boolean",
                        "description": "Optional flag"
                    }
                },
                "required": ["id"],
                "additionalProperties": false
            })
        );
    }
}
