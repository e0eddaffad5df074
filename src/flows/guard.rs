use crate::{Error, Result, schema::Schema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Gates raw model output through the response schema.
///
/// Absent or `null` output is a contract violation; anything else must pass
/// the schema and is returned as-is, only converted to the typed value.
pub fn guard<T: DeserializeOwned>(schema: &Schema, raw: Option<Value>) -> Result<T> {
    match raw {
        None | Some(Value::Null) => Err(Error::contract("no output returned")),
        Some(value) => schema.parse(&value),
    }
}
