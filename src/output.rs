//! JSON rendering of bound parameters and of the SQL request body.
//!
//! The remote SQL endpoint takes `{"query": "...", "params": [...]}`; values
//! are converted so that each placeholder binds a plain JSON scalar.
//!
//! # Examples
//!
//! ```
//! use elastic_query::Value;
//! use elastic_query::output::to_json;
//!
//! assert_eq!(to_json(&Value::Integer(42)), serde_json::json!(42));
//! assert_eq!(to_json(&Value::from("x")), serde_json::json!("x"));
//! ```

use rust_decimal::prelude::ToPrimitive;

use crate::{compiler::CompiledQuery, value::Value};

/// Convert a value to JSON.
///
/// Decimals become numbers when they fit an `f64` and strings otherwise;
/// date/times are RFC 3339 strings and unique ids hyphenated strings.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(n) => serde_json::Value::Number((*n).into()),
        Value::Float(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Decimal(d) => d
            .to_f64()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(d.to_string())),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
        Value::Guid(g) => serde_json::Value::String(g.hyphenated().to_string()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Object(members) => {
            let mut keys: Vec<_> = members.keys().collect();
            keys.sort();
            serde_json::Value::Object(
                keys.into_iter()
                    .map(|k| (k.clone(), to_json(&members[k])))
                    .collect(),
            )
        }
        Value::Query(q) => serde_json::Value::String(q.dataset_name.clone()),
    }
}

/// Convert a JSON value to a [`Value`]. Integers stay integers.
pub fn from_json(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(members) => Value::Object(
            members
                .into_iter()
                .map(|(k, v)| (k, from_json(v)))
                .collect(),
        ),
    }
}

impl CompiledQuery {
    /// Request body for the SQL endpoint.
    pub fn to_request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "query": self.sql,
            "params": self.params.iter().map(to_json).collect::<Vec<_>>(),
        })
    }

    pub fn to_request_body_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.to_request_body()).unwrap_or_default()
    }
}
