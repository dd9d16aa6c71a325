use chrono::DateTime;
use elastic_query::{Value, from_json, to_json};
use rust_decimal::Decimal;
use serde_json::json;
use std::{collections::HashMap, str::FromStr};
use uuid::Uuid;

#[test]
fn test_scalars_to_json() {
    assert_eq!(to_json(&Value::Null), json!(null));
    assert_eq!(to_json(&Value::Boolean(true)), json!(true));
    assert_eq!(to_json(&Value::Integer(-3)), json!(-3));
    assert_eq!(to_json(&Value::Float(1.5)), json!(1.5));
    assert_eq!(to_json(&Value::from("x")), json!("x"));
}

#[test]
fn test_decimal_to_json() {
    let price = Decimal::from_str("12.25").unwrap();
    assert_eq!(to_json(&Value::from(price)), json!(12.25));
}

#[test]
fn test_datetime_to_json() {
    let dt = DateTime::parse_from_rfc3339("2024-03-01T10:30:00+02:00").unwrap();
    assert_eq!(to_json(&Value::from(dt)), json!("2024-03-01T10:30:00+02:00"));
}

#[test]
fn test_guid_to_json() {
    let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
    assert_eq!(
        to_json(&Value::from(id)),
        json!("67e55044-10b1-426f-9247-bb680e5fe0c8")
    );
}

#[test]
fn test_collections_to_json() {
    let list = Value::Array(vec![Value::Integer(1), Value::Null]);
    assert_eq!(to_json(&list), json!([1, null]));

    let mut members = HashMap::new();
    members.insert("b".to_string(), Value::Integer(2));
    members.insert("a".to_string(), Value::Integer(1));
    assert_eq!(
        serde_json::to_string(&to_json(&Value::Object(members))).unwrap(),
        r#"{"a":1,"b":2}"#
    );
}

#[test]
fn test_from_json() {
    assert_eq!(from_json(json!(7)), Value::Integer(7));
    assert_eq!(from_json(json!(0.5)), Value::Float(0.5));
    assert_eq!(
        from_json(json!([1, "a", null])),
        Value::Array(vec![Value::Integer(1), Value::from("a"), Value::Null])
    );
    assert_eq!(
        from_json(json!({ "k": true })).member("k"),
        Some(&Value::Boolean(true))
    );
}

#[test]
fn test_optional_values() {
    assert_eq!(Value::from(Some(3)), Value::Integer(3));
    assert_eq!(Value::from(None::<i64>), Value::Null);
}
