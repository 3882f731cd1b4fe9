//! Option coercion shared by collector and handler configuration.
//!
//! Configuration options arrive as loosely-typed JSON; numeric values may be
//! written as text or numbers. The `as_*` functions are total coercions
//! (success reported through `Option`), the `get_as_*` wrappers implement the
//! soft-failure contract: log a warning and fall back to the caller's default,
//! never fail hard.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

/// A recognized-option set, as read from a JSON configuration object.
pub type Options = serde_json::Map<String, Value>;

/// Coerce a value to an integer.
///
/// Accepts integers, floats (truncated), and numeric strings.
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|f| f as i64)),
        _ => None,
    }
}

/// Coerce a value to a float.
///
/// Accepts numbers and numeric strings.
pub fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce a value to a string map.
///
/// Accepts a JSON object of strings or a JSON-encoded object in a string.
pub fn as_string_map(value: &Value) -> Option<HashMap<String, String>> {
    match value {
        Value::Object(map) => {
            let mut result = HashMap::with_capacity(map.len());
            for (k, v) in map {
                match v {
                    Value::String(s) => {
                        result.insert(k.clone(), s.clone());
                    }
                    other => {
                        warn!(key = %k, value = %other, "discarding non-string map entry");
                    }
                }
            }
            Some(result)
        }
        Value::String(s) => serde_json::from_str(s).ok(),
        _ => None,
    }
}

/// Coerce a value to a string list.
///
/// Accepts a JSON array of strings or a JSON-encoded array in a string.
pub fn as_string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::String(s) => serde_json::from_str(s).ok(),
        _ => None,
    }
}

/// Integer coercion with warn-and-fall-back semantics.
pub fn get_as_int(value: &Value, default: i64) -> i64 {
    match as_int(value) {
        Some(v) => v,
        None => {
            warn!(value = %value, default, "failed to coerce value to an int, falling back");
            default
        }
    }
}

/// Float coercion with warn-and-fall-back semantics.
pub fn get_as_float(value: &Value, default: f64) -> f64 {
    match as_float(value) {
        Some(v) => v,
        None => {
            warn!(value = %value, default, "failed to coerce value to a float, falling back");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_as_int() {
        assert_eq!(get_as_int(&json!("10"), 123), 10);
        assert_eq!(get_as_int(&json!("notanint"), 123), 123);
        assert_eq!(get_as_int(&json!(12.123), 123), 12);
        assert_eq!(get_as_int(&json!(12), 123), 12);
    }

    #[test]
    fn test_get_as_float() {
        assert_eq!(get_as_float(&json!("10"), 123.0), 10.0);
        assert_eq!(get_as_float(&json!("10.21"), 123.0), 10.21);
        assert_eq!(get_as_float(&json!("notanint"), 123.0), 123.0);
        assert_eq!(get_as_float(&json!(12.123), 123.0), 12.123);
    }

    #[test]
    fn test_as_int_reports_failure() {
        assert_eq!(as_int(&json!(true)), None);
        assert_eq!(as_int(&json!([1, 2])), None);
        assert_eq!(as_int(&json!("7")), Some(7));
    }

    #[test]
    fn test_as_string_map_from_object_and_string() {
        let expected: HashMap<String, String> = [
            ("runtimeenv".to_string(), "dev".to_string()),
            ("region".to_string(), "uswest1-devc".to_string()),
        ]
        .into();

        let from_str = as_string_map(&json!(
            "{\"runtimeenv\" : \"dev\", \"region\":\"uswest1-devc\"}"
        ));
        assert_eq!(from_str, Some(expected.clone()));

        let from_obj = as_string_map(&json!({"runtimeenv": "dev", "region": "uswest1-devc"}));
        assert_eq!(from_obj, Some(expected));
    }

    #[test]
    fn test_as_string_map_skips_non_string_values() {
        let map = as_string_map(&json!({"ok": "yes", "bad": 7})).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["ok"], "yes");
    }

    #[test]
    fn test_as_string_list() {
        let expected = vec!["TestCollector1".to_string(), "TestCollector2".to_string()];
        assert_eq!(
            as_string_list(&json!("[\"TestCollector1\", \"TestCollector2\"]")),
            Some(expected.clone())
        );
        assert_eq!(
            as_string_list(&json!(["TestCollector1", "TestCollector2"])),
            Some(expected)
        );
        assert_eq!(as_string_list(&json!([1, 2])), None);
    }
}
