// src/record/clean.rs

use serde_json::Value;

const TOMBSTONES: [&str; 7] = ["n/a", "na", "none", "-", "\u{2014}", "null", "undefined"];

/// True for values that count as "no data": null, blank or tombstone strings,
/// empty arrays and empty objects.
pub fn is_empty_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || TOMBSTONES.contains(&s.to_lowercase().as_str())
        }
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Recursively strip empty values from a record before persistence.
/// Arrays and objects that end up empty collapse to `None` and are omitted
/// from their parent. Idempotent.
pub fn deep_clean(value: &Value) -> Option<Value> {
    match value {
        Value::Array(items) => {
            let cleaned: Vec<Value> = items.iter().filter_map(deep_clean).collect();
            if cleaned.is_empty() {
                None
            } else {
                Some(Value::Array(cleaned))
            }
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                if let Some(cleaned) = deep_clean(v) {
                    out.insert(k.clone(), cleaned);
                }
            }
            if out.is_empty() {
                None
            } else {
                Some(Value::Object(out))
            }
        }
        v if is_empty_value(v) => None,
        v => Some(v.clone()),
    }
}
