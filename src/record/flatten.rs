// src/record/flatten.rs

use serde_json::{Map, Value};

const MAX_FLATTEN_DEPTH: usize = 6;

/// Flatten a nested record into a single-level map with dotted path keys.
///
/// Arrays are leaf values (never expanded); an object below the depth limit
/// is kept whole as a leaf. The first occurrence of a flattened key wins,
/// later duplicates from deeper nesting are dropped.
pub fn flatten(record: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(record, MAX_FLATTEN_DEPTH, "", &mut out);
    out
}

fn flatten_into(record: &Map<String, Value>, depth: usize, prefix: &str, out: &mut Map<String, Value>) {
    for (k, v) in record {
        let key = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        match v {
            Value::Object(nested) if depth > 0 => {
                flatten_into(nested, depth - 1, &key, out);
            }
            _ => {
                out.entry(key).or_insert_with(|| v.clone());
            }
        }
    }
}
