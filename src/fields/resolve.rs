// src/fields/resolve.rs

use super::model::{is_blank, number_from, CanonicalField, FieldGroupModel};
use crate::record::flatten;
use serde_json::{Map, Value};

/// Outcome of resolving one canonical field. Callers must handle the
/// coercion result explicitly instead of duck-typing number-or-string.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Numeric(f64),
    Text(String),
    Absent,
}

impl ResolvedValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, ResolvedValue::Absent)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ResolvedValue::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            ResolvedValue::Numeric(n) => Some(super::model::num_value(n)),
            ResolvedValue::Text(s) => Some(Value::String(s)),
            ResolvedValue::Absent => None,
        }
    }
}

fn value_to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Resolves canonical field values across a priority-ordered list of source
/// records. The ordering encodes a trust hierarchy: the caller passes
/// explicit overrides before computed details before the bulk-imported card,
/// and within one field exact alias spellings outrank fuzzy key matches,
/// which outrank the last-resort numeric scan.
pub struct Resolver<'a> {
    model: &'a FieldGroupModel,
}

impl<'a> Resolver<'a> {
    pub fn new(model: &'a FieldGroupModel) -> Self {
        Self { model }
    }

    pub fn resolve(
        &self,
        sources: &[&Map<String, Value>],
        field: CanonicalField,
        numeric: bool,
    ) -> ResolvedValue {
        self.resolve_inner(sources, field, numeric, true)
    }

    /// Same as [`resolve`](Self::resolve) but without the positive-number
    /// scan, for callers that would rather miss than guess.
    pub fn resolve_no_scan(
        &self,
        sources: &[&Map<String, Value>],
        field: CanonicalField,
        numeric: bool,
    ) -> ResolvedValue {
        self.resolve_inner(sources, field, numeric, false)
    }

    fn resolve_inner(
        &self,
        sources: &[&Map<String, Value>],
        field: CanonicalField,
        numeric: bool,
        allow_scan: bool,
    ) -> ResolvedValue {
        let flats: Vec<Map<String, Value>> = sources.iter().map(|s| flatten(s)).collect();

        // A hit in a higher-priority source always wins, even when it is
        // only a fuzzy key match and a lower-priority source spells the
        // alias exactly. Within one source, exact aliases go first.
        for (source, flat) in sources.iter().zip(&flats) {
            for alias in self.model.aliases(field) {
                if let Some(v) = source.get(*alias) {
                    if let Some(resolved) = accept(v, numeric) {
                        return resolved;
                    }
                }
            }
            for (k, v) in flat {
                if self.model.fuzzy_matches(k, field) {
                    if let Some(resolved) = accept(v, numeric) {
                        return resolved;
                    }
                }
            }
        }

        // Numeric fields only: first strictly-positive number anywhere.
        // Lowest confidence; this can grab an unrelated column and exists
        // only so a threadbare feed still shows something.
        if numeric && allow_scan {
            for flat in &flats {
                for v in flat.values() {
                    if let Some(n) = number_from(v) {
                        if n > 0.0 {
                            return ResolvedValue::Numeric(n);
                        }
                    }
                }
            }
        }

        ResolvedValue::Absent
    }
}

/// A candidate value is usable when non-blank and, for numeric fields,
/// finitely coercible. Non-coercible candidates are skipped, not returned.
fn accept(v: &Value, numeric: bool) -> Option<ResolvedValue> {
    if is_blank(v) {
        return None;
    }
    if numeric {
        number_from(v).map(ResolvedValue::Numeric)
    } else {
        Some(ResolvedValue::Text(value_to_text(v)))
    }
}
