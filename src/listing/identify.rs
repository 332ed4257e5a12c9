// src/listing/identify.rs

use crate::fields::is_blank;
use serde_json::{Map, Value};

fn norm_key(k: &str) -> String {
    k.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// First non-blank value whose key matches any candidate spelling after
/// normalization (case and punctuation insensitive), candidates in priority
/// order. CSV headers are too inconsistent for exact lookup here.
pub fn pick_first<'a>(record: &'a Map<String, Value>, candidates: &[&str]) -> Option<&'a Value> {
    for cand in candidates {
        let want = norm_key(cand);
        for (k, v) in record {
            if norm_key(k) == want && !is_blank(v) {
                return Some(v);
            }
        }
    }
    None
}

pub fn read_mls(record: &Map<String, Value>) -> Option<String> {
    pick_first(
        record,
        &["MLS Number", "MLS#", "mls", "MLS", "Listing ID", "ListingId"],
    )
    .map(value_text)
}

fn join_nonempty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(sep)
}

/// Assemble a display address: a direct address-like column if present, else
/// number + street + unit, city, state, zip.
pub fn read_address(record: &Map<String, Value>) -> Option<String> {
    let direct = pick_first(
        record,
        &[
            "Address",
            "Street Address",
            "Full Address",
            "Property Address",
            "Site Address",
            "StreetAddress",
            "Unparsed Address",
        ],
    );
    if let Some(v) = direct {
        return Some(value_text(v));
    }

    let get = |cands: &[&str]| {
        pick_first(record, cands)
            .map(value_text)
            .unwrap_or_default()
    };
    let street = {
        let s = get(&["Street", "Street Name", "StreetName"]);
        if s.is_empty() {
            get(&["Street Address", "StreetAddress"])
        } else {
            s
        }
    };
    let number = get(&["Street Number", "StreetNumber", "Address Number"]);
    let unit = get(&["Unit", "Unit Number", "UnitNumber", "Apt"]);
    let city = get(&["City", "Municipality"]);
    let state = get(&["State", "State Or Province", "StateOrProvince"]);
    let zip = get(&["Zip", "Zip Code", "Postal Code", "PostalCode"]);

    let street_line = join_nonempty(&[&number, &street], " ");
    let line1 = join_nonempty(&[&street_line, &unit], " ");
    let line2 = join_nonempty(&[&city, &state, &zip], ", ");
    let addr = join_nonempty(&[&line1, &line2], ", ");

    if addr.is_empty() {
        None
    } else {
        Some(addr)
    }
}

/// Lowercase, punctuation stripped, whitespace runs collapsed to `-`.
pub fn slugify(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
        // other punctuation drops without producing a separator
    }
    slug
}

/// Stable identifier for an ingested row: explicit MLS-like number first,
/// else the slug of the assembled address, else a positional fallback.
pub fn derive_listing_id(record: &Map<String, Value>, index: usize) -> String {
    if let Some(mls) = read_mls(record) {
        if !mls.is_empty() {
            return mls;
        }
    }
    if let Some(address) = read_address(record) {
        let slug = slugify(&address);
        if !slug.is_empty() {
            return slug;
        }
    }
    format!("row-{}", index + 1)
}
