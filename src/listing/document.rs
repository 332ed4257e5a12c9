// src/listing/document.rs

use crate::config::Config;
use crate::errors::IngestError;
use crate::fields::{
    adopt_core_from_extras, is_blank, mirror_aliases_into_extras, num_value, number_from,
    CoreValues, FieldGroupModel,
};
use crate::store::{get_json, put_json, BlobStore};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Map, Value};

pub fn details_key(listing_id: &str) -> String {
    format!("listings/{listing_id}/details.json")
}

/// Current durable document for a listing; absent documents read as empty.
pub fn load_details(
    store: &dyn BlobStore,
    listing_id: &str,
) -> Result<Map<String, Value>, IngestError> {
    Ok(get_json(store, &details_key(listing_id))?.unwrap_or_default())
}

/// Normalize a loosely-formatted date to `YYYY-MM-DD`. Accepts ISO dates,
/// `m/d/y` or `m-d-y` with two- or four-digit years (two-digit years >= 70
/// are 1900s), and RFC 3339 timestamps.
pub fn normalize_active_date(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.format("%Y-%m-%d").to_string());
    }

    let parts: Vec<&str> = s.split(['/', '-']).collect();
    if parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit())) {
        let m: u32 = parts[0].parse().ok()?;
        let d: u32 = parts[1].parse().ok()?;
        let mut y: i32 = parts[2].parse().ok()?;
        if parts[2].len() == 2 {
            y = if y >= 70 { 1900 + y } else { 2000 + y };
        }
        return NaiveDate::from_ymd_opt(y, m, d).map(|d| d.format("%Y-%m-%d").to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    for fmt in ["%B %d, %Y", "%b %d, %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Scrub an incoming patch before it touches the document: normalize the
/// active date and timezone, drop the read-only `details.*` namespace and
/// derived fields, and retire the two legacy aliases that keep creeping back
/// in from old override documents.
pub fn sanitize_patch(patch: &mut Map<String, Value>) {
    if let Some(Value::String(raw)) = patch.get("activeDate") {
        if let Some(iso) = normalize_active_date(raw) {
            patch.insert("activeDate".to_string(), Value::String(iso));
        }
    }
    if let Some(tz) = patch.get("timezone") {
        let trimmed = match tz {
            Value::String(s) => s.trim().to_string(),
            _ => String::new(),
        };
        if trimmed.is_empty() {
            patch.remove("timezone");
        } else {
            patch.insert("timezone".to_string(), Value::String(trimmed));
        }
    }

    patch.retain(|k, _| !k.starts_with("details."));
    patch.remove("daysOnMarket");
    patch.remove("bedrooms");
    patch.remove("squareFeet");
}

/// Apply a patch: null or blank-string values delete their key, everything
/// else overwrites.
pub fn apply_patch(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (k, v) in patch {
        let deletes = matches!(&v, Value::Null) || matches!(&v, Value::String(s) if s.trim().is_empty());
        if deletes {
            target.remove(&k);
        } else {
            target.insert(k, v);
        }
    }
}

/// Roll per-floor bath counts up into the totals the rest of the system
/// reads: full baths across floors into `TotalFullBaths`, full plus half
/// into `totalBaths`.
pub fn normalize_baths(details: &mut Map<String, Value>) {
    let count = |keys: [&str; 3]| -> Vec<f64> {
        keys.iter()
            .filter_map(|k| details.get(*k))
            .filter_map(number_from)
            .collect()
    };

    let full = count(["FullBathsMain", "FullBathsSecond", "FullBathsThird"]);
    let half = count(["HalfBathsMain", "HalfBathsSecond", "HalfBathsThird"]);

    if !full.is_empty() {
        details.insert(
            "TotalFullBaths".to_string(),
            num_value(full.iter().sum::<f64>()),
        );
    }
    if !full.is_empty() || !half.is_empty() {
        let total = full.iter().sum::<f64>() + half.iter().sum::<f64>();
        details.insert("totalBaths".to_string(), num_value(total));
    }
}

/// One save against a listing document. `replace` swaps the whole document
/// for the patch; otherwise recognized keys are patched in place.
pub struct SaveRequest {
    pub listing_id: String,
    pub patch: Map<String, Value>,
    pub replace: bool,
}

pub fn save_listing(
    store: &dyn BlobStore,
    request: &SaveRequest,
    config: &Config,
) -> Result<Map<String, Value>, IngestError> {
    let current = load_details(store, &request.listing_id)?;

    let mut patch = request.patch.clone();
    sanitize_patch(&mut patch);

    let mut next = if request.replace {
        let mut doc = Map::new();
        apply_patch(&mut doc, patch);
        doc
    } else {
        let mut doc = current.clone();
        apply_patch(&mut doc, patch);
        doc
    };

    if next.get("timezone").map(is_blank).unwrap_or(true) {
        let tz = current
            .get("timezone")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&config.default_timezone);
        next.insert("timezone".to_string(), Value::String(tz.to_string()));
    }

    normalize_baths(&mut next);

    next.insert(
        "updatedAt".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    next.insert(
        "_lastEditedBy".to_string(),
        Value::String(config.editor_identity.clone()),
    );

    put_json(store, &details_key(&request.listing_id), &next)?;
    Ok(next)
}

/// Build the full-replace patch for one edit session: adopt blanks from
/// extras, mirror the core back over every recognized alias key, then lay
/// the canonical spellings on top so they always win.
pub fn build_save_patch(
    core: &mut CoreValues,
    mut extras: Map<String, Value>,
    present_sources: &[&Map<String, Value>],
    model: &FieldGroupModel,
) -> Map<String, Value> {
    adopt_core_from_extras(core, &extras, model);
    mirror_aliases_into_extras(&mut extras, core, present_sources, model);
    extras.remove("bedrooms");
    extras.remove("squareFeet");

    let mut patch = extras;
    let mut set = |key: &str, v: Option<Value>| {
        if let Some(v) = v {
            patch.insert(key.to_string(), v);
        }
    };

    let text = |s: &Option<String>| s.clone().map(Value::String);
    let number = |n: &Option<f64>| n.map(num_value);

    set("mls", text(&core.mls));
    set("address", text(&core.address));
    set("city", text(&core.city));
    set("state", text(&core.state));
    set("zip", text(&core.zip));
    set("listPrice", number(&core.price));
    set("price", number(&core.price));
    set("TotalBedrooms", number(&core.beds));
    set("beds", number(&core.beds));
    set("totalBaths", number(&core.baths));
    set("baths", number(&core.baths));
    set("SqFtTotal", number(&core.sqft));
    set("sqft", number(&core.sqft));
    set("yearBuilt", number(&core.year));
    set("status", text(&core.status));
    set("activeDate", text(&core.active_date));
    set("timezone", text(&core.timezone));
    set("publicRemarks", text(&core.description));
    set("remarks", text(&core.description));
    set("agentNotes", text(&core.notes));
    set("primaryPhoto", text(&core.photo));
    set("photo", text(&core.photo));

    patch
}

/// Remove the listing document and every photo stored for it. Returns the
/// number of photo objects deleted.
pub fn delete_listing(store: &dyn BlobStore, listing_id: &str) -> Result<usize, IngestError> {
    let key = details_key(listing_id);
    if store.exists(&key)? {
        eprintln!("🗑️ Deleting listing document: {key}");
        store.delete(&key)?;
    }

    let mut photos_deleted = 0;
    for obj in store.list(&format!("photos/{listing_id}/"))? {
        eprintln!("🗑️ Deleting photo: {}", obj.key);
        store.delete(&obj.key)?;
        photos_deleted += 1;
    }
    Ok(photos_deleted)
}
