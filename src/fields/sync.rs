// src/fields/sync.rs

use super::model::{is_blank, num_value, number_from, CanonicalField, FieldGroupModel, SYNC_GROUPS};
use super::resolve::{ResolvedValue, Resolver};
use super::visibility::KeyVisibility;
use crate::record::flatten;
use serde_json::{Map, Value};

/// The core form state for one edit session: resolved canonical values,
/// mutated by user input or by adoption from extras, flowing into a single
/// save patch at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreValues {
    pub mls: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub price: Option<f64>,
    pub beds: Option<f64>,
    pub baths: Option<f64>,
    pub sqft: Option<f64>,
    pub year: Option<f64>,
    pub status: Option<String>,
    pub active_date: Option<String>,
    pub timezone: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub photo: Option<String>,
}

fn text_of(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl CoreValues {
    /// Resolve a fresh core from the layered sources of one listing,
    /// highest-trust source first (overrides, details, card summary).
    pub fn resolve_from(resolver: &Resolver<'_>, sources: &[&Map<String, Value>]) -> Self {
        let text = |field| match resolver.resolve(sources, field, false) {
            ResolvedValue::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        };
        let number = |field| resolver.resolve(sources, field, true).as_f64();

        CoreValues {
            mls: text(CanonicalField::Mls),
            address: text(CanonicalField::Address),
            city: text(CanonicalField::City),
            state: text(CanonicalField::State),
            zip: text(CanonicalField::Zip),
            price: number(CanonicalField::Price),
            beds: number(CanonicalField::Beds),
            baths: number(CanonicalField::Baths),
            sqft: number(CanonicalField::Sqft),
            year: number(CanonicalField::Year),
            status: text(CanonicalField::Status),
            active_date: text(CanonicalField::ActiveDate),
            timezone: text(CanonicalField::Timezone),
            description: text(CanonicalField::Description),
            notes: text(CanonicalField::Notes),
            photo: text(CanonicalField::Photo),
        }
    }

    pub fn is_blank_for(&self, field: CanonicalField) -> bool {
        self.group_value(field).is_none()
    }

    /// The field's current value rendered as JSON, `None` when blank.
    pub fn group_value(&self, field: CanonicalField) -> Option<Value> {
        match field {
            CanonicalField::Mls => self.mls.clone().map(Value::String),
            CanonicalField::Address => self.address.clone().map(Value::String),
            CanonicalField::City => self.city.clone().map(Value::String),
            CanonicalField::State => self.state.clone().map(Value::String),
            CanonicalField::Zip => self.zip.clone().map(Value::String),
            CanonicalField::Price => self.price.map(num_value),
            CanonicalField::Beds => self.beds.map(num_value),
            CanonicalField::Baths => self.baths.map(num_value),
            CanonicalField::Sqft => self.sqft.map(num_value),
            CanonicalField::Year => self.year.map(num_value),
            CanonicalField::Status => self.status.clone().map(Value::String),
            CanonicalField::ActiveDate => self.active_date.clone().map(Value::String),
            CanonicalField::Timezone => self.timezone.clone().map(Value::String),
            CanonicalField::Description => self.description.clone().map(Value::String),
            CanonicalField::Notes => self.notes.clone().map(Value::String),
            CanonicalField::Photo => self.photo.clone().map(Value::String),
        }
    }

    fn set_from(&mut self, field: CanonicalField, v: &Value) {
        if field.is_numeric() {
            let Some(n) = number_from(v) else { return };
            match field {
                CanonicalField::Price => self.price = Some(n),
                CanonicalField::Beds => self.beds = Some(n),
                CanonicalField::Baths => self.baths = Some(n),
                CanonicalField::Sqft => self.sqft = Some(n),
                CanonicalField::Year => self.year = Some(n),
                _ => {}
            }
            return;
        }
        let Some(s) = text_of(v) else { return };
        match field {
            CanonicalField::Mls => self.mls = Some(s),
            CanonicalField::Address => self.address = Some(s),
            CanonicalField::City => self.city = Some(s),
            CanonicalField::State => self.state = Some(s),
            CanonicalField::Zip => self.zip = Some(s),
            CanonicalField::Status => self.status = Some(s),
            CanonicalField::ActiveDate => self.active_date = Some(s),
            CanonicalField::Timezone => self.timezone = Some(s),
            CanonicalField::Description => self.description = Some(s),
            CanonicalField::Notes => self.notes = Some(s),
            CanonicalField::Photo => self.photo = Some(s),
            _ => {}
        }
    }
}

/// Extras -> core. Fill blank core fields from the best alias value found in
/// extras. Core values that are already set are never overwritten; a value
/// the user typed always beats a leftover import column.
pub fn adopt_core_from_extras(
    core: &mut CoreValues,
    extras: &Map<String, Value>,
    model: &FieldGroupModel,
) {
    for field in SYNC_GROUPS {
        if !core.is_blank_for(field) {
            continue;
        }
        if let Some(v) = model.pick_group_value(extras, field) {
            core.set_from(field, v);
        }
    }
}

/// Core -> extras. Every key (across the present source layers and the
/// extras themselves) that belongs to a recognized group is overwritten with
/// the current core value; first matching group wins per key. Two legacy
/// aliases are retired outright on every save: once beds and sqft are known,
/// `bedrooms` and `squareFeet` are deleted so stale duplicates stop
/// re-accumulating, with `TotalBedrooms`/`SqFtTotal` carrying the values.
pub fn mirror_aliases_into_extras(
    extras: &mut Map<String, Value>,
    core: &CoreValues,
    present_sources: &[&Map<String, Value>],
    model: &FieldGroupModel,
) {
    let mut keys: Vec<String> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for source in present_sources {
        for k in flatten(source).keys() {
            if seen.insert(k.clone()) {
                keys.push(k.clone());
            }
        }
    }
    for k in extras.keys() {
        if seen.insert(k.clone()) {
            keys.push(k.clone());
        }
    }

    for key in keys {
        for field in SYNC_GROUPS {
            if !model.key_belongs_to_group(&key, field) {
                continue;
            }
            if let Some(val) = core.group_value(field) {
                extras.insert(key, val);
                break;
            }
        }
    }

    if let Some(beds) = core.beds {
        extras.insert("TotalBedrooms".to_string(), num_value(beds));
        extras.remove("bedrooms");
    }
    if let Some(sqft) = core.sqft {
        extras.insert("SqFtTotal".to_string(), num_value(sqft));
        extras.remove("squareFeet");
    }
}

/// Merge the layered sources into the editable extras set, dropping keys the
/// core form owns, provenance data and anything the visibility filter hides.
/// Later sources overwrite earlier ones, so callers pass lowest trust first.
pub fn collect_visible_extras(
    sources: &[&Map<String, Value>],
    visibility: &KeyVisibility,
) -> Map<String, Value> {
    let mut merged = Map::new();
    for source in sources {
        for (k, v) in flatten(source) {
            if visibility.is_canonical(&k) {
                continue;
            }
            if k.to_lowercase().contains("source.i") || k == "detailsUrl" {
                continue;
            }
            if visibility.should_hide(&k) {
                continue;
            }
            merged.insert(k, v);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn resolve_from_layers_sources_by_trust() {
        let model = FieldGroupModel::standard();
        let resolver = Resolver::new(&model);
        let overrides = map(json!({ "status": "Pending" }));
        let card = map(json!({
            "ListPrice": "$350,000",
            "StandardStatus": "Active",
            "City": "Springfield"
        }));

        let core = CoreValues::resolve_from(&resolver, &[&overrides, &card]);
        assert_eq!(core.status.as_deref(), Some("Pending"));
        assert_eq!(core.price, Some(350000.0));
        assert_eq!(core.city.as_deref(), Some("Springfield"));
        assert_eq!(core.mls, None);
    }

    #[test]
    fn adopt_fills_blank_beds_from_extras() {
        let model = FieldGroupModel::standard();
        let mut core = CoreValues::default();
        let extras = map(json!({ "bedrooms": 4 }));

        adopt_core_from_extras(&mut core, &extras, &model);
        assert_eq!(core.beds, Some(4.0));
    }

    #[test]
    fn adopt_never_overwrites_user_entered_values() {
        let model = FieldGroupModel::standard();
        let mut core = CoreValues {
            price: Some(500000.0),
            ..CoreValues::default()
        };
        let extras = map(json!({ "ListPrice": "350000", "bedrooms": "2" }));

        adopt_core_from_extras(&mut core, &extras, &model);
        assert_eq!(core.price, Some(500000.0));
        assert_eq!(core.beds, Some(2.0));
    }

    #[test]
    fn mirror_rewrites_grouped_keys_and_retires_legacy_aliases() {
        let model = FieldGroupModel::standard();
        let core = CoreValues {
            beds: Some(4.0),
            sqft: Some(1800.0),
            price: Some(350000.0),
            ..CoreValues::default()
        };
        let mut extras = map(json!({
            "bedrooms": 2,
            "ListPrice": "999",
            "LotFeatures": "corner lot"
        }));
        let details = map(json!({ "BuildingAreaTotal": "1500" }));

        mirror_aliases_into_extras(&mut extras, &core, &[&details], &model);

        assert_eq!(extras.get("ListPrice"), Some(&json!(350000)));
        assert_eq!(extras.get("BuildingAreaTotal"), Some(&json!(1800)));
        assert_eq!(extras.get("TotalBedrooms"), Some(&json!(4)));
        assert_eq!(extras.get("SqFtTotal"), Some(&json!(1800)));
        assert!(extras.get("bedrooms").is_none());
        assert_eq!(extras.get("LotFeatures"), Some(&json!("corner lot")));
    }

    #[test]
    fn mirror_then_adopt_round_trips_core_values() {
        let model = FieldGroupModel::standard();
        let core = CoreValues {
            price: Some(275000.0),
            beds: Some(3.0),
            baths: Some(2.0),
            sqft: Some(1650.0),
            status: Some("Active".to_string()),
            city: Some("Springfield".to_string()),
            ..CoreValues::default()
        };
        let mut extras = map(json!({
            "ListPrice": "1",
            "totalBaths": "9",
            "SqFtTotal": "2",
            "StandardStatus": "Sold",
            "City": "Elsewhere"
        }));

        mirror_aliases_into_extras(&mut extras, &core, &[], &model);

        let mut adopted = CoreValues::default();
        adopt_core_from_extras(&mut adopted, &extras, &model);

        assert_eq!(adopted.price, core.price);
        assert_eq!(adopted.beds, core.beds);
        assert_eq!(adopted.baths, core.baths);
        assert_eq!(adopted.sqft, core.sqft);
        assert_eq!(adopted.status, core.status);
        assert_eq!(adopted.city, core.city);
    }

    #[test]
    fn visible_extras_drop_canonical_and_provenance_keys() {
        let vis = KeyVisibility::new(false);
        let details = map(json!({
            "ListPrice": 350000,
            "LotFeatures": "corner lot",
            "source": { "csvKey": "csv-incoming/feed.csv", "ingestedAt": "2026-01-01" },
            "detailsUrl": "https://example.com/details.json"
        }));

        let extras = collect_visible_extras(&[&details], &vis);
        assert!(extras.get("ListPrice").is_none());
        assert!(extras.get("source.csvKey").is_none());
        assert!(extras.get("source.ingestedAt").is_none());
        assert!(extras.get("detailsUrl").is_none());
        assert_eq!(extras.get("LotFeatures"), Some(&json!("corner lot")));
    }
}
