// src/fields/model.rs

use regex::Regex;
use serde_json::{Map, Value};

/// The fixed set of listing attributes everything normalizes toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Mls,
    Address,
    City,
    State,
    Zip,
    Price,
    Beds,
    Baths,
    Sqft,
    Year,
    Status,
    ActiveDate,
    Timezone,
    Description,
    Notes,
    Photo,
}

pub const ALL_FIELDS: [CanonicalField; 16] = [
    CanonicalField::Mls,
    CanonicalField::Address,
    CanonicalField::City,
    CanonicalField::State,
    CanonicalField::Zip,
    CanonicalField::Price,
    CanonicalField::Beds,
    CanonicalField::Baths,
    CanonicalField::Sqft,
    CanonicalField::Year,
    CanonicalField::Status,
    CanonicalField::ActiveDate,
    CanonicalField::Timezone,
    CanonicalField::Description,
    CanonicalField::Notes,
    CanonicalField::Photo,
];

/// Fields that participate in core<->extras synchronization, in the order
/// mirroring tries them. First matching group wins per key, so this order is
/// part of the behavior, not a style choice.
pub const SYNC_GROUPS: [CanonicalField; 12] = [
    CanonicalField::Price,
    CanonicalField::Beds,
    CanonicalField::Baths,
    CanonicalField::Sqft,
    CanonicalField::Year,
    CanonicalField::Status,
    CanonicalField::Description,
    CanonicalField::Photo,
    CanonicalField::Address,
    CanonicalField::City,
    CanonicalField::State,
    CanonicalField::Zip,
];

impl CanonicalField {
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::Mls => "mls",
            CanonicalField::Address => "address",
            CanonicalField::City => "city",
            CanonicalField::State => "state",
            CanonicalField::Zip => "zip",
            CanonicalField::Price => "price",
            CanonicalField::Beds => "beds",
            CanonicalField::Baths => "baths",
            CanonicalField::Sqft => "sqft",
            CanonicalField::Year => "year",
            CanonicalField::Status => "status",
            CanonicalField::ActiveDate => "activeDate",
            CanonicalField::Timezone => "timezone",
            CanonicalField::Description => "description",
            CanonicalField::Notes => "notes",
            CanonicalField::Photo => "photo",
        }
    }

    /// Fields whose values coerce to numbers during resolution and adoption.
    /// Zip stays text so leading zeros survive.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            CanonicalField::Price
                | CanonicalField::Beds
                | CanonicalField::Baths
                | CanonicalField::Sqft
                | CanonicalField::Year
        )
    }

    fn index(&self) -> usize {
        ALL_FIELDS.iter().position(|f| f == self).unwrap_or(0)
    }
}

/// Null and blank strings count as "no value"; tombstone strings like "n/a"
/// are NOT blank here — the record cleaner owns those.
pub fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Best-effort numeric coercion: strip everything but digits, dot and minus,
/// then parse. `"$350,000"` -> `350000.0`, `"1,800"` -> `1800.0`.
pub fn number_from(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => {
            let digits: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            if digits.is_empty() {
                return None;
            }
            digits.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Render a coerced number as JSON, keeping integral values as integers so
/// `beds: 4` does not round-trip into `beds: 4.0`.
pub fn num_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

struct FieldSpec {
    /// Known exact spellings, in resolution priority order.
    aliases: &'static [&'static str],
    /// Looser patterns tried against flattened keys when no alias hits.
    fuzzy: Vec<Regex>,
    /// Exact spellings tried first when adopting a value from extras.
    group_priority: &'static [&'static str],
    /// Patterns that classify an arbitrary key as belonging to this group.
    group_matchers: Vec<Regex>,
}

/// Immutable alias/matcher tables for every canonical field. Built once and
/// passed to the resolver, synchronizer and visibility filter so there is a
/// single source of truth without module-level globals.
pub struct FieldGroupModel {
    specs: Vec<FieldSpec>,
}

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

fn rxs(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| rx(p)).collect()
}

impl FieldGroupModel {
    /// The historically-grown tables: every spelling here has been seen in a
    /// real feed or an old override document at some point.
    pub fn standard() -> Self {
        let specs = ALL_FIELDS
            .iter()
            .map(|field| match field {
                CanonicalField::Mls => FieldSpec {
                    aliases: &["mls", "MLS", "mlsNumber", "MlsNumber", "ListingId", "ListingID", "MLSNumber"],
                    fuzzy: rxs(&[r"(?i)mls", r"(?i)listing\.?id", r"(?i)mlsnumber"]),
                    group_priority: &[],
                    group_matchers: vec![],
                },
                CanonicalField::Address => FieldSpec {
                    aliases: &["address", "Address", "StreetAddress", "StreetNumberNumeric", "StreetName", "FullAddress"],
                    fuzzy: rxs(&[r"(?i)address", r"(?i)street"]),
                    group_priority: &["FullAddress", "StreetAddress", "address", "StreetName"],
                    group_matchers: rxs(&[r"(?i)address", r"(?i)streetaddress", r"(?i)streetname", r"(?i)fulladdress"]),
                },
                CanonicalField::City => FieldSpec {
                    aliases: &["city", "City", "Town"],
                    fuzzy: rxs(&[r"(?i)city"]),
                    group_priority: &["City", "city"],
                    group_matchers: rxs(&[r"(?i)city"]),
                },
                CanonicalField::State => FieldSpec {
                    aliases: &["state", "State", "Province"],
                    fuzzy: rxs(&[r"(?i)state", r"(?i)province"]),
                    group_priority: &["State", "Province", "state", "province"],
                    group_matchers: rxs(&[r"(?i)state", r"(?i)province"]),
                },
                CanonicalField::Zip => FieldSpec {
                    aliases: &["zip", "Zip", "postalCode", "PostalCode", "ZipCode", "ParcelZip"],
                    fuzzy: rxs(&[r"(?i)zip", r"(?i)postal"]),
                    group_priority: &["PostalCode", "ZipCode", "zip", "postalCode", "ParcelZip"],
                    group_matchers: rxs(&[r"(?i)zip", r"(?i)postalcode", r"(?i)parcelzip"]),
                },
                CanonicalField::Price => FieldSpec {
                    aliases: &["price", "listPrice", "ListPrice", "ListPriceOriginal", "OriginalListPrice", "CurrentPrice"],
                    fuzzy: rxs(&[r"(?i)price", r"(?i)list\.?price", r"(?i)current\.?price"]),
                    group_priority: &["ListPrice", "CurrentPrice", "price", "listPrice", "OriginalListPrice"],
                    group_matchers: rxs(&[r"(?i)price", r"(?i)listprice", r"(?i)currentprice", r"(?i)originallistprice"]),
                },
                CanonicalField::Beds => FieldSpec {
                    aliases: &["TotalBedrooms", "BedroomsTotal", "Bedrooms", "BedsTotal", "BedroomsTotalInteger", "beds", "bedrooms"],
                    fuzzy: rxs(&[r"(?i)beds?", r"(?i)bedrooms?", r"(?i)totalbedrooms?"]),
                    group_priority: &["TotalBedrooms", "BedroomsTotal", "BedroomsTotalInteger", "BedsTotal", "Bedrooms", "beds", "bedrooms"],
                    group_matchers: rxs(&[r"(?i)totalbedrooms", r"(?i)bedroomstotal", r"(?i)bedroomstotalinteger", r"(?i)beds"]),
                },
                CanonicalField::Baths => FieldSpec {
                    aliases: &["totalBaths", "BathroomsTotalInteger", "FullBaths", "BathTotal", "bathrooms", "baths", "TotalFullBaths"],
                    fuzzy: rxs(&[r"(?i)baths?", r"(?i)bathrooms?", r"(?i)full\b.*bath"]),
                    group_priority: &["totalBaths", "BathroomsTotalInteger", "bathrooms", "baths", "BathTotal"],
                    group_matchers: rxs(&[
                        r"(?i)(^|[^A-Za-z])totalbaths([^A-Za-z]|$)",
                        r"(?i)bathroomstotalinteger",
                        r"(?i)(^|[^A-Za-z])baths([^A-Za-z]|$)",
                        r"(?i)(^|[^A-Za-z])bathrooms([^A-Za-z]|$)",
                        r"(?i)(^|[^A-Za-z])bathtotal([^A-Za-z]|$)",
                    ]),
                },
                CanonicalField::Sqft => FieldSpec {
                    aliases: &["SqFtTotal", "TotalSqFt", "BuildingAreaTotal", "squareFeet", "LivingArea", "livingArea", "sqft", "SqFtMainFloor", "AboveGradeFinishedArea"],
                    fuzzy: rxs(&[r"(?i)sq.?ft", r"(?i)square.?feet", r"(?i)living.?area", r"(?i)building.?area"]),
                    group_priority: &["SqFtTotal", "TotalSqFt", "BuildingAreaTotal", "squareFeet", "LivingArea", "livingArea", "sqft", "SqFtMainFloor", "AboveGradeFinishedArea"],
                    group_matchers: rxs(&[r"(?i)sqfttotal", r"(?i)totalsqft", r"(?i)buildingareatotal", r"(?i)squarefeet", r"(?i)livingarea", r"(?i)sqft", r"(?i)sqftmainfloor"]),
                },
                CanonicalField::Year => FieldSpec {
                    aliases: &["YearBuilt", "YearBuiltDetails", "yearBuilt", "year"],
                    fuzzy: rxs(&[r"(?i)year.?built", r"(?i)built.?year"]),
                    group_priority: &["YearBuilt", "YearBuiltDetails", "yearBuilt", "year"],
                    group_matchers: rxs(&[r"(?i)yearbuilt", r"(?i)yearbuiltdetails", r"(?i)year"]),
                },
                CanonicalField::Status => FieldSpec {
                    aliases: &["status", "ListingStatus", "Status", "StandardStatus"],
                    fuzzy: rxs(&[r"(?i)status", r"(?i)standardstatus", r"(?i)listingstatus"]),
                    group_priority: &["StandardStatus", "ListingStatus", "status"],
                    group_matchers: rxs(&[r"(?i)status", r"(?i)standardstatus", r"(?i)listingstatus"]),
                },
                CanonicalField::ActiveDate => FieldSpec {
                    aliases: &["activeDate", "listDate", "ListDate", "DateListed", "DateActive", "ListingDate"],
                    fuzzy: rxs(&[r"(?i)active.?date", r"(?i)list.?date", r"(?i)date.?listed"]),
                    group_priority: &[],
                    group_matchers: vec![],
                },
                CanonicalField::Timezone => FieldSpec {
                    aliases: &["timezone", "TimeZone", "TimeZoneLocal"],
                    fuzzy: rxs(&[r"(?i)time.?zone"]),
                    group_priority: &[],
                    group_matchers: vec![],
                },
                CanonicalField::Description => FieldSpec {
                    aliases: &["publicRemarks", "remarks", "description", "PublicRemarks", "PropertyDescription", "RemarksPublic", "Remarks"],
                    fuzzy: rxs(&[r"(?i)remarks?", r"(?i)description"]),
                    group_priority: &["PublicRemarks", "RemarksPublic", "remarks", "description", "publicRemarks"],
                    group_matchers: rxs(&[r"(?i)remarks", r"(?i)description", r"(?i)publicremarks"]),
                },
                CanonicalField::Notes => FieldSpec {
                    aliases: &["agentNotes", "AgentNotes", "PrivateRemarks"],
                    fuzzy: rxs(&[r"(?i)agent.?notes?", r"(?i)private.?remarks?"]),
                    group_priority: &[],
                    group_matchers: vec![],
                },
                CanonicalField::Photo => FieldSpec {
                    aliases: &["PrimaryPhoto", "photo", "primaryPhoto", "PhotoUrl", "MainPhotoUrl", "mainPhotoUrl", "photoUrl"],
                    fuzzy: rxs(&[r"(?i)photo", r"(?i)image.?url"]),
                    group_priority: &["PrimaryPhoto", "PhotoUrl", "photo", "primaryPhoto", "mainPhotoUrl", "MainPhotoUrl", "photoUrl"],
                    group_matchers: rxs(&[r"(?i)photo", r"(?i)image.?url"]),
                },
            })
            .collect();

        FieldGroupModel { specs }
    }

    fn spec(&self, field: CanonicalField) -> &FieldSpec {
        &self.specs[field.index()]
    }

    pub fn aliases(&self, field: CanonicalField) -> &[&'static str] {
        self.spec(field).aliases
    }

    pub fn group_priority(&self, field: CanonicalField) -> &[&'static str] {
        self.spec(field).group_priority
    }

    pub fn fuzzy_matches(&self, key: &str, field: CanonicalField) -> bool {
        self.spec(field).fuzzy.iter().any(|rx| rx.is_match(key))
    }

    /// Pure pattern evaluation: does `key` belong to `field`'s group?
    pub fn key_belongs_to_group(&self, key: &str, field: CanonicalField) -> bool {
        self.spec(field).group_matchers.iter().any(|rx| rx.is_match(key))
    }

    /// Best value for a group inside one record: priority spellings first,
    /// then any key the group matchers accept. Blank values never win.
    pub fn pick_group_value<'a>(
        &self,
        record: &'a Map<String, Value>,
        field: CanonicalField,
    ) -> Option<&'a Value> {
        for alias in self.group_priority(field) {
            if let Some(v) = record.get(*alias) {
                if !is_blank(v) {
                    return Some(v);
                }
            }
        }
        record
            .iter()
            .find(|(k, v)| self.key_belongs_to_group(k, field) && !is_blank(v))
            .map(|(_, v)| v)
    }
}
