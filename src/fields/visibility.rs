// src/fields/visibility.rs

use regex::Regex;
use std::collections::HashSet;

/// Canonical spellings (normalized) that never appear in the free-form
/// extras editor; they are owned by the core form.
const CANON_HIDE: [&str; 32] = [
    "mls",
    "listingid",
    "address",
    "streetaddress",
    "city",
    "state",
    "province",
    "zip",
    "zipcode",
    "postalcode",
    "price",
    "listprice",
    "beds",
    "baths",
    "sqft",
    "yearbuilt",
    "year",
    "status",
    "activedate",
    "listdate",
    "datelisted",
    "dateactive",
    "listingdate",
    "timezone",
    "publicremarks",
    "remarks",
    "description",
    "agentnotes",
    "primaryphoto",
    "photo",
    "photourl",
    "mainphotourl",
];

/// Structural and provenance keys hidden by exact (case-insensitive) match.
const HARD_HIDE: [&str; 11] = [
    "0.path",
    "0.value",
    "path",
    "value",
    "key",
    "csvkey",
    "ingestedat",
    "listingtype",
    "longitude",
    "parceliddisplay",
    "slug",
];

const HIDE_PATTERNS: [&str; 11] = [
    r"(?i)\.path$",
    r"(?i)\.value$",
    r"(?i)path$",
    r"(?i)value$",
    r"(?i)key$",
    r"(?i)slug$",
    r"(?i)csvkey",
    r"(?i)ingestedat",
    r"(?i)listingtype",
    r"(?i)longitude",
    r"(?i)parceliddisplay",
];

pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase()
}

/// Decides which raw keys the free-form extras editor shows. Only ever a
/// display decision; persistence is unaffected.
pub struct KeyVisibility {
    show_all: bool,
    canonical: HashSet<&'static str>,
    hard: HashSet<&'static str>,
    patterns: Vec<Regex>,
}

impl KeyVisibility {
    /// `show_all` is the operator override that reveals every hidden key.
    pub fn new(show_all: bool) -> Self {
        Self {
            show_all,
            canonical: CANON_HIDE.into_iter().collect(),
            hard: HARD_HIDE.into_iter().collect(),
            patterns: HIDE_PATTERNS
                .iter()
                .map(|p| Regex::new(p).expect("static pattern compiles"))
                .collect(),
        }
    }

    /// Structural/provenance keys the editor suppresses.
    pub fn should_hide(&self, key: &str) -> bool {
        if self.show_all {
            return false;
        }
        if self.hard.contains(key.to_lowercase().as_str()) {
            return true;
        }
        self.patterns.iter().any(|rx| rx.is_match(key))
    }

    /// Keys owned by the core form, hidden from extras regardless of the
    /// operator override.
    pub fn is_canonical(&self, key: &str) -> bool {
        self.canonical.contains(normalize_key(key).as_str())
    }
}
