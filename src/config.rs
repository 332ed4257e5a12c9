// src/config.rs

use crate::errors::IngestError;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Runtime configuration, read once at startup from the environment.
/// A missing store root is fatal before any row is processed.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_root: PathBuf,
    pub default_timezone: String,
    pub editor_identity: String,
    pub delete_csv_after_ingest: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, IngestError> {
        let store_root = env::var("LISTING_STORE_ROOT").map_err(|_| {
            IngestError::Config("LISTING_STORE_ROOT environment variable not set".into())
        })?;

        let default_timezone =
            env::var("DEFAULT_LISTING_TZ").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());

        let editor_identity =
            env::var("INGEST_EDITOR_ID").unwrap_or_else(|_| "csv-ingest".to_string());

        // Any non-empty value keeps the source CSV in place after a run.
        let delete_csv_after_ingest = env::var("KEEP_SOURCE_CSV")
            .map(|v| v.trim().is_empty())
            .unwrap_or(true);

        Ok(Config {
            store_root: PathBuf::from(store_root),
            default_timezone,
            editor_identity,
            delete_csv_after_ingest,
        })
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Config {
            store_root: PathBuf::from("."),
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            editor_identity: "csv-ingest".to_string(),
            delete_csv_after_ingest: true,
        }
    }
}
