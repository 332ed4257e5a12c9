// src/ingest.rs

use crate::config::Config;
use crate::errors::IngestError;
use crate::fields::{CanonicalField, FieldGroupModel, Resolver};
use crate::listing::{derive_listing_id, details_key, read_address, read_mls};
use crate::photos::{choose_primary, PhotoMatcher};
use crate::record::{deep_clean, rows_to_records};
use crate::store::{get_json, put_json, BlobStore};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub const CSV_INCOMING_PREFIX: &str = "csv-incoming/";

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Explicit CSV key; when absent the newest object under the incoming
    /// prefix is used.
    pub source_key: Option<String>,
    /// Report what would happen without touching the store.
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct PhotoMove {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row: usize,
    pub listing_id: String,
    pub error: String,
}

/// Aggregate outcome of one ingestion run. `processed` vs `written` is the
/// caller's signal for partial success.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub csv_key: String,
    pub dry_run: bool,
    pub processed: usize,
    pub written: usize,
    pub photos_moved: usize,
    pub details_keys: Vec<String>,
    pub photo_moves: Vec<PhotoMove>,
    pub row_errors: Vec<RowError>,
    /// Sources whose copy succeeded but whose delete failed; they need a
    /// manual sweep.
    pub orphaned_sources: Vec<String>,
    pub csv_deleted: bool,
}

/// Drives one ingestion run: locate source, parse, and for each row derive
/// an identifier, move photos, clean the record and merge it into the
/// listing document. Row failures never abort the batch.
pub struct Ingestor<'a> {
    store: &'a dyn BlobStore,
    model: &'a FieldGroupModel,
    config: &'a Config,
}

impl<'a> Ingestor<'a> {
    pub fn new(store: &'a dyn BlobStore, model: &'a FieldGroupModel, config: &'a Config) -> Self {
        Self {
            store,
            model,
            config,
        }
    }

    pub fn run(&self, options: &IngestOptions) -> Result<IngestReport, IngestError> {
        let csv_key = match &options.source_key {
            Some(key) => key.clone(),
            None => self.newest_csv()?.ok_or_else(|| {
                IngestError::NoSource(format!("no .csv under {CSV_INCOMING_PREFIX}"))
            })?,
        };

        let bytes = self
            .store
            .get(&csv_key)?
            .ok_or_else(|| IngestError::NoSource(format!("source object missing: {csv_key}")))?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let rows = rows_to_records(&text);

        eprintln!("📄 Ingesting {csv_key}: {} rows{}", rows.len(), if options.dry_run { " (dry run)" } else { "" });

        let mut report = IngestReport {
            csv_key: csv_key.clone(),
            dry_run: options.dry_run,
            processed: 0,
            written: 0,
            photos_moved: 0,
            details_keys: Vec::new(),
            photo_moves: Vec::new(),
            row_errors: Vec::new(),
            orphaned_sources: Vec::new(),
            csv_deleted: false,
        };

        let matcher = PhotoMatcher::new(self.store);
        let resolver = Resolver::new(self.model);

        for (index, row) in rows.iter().enumerate() {
            report.processed += 1;
            let listing_id = derive_listing_id(row, index);

            match self.ingest_row(row, &listing_id, &csv_key, &matcher, &resolver, options, &mut report) {
                Ok(key) => {
                    report.written += 1;
                    report.details_keys.push(key);
                }
                Err(e) => {
                    eprintln!("⚠️ Row {} ({listing_id}) failed: {e}", index + 1);
                    report.row_errors.push(RowError {
                        row: index + 1,
                        listing_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        if self.config.delete_csv_after_ingest && !options.dry_run {
            // best effort; a leftover CSV only means a redundant re-ingest
            match self.store.delete(&csv_key) {
                Ok(()) => report.csv_deleted = true,
                Err(e) => eprintln!("⚠️ Could not delete {csv_key}: {e}"),
            }
        }

        eprintln!(
            "✅ Ingest complete: {}/{} rows written, {} photos moved",
            report.written, report.processed, report.photos_moved
        );
        Ok(report)
    }

    /// Newest CSV under the incoming prefix by last-modified time.
    fn newest_csv(&self) -> Result<Option<String>, IngestError> {
        let mut newest: Option<(String, chrono::DateTime<Utc>)> = None;
        for obj in self.store.list(CSV_INCOMING_PREFIX)? {
            if !obj.key.to_lowercase().ends_with(".csv") {
                continue;
            }
            let newer = newest
                .as_ref()
                .map(|(_, at)| obj.last_modified > *at)
                .unwrap_or(true);
            if newer {
                newest = Some((obj.key, obj.last_modified));
            }
        }
        Ok(newest.map(|(key, _)| key))
    }

    #[allow(clippy::too_many_arguments)]
    fn ingest_row(
        &self,
        row: &Map<String, Value>,
        listing_id: &str,
        csv_key: &str,
        matcher: &PhotoMatcher<'_>,
        resolver: &Resolver<'_>,
        options: &IngestOptions,
        report: &mut IngestReport,
    ) -> Result<String, IngestError> {
        // photos first so the document can reference the primary
        let candidates = matcher.find_candidates(listing_id)?;
        let mut moved = Vec::new();
        for src in candidates {
            let dest = crate::photos::permanent_key(&src, listing_id);
            if options.dry_run {
                report.photo_moves.push(PhotoMove { from: src, to: dest.clone() });
                report.photos_moved += 1;
                moved.push(dest);
                continue;
            }
            match matcher.move_candidate(&src, listing_id) {
                Ok(m) => {
                    if !m.source_deleted {
                        eprintln!("⚠️ Copied but could not delete source: {src}");
                        report.orphaned_sources.push(src.clone());
                    }
                    report.photo_moves.push(PhotoMove { from: src, to: m.dest.clone() });
                    report.photos_moved += 1;
                    moved.push(m.dest);
                }
                Err(e) => {
                    eprintln!("⚠️ Photo move failed for {src}: {e}");
                }
            }
        }
        let primary_photo = choose_primary(&moved, listing_id);

        let sources = [row];
        let mls = read_mls(row);
        let address = read_address(row);
        // no positive-number scan here: a feed without a price column must
        // not pick up the MLS number or bed count as a price
        let list_price = resolver
            .resolve_no_scan(&sources, CanonicalField::Price, true)
            .into_json();

        let mut details = Map::new();
        if let Some(mls) = mls {
            details.insert("mlsNumber".to_string(), Value::String(mls));
        }
        if let Some(price) = list_price {
            details.insert("listPrice".to_string(), price);
        }
        if let Some(address) = address {
            details.insert("address".to_string(), Value::String(address));
        }
        if let Some(photo) = primary_photo {
            details.insert("primaryPhoto".to_string(), Value::String(photo));
        }
        details.insert(
            "source".to_string(),
            serde_json::json!({
                "csvKey": csv_key,
                "ingestedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            }),
        );
        // raw columns win over the derived fields when names collide, so an
        // explicit "address" column is preserved verbatim
        for (k, v) in row {
            details.insert(k.clone(), v.clone());
        }

        let details = match deep_clean(&Value::Object(details)) {
            Some(Value::Object(m)) => m,
            _ => Map::new(),
        };

        let key = details_key(listing_id);
        if options.dry_run {
            return Ok(key);
        }

        // merge over whatever a previous run or a manual edit wrote
        let mut doc = get_json(self.store, &key)?.unwrap_or_default();
        for (k, v) in details {
            doc.insert(k, v);
        }
        doc.insert(
            "updatedAt".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        doc.insert(
            "_lastEditedBy".to_string(),
            Value::String(self.config.editor_identity.clone()),
        );
        put_json(self.store, &key, &doc)?;
        Ok(key)
    }
}
