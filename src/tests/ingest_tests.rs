use crate::config::Config;
use crate::fields::FieldGroupModel;
use crate::ingest::{IngestOptions, Ingestor};
use crate::store::{BlobStore, MemStore};
use crate::tests::utils::{read_details, store_with_csv, FailingStore};
use chrono::{TimeZone, Utc};
use serde_json::json;

fn run(store: &MemStore, options: &IngestOptions) -> crate::ingest::IngestReport {
    let config = Config::default();
    let model = FieldGroupModel::standard();
    Ingestor::new(store, &model, &config)
        .run(options)
        .expect("ingest run")
}

#[test]
fn ingests_a_row_with_aliased_columns() {
    let store = store_with_csv(
        "MLS Number,TotalBedrooms,SqFtTotal,ListPrice,Address\n\
         AB123,3,\"1,800\",\"$350,000\",\"12 Oak Ave, Springfield, IL 62701\"\n",
    );

    let report = run(&store, &IngestOptions::default());

    assert_eq!(report.processed, 1);
    assert_eq!(report.written, 1);
    assert!(report.row_errors.is_empty());
    assert_eq!(report.details_keys, vec!["listings/AB123/details.json"]);

    let details = read_details(&store, "AB123");
    assert_eq!(details.get("mlsNumber"), Some(&json!("AB123")));
    assert_eq!(details.get("listPrice"), Some(&json!(350000)));
    assert_eq!(details.get("TotalBedrooms"), Some(&json!("3")));
    assert_eq!(details.get("source").and_then(|s| s.get("csvKey")), Some(&json!("csv-incoming/feed.csv")));
    assert!(details.get("updatedAt").is_some());
    assert_eq!(details.get("_lastEditedBy"), Some(&json!("csv-ingest")));

    // clean run deletes the source CSV
    assert!(report.csv_deleted);
    assert!(!store.exists("csv-incoming/feed.csv").unwrap());
}

#[test]
fn missing_price_column_never_invents_one() {
    // the MLS number and bed count are positive numbers; neither may be
    // mistaken for a price
    let store = store_with_csv("MLS Number,TotalBedrooms\n123,3\n");

    run(&store, &IngestOptions::default());

    let details = read_details(&store, "123");
    assert_eq!(details.get("listPrice"), None);
    assert_eq!(details.get("TotalBedrooms"), Some(&json!("3")));
}

#[test]
fn derives_identifier_from_address_when_mls_is_missing() {
    let store = store_with_csv("Address,City\n\"12 Oak Ave, Springfield, IL 62701\",Springfield\n");

    let report = run(&store, &IngestOptions::default());
    assert_eq!(
        report.details_keys,
        vec!["listings/12-oak-ave-springfield-il-62701/details.json"]
    );
}

#[test]
fn moves_photos_and_records_the_primary() {
    let store = store_with_csv("MLS Number\n123\n");
    store.put("photos-incoming/123/main.jpg", b"a").unwrap();
    store.put("photos-incoming/123/2.png", b"b").unwrap();

    let report = run(&store, &IngestOptions::default());

    assert_eq!(report.photos_moved, 2);
    assert!(store.exists("photos/123/main.jpg").unwrap());
    assert!(store.exists("photos/123/2.png").unwrap());
    assert!(!store.exists("photos-incoming/123/main.jpg").unwrap());
    assert!(report.orphaned_sources.is_empty());

    let details = read_details(&store, "123");
    assert_eq!(details.get("primaryPhoto"), Some(&json!("photos/123/main.jpg")));
}

#[test]
fn dry_run_reports_without_mutating_the_store() {
    let store = store_with_csv("MLS Number\n123\n");
    store.put("photos-incoming/123/main.jpg", b"a").unwrap();

    let report = run(
        &store,
        &IngestOptions {
            source_key: None,
            dry_run: true,
        },
    );

    assert!(report.dry_run);
    assert_eq!(report.processed, 1);
    assert_eq!(report.written, 1);
    assert_eq!(report.photos_moved, 1);
    assert_eq!(report.photo_moves[0].to, "photos/123/main.jpg");

    // nothing actually happened
    assert!(store.exists("csv-incoming/feed.csv").unwrap());
    assert!(store.exists("photos-incoming/123/main.jpg").unwrap());
    assert!(!store.exists("photos/123/main.jpg").unwrap());
    assert!(!store.exists("listings/123/details.json").unwrap());
    assert!(!report.csv_deleted);
}

#[test]
fn picks_the_newest_csv_when_no_source_key_given() {
    let store = MemStore::new();
    store.put_at(
        "csv-incoming/old.csv",
        b"MLS Number\nOLD1\n",
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    );
    store.put_at(
        "csv-incoming/new.csv",
        b"MLS Number\nNEW1\n",
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
    );
    store.put_at(
        "csv-incoming/readme.txt",
        b"not a feed",
        Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap(),
    );

    let report = run(&store, &IngestOptions::default());
    assert_eq!(report.csv_key, "csv-incoming/new.csv");
    assert_eq!(report.details_keys, vec!["listings/NEW1/details.json"]);
}

#[test]
fn explicit_source_key_overrides_discovery() {
    let store = store_with_csv("MLS Number\nA1\n");
    store.put("csv-incoming/other.csv", b"MLS Number\nB2\n").unwrap();

    let report = run(
        &store,
        &IngestOptions {
            source_key: Some("csv-incoming/other.csv".to_string()),
            dry_run: false,
        },
    );
    assert_eq!(report.csv_key, "csv-incoming/other.csv");
    assert_eq!(report.details_keys, vec!["listings/B2/details.json"]);
}

#[test]
fn missing_source_is_a_run_level_error() {
    let store = MemStore::new();
    let config = Config::default();
    let model = FieldGroupModel::standard();
    let result = Ingestor::new(&store, &model, &config).run(&IngestOptions::default());
    assert!(result.is_err());
}

#[test]
fn re_ingesting_merges_over_the_existing_document() {
    let store = store_with_csv("MLS Number,Status\n123,Active\n");
    store
        .put(
            "listings/123/details.json",
            serde_json::to_vec_pretty(&json!({ "agentNotes": "call before showing" }))
                .unwrap()
                .as_slice(),
        )
        .unwrap();

    run(&store, &IngestOptions::default());

    let details = read_details(&store, "123");
    // manual edit survives, fresh row data lands next to it
    assert_eq!(details.get("agentNotes"), Some(&json!("call before showing")));
    assert_eq!(details.get("Status"), Some(&json!("Active")));
}

#[test]
fn blank_and_tombstone_cells_never_reach_the_document() {
    let store = store_with_csv("MLS Number,Pool,Fence,Garage\n123,,n/a,2-car\n");

    run(&store, &IngestOptions::default());

    let details = read_details(&store, "123");
    assert!(details.get("Pool").is_none());
    assert!(details.get("Fence").is_none());
    assert_eq!(details.get("Garage"), Some(&json!("2-car")));
}

#[test]
fn failed_document_write_marks_the_row_and_the_run_continues() {
    let store = FailingStore::new(&["listings/123/details.json"], &[]);
    store
        .put("csv-incoming/feed.csv", b"MLS Number\n123\n456\n")
        .unwrap();

    let config = Config::default();
    let model = FieldGroupModel::standard();
    let report = Ingestor::new(&store, &model, &config)
        .run(&IngestOptions::default())
        .expect("run completes despite the row failure");

    assert_eq!(report.processed, 2);
    assert_eq!(report.written, 1);
    assert_eq!(report.row_errors.len(), 1);
    assert_eq!(report.row_errors[0].row, 1);
    assert_eq!(report.row_errors[0].listing_id, "123");
    assert_eq!(report.details_keys, vec!["listings/456/details.json"]);
}

#[test]
fn undeletable_photo_source_is_reported_as_orphaned() {
    let store = FailingStore::new(&[], &["photos-incoming/123/main.jpg"]);
    store
        .put("csv-incoming/feed.csv", b"MLS Number\n123\n")
        .unwrap();
    store.put("photos-incoming/123/main.jpg", b"img").unwrap();

    let config = Config::default();
    let model = FieldGroupModel::standard();
    let report = Ingestor::new(&store, &model, &config)
        .run(&IngestOptions::default())
        .expect("ingest run");

    // the copy landed and the row still wrote; only the source is left over
    assert_eq!(report.written, 1);
    assert!(report.row_errors.is_empty());
    assert_eq!(report.photos_moved, 1);
    assert_eq!(
        report.orphaned_sources,
        vec!["photos-incoming/123/main.jpg".to_string()]
    );
    assert!(store.exists("photos/123/main.jpg").unwrap());
    assert!(store.exists("photos-incoming/123/main.jpg").unwrap());
}

#[test]
fn every_row_is_counted_and_keyed() {
    let store = store_with_csv("MLS Number\n123\n456\n");
    let report = run(&store, &IngestOptions::default());
    assert_eq!(report.processed, 2);
    assert_eq!(report.written, 2);
    assert_eq!(report.written, report.details_keys.len());
}
