use crate::config::Config;
use crate::fields::FieldGroupModel;
use crate::ingest::{IngestOptions, Ingestor};
use crate::store::FsStore;

mod config;
mod errors;
mod fields;
mod ingest;
mod listing;
mod photos;
mod record;
mod store;

#[cfg(test)]
mod tests;

fn parse_args() -> Result<IngestOptions, String> {
    let mut options = IngestOptions::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dry-run" => options.dry_run = true,
            "--source-key" => {
                let key = args
                    .next()
                    .ok_or_else(|| "--source-key requires a value".to_string())?;
                options.source_key = Some(key);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(options)
}

fn main() {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("❌ {e}");
            eprintln!("Usage: listing_ingest [--dry-run] [--source-key KEY]");
            std::process::exit(1);
        }
    };

    // Configuration problems abort before any row is touched
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let store = FsStore::new(&config.store_root);
    let model = FieldGroupModel::standard();
    let ingestor = Ingestor::new(&store, &model, &config);

    match ingestor.run(&options) {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("❌ Could not serialize report: {e}"),
            }
            if !report.row_errors.is_empty() {
                std::process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("❌ Ingest failed: {e}");
            std::process::exit(1);
        }
    }
}
