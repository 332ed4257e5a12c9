mod ingest_tests;
mod utils;
