mod blob;
mod fs;
mod memory;

pub use blob::{get_json, put_json, BlobStore, ObjectInfo, StoreError};
pub use fs::FsStore;
pub use memory::MemStore;
