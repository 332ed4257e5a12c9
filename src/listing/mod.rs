mod document;
mod identify;

pub use document::{
    apply_patch, build_save_patch, delete_listing, details_key, load_details,
    normalize_active_date, normalize_baths, sanitize_patch, save_listing, SaveRequest,
};
pub use identify::{derive_listing_id, pick_first, read_address, read_mls, slugify};
