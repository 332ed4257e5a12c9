mod clean;
mod flatten;
mod matrix;

pub use clean::deep_clean;
pub use flatten::flatten;
pub use matrix::{parse_matrix, rows_to_records};
