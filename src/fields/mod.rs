mod model;
mod resolve;
mod sync;
mod visibility;

pub use model::{is_blank, num_value, number_from, CanonicalField, FieldGroupModel};
pub use resolve::{ResolvedValue, Resolver};
pub use sync::{
    adopt_core_from_extras, collect_visible_extras, mirror_aliases_into_extras, CoreValues,
};
pub use visibility::KeyVisibility;
