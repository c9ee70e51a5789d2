mod loader;
mod types;

pub use loader::{load_catalog_file, load_rig, parse_catalog_json, rig_from_catalog, CatalogError};
pub use types::{AnimationCatalog, RigData, RigLoad, DEFAULT_SPECIAL_CLIP, MOVE_CLIP, RELAX_CLIP};
