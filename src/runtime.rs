//! Runtime configuration shared by the library loaders and the binary.
//!
//! Centralizes where the surface schema is found so every caller resolves it
//! the same way.

use std::env;
use std::path::{Path, PathBuf};

/// Environment override for the surface schema location.
pub const SCHEMA_PATH_ENV: &str = "SURFACE_SCHEMA_PATH";

/// Schema path relative to the crate (or to a surface file's parent root).
pub const CANONICAL_SCHEMA_PATH: &str = "schema/type_surface.schema.json";

/// Resolve the schema used to validate `surface_path`.
///
/// Search order: `SURFACE_SCHEMA_PATH` when set and non-empty, a `schema/`
/// directory beside the surface file's parent directory, then the copy
/// shipped with the crate.
pub fn schema_path_for(surface_path: &Path) -> PathBuf {
    if let Some(path) = schema_path_from_env() {
        return path;
    }

    if let Some(base) = surface_path.parent().and_then(|p| p.parent()) {
        let candidate = base.join(CANONICAL_SCHEMA_PATH);
        if candidate.is_file() {
            return candidate;
        }
    }

    default_schema_path()
}

/// The schema shipped alongside the crate sources.
pub fn default_schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(CANONICAL_SCHEMA_PATH)
}

fn schema_path_from_env() -> Option<PathBuf> {
    env::var_os(SCHEMA_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
