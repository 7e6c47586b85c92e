//! Registered surfaces, looked up by type name.
//!
//! The repository is the single place surfaces enter the system. Registration
//! rejects duplicate and unnamed types and feeds the signal registry used by
//! instance-mode checks. `SurfaceRepository::load` additionally validates a
//! surface file against the shipped JSON Schema before anything is registered.

use crate::catalog::identity::TypeName;
use crate::catalog::instance::{ObjectInstance, SignalRegistry};
use crate::catalog::model::{TypeSurface, load_surfaces_from_path};
use crate::runtime::schema_path_for;
use crate::schema_loader::{load_json_schema, validate_instance};
use anyhow::{Context, Result, bail};
use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// Only one surface layout exists so far; anything else is refused outright.
const SURFACE_SCHEMA_VERSION: &str = "type_surface_v1";

#[derive(Debug, Default)]
/// In-memory store of type surfaces keyed by `TypeName`.
pub struct SurfaceRepository {
    surfaces: BTreeMap<TypeName, TypeSurface>,
    signals: SignalRegistry,
}

impl SurfaceRepository {
    /// Load, validate, and register every surface in a surface file.
    pub fn load(path: &Path) -> Result<Self> {
        validate_against_schema(path)?;

        let file =
            load_surfaces_from_path(path).with_context(|| format!("loading {}", path.display()))?;
        validate_schema_version(&file.schema_version)?;

        let mut repo = Self::default();
        for surface in file.types {
            repo.register(surface)
                .with_context(|| format!("registering surfaces from {}", path.display()))?;
        }
        debug!(
            "loaded {} type surfaces from {}",
            repo.surfaces.len(),
            path.display()
        );
        Ok(repo)
    }

    /// Build a repository from surfaces declared in code.
    pub fn from_surfaces(surfaces: impl IntoIterator<Item = TypeSurface>) -> Result<Self> {
        let mut repo = Self::default();
        for surface in surfaces {
            repo.register(surface)?;
        }
        Ok(repo)
    }

    /// Register a surface for later lookup.
    pub fn register(&mut self, surface: TypeSurface) -> Result<()> {
        validate_surface(&surface)?;
        if self.surfaces.contains_key(&surface.name) {
            bail!("duplicate type surface {}", surface.name);
        }
        self.signals.register_surface(&surface);
        debug!("registered type surface {}", surface.name);
        self.surfaces.insert(surface.name.clone(), surface);
        Ok(())
    }

    /// Fetch a surface by type name, if present.
    pub fn get(&self, name: &TypeName) -> Option<&TypeSurface> {
        self.surfaces.get(name)
    }

    /// Iterates registered type names in stable order.
    pub fn names(&self) -> impl Iterator<Item = &TypeName> {
        self.surfaces.keys()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Signal registry covering every registered surface.
    pub fn signals(&self) -> &SignalRegistry {
        &self.signals
    }

    /// Construct a live instance of a registered type.
    pub fn instantiate(&self, name: &TypeName) -> Option<ObjectInstance> {
        self.get(name).map(ObjectInstance::from_surface)
    }
}

fn validate_schema_version(schema_version: &str) -> Result<()> {
    if schema_version.is_empty() {
        bail!("schema_version must not be empty");
    }
    let allowed = allowed_schema_versions();
    if !allowed.contains(schema_version) {
        bail!(
            "schema_version '{}' not in allowed set {:?}",
            schema_version,
            allowed
        );
    }
    Ok(())
}

fn allowed_schema_versions() -> BTreeSet<String> {
    BTreeSet::from_iter([SURFACE_SCHEMA_VERSION.to_string()])
}

fn validate_surface(surface: &TypeSurface) -> Result<()> {
    if surface.name.0.trim().is_empty() {
        bail!("encountered type surface with no name");
    }
    for ancestor in &surface.ancestors {
        if ancestor.name.0.trim().is_empty() {
            bail!("type {} has an ancestor with no name", surface.name);
        }
    }
    if surface.declared_names().any(|name| name.0.trim().is_empty()) {
        bail!("type {} declares an empty capability name", surface.name);
    }
    Ok(())
}

fn validate_against_schema(surface_path: &Path) -> Result<()> {
    let surface_file = File::open(surface_path)
        .with_context(|| format!("opening surface file {}", surface_path.display()))?;
    let surface_value: Value = serde_json::from_reader(BufReader::new(surface_file))
        .with_context(|| format!("parsing surface file {}", surface_path.display()))?;

    let schema_path = schema_path_for(surface_path);
    let allowed = allowed_schema_versions();
    let schema = load_json_schema(&schema_path, Some(&allowed))
        .with_context(|| format!("loading surface schema {}", schema_path.display()))?;
    debug!(
        "validating {} against {} ({})",
        surface_path.display(),
        schema_path.display(),
        schema.schema_version
    );
    validate_instance(&schema, &surface_value, surface_path)
}
