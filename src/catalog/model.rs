//! Declarative description of a binding's exposed surface.
//!
//! A `TypeSurface` is declared once per type under test, either through the
//! builder methods below or by deserializing a surface file. Verification
//! never inspects anything beyond these declarations; use `CapabilityIndex`
//! to turn them into a lookup table.

use crate::catalog::identity::{CapabilityKind, CapabilityName, DescriptorKind, TypeName};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
/// Surface file as stored on disk.
pub struct SurfaceFile {
    pub schema_version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub types: Vec<TypeSurface>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
/// Everything a type exposes: its ancestry plus the flat attribute sets.
pub struct TypeSurface {
    pub name: TypeName,
    /// Ancestor descriptors, most-derived first. The type's own descriptor is
    /// the first entry when it carries one.
    #[serde(default)]
    pub ancestors: Vec<AncestorDescriptor>,
    /// Directly callable attributes.
    #[serde(default)]
    pub methods: BTreeSet<CapabilityName>,
    /// Enumeration or flag constants exposed as attributes.
    #[serde(default)]
    pub constants: BTreeSet<CapabilityName>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
/// One entry of an ancestry chain.
pub struct AncestorDescriptor {
    pub name: TypeName,
    pub kind: DescriptorKind,
    #[serde(default)]
    pub properties: Vec<CapabilityName>,
    #[serde(default)]
    pub vfuncs: Vec<CapabilityName>,
    #[serde(default)]
    pub signals: Vec<CapabilityName>,
}

/// Uniform view over ancestor descriptors regardless of their shape.
///
/// Descriptors that cannot declare a category return an empty slice.
pub trait AncestorInfo {
    fn declared_properties(&self) -> &[CapabilityName];
    fn declared_vfuncs(&self) -> &[CapabilityName];
    fn declared_signals(&self) -> &[CapabilityName];
}

impl AncestorInfo for AncestorDescriptor {
    fn declared_properties(&self) -> &[CapabilityName] {
        match self.kind {
            DescriptorKind::Opaque => &[],
            _ => &self.properties,
        }
    }

    fn declared_vfuncs(&self) -> &[CapabilityName] {
        match self.kind {
            DescriptorKind::Opaque => &[],
            _ => &self.vfuncs,
        }
    }

    fn declared_signals(&self) -> &[CapabilityName] {
        match self.kind {
            DescriptorKind::Opaque => &[],
            _ => &self.signals,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// A single indexed capability and the type that declared it.
pub struct Capability {
    pub kind: CapabilityKind,
    pub name: CapabilityName,
    pub origin: TypeName,
}

impl TypeSurface {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_ancestor(mut self, ancestor: AncestorDescriptor) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    pub fn with_methods<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.methods.extend(names.into_iter().map(CapabilityName::from));
        self
    }

    pub fn with_constants<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.constants
            .extend(names.into_iter().map(CapabilityName::from));
        self
    }

    /// Every capability name the surface declares, for emptiness checks.
    pub(crate) fn declared_names(&self) -> impl Iterator<Item = &CapabilityName> {
        self.methods
            .iter()
            .chain(self.constants.iter())
            .chain(self.ancestors.iter().flat_map(|ancestor| {
                ancestor
                    .properties
                    .iter()
                    .chain(ancestor.vfuncs.iter())
                    .chain(ancestor.signals.iter())
            }))
    }
}

impl AncestorDescriptor {
    pub fn new(name: impl Into<TypeName>, kind: DescriptorKind) -> Self {
        Self {
            name: name.into(),
            kind,
            properties: Vec::new(),
            vfuncs: Vec::new(),
            signals: Vec::new(),
        }
    }

    pub fn class(name: impl Into<TypeName>) -> Self {
        Self::new(name, DescriptorKind::Class)
    }

    pub fn interface(name: impl Into<TypeName>) -> Self {
        Self::new(name, DescriptorKind::Interface)
    }

    pub fn opaque(name: impl Into<TypeName>) -> Self {
        Self::new(name, DescriptorKind::Opaque)
    }

    pub fn with_properties<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.properties
            .extend(names.into_iter().map(CapabilityName::from));
        self
    }

    pub fn with_vfuncs<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.vfuncs.extend(names.into_iter().map(CapabilityName::from));
        self
    }

    pub fn with_signals<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.signals.extend(names.into_iter().map(CapabilityName::from));
        self
    }
}

/// Read and parse a surface file from disk without additional validation.
pub fn load_surfaces_from_path(path: &Path) -> Result<SurfaceFile> {
    let data = fs::read_to_string(path)?;
    let surfaces: SurfaceFile = serde_json::from_str(&data)?;
    Ok(surfaces)
}
