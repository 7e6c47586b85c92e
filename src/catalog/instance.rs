//! Live instances and the runtime signal registry.
//!
//! Instance-mode checks do not walk descriptors. They read what a live object
//! reports about itself (its property list and attributes) and ask the signal
//! registry which signals its effective type carries.

use crate::catalog::identity::{CapabilityName, TypeName};
use crate::catalog::model::{AncestorInfo, TypeSurface};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default)]
/// Signal names registered per type.
pub struct SignalRegistry {
    by_type: BTreeMap<TypeName, BTreeSet<CapabilityName>>,
}

impl SignalRegistry {
    /// Add signals to the entry of `type_name`, creating it if needed.
    pub fn register<I>(&mut self, type_name: &TypeName, signals: I)
    where
        I: IntoIterator<Item = CapabilityName>,
    {
        self.by_type
            .entry(type_name.clone())
            .or_default()
            .extend(signals);
    }

    /// Register every signal reachable through the ancestry of `surface`.
    pub fn register_surface(&mut self, surface: &TypeSurface) {
        let signals = surface
            .ancestors
            .iter()
            .flat_map(|ancestor| ancestor.declared_signals().iter().cloned());
        self.register(&surface.name, signals);
    }

    /// Signals carried by `type_name`; unknown types have none.
    pub fn signal_names(&self, type_name: &TypeName) -> impl Iterator<Item = &CapabilityName> {
        self.by_type.get(type_name).into_iter().flatten()
    }

    pub fn contains_type(&self, type_name: &TypeName) -> bool {
        self.by_type.contains_key(type_name)
    }
}

#[derive(Clone, Debug)]
/// What a constructed object reports about itself.
pub struct ObjectInstance {
    pub type_name: TypeName,
    pub properties: Vec<CapabilityName>,
    pub attributes: BTreeSet<CapabilityName>,
}

impl ObjectInstance {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: Vec::new(),
            attributes: BTreeSet::new(),
        }
    }

    /// Instantiate a declared surface: the live property list holds every
    /// property declared along the ancestry, attributes are the type's methods.
    pub fn from_surface(surface: &TypeSurface) -> Self {
        let mut seen = BTreeSet::new();
        let properties = surface
            .ancestors
            .iter()
            .flat_map(|ancestor| ancestor.declared_properties().iter())
            .filter(|name| seen.insert(*name))
            .cloned()
            .collect();
        Self {
            type_name: surface.name.clone(),
            properties,
            attributes: surface.methods.clone(),
        }
    }

    pub fn with_properties<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.properties
            .extend(names.into_iter().map(CapabilityName::from));
        self
    }

    pub fn with_attributes<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.attributes
            .extend(names.into_iter().map(CapabilityName::from));
        self
    }
}
