//! Capability lookup table for one verification target.
//!
//! The index is the explicit registry every check queries: each entry maps a
//! `(kind, name)` pair to the capability and the type that declared it.
//! Building an index never fails; a target that declares nothing simply
//! yields an empty index and every lookup misses.

use crate::catalog::identity::{CapabilityKind, CapabilityName, TypeName};
use crate::catalog::instance::{ObjectInstance, SignalRegistry};
use crate::catalog::model::{AncestorInfo, Capability, TypeSurface};
use log::debug;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
/// Capabilities discovered for a target, keyed by kind and name.
pub struct CapabilityIndex {
    target: TypeName,
    by_key: BTreeMap<(CapabilityKind, CapabilityName), Capability>,
}

impl CapabilityIndex {
    /// Index a type by walking its ancestry chain.
    ///
    /// Methods and constants come from the flat attribute sets. Properties,
    /// vfunc slots, and signals come from every ancestor descriptor; the
    /// most-derived declaration is recorded as the origin.
    pub fn for_type(surface: &TypeSurface) -> Self {
        let mut index = Self {
            target: surface.name.clone(),
            by_key: BTreeMap::new(),
        };
        for method in &surface.methods {
            index.insert(CapabilityKind::Method, method.clone(), &surface.name);
        }
        for constant in &surface.constants {
            index.insert(CapabilityKind::Enumeration, constant.clone(), &surface.name);
        }
        for ancestor in &surface.ancestors {
            for prop in ancestor.declared_properties() {
                index.insert(CapabilityKind::Property, prop.clone(), &ancestor.name);
            }
            for vfunc in ancestor.declared_vfuncs() {
                index.insert(
                    CapabilityKind::Vmethod,
                    CapabilityName::vfunc_slot(vfunc),
                    &ancestor.name,
                );
            }
            for signal in ancestor.declared_signals() {
                index.insert(CapabilityKind::Signal, signal.clone(), &ancestor.name);
            }
        }
        debug!(
            "indexed {} capabilities for type {} across {} ancestors",
            index.len(),
            surface.name,
            surface.ancestors.len()
        );
        index
    }

    /// Index a live instance.
    ///
    /// Properties come from the instance's own property list and signals from
    /// the registry entry of its effective type. Vfunc slots are not
    /// enumerable on an instance, so no vmethod entries are produced.
    pub fn for_instance(instance: &ObjectInstance, signals: &SignalRegistry) -> Self {
        let origin = &instance.type_name;
        let mut index = Self {
            target: origin.clone(),
            by_key: BTreeMap::new(),
        };
        for attr in &instance.attributes {
            index.insert(CapabilityKind::Method, attr.clone(), origin);
        }
        for prop in &instance.properties {
            index.insert(CapabilityKind::Property, prop.clone(), origin);
        }
        if !signals.contains_type(origin) {
            debug!("no signals registered for {}", origin);
        }
        for signal in signals.signal_names(origin) {
            index.insert(CapabilityKind::Signal, signal.clone(), origin);
        }
        debug!(
            "indexed {} capabilities for instance of {}",
            index.len(),
            origin
        );
        index
    }

    fn insert(&mut self, kind: CapabilityKind, name: CapabilityName, origin: &TypeName) {
        self.by_key
            .entry((kind, name.clone()))
            .or_insert_with(|| Capability {
                kind,
                name,
                origin: origin.clone(),
            });
    }

    /// The type the index was built for.
    pub fn target(&self) -> &TypeName {
        &self.target
    }

    pub fn contains(&self, kind: CapabilityKind, name: &str) -> bool {
        self.capability(kind, name).is_some()
    }

    /// Resolve a capability by kind and name.
    pub fn capability(&self, kind: CapabilityKind, name: &str) -> Option<&Capability> {
        self.by_key.get(&(kind, CapabilityName::from(name)))
    }

    /// Names of one kind in stable order.
    pub fn names(&self, kind: CapabilityKind) -> impl Iterator<Item = &CapabilityName> {
        self.by_key
            .range((kind, CapabilityName(String::new()))..)
            .take_while(move |((entry_kind, _), _)| *entry_kind == kind)
            .map(|((_, name), _)| name)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
