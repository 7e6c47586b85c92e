//! Full-surface audits.
//!
//! The verifiers stop at the first miss. The audits here evaluate every
//! expected name in every category and collect all misses, so a failing check
//! can be reported as a complete diff in one pass.

use crate::catalog::{CapabilityIndex, CapabilityKind, CapabilityName, TypeName, TypeSurface};
use crate::expectation::Expectation;
use crate::verifier::{MissingCapability, Target};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize)]
/// Every missing capability found for one target, in check order.
pub struct SurfaceReport {
    pub target: TypeName,
    pub checked: usize,
    pub missing: Vec<MissingCapability>,
}

impl SurfaceReport {
    /// True when nothing expected was missing.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Missing capabilities of one kind.
    pub fn missing_of(&self, kind: CapabilityKind) -> impl Iterator<Item = &MissingCapability> {
        self.missing.iter().filter(move |entry| entry.kind == kind)
    }
}

/// Audit an object target across methods, properties, vmethods, and signals.
pub fn audit_object(target: Target<'_>, expected: &Expectation) -> SurfaceReport {
    let index = target.index();
    let kinds = [
        CapabilityKind::Method,
        CapabilityKind::Property,
        CapabilityKind::Vmethod,
        CapabilityKind::Signal,
    ];
    collect(&index, kinds.iter().map(|kind| (*kind, expected.names(*kind))))
}

/// Audit enumeration constants exposed by `surface`.
pub fn audit_enumerations<S: AsRef<str>>(surface: &TypeSurface, expected: &[S]) -> SurfaceReport {
    let index = CapabilityIndex::for_type(surface);
    collect(&index, [(CapabilityKind::Enumeration, expected)])
}

/// Audit method presence on a record-like type.
pub fn audit_struct<S: AsRef<str>>(surface: &TypeSurface, expected: &[S]) -> SurfaceReport {
    let index = CapabilityIndex::for_type(surface);
    collect(&index, [(CapabilityKind::Method, expected)])
}

fn collect<'a, S, I>(index: &CapabilityIndex, groups: I) -> SurfaceReport
where
    S: AsRef<str> + 'a,
    I: IntoIterator<Item = (CapabilityKind, &'a [S])>,
{
    let mut checked = 0;
    let mut missing = Vec::new();
    for (kind, names) in groups {
        // Repeated names in one category are reported once.
        let mut seen = BTreeSet::new();
        for name in names.iter().map(|name| name.as_ref()) {
            if !seen.insert(name) {
                continue;
            }
            checked += 1;
            if !index.contains(kind, name) {
                missing.push(MissingCapability {
                    kind,
                    name: CapabilityName::from(name),
                    target: index.target().clone(),
                });
            }
        }
    }
    SurfaceReport {
        target: index.target().clone(),
        checked,
        missing,
    }
}
