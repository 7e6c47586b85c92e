//! Capability-presence checks.
//!
//! Every check is a read-only pass over a `CapabilityIndex`. The `check_*`
//! functions return a `Verdict` describing the first missing capability; the
//! `verify_*` functions wrap them with the boolean contract test cases use and
//! print the diagnostic. A missing capability is an ordinary outcome, never
//! an error.

use crate::catalog::{
    CapabilityIndex, CapabilityKind, CapabilityName, ObjectInstance, SignalRegistry, TypeName,
    TypeSurface,
};
use crate::expectation::Expectation;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Category order for object checks. Methods come first because they live on
/// the attribute surface rather than on ancestor descriptors.
const OBJECT_CHECK_ORDER: [CapabilityKind; 4] = [
    CapabilityKind::Method,
    CapabilityKind::Property,
    CapabilityKind::Vmethod,
    CapabilityKind::Signal,
];

/// What an object check inspects.
#[derive(Clone, Copy, Debug)]
pub enum Target<'a> {
    /// Declared ancestry of a type.
    Type(&'a TypeSurface),
    /// A live instance plus the registry holding its effective type's signals.
    Instance {
        instance: &'a ObjectInstance,
        signals: &'a SignalRegistry,
    },
}

impl<'a> Target<'a> {
    pub fn name(&self) -> &'a TypeName {
        match *self {
            Target::Type(surface) => &surface.name,
            Target::Instance { instance, .. } => &instance.type_name,
        }
    }

    pub fn index(&self) -> CapabilityIndex {
        match *self {
            Target::Type(surface) => CapabilityIndex::for_type(surface),
            Target::Instance { instance, signals } => {
                CapabilityIndex::for_instance(instance, signals)
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// The capability a check could not find.
pub struct MissingCapability {
    pub kind: CapabilityKind,
    pub name: CapabilityName,
    pub target: TypeName,
}

impl fmt::Display for MissingCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CapabilityKind::Enumeration => write!(
                f,
                "{} {} is not produced for {}.",
                self.kind.label(),
                self.name,
                self.target
            ),
            _ => write!(f, "{} {} is not produced.", self.kind.label(), self.name),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// Outcome of a single check.
pub enum Verdict {
    Satisfied,
    Missing(MissingCapability),
}

impl Verdict {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Verdict::Satisfied)
    }

    pub fn missing(&self) -> Option<&MissingCapability> {
        match self {
            Verdict::Satisfied => None,
            Verdict::Missing(missing) => Some(missing),
        }
    }
}

/// Check methods, properties, vmethods, then signals; stop at the first miss.
pub fn check_object(target: Target<'_>, expected: &Expectation) -> Verdict {
    let index = target.index();
    debug!(
        "checking object {} against {} indexed capabilities",
        target.name(),
        index.len()
    );
    for kind in OBJECT_CHECK_ORDER {
        if let Some(missing) = first_missing(&index, kind, expected.names(kind)) {
            return Verdict::Missing(missing);
        }
    }
    Verdict::Satisfied
}

/// Check that every expected constant is exposed by `surface`.
pub fn check_enumerations<S: AsRef<str>>(surface: &TypeSurface, expected: &[S]) -> Verdict {
    let index = CapabilityIndex::for_type(surface);
    match first_missing(&index, CapabilityKind::Enumeration, expected) {
        Some(missing) => Verdict::Missing(missing),
        None => Verdict::Satisfied,
    }
}

/// Check method presence only, for record-like types.
pub fn check_struct<S: AsRef<str>>(surface: &TypeSurface, expected: &[S]) -> Verdict {
    let index = CapabilityIndex::for_type(surface);
    match first_missing(&index, CapabilityKind::Method, expected) {
        Some(missing) => Verdict::Missing(missing),
        None => Verdict::Satisfied,
    }
}

fn first_missing<S: AsRef<str>>(
    index: &CapabilityIndex,
    kind: CapabilityKind,
    expected: &[S],
) -> Option<MissingCapability> {
    expected
        .iter()
        .map(|name| name.as_ref())
        .find(|name| !index.contains(kind, name))
        .map(|name| MissingCapability {
            kind,
            name: CapabilityName::from(name),
            target: index.target().clone(),
        })
}

/// Runs checks and writes one diagnostic line per failed check.
pub struct Verifier<W> {
    out: W,
}

impl Verifier<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Verifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn verify_object(&mut self, target: Target<'_>, expected: &Expectation) -> bool {
        let verdict = check_object(target, expected);
        self.report(verdict)
    }

    pub fn verify_enumerations<S: AsRef<str>>(
        &mut self,
        surface: &TypeSurface,
        expected: &[S],
    ) -> bool {
        let verdict = check_enumerations(surface, expected);
        self.report(verdict)
    }

    pub fn verify_struct<S: AsRef<str>>(&mut self, surface: &TypeSurface, expected: &[S]) -> bool {
        let verdict = check_struct(surface, expected);
        self.report(verdict)
    }

    /// Hand back the writer, e.g. to inspect captured diagnostics.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn report(&mut self, verdict: Verdict) -> bool {
        let Verdict::Missing(missing) = verdict else {
            return true;
        };
        debug!(
            "{} {} missing from {}",
            missing.kind.as_str(),
            missing.name,
            missing.target
        );
        // The verdict stands even when the diagnostic cannot be written.
        if let Err(err) = writeln!(self.out, "{missing}") {
            warn!("unable to write diagnostic for {}: {err}", missing.target);
        }
        false
    }
}

/// Object check printing its diagnostic to stdout.
pub fn verify_object(
    target: Target<'_>,
    properties: &[&str],
    methods: &[&str],
    vmethods: &[&str],
    signals: &[&str],
) -> bool {
    let expected = Expectation::new()
        .properties(properties.iter().copied())
        .methods(methods.iter().copied())
        .vmethods(vmethods.iter().copied())
        .signals(signals.iter().copied());
    Verifier::stdout().verify_object(target, &expected)
}

/// Enumeration check printing its diagnostic to stdout.
pub fn verify_enumerations(surface: &TypeSurface, enumerations: &[&str]) -> bool {
    Verifier::stdout().verify_enumerations(surface, enumerations)
}

/// Struct check printing its diagnostic to stdout.
pub fn verify_struct(surface: &TypeSurface, methods: &[&str]) -> bool {
    Verifier::stdout().verify_struct(surface, methods)
}
