//! Capability-presence checks for generated introspection bindings.
//!
//! A binding generator is expected to expose, for every introspected type, a
//! set of properties, methods, virtual-method slots, signals, and enumeration
//! constants. This crate lets test code declare those surfaces explicitly
//! (`TypeSurface`) and verify expectations against them. The verifiers report
//! the first missing capability per call; the audits in `coverage` report all
//! of them.

pub mod catalog;
pub mod coverage;
pub mod expectation;
pub mod runtime;
mod schema_loader;
pub mod verifier;

pub use catalog::{
    AncestorDescriptor, AncestorInfo, Capability, CapabilityIndex, CapabilityKind,
    CapabilityName, DescriptorKind, ObjectInstance, SignalRegistry, SurfaceFile,
    SurfaceRepository, TypeName, TypeSurface, VFUNC_PREFIX, load_surfaces_from_path,
};
pub use coverage::{SurfaceReport, audit_enumerations, audit_object, audit_struct};
pub use expectation::{CheckMode, CheckSpec, Expectation, load_checks_from_path};
pub use verifier::{
    MissingCapability, Target, Verdict, Verifier, check_enumerations, check_object, check_struct,
    verify_enumerations, verify_object, verify_struct,
};
