//! Capability catalog wiring.
//!
//! Types here describe what a generated binding exposes: `TypeSurface` and its
//! ancestor descriptors are declared once per type, `CapabilityIndex` turns a
//! type or live instance into a lookup table, and `SurfaceRepository` holds
//! surfaces loaded from disk together with the runtime signal registry.

pub mod identity;
pub mod index;
pub mod instance;
pub mod model;
pub mod repository;

pub use identity::{CapabilityKind, CapabilityName, DescriptorKind, TypeName, VFUNC_PREFIX};
pub use index::CapabilityIndex;
pub use instance::{ObjectInstance, SignalRegistry};
pub use model::{
    AncestorDescriptor, AncestorInfo, Capability, SurfaceFile, TypeSurface,
    load_surfaces_from_path,
};
pub use repository::SurfaceRepository;
