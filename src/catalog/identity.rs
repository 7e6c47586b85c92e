use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Prefix the bindings put in front of a virtual function to name its
/// overridable implementation slot (`handle_event` becomes `do_handle_event`).
pub const VFUNC_PREFIX: &str = "do_";

/// Fully qualified name of a described type (e.g., `ALSASeq.UserClient`).
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(pub String);

/// Name of a single capability as the bindings expose it.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityName(pub String);

impl TypeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CapabilityName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the implementation slot for a declared virtual function.
    pub fn vfunc_slot(vfunc: &CapabilityName) -> Self {
        CapabilityName(format!("{VFUNC_PREFIX}{}", vfunc.0))
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        TypeName(value.to_string())
    }
}

impl From<&str> for CapabilityName {
    fn from(value: &str) -> Self {
        CapabilityName(value.to_string())
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category a capability belongs to.
///
/// The derived ordering is the order categories appear in reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CapabilityKind {
    Method,
    Property,
    Vmethod,
    Signal,
    Enumeration,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 5] = [
        CapabilityKind::Method,
        CapabilityKind::Property,
        CapabilityKind::Vmethod,
        CapabilityKind::Signal,
        CapabilityKind::Enumeration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Method => "method",
            CapabilityKind::Property => "property",
            CapabilityKind::Vmethod => "vmethod",
            CapabilityKind::Signal => "signal",
            CapabilityKind::Enumeration => "enumeration",
        }
    }

    /// Capitalized label used at the start of diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            CapabilityKind::Method => "Method",
            CapabilityKind::Property => "Property",
            CapabilityKind::Vmethod => "Vmethod",
            CapabilityKind::Signal => "Signal",
            CapabilityKind::Enumeration => "Enumeration",
        }
    }
}

impl Serialize for CapabilityKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Shape of an ancestor in a type's inheritance chain.
///
/// `Opaque` marks an ancestor that carries no introspection data at all.
/// `Other` keeps surface files written for newer descriptor shapes loadable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DescriptorKind {
    Class,
    Interface,
    Opaque,
    Other(String),
}

impl DescriptorKind {
    pub fn as_str(&self) -> &str {
        match self {
            DescriptorKind::Class => "class",
            DescriptorKind::Interface => "interface",
            DescriptorKind::Opaque => "opaque",
            DescriptorKind::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "class" => DescriptorKind::Class,
            "interface" => DescriptorKind::Interface,
            "opaque" => DescriptorKind::Opaque,
            other => DescriptorKind::Other(other.to_string()),
        }
    }
}

impl Serialize for DescriptorKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DescriptorKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_kind_round_trips_known_and_unknown() {
        let known = DescriptorKind::Interface;
        let json = serde_json::to_string(&known).unwrap();
        assert_eq!(json, "\"interface\"");
        let back: DescriptorKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, known);

        let parsed: DescriptorKind = serde_json::from_str("\"boxed\"").unwrap();
        assert_eq!(parsed, DescriptorKind::Other("boxed".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"boxed\"");
    }

    #[test]
    fn vfunc_slot_uses_implementation_prefix() {
        let slot = CapabilityName::vfunc_slot(&CapabilityName::from("handle_event"));
        assert_eq!(slot.as_str(), "do_handle_event");
    }

    #[test]
    fn kind_labels_are_capitalized() {
        for kind in CapabilityKind::ALL {
            let label = kind.label();
            assert_eq!(label.to_lowercase(), kind.as_str());
            assert!(label.chars().next().unwrap().is_ascii_uppercase());
        }
    }

    #[test]
    fn names_serialize_transparently() {
        let name = TypeName::from("ALSASeq.UserClient");
        assert_eq!(
            serde_json::to_string(&name).unwrap(),
            "\"ALSASeq.UserClient\""
        );
        let cap: CapabilityName = serde_json::from_str("\"client-id\"").unwrap();
        assert_eq!(cap, CapabilityName::from("client-id"));
    }
}
