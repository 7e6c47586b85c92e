//! Expected capability names and the check files that carry them.

use crate::catalog::{CapabilityKind, ObjectInstance, SurfaceRepository, TypeName, TypeSurface};
use crate::coverage::{SurfaceReport, audit_enumerations, audit_object, audit_struct};
use crate::verifier::{Target, Verdict, check_enumerations, check_object, check_struct};
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, Deserialize)]
/// Expected names per category. Order only affects which miss is reported
/// first; membership is what counts.
pub struct Expectation {
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub vmethods: Vec<String>,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub enumerations: Vec<String>,
}

impl Expectation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn properties<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.properties.extend(names.into_iter().map(str::to_string));
        self
    }

    pub fn methods<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.methods.extend(names.into_iter().map(str::to_string));
        self
    }

    pub fn vmethods<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.vmethods.extend(names.into_iter().map(str::to_string));
        self
    }

    pub fn signals<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.signals.extend(names.into_iter().map(str::to_string));
        self
    }

    pub fn enumerations<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.enumerations
            .extend(names.into_iter().map(str::to_string));
        self
    }

    /// Expected names for one category.
    pub fn names(&self, kind: CapabilityKind) -> &[String] {
        match kind {
            CapabilityKind::Method => &self.methods,
            CapabilityKind::Property => &self.properties,
            CapabilityKind::Vmethod => &self.vmethods,
            CapabilityKind::Signal => &self.signals,
            CapabilityKind::Enumeration => &self.enumerations,
        }
    }

    pub fn is_empty(&self) -> bool {
        CapabilityKind::ALL
            .iter()
            .all(|kind| self.names(*kind).is_empty())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which verifier a check runs.
pub enum CheckMode {
    /// Object check against the declared ancestry.
    Type,
    /// Object check against a live instance and the signal registry.
    Instance,
    /// Method presence only.
    Struct,
    /// Enumeration constant presence.
    Enum,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(from = "CheckEntry")]
/// One entry of a check file.
pub struct CheckSpec {
    pub target: TypeName,
    pub mode: CheckMode,
    pub expect: Expectation,
}

/// On-disk shape of a check. Unknown keys are rejected so a misspelled
/// category cannot turn into an empty expectation.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckEntry {
    target: TypeName,
    mode: CheckMode,
    #[serde(default)]
    properties: Vec<String>,
    #[serde(default)]
    methods: Vec<String>,
    #[serde(default)]
    vmethods: Vec<String>,
    #[serde(default)]
    signals: Vec<String>,
    #[serde(default)]
    enumerations: Vec<String>,
}

impl From<CheckEntry> for CheckSpec {
    fn from(entry: CheckEntry) -> Self {
        Self {
            target: entry.target,
            mode: entry.mode,
            expect: Expectation {
                properties: entry.properties,
                methods: entry.methods,
                vmethods: entry.vmethods,
                signals: entry.signals,
                enumerations: entry.enumerations,
            },
        }
    }
}

impl CheckSpec {
    /// Reject categories the chosen mode never consults.
    fn validate(&self) -> Result<()> {
        let unused: &[CapabilityKind] = match self.mode {
            CheckMode::Type | CheckMode::Instance => &[CapabilityKind::Enumeration],
            CheckMode::Struct => &[
                CapabilityKind::Property,
                CapabilityKind::Vmethod,
                CapabilityKind::Signal,
                CapabilityKind::Enumeration,
            ],
            CheckMode::Enum => &[
                CapabilityKind::Method,
                CapabilityKind::Property,
                CapabilityKind::Vmethod,
                CapabilityKind::Signal,
            ],
        };
        for kind in unused {
            if !self.expect.names(*kind).is_empty() {
                bail!(
                    "check for {} lists {} names, which {:?} mode does not verify",
                    self.target,
                    kind.as_str(),
                    self.mode
                );
            }
        }
        Ok(())
    }

    /// Run the short-circuit verifier for this check.
    ///
    /// Errors only when the target is not registered; a missing capability is
    /// a `Verdict::Missing`.
    pub fn run(&self, repo: &SurfaceRepository) -> Result<Verdict> {
        let surface = self.surface(repo)?;
        let verdict = match self.mode {
            CheckMode::Type => check_object(Target::Type(surface), &self.expect),
            CheckMode::Instance => {
                let instance = ObjectInstance::from_surface(surface);
                let target = Target::Instance {
                    instance: &instance,
                    signals: repo.signals(),
                };
                check_object(target, &self.expect)
            }
            CheckMode::Struct => check_struct(surface, &self.expect.methods),
            CheckMode::Enum => check_enumerations(surface, &self.expect.enumerations),
        };
        Ok(verdict)
    }

    /// Collect every missing capability for this check.
    pub fn audit(&self, repo: &SurfaceRepository) -> Result<SurfaceReport> {
        let surface = self.surface(repo)?;
        let report = match self.mode {
            CheckMode::Type => audit_object(Target::Type(surface), &self.expect),
            CheckMode::Instance => {
                let instance = ObjectInstance::from_surface(surface);
                let target = Target::Instance {
                    instance: &instance,
                    signals: repo.signals(),
                };
                audit_object(target, &self.expect)
            }
            CheckMode::Struct => audit_struct(surface, &self.expect.methods),
            CheckMode::Enum => audit_enumerations(surface, &self.expect.enumerations),
        };
        Ok(report)
    }

    fn surface<'r>(&self, repo: &'r SurfaceRepository) -> Result<&'r TypeSurface> {
        repo.get(&self.target)
            .ok_or_else(|| anyhow!("check references unknown type {}", self.target))
    }
}

/// Read a check file: a JSON array of `CheckSpec` entries.
pub fn load_checks_from_path(path: &Path) -> Result<Vec<CheckSpec>> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let checks: Vec<CheckSpec> =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    if checks.is_empty() {
        bail!("no checks found in {}", path.display());
    }
    for check in &checks {
        check
            .validate()
            .with_context(|| format!("validating {}", path.display()))?;
    }
    Ok(checks)
}
