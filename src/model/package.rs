use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// A package discovered on the search path, with its resolved version.
///
/// Records are created once per (package, location) and never mutated.
/// Equality covers name, version and origin; ordering is by name first, so
/// sorting a list of records sorts it by package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportPackage {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    origin: PathBuf,
}

impl ExportPackage {
    /// Creates a record, converting `/` separators to `.` and dropping any
    /// leading separator from `name`.
    pub fn new(name: impl AsRef<str>, version: Option<String>, origin: impl Into<PathBuf>) -> Self {
        Self {
            name: canonical_package_name(name.as_ref()),
            version,
            origin: origin.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The directory or archive this record was found in.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Short label for the origin, used in diagnostics.
    pub fn origin_name(&self) -> String {
        self.origin
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.origin.display().to_string())
    }
}

impl PartialOrd for ExportPackage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExportPackage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.origin.cmp(&other.origin))
    }
}

/// Two locations exported the same package with versions that disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConflict {
    pub package: String,
    /// The record that was already winning when the duplicate arrived.
    pub current: ExportPackage,
    /// The record that was discovered later.
    pub incoming: ExportPackage,
    /// Whether `incoming` replaced `current`.
    pub replaced: bool,
}

pub(crate) fn canonical_package_name(raw: &str) -> String {
    let dotted = raw.replace(['/', '\\'], ".");
    dotted.trim_start_matches('.').to_string()
}
