//! Core data types for discovered packages and scan results.
//!
//! - [`ExportPackage`] - A package found at one location, with its version
//! - [`PackageConflict`] - Two locations disagreeing about a package's version
//! - [`ScanReport`] - The merged, sorted outcome of a scan
//!
//! # Example
//!
//! ```
//! use pkgscan::{ExportPackage, ScanReport};
//!
//! let package = ExportPackage::new("org.example", Some("1.2.0".into()), "lib/example-1.2.jar");
//! let report = ScanReport::new(vec![package], Vec::new());
//!
//! println!("Found {} packages", report.packages.len());
//! ```

mod package;

pub use package::{ExportPackage, PackageConflict};
pub(crate) use package::canonical_package_name;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a complete scan: one record per package, sorted by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_time: DateTime<Utc>,
    pub packages: Vec<ExportPackage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<PackageConflict>,
}

impl ScanReport {
    pub fn new(packages: Vec<ExportPackage>, conflicts: Vec<PackageConflict>) -> Self {
        Self {
            scan_time: Utc::now(),
            packages,
            conflicts,
        }
    }

    /// Number of packages that carry a version.
    pub fn versioned_count(&self) -> usize {
        self.packages.iter().filter(|p| p.version().is_some()).count()
    }
}
