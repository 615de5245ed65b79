//! Merging records found at several locations into one export list.
//!
//! A versioned record always beats an unversioned one. When two records both
//! carry versions, the one discovered last wins and the disagreement is
//! reported as a conflict. Discovery order across locations is not stable, so
//! callers that need a fixed outcome should pin the package with a version
//! mapping.

use crate::model::{ExportPackage, PackageConflict, ScanReport};
use crate::report::{ScanReporter, TracingReporter};
use std::collections::HashMap;
use tracing::debug;

pub struct ExportListBuilder<'a> {
    packages: HashMap<String, ExportPackage>,
    conflicts: Vec<PackageConflict>,
    reporter: &'a dyn ScanReporter,
}

impl<'a> ExportListBuilder<'a> {
    pub fn new(reporter: &'a dyn ScanReporter) -> Self {
        Self {
            packages: HashMap::new(),
            conflicts: Vec::new(),
            reporter,
        }
    }

    pub fn add(&mut self, package: ExportPackage) {
        if !self.packages.contains_key(package.name()) {
            self.packages.insert(package.name().to_string(), package);
            return;
        }
        let current = &self.packages[package.name()];

        match (package.version(), current.version()) {
            (None, Some(current_version)) => {
                // Keep the versioned record.
                if !current_version.is_empty() {
                    let conflict = conflict(current, &package, false);
                    self.record(conflict);
                }
            }
            (None, None) => {}
            (Some(_), None) => {
                let conflict = conflict(current, &package, true);
                self.record(conflict);
                self.packages.insert(package.name().to_string(), package);
            }
            (Some(incoming), Some(existing)) => {
                if incoming != existing {
                    let conflict = conflict(current, &package, true);
                    self.record(conflict);
                } else {
                    debug!(package = %package.name(), version = incoming, "same version found again");
                }
                self.packages.insert(package.name().to_string(), package);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ExportPackage> {
        self.packages.get(name)
    }

    pub fn conflicts(&self) -> &[PackageConflict] {
        &self.conflicts
    }

    /// Returns the winning records, ordered by package name.
    pub fn package_list(&self) -> Vec<ExportPackage> {
        let mut list: Vec<ExportPackage> = self.packages.values().cloned().collect();
        list.sort();
        list
    }

    pub fn into_report(self) -> ScanReport {
        let mut packages: Vec<ExportPackage> = self.packages.into_values().collect();
        packages.sort();
        ScanReport::new(packages, self.conflicts)
    }

    fn record(&mut self, conflict: PackageConflict) {
        self.reporter.conflict(&conflict);
        self.conflicts.push(conflict);
    }
}

impl Default for ExportListBuilder<'static> {
    fn default() -> Self {
        Self::new(&TracingReporter)
    }
}

impl Extend<ExportPackage> for ExportListBuilder<'_> {
    fn extend<I: IntoIterator<Item = ExportPackage>>(&mut self, iter: I) {
        for package in iter {
            self.add(package);
        }
    }
}

fn conflict(current: &ExportPackage, incoming: &ExportPackage, replaced: bool) -> PackageConflict {
    PackageConflict {
        package: incoming.name().to_string(),
        current: current.clone(),
        incoming: incoming.clone(),
        replaced,
    }
}
