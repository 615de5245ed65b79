//! Directory and archive traversal.
//!
//! Each location is walked on its own with a fresh set of already-emitted
//! package names, so one location yields at most one record per package. A
//! location that cannot be read is handed to the reporter and contributes no
//! records; the walk moves on to the next one.

use super::archive::JarMetadata;
use super::location::resolve_location;
use super::locator::ResourceLocator;
use crate::builder::ExportListBuilder;
use crate::error::ScanError;
use crate::filter::PackageFilter;
use crate::model::{canonical_package_name, ExportPackage, ScanReport};
use crate::report::ScanReporter;
use crate::version::VersionResolver;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const ARCHIVE_EXTENSIONS: [&str; 2] = ["jar", "zip"];

pub struct ClasspathWalker<'a> {
    filter: &'a dyn PackageFilter,
    resolver: &'a VersionResolver,
    reporter: &'a dyn ScanReporter,
}

impl<'a> ClasspathWalker<'a> {
    pub fn new(
        filter: &'a dyn PackageFilter,
        resolver: &'a VersionResolver,
        reporter: &'a dyn ScanReporter,
    ) -> Self {
        Self {
            filter,
            resolver,
            reporter,
        }
    }

    /// Finds packages under each dotted root and merges them into one report.
    pub fn find_in_packages<S: AsRef<str>>(
        &self,
        locator: &dyn ResourceLocator,
        roots: &[S],
    ) -> ScanReport {
        let mut builder = ExportListBuilder::new(self.reporter);
        for root in roots {
            builder.extend(self.find_in_package(locator, root.as_ref()));
        }
        builder.into_report()
    }

    /// Finds packages at and below `package`, wherever the locator finds it.
    /// Records are returned unmerged, in discovery order.
    pub fn find_in_package(&self, locator: &dyn ResourceLocator, package: &str) -> Vec<ExportPackage> {
        let package_path = package.trim_matches('.').replace('.', "/");
        match locator.locate(&package_path, self.reporter) {
            Ok(locations) => self.scan_locations(&package_path, &locations),
            Err(e) => {
                self.reporter.location_failed(package, &e);
                Vec::new()
            }
        }
    }

    /// Scans explicit location identifiers from their top level and merges
    /// the results.
    pub fn find_in_locations<S: AsRef<str>>(&self, locations: &[S]) -> ScanReport {
        let mut builder = ExportListBuilder::new(self.reporter);
        builder.extend(self.scan_locations("", locations));
        builder.into_report()
    }

    /// Scans each location for packages under `prefix` (a `/`-separated
    /// package path, empty for everything).
    pub fn scan_locations<S: AsRef<str>>(&self, prefix: &str, locations: &[S]) -> Vec<ExportPackage> {
        let mut found = Vec::new();
        for location in locations {
            let location = location.as_ref();
            match self.scan_location(prefix, location) {
                Ok(records) => {
                    debug!(location, count = records.len(), "scanned location");
                    found.extend(records);
                }
                Err(e) => self.reporter.location_failed(location, &e),
            }
        }
        found
    }

    fn scan_location(&self, prefix: &str, location: &str) -> Result<Vec<ExportPackage>, ScanError> {
        let path = resolve_location(location)?;
        if path.is_dir() {
            return Ok(self.scan_directory(prefix, &path));
        }
        if !path.exists() {
            return Err(ScanError::io(path, io::ErrorKind::NotFound.into()));
        }
        if !self.filter.matches_archive(&file_name(&path)) {
            debug!(location, "archive not selected");
            return Ok(Vec::new());
        }
        self.scan_archive(prefix, &path)
    }

    /// Walks a directory tree. `prefix` is the package path of `dir` itself.
    pub fn scan_directory(&self, prefix: &str, dir: &Path) -> Vec<ExportPackage> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                    let error = ScanError::io(path.clone(), e.into());
                    self.reporter.location_failed(&path.display().to_string(), &error);
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(dir) else {
                continue;
            };

            let entry_name = file_name(entry.path());
            if entry.depth() == 1 && prefix.is_empty() && is_archive_name(&entry_name) {
                if self.filter.matches_archive(&entry_name) {
                    match self.scan_archive("", entry.path()) {
                        Ok(records) => found.extend(records),
                        Err(e) => self
                            .reporter
                            .location_failed(&entry.path().display().to_string(), &e),
                    }
                }
                continue;
            }

            let parent = relative
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            let raw = match (prefix.is_empty(), parent.is_empty()) {
                (true, _) => parent,
                (false, true) => prefix.to_string(),
                (false, false) => format!("{}/{}", prefix, parent),
            };
            let name = canonical_package_name(&raw);
            if name.is_empty() || !seen.insert(name.clone()) {
                continue;
            }
            if self.filter.matches_package(&name) {
                let version = self.resolver.resolve(&name, None);
                debug!(package = %name, version = version.as_deref().unwrap_or("-"), origin = %dir.display(), "found package");
                found.push(ExportPackage::new(name, version, dir));
            }
        }

        found
    }

    /// Reads an archive and emits one record per package under `prefix`. The
    /// archive is closed before this returns.
    pub fn scan_archive(&self, prefix: &str, path: &Path) -> Result<Vec<ExportPackage>, ScanError> {
        let metadata = JarMetadata::read(path)?;
        let prefix = prefix.trim_matches('/');
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        for entry in metadata.entries().iter().filter(|e| !e.is_dir) {
            let entry_name = entry.name.trim_start_matches('/');
            if !under_prefix(entry_name, prefix) {
                continue;
            }
            let Some((package_path, _)) = entry_name.rsplit_once('/') else {
                continue;
            };
            let name = canonical_package_name(package_path);
            if name.is_empty() || !seen.insert(name.clone()) {
                continue;
            }
            if self.filter.matches_package(&name) {
                let version = self.resolver.resolve(&name, Some(&metadata));
                debug!(package = %name, version = version.as_deref().unwrap_or("-"), origin = %path.display(), "found package");
                found.push(ExportPackage::new(name, version, PathBuf::from(path)));
            }
        }

        Ok(found)
    }
}

/// Segment-aware: `foo` covers `foo/A.class` but not `foobar/A.class`.
fn under_prefix(entry_name: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || entry_name
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn is_archive_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ARCHIVE_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
