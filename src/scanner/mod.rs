//! Classpath scanning.
//!
//! [`PackageScanner`] is the entry point: it ties a [`ResourceLocator`], a
//! [`PackageFilter`], version mappings and a [`ScanReporter`] together and
//! produces a [`ScanReport`]. The pieces it is built from are public too:
//!
//! | Module | Role |
//! |--------|------|
//! | [`location`] | Decoding location identifiers into paths |
//! | [`locator`] | Finding package roots on the search path |
//! | [`archive`] | Reading entry names and version metadata from archives |
//! | [`walker`] | Directory and archive traversal |
//!
//! # Example
//!
//! ```no_run
//! use pkgscan::filter::{PatternFilter, Selection};
//! use pkgscan::pattern::WildcardCompiler;
//! use pkgscan::scanner::PackageScanner;
//! use pkgscan::version::VersionMapping;
//!
//! let report = PackageScanner::for_classpath(["target/classes", "lib/commons-io-2.11.0.jar"])
//!     .select(PatternFilter::new(
//!         Selection::new(&WildcardCompiler, &["org.*"], &[])?,
//!         Selection::new(&WildcardCompiler, &["*.jar"], &[])?,
//!     ))
//!     .with_mappings(vec![
//!         VersionMapping::new(&WildcardCompiler, "org.example*")?.to_version("1.0"),
//!     ])
//!     .with_roots(["org"])
//!     .scan();
//!
//! for package in &report.packages {
//!     println!("{} {}", package.name(), package.version().unwrap_or("-"));
//! }
//! # Ok::<(), pkgscan::ScanError>(())
//! ```

pub mod archive;
pub mod location;
pub mod locator;
pub mod walker;

pub use archive::{ArchiveEntry, JarMetadata};
pub use location::resolve_location;
pub use locator::{ClasspathLocator, ResourceLocator};
pub use walker::ClasspathWalker;

use crate::config::ScanConfig;
use crate::error::Result;
use crate::filter::{PackageFilter, PatternFilter};
use crate::model::ScanReport;
use crate::report::{ScanReporter, TracingReporter};
use crate::version::{OsgiVersionConverter, VersionMapping, VersionResolver};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// A configured scan session.
///
/// Configuration is read-only once built; [`scan`](Self::scan) and friends
/// take `&self` and keep all traversal state local, so one scanner can be
/// reused for any number of scans.
pub struct PackageScanner {
    locator: Box<dyn ResourceLocator>,
    filter: Box<dyn PackageFilter>,
    resolver: VersionResolver,
    reporter: Arc<dyn ScanReporter>,
    roots: Vec<String>,
}

impl PackageScanner {
    /// Creates a scanner that accepts every package and archive.
    pub fn new(locator: impl ResourceLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
            filter: Box::new(PatternFilter::match_all()),
            resolver: VersionResolver::default(),
            reporter: Arc::new(TracingReporter),
            roots: Vec::new(),
        }
    }

    /// Creates a scanner over a list of directories and archives.
    pub fn for_classpath<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(ClasspathLocator::new(entries))
    }

    /// Builds a scanner from a configuration file's contents.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidPattern`](crate::ScanError::InvalidPattern)
    /// if a filter or mapping pattern does not compile.
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let scanner = Self::for_classpath(config.classpath.iter().cloned())
            .select(config.build_filter()?)
            .with_mappings(config.build_mappings()?)
            .with_roots(config.roots.iter().cloned());
        Ok(scanner)
    }

    pub fn select(self, filter: impl PackageFilter + 'static) -> Self {
        Self {
            filter: Box::new(filter),
            ..self
        }
    }

    pub fn with_mappings(self, mappings: Vec<VersionMapping>) -> Self {
        Self {
            resolver: self.resolver.with_mappings(mappings),
            ..self
        }
    }

    pub fn with_converter(self, converter: Box<dyn OsgiVersionConverter>) -> Self {
        Self {
            resolver: self.resolver.with_converter(converter),
            ..self
        }
    }

    pub fn with_reporter(self, reporter: Arc<dyn ScanReporter>) -> Self {
        Self { reporter, ..self }
    }

    /// Sets the dotted package roots [`scan`](Self::scan) starts from.
    pub fn with_roots<I, S>(self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn resolver(&self) -> &VersionResolver {
        &self.resolver
    }

    /// Scans the configured roots, or the whole search path if none are set.
    pub fn scan(&self) -> ScanReport {
        if self.roots.is_empty() {
            self.scan_packages(&[""])
        } else {
            self.scan_packages(self.roots.as_slice())
        }
    }

    /// Scans the packages at and below each dotted root.
    pub fn scan_packages<S: AsRef<str>>(&self, roots: &[S]) -> ScanReport {
        let report = self.walker().find_in_packages(self.locator.as_ref(), roots);
        info!(
            packages = report.packages.len(),
            conflicts = report.conflicts.len(),
            "scan finished"
        );
        report
    }

    /// Scans explicit location identifiers, bypassing the locator.
    pub fn scan_locations<S: AsRef<str>>(&self, locations: &[S]) -> ScanReport {
        let report = self.walker().find_in_locations(locations);
        info!(
            packages = report.packages.len(),
            conflicts = report.conflicts.len(),
            "scan finished"
        );
        report
    }

    fn walker(&self) -> ClasspathWalker<'_> {
        ClasspathWalker::new(self.filter.as_ref(), &self.resolver, self.reporter.as_ref())
    }
}

impl fmt::Debug for PackageScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageScanner")
            .field("resolver", &self.resolver)
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}
