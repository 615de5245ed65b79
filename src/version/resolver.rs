//! Per-package version resolution.
//!
//! Sources are tried in a fixed order and the first one that yields a value
//! wins:
//!
//! 1. the last version mapping whose pattern matches the package name
//! 2. the archive manifest (`Bundle-Version`, `Specification-Version`,
//!    `Implementation-Version`)
//! 3. the archive's embedded `pom.properties`
//! 4. the archive's file name
//! 5. [`UNKNOWN_VERSION`], so an archive-backed package always has a version
//!
//! Packages found in plain directories have no archive to consult; without a
//! mapping their version is absent.

use super::filename::extract_version;
use super::normalizer::{DefaultVersionConverter, OsgiVersionConverter};
use crate::error::Result;
use crate::pattern::{CompiledPattern, PatternCompiler};
use crate::scanner::archive::JarMetadata;
use std::fmt;
use tracing::debug;

/// Version given to archive-backed packages when no source yields one.
pub const UNKNOWN_VERSION: &str = "0.0.0";

/// Manifest headers consulted, in order.
pub const VERSION_HEADERS: [&str; 3] = [
    "Bundle-Version",
    "Specification-Version",
    "Implementation-Version",
];

const BUILD_VERSION_KEY: &str = "version";

/// Forces a version for every package whose name matches a pattern.
///
/// ```
/// use pkgscan::pattern::WildcardCompiler;
/// use pkgscan::version::VersionMapping;
///
/// let mapping = VersionMapping::new(&WildcardCompiler, "org.apache.commons.logging*")?
///     .to_version("1.0.4");
/// assert!(mapping.matches("org.apache.commons.logging.impl"));
/// assert_eq!(mapping.version(), Some("1.0.4"));
/// # Ok::<(), pkgscan::ScanError>(())
/// ```
pub struct VersionMapping {
    pattern: Box<dyn CompiledPattern>,
    version: Option<String>,
    normalize: bool,
}

impl VersionMapping {
    pub fn new(compiler: &dyn PatternCompiler, pattern: &str) -> Result<Self> {
        Ok(Self::from_pattern(compiler.compile(pattern)?))
    }

    pub fn from_pattern(pattern: Box<dyn CompiledPattern>) -> Self {
        Self {
            pattern,
            version: None,
            normalize: true,
        }
    }

    pub fn to_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Uses the mapped version exactly as given.
    pub fn without_normalization(mut self) -> Self {
        self.normalize = false;
        self
    }

    pub fn matches(&self, package: &str) -> bool {
        self.pattern.matches(package)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn pattern(&self) -> &str {
        self.pattern.original()
    }

    pub fn normalizes(&self) -> bool {
        self.normalize
    }
}

impl fmt::Debug for VersionMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionMapping")
            .field("pattern", &self.pattern.original())
            .field("version", &self.version)
            .field("normalize", &self.normalize)
            .finish()
    }
}

pub struct VersionResolver {
    mappings: Vec<VersionMapping>,
    converter: Box<dyn OsgiVersionConverter>,
}

impl VersionResolver {
    pub fn new(mappings: Vec<VersionMapping>) -> Self {
        Self {
            mappings,
            converter: Box::new(DefaultVersionConverter),
        }
    }

    pub fn with_mappings(mut self, mappings: Vec<VersionMapping>) -> Self {
        self.mappings = mappings;
        self
    }

    pub fn with_converter(mut self, converter: Box<dyn OsgiVersionConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn mappings(&self) -> &[VersionMapping] {
        &self.mappings
    }

    pub fn normalize(&self, version: &str) -> String {
        self.converter.convert(version)
    }

    /// Resolves the version of `package`, found inside `archive` if given.
    pub fn resolve(&self, package: &str, archive: Option<&JarMetadata>) -> Option<String> {
        if let Some(version) = self.mapped_version(package) {
            return Some(version);
        }

        let archive = archive?;

        if let Some(value) = VERSION_HEADERS.iter().find_map(|h| archive.header(h)) {
            debug!(package, archive = %archive.file_name(), version = value, "version from manifest");
            return Some(self.normalize(value));
        }

        if let Some(value) = archive.build_property(BUILD_VERSION_KEY) {
            debug!(package, archive = %archive.file_name(), version = value, "version from pom.properties");
            return Some(self.normalize(value));
        }

        match extract_version(&archive.file_name()) {
            Some(value) => Some(self.normalize(&value)),
            None => Some(UNKNOWN_VERSION.to_string()),
        }
    }

    fn mapped_version(&self, package: &str) -> Option<String> {
        let mapping = self.mappings.iter().rev().find(|m| m.matches(package))?;
        let version = mapping.version()?;
        if mapping.normalizes() {
            Some(self.normalize(version))
        } else {
            Some(version.to_string())
        }
    }
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for VersionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionResolver")
            .field("mappings", &self.mappings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{LiteralCompiler, WildcardCompiler};
    use crate::scanner::archive::ArchiveEntry;
    use crate::version::IdentityConverter;
    use std::collections::BTreeMap;

    fn jar(name: &str, headers: &[(&str, &str)], pom_version: Option<&str>) -> JarMetadata {
        let headers: BTreeMap<String, String> = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let build = pom_version.map(|v| {
            let mut props = BTreeMap::new();
            props.insert("foo".to_string(), "bar".to_string());
            props.insert("version".to_string(), v.to_string());
            props
        });
        JarMetadata::from_parts(
            format!("/tmp/{name}"),
            vec![ArchiveEntry::file("testpackage/Foo.class")],
            headers,
            build,
        )
    }

    fn mapping(pattern: &str, version: &str) -> VersionMapping {
        VersionMapping::new(&LiteralCompiler, pattern)
            .unwrap()
            .to_version(version)
    }

    #[test]
    fn test_version_from_filename() {
        let resolver = VersionResolver::default().with_converter(Box::new(IdentityConverter));
        let cases = [
            ("sdfoo-2.0.jar", Some("2.0")),
            ("fdsfoo-2.0_something.jar", Some("2.0_something")),
            ("fwwoo-2.0-beta.jar", Some("2.0-beta")),
            ("fofdso-2.jar", Some("2")),
            ("foaao4-2.jar", Some("2")),
            ("log4j-1.2.8.jar", Some("1.2.8")),
            ("xmlrpc-2.0+xmlrpc61.jar", Some("2.0+xmlrpc61")),
            ("foo-alpha.jar", Some(UNKNOWN_VERSION)),
        ];
        for (name, expected) in cases {
            let meta = jar(name, &[], None);
            assert_eq!(
                resolver.resolve("testpackage", Some(&meta)).as_deref(),
                expected,
                "{name}"
            );
        }
    }

    #[test]
    fn test_filename_version_is_normalized() {
        let resolver = VersionResolver::default();
        let meta = jar("fwwoo-2.0-beta.jar", &[], None);
        assert_eq!(
            resolver.resolve("testpackage", Some(&meta)).as_deref(),
            Some("2.0.0.beta")
        );
    }

    #[test]
    fn test_version_from_manifest() {
        let resolver = VersionResolver::default().with_converter(Box::new(IdentityConverter));
        for header in VERSION_HEADERS {
            let meta = jar("pkgscanner-test-1234.jar", &[(header, "1")], None);
            assert_eq!(resolver.resolve("testpackage", Some(&meta)).as_deref(), Some("1"));
        }

        let meta = jar("pkgscanner-test-1234.jar", &[], None);
        assert!(resolver.resolve("testpackage", Some(&meta)).is_some());
    }

    #[test]
    fn test_manifest_header_order() {
        let resolver = VersionResolver::default();
        let meta = jar(
            "foo-9.jar",
            &[("Implementation-Version", "3"), ("Bundle-Version", "1.1")],
            Some("2"),
        );
        assert_eq!(resolver.resolve("testpackage", Some(&meta)).as_deref(), Some("1.1.0"));
    }

    #[test]
    fn test_version_from_build_properties() {
        let resolver = VersionResolver::default();
        let meta = jar("foo-9.jar", &[], Some("1"));
        assert_eq!(resolver.resolve("testpackage", Some(&meta)).as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_mapping_is_normalized() {
        let resolver = VersionResolver::new(vec![mapping("testpackage", "34")]);
        let meta = jar("fdas-2.0.jar", &[("Bundle-Version", "5")], None);
        assert_eq!(resolver.resolve("testpackage", Some(&meta)).as_deref(), Some("34.0.0"));
    }

    #[test]
    fn test_mapping_with_non_osgi_version() {
        let resolver = VersionResolver::new(vec![mapping("testpackage", "34-SNAPSHOT")]);
        let meta = jar("fdas-2.0.jar", &[], None);
        assert_eq!(
            resolver.resolve("testpackage", Some(&meta)).as_deref(),
            Some("34.0.0.SNAPSHOT")
        );
    }

    #[test]
    fn test_mapping_without_normalization() {
        let resolver =
            VersionResolver::new(vec![mapping("testpackage", "34-SNAPSHOT").without_normalization()]);
        assert_eq!(resolver.resolve("testpackage", None).as_deref(), Some("34-SNAPSHOT"));
    }

    #[test]
    fn test_last_matching_mapping_wins() {
        let resolver = VersionResolver::new(vec![
            VersionMapping::new(&WildcardCompiler, "org.*").unwrap().to_version("1"),
            VersionMapping::new(&WildcardCompiler, "org.example*").unwrap().to_version("2"),
            VersionMapping::new(&WildcardCompiler, "com.*").unwrap().to_version("3"),
        ]);
        assert_eq!(resolver.resolve("org.example.util", None).as_deref(), Some("2.0.0"));
        assert_eq!(resolver.resolve("org.other", None).as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_mapping_without_version_falls_through() {
        let resolver = VersionResolver::new(vec![
            VersionMapping::new(&LiteralCompiler, "testpackage").unwrap(),
        ]);
        let meta = jar("foo-1.6.jar", &[], None);
        assert_eq!(resolver.resolve("testpackage", Some(&meta)).as_deref(), Some("1.6.0"));
        assert_eq!(resolver.resolve("testpackage", None), None);
    }

    #[test]
    fn test_directory_package_without_mapping_has_no_version() {
        let resolver = VersionResolver::new(vec![mapping("other", "1")]);
        assert_eq!(resolver.resolve("testpackage", None), None);
    }

    #[test]
    fn test_mapping_debug_shows_pattern() {
        let debug = format!("{:?}", mapping("testpackage", "1"));
        assert!(debug.contains("testpackage"));
    }
}
