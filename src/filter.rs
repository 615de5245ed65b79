//! Package and archive selection.
//!
//! A scan asks two questions while walking: should this package be reported,
//! and should this archive file be opened? [`PackageFilter`] names both.
//! [`PatternFilter`] answers them from include/exclude pattern lists, and
//! [`FnFilter`] from two plain closures.

use crate::error::Result;
use crate::pattern::{CompiledPattern, PatternCompiler};

/// The filter capability consulted during traversal.
pub trait PackageFilter {
    /// `name` is a dotted package name such as `org.example.util`.
    fn matches_package(&self, name: &str) -> bool;

    /// `file_name` is the bare archive file name such as `foo-1.0.jar`.
    fn matches_archive(&self, file_name: &str) -> bool;
}

/// Include and exclude pattern lists for one kind of name.
///
/// A name is selected when the include list is empty or any include pattern
/// matches it, and no exclude pattern matches it.
#[derive(Debug, Default)]
pub struct Selection {
    include: Vec<Box<dyn CompiledPattern>>,
    exclude: Vec<Box<dyn CompiledPattern>>,
}

impl Selection {
    pub fn new<S: AsRef<str>>(
        compiler: &dyn PatternCompiler,
        include: &[S],
        exclude: &[S],
    ) -> Result<Self> {
        Ok(Self {
            include: compile_all(compiler, include)?,
            exclude: compile_all(compiler, exclude)?,
        })
    }

    /// Selects every name.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(name));
        included && !self.exclude.iter().any(|p| p.matches(name))
    }
}

fn compile_all<S: AsRef<str>>(
    compiler: &dyn PatternCompiler,
    patterns: &[S],
) -> Result<Vec<Box<dyn CompiledPattern>>> {
    patterns
        .iter()
        .map(|p| compiler.compile(p.as_ref()))
        .collect()
}

/// A filter built from package and archive [`Selection`]s.
///
/// # Example
///
/// ```
/// use pkgscan::filter::{PackageFilter, PatternFilter, Selection};
/// use pkgscan::pattern::WildcardCompiler;
///
/// let filter = PatternFilter::new(
///     Selection::new(&WildcardCompiler, &["org.*", "com.*"], &["com.intellij.*"])?,
///     Selection::new(&WildcardCompiler, &["*.jar"], &[])?,
/// );
///
/// assert!(filter.matches_package("org.example"));
/// assert!(!filter.matches_package("com.intellij.openapi"));
/// assert!(filter.matches_archive("foo-1.0.jar"));
/// # Ok::<(), pkgscan::ScanError>(())
/// ```
#[derive(Debug, Default)]
pub struct PatternFilter {
    packages: Selection,
    archives: Selection,
}

impl PatternFilter {
    pub fn new(packages: Selection, archives: Selection) -> Self {
        Self { packages, archives }
    }

    /// Accepts every package and every archive.
    pub fn match_all() -> Self {
        Self::default()
    }
}

impl PackageFilter for PatternFilter {
    fn matches_package(&self, name: &str) -> bool {
        self.packages.matches(name)
    }

    fn matches_archive(&self, file_name: &str) -> bool {
        self.archives.matches(file_name)
    }
}

/// A filter made of two independent predicates.
pub struct FnFilter<P, A> {
    package: P,
    archive: A,
}

impl<P, A> FnFilter<P, A>
where
    P: Fn(&str) -> bool,
    A: Fn(&str) -> bool,
{
    pub fn new(package: P, archive: A) -> Self {
        Self { package, archive }
    }
}

impl<P, A> PackageFilter for FnFilter<P, A>
where
    P: Fn(&str) -> bool,
    A: Fn(&str) -> bool,
{
    fn matches_package(&self, name: &str) -> bool {
        (self.package)(name)
    }

    fn matches_archive(&self, file_name: &str) -> bool {
        (self.archive)(file_name)
    }
}
