//! Finding where a package lives on the search path.

use super::location::file_url;
use crate::error::{Result, ScanError};
use crate::report::ScanReporter;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// Maps a package path such as `org/example` to the location identifiers that
/// contain it.
///
/// An empty path asks for every location on the search path. Search path
/// entries that cannot be read are handed to `reporter` and left out of the
/// result; an `Err` means the lookup as a whole failed.
pub trait ResourceLocator: Send + Sync {
    fn locate(&self, package_path: &str, reporter: &dyn ScanReporter) -> Result<Vec<String>>;
}

/// Locates packages on a fixed list of directories and archives.
///
/// Directories are returned as `file:` URLs pointing at the package directory.
/// Archives are returned as `jar:file:<archive>!/<package path>`. Both are
/// percent-encoded, so a caller has to decode them the same way any other
/// location identifier is decoded.
#[derive(Debug, Clone, Default)]
pub struct ClasspathLocator {
    entries: Vec<PathBuf>,
}

impl ClasspathLocator {
    pub fn new<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    fn locate_in(&self, entry: &Path, package_path: &str) -> Result<Option<String>> {
        if entry.is_dir() {
            if package_path.is_empty() {
                return file_url(entry).map(|url| Some(url.to_string()));
            }
            let candidate = entry.join(package_path);
            if candidate.is_dir() {
                return file_url(&candidate).map(|url| Some(url.to_string()));
            }
            return Ok(None);
        }

        if !entry.exists() {
            return Err(ScanError::io(entry, io::ErrorKind::NotFound.into()));
        }

        let url = file_url(entry)?;
        if package_path.is_empty() {
            return Ok(Some(format!("jar:{}!/", url)));
        }
        if archive_contains(entry, package_path)? {
            return Ok(Some(format!("jar:{}!/{}", url, package_path)));
        }
        Ok(None)
    }
}

impl ResourceLocator for ClasspathLocator {
    fn locate(&self, package_path: &str, reporter: &dyn ScanReporter) -> Result<Vec<String>> {
        let package_path = package_path.trim_matches('/');
        let mut found = Vec::new();

        for entry in &self.entries {
            match self.locate_in(entry, package_path) {
                Ok(Some(location)) => found.push(location),
                Ok(None) => {}
                Err(e) => reporter.location_failed(&entry.display().to_string(), &e),
            }
        }

        debug!(package_path, count = found.len(), "located package");
        Ok(found)
    }
}

fn archive_contains(path: &Path, package_path: &str) -> Result<bool> {
    let file = File::open(path).map_err(|source| ScanError::io(path, source))?;
    let archive =
        ZipArchive::new(BufReader::new(file)).map_err(|source| ScanError::zip(path, source))?;
    let prefix = format!("{}/", package_path);
    let found = archive
        .file_names()
        .any(|name| name.trim_start_matches('/').starts_with(&prefix));
    Ok(found)
}
