//! Reading the parts of an archive that matter for version resolution.
//!
//! [`JarMetadata`] is a snapshot taken while the archive is open: entry names,
//! the manifest's main headers and the first embedded `pom.properties`. The
//! underlying file handle is closed before [`JarMetadata::read`] returns.

use crate::error::{Result, ScanError};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;
use zip::ZipArchive;

const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub is_dir: bool,
}

impl ArchiveEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JarMetadata {
    path: PathBuf,
    entries: Vec<ArchiveEntry>,
    headers: BTreeMap<String, String>,
    build_properties: Option<BTreeMap<String, String>>,
}

impl JarMetadata {
    /// Opens the archive at `path` and reads its metadata.
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ScanError::io(path, source))?;
        Self::from_reader(path, BufReader::new(file))
    }

    /// Reads metadata from any seekable zip stream; `path` is only used for
    /// the file name and error messages.
    pub fn from_reader<R: Read + Seek>(path: impl Into<PathBuf>, reader: R) -> Result<Self> {
        let path = path.into();
        let mut archive =
            ZipArchive::new(reader).map_err(|source| ScanError::zip(&path, source))?;

        let mut entries = Vec::with_capacity(archive.len());
        let mut manifest_index = None;
        let mut properties_index = None;

        for idx in 0..archive.len() {
            let entry = archive
                .by_index_raw(idx)
                .map_err(|source| ScanError::zip(&path, source))?;
            let name = entry.name().to_string();

            if manifest_index.is_none() && is_manifest(&name) {
                manifest_index = Some(idx);
            }
            if properties_index.is_none() && is_build_properties(&name) {
                properties_index = Some(idx);
            }

            entries.push(ArchiveEntry {
                is_dir: entry.is_dir(),
                name,
            });
        }

        let headers = manifest_index
            .and_then(|idx| read_text(&mut archive, idx, &path))
            .map(|text| parse_manifest(&text))
            .unwrap_or_default();

        let build_properties = properties_index
            .and_then(|idx| read_text(&mut archive, idx, &path))
            .map(|text| parse_properties(&text));

        Ok(Self {
            path,
            entries,
            headers,
            build_properties,
        })
    }

    /// Builds metadata from already-parsed parts.
    pub fn from_parts(
        path: impl Into<PathBuf>,
        entries: Vec<ArchiveEntry>,
        headers: BTreeMap<String, String>,
        build_properties: Option<BTreeMap<String, String>>,
    ) -> Self {
        Self {
            path: path.into(),
            entries,
            headers,
            build_properties,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Looks up a main-section manifest header, ignoring case. Blank values
    /// count as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Looks up a key in the embedded `pom.properties`, if there is one.
    pub fn build_property(&self, key: &str) -> Option<&str> {
        self.build_properties
            .as_ref()?
            .get(key)
            .map(|value| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

fn read_text<R: Read + Seek>(archive: &mut ZipArchive<R>, idx: usize, path: &Path) -> Option<String> {
    let mut entry = match archive.by_index(idx) {
        Ok(entry) => entry,
        Err(e) => {
            debug!(archive = %path.display(), error = %e, "could not open metadata entry");
            return None;
        }
    };
    let mut bytes = Vec::new();
    if let Err(e) = entry.read_to_end(&mut bytes) {
        debug!(archive = %path.display(), entry = entry.name(), error = %e, "could not read metadata entry");
        return None;
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn is_manifest(name: &str) -> bool {
    name.trim_start_matches('/').eq_ignore_ascii_case(MANIFEST_PATH)
}

fn build_properties_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^/?META-INF/maven/[^/]+/[^/]+/pom\.properties$")
            .expect("valid pom.properties pattern")
    })
}

/// `META-INF/maven/<group>/<artifact>/pom.properties`
pub(crate) fn is_build_properties(name: &str) -> bool {
    build_properties_pattern().is_match(name)
}

/// Parses the main section of a manifest. Continuation lines (starting with
/// a single space) are joined onto the previous header.
pub(crate) fn parse_manifest(text: &str) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    let mut current: Option<(String, String)> = None;

    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            break;
        }
        if let Some(rest) = line.strip_prefix(' ') {
            if let Some((_, value)) = current.as_mut() {
                value.push_str(rest);
            }
            continue;
        }
        if let Some((name, value)) = current.take() {
            headers.insert(name, value);
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.strip_prefix(' ').unwrap_or(value);
            current = Some((name.trim().to_string(), value.to_string()));
        }
    }
    if let Some((name, value)) = current {
        headers.insert(name, value);
    }

    headers
}

/// Parses `key=value` / `key: value` lines, skipping `#` and `!` comments.
pub(crate) fn parse_properties(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let split = line.find(['=', ':'])?;
            let key = line[..split].trim();
            let value = line[split + 1..].trim();
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
