//! Turning location identifiers into filesystem paths.
//!
//! Identifiers come in three shapes:
//!
//! - `jar:file:/lib/foo.jar!/org/example` - an entry inside an archive; only
//!   the archive's own path is kept
//! - `file:/lib/bar%20baz.jar` - a file URL; percent-escapes are decoded, a
//!   literal `+` stays a `+`
//! - `/lib/foo+bar.jar` - a bare path, used as is; if nothing exists there,
//!   `%XX` escapes are decoded and the decoded path is used when it exists

use crate::error::{Result, ScanError};
use std::path::PathBuf;
use url::Url;

const ARCHIVE_PREFIX: &str = "jar:";
const FILE_SCHEME: &str = "file:";

/// Resolves a location identifier to the directory or archive it names.
pub fn resolve_location(location: &str) -> Result<PathBuf> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(malformed(location, "empty location"));
    }

    let mut target = trimmed;
    let has_archive_prefix = starts_with_ignore_case(target, ARCHIVE_PREFIX);
    if has_archive_prefix {
        target = &target[ARCHIVE_PREFIX.len()..];
    }
    if has_archive_prefix || target.contains("!/") {
        if let Some(idx) = target.rfind('!') {
            if idx > 0 {
                target = &target[..idx];
            }
        }
    }

    if starts_with_ignore_case(target, FILE_SCHEME) {
        return file_url_to_path(location, target);
    }

    if let Some(scheme) = foreign_scheme(target) {
        return Err(ScanError::UnsupportedScheme {
            location: location.to_string(),
            scheme: scheme.to_string(),
        });
    }

    Ok(bare_path(target))
}

fn bare_path(target: &str) -> PathBuf {
    let verbatim = PathBuf::from(target);
    if verbatim.exists() || !target.contains('%') {
        return verbatim;
    }
    match urlencoding::decode(target) {
        Ok(decoded) => {
            let decoded = PathBuf::from(decoded.as_ref());
            if decoded.exists() {
                decoded
            } else {
                verbatim
            }
        }
        Err(_) => verbatim,
    }
}

fn file_url_to_path(location: &str, target: &str) -> Result<PathBuf> {
    let url = Url::parse(target).map_err(|e| malformed(location, &e.to_string()))?;
    url.to_file_path()
        .map_err(|_| malformed(location, "not a local file URL"))
}

/// Returns the scheme of `target` if it looks like a non-file URL. A single
/// letter before `:` is a Windows drive, not a scheme.
fn foreign_scheme(target: &str) -> Option<&str> {
    let (scheme, _) = target.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && scheme.len() > 1
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.is_char_boundary(prefix.len())
        && value[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn malformed(location: &str, reason: &str) -> ScanError {
    ScanError::MalformedLocation {
        location: location.to_string(),
        reason: reason.to_string(),
    }
}

/// Builds the `file:` URL for an absolute path.
pub(crate) fn file_url(path: &std::path::Path) -> Result<Url> {
    let absolute = std::path::absolute(path).map_err(|source| ScanError::io(path, source))?;
    Url::from_file_path(&absolute).map_err(|_| ScanError::MalformedLocation {
        location: absolute.display().to_string(),
        reason: "cannot be expressed as a file URL".to_string(),
    })
}
