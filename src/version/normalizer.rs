//! Conversion of free-form version tokens into OSGi versions.
//!
//! The target grammar is `major.minor.micro[.qualifier]` where the first three
//! parts are unsigned integers and the qualifier is `[0-9A-Za-z_-]+`. Rules are
//! tried in a fixed order and the first one that produces a valid version wins;
//! changing the order changes the output for tokens that fit several shapes.

use regex::Regex;
use std::sync::OnceLock;

/// Strategy for turning a raw version token into an OSGi version.
pub trait OsgiVersionConverter: Send + Sync {
    fn convert(&self, version: &str) -> String;
}

/// The standard converter, following the Maven bundle conventions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultVersionConverter;

impl OsgiVersionConverter for DefaultVersionConverter {
    fn convert(&self, version: &str) -> String {
        normalize(version)
    }
}

/// Passes tokens through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl OsgiVersionConverter for IdentityConverter {
    fn convert(&self, version: &str) -> String {
        version.to_string()
    }
}

fn osgi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+(\.[0-9A-Za-z_-]+)?$").expect("valid OSGi pattern")
    })
}

/// `1[.2[.3]]-YYYYMMDD.HHMMSS-N`
fn dated_snapshot_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]+)(?:\.([0-9]+))?(?:\.([0-9]+))?-([0-9]{8}\.[0-9]{6}-[0-9]*)$")
            .expect("valid snapshot pattern")
    })
}

/// `N[.N].X.Y`, where a dot may sit inside the qualifier.
fn dots_in_qualifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]+)(\.[0-9]+)?\.([0-9A-Za-z_-]+)\.([0-9A-Za-z_-]+)$")
            .expect("valid qualifier pattern")
    })
}

/// Up to three numeric parts, then an optional trailing token after any
/// non-alphanumeric separator.
fn fill_zeros_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^([0-9]+)(?:\.([0-9]+)(?:\.([0-9]+))?)?(?:[^0-9A-Za-z](.*))?$")
            .expect("valid fill pattern")
    })
}

/// Returns true if `version` already matches the OSGi grammar.
pub fn is_osgi_version(version: &str) -> bool {
    osgi_pattern().is_match(version)
}

/// Normalizes an arbitrary version token into an OSGi version string.
///
/// # Examples
///
/// ```
/// use pkgscan::version::normalize;
///
/// assert_eq!(normalize("1.2.3"), "1.2.3");
/// assert_eq!(normalize("1.0-SNAPSHOT"), "1.0.0.SNAPSHOT");
/// assert_eq!(normalize("1.2.3_RC4"), "1.2.3.RC4");
/// assert_eq!(normalize("2.0"), "2.0.0");
/// ```
pub fn normalize(version: &str) -> String {
    if is_osgi_version(version) {
        return version.to_string();
    }

    if let Some(caps) = dated_snapshot_pattern().captures(version) {
        let qualifier = caps[4].replace(['-', '.'], "_");
        return assemble(
            &caps[1],
            caps.get(2).map(|m| m.as_str()),
            caps.get(3).map(|m| m.as_str()),
            Some(&qualifier),
        );
    }

    let mut working = version.replacen('-', ".", 1).replace('-', "_");
    if is_osgi_version(&working) {
        return working;
    }

    if let Some(caps) = dots_in_qualifier_pattern().captures(&working) {
        let inner = &caps[3];
        if !is_numeric(inner) {
            let minor = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            working = format!("{}{}.{}_{}", &caps[1], minor, inner, &caps[4]);
        }
    }

    if let Some(filled) = fill_zeros(&working) {
        if is_osgi_version(&filled) {
            return filled;
        }
    }

    fallback(version)
}

fn fill_zeros(working: &str) -> Option<String> {
    let caps = fill_zeros_pattern().captures(working)?;
    let major = caps.get(1)?.as_str();
    let mut minor = caps.get(2).map(|m| m.as_str().to_string());
    let mut micro = caps.get(3).map(|m| m.as_str().to_string());
    let trailing = caps
        .get(4)
        .map(|m| sanitize_qualifier(m.as_str()))
        .filter(|q| !q.is_empty());

    let qualifier = match trailing {
        Some(token) if is_numeric(&token) && minor.is_none() => {
            minor = Some(token);
            None
        }
        Some(token) if is_numeric(&token) && micro.is_none() => {
            micro = Some(token);
            None
        }
        other => other,
    };

    Some(assemble(
        major,
        minor.as_deref(),
        micro.as_deref(),
        qualifier.as_deref(),
    ))
}

fn fallback(original: &str) -> String {
    if original.is_empty() {
        return "0.0.0".to_string();
    }
    let qualifier: String = original
        .chars()
        .map(|c| if is_qualifier_char(c) { c } else { '_' })
        .collect();
    format!("0.0.0.{}", qualifier)
}

fn assemble(major: &str, minor: Option<&str>, micro: Option<&str>, qualifier: Option<&str>) -> String {
    let mut version = format!("{}.{}.{}", major, minor.unwrap_or("0"), micro.unwrap_or("0"));
    if let Some(qualifier) = qualifier {
        version.push('.');
        version.push_str(qualifier);
    }
    version
}

fn sanitize_qualifier(raw: &str) -> String {
    raw.chars().filter(|c| is_qualifier_char(*c)).collect()
}

fn is_qualifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
