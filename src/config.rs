//! Configuration file handling.
//!
//! This module provides loading and saving of pkgscan configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/pkgscan/config.toml`
//! - macOS: `~/Library/Application Support/pkgscan/config.toml`
//! - Windows: `%APPDATA%\pkgscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! classpath = ["target/classes", "lib"]
//! roots = []
//! pattern_syntax = "wildcard"
//! default_format = "header"
//!
//! [packages]
//! include = ["org.*", "com.*"]
//! exclude = ["com.intellij.*"]
//!
//! [archives]
//! include = ["*.jar"]
//!
//! [[mappings]]
//! package = "org.apache.commons.logging*"
//! version = "1.0.4"
//! ```

use crate::error::{Result, ScanError};
use crate::filter::{PatternFilter, Selection};
use crate::pattern::PatternSyntax;
use crate::version::VersionMapping;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Scan configuration.
///
/// Every field has a default, so an empty file (or no file at all) is a valid
/// configuration that scans nothing until a classpath is given.
///
/// # Example
///
/// ```no_run
/// use pkgscan::ScanConfig;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = ScanConfig::load().unwrap();
///
/// println!("Classpath entries: {}", config.classpath.len());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directories and archives making up the search path.
    pub classpath: Vec<PathBuf>,

    /// Dotted package roots to start from. Empty scans the whole classpath.
    pub roots: Vec<String>,

    /// How filter and mapping patterns are interpreted.
    ///
    /// Default: wildcard
    pub pattern_syntax: PatternSyntax,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "header", "table", "json"
    /// Default: "header"
    pub default_format: String,

    /// Which packages are reported.
    pub packages: SelectionConfig,

    /// Which archive files are opened.
    pub archives: SelectionConfig,

    /// Explicit versions, later entries taking precedence.
    pub mappings: Vec<MappingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl SelectionConfig {
    pub fn build(&self, syntax: PatternSyntax) -> Result<Selection> {
        Selection::new(syntax.compiler().as_ref(), &self.include, &self.exclude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Package name pattern.
    pub package: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Whether `version` is normalized into an OSGi version.
    #[serde(default = "default_true")]
    pub normalize: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            classpath: Vec::new(),
            roots: Vec::new(),
            pattern_syntax: PatternSyntax::default(),
            default_format: "header".to_string(),
            packages: SelectionConfig::default(),
            archives: SelectionConfig {
                include: vec!["*.jar".to_string()],
                exclude: Vec::new(),
            },
            mappings: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Loads configuration from the default config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults if it does
    /// not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ScanError::io(path, source))?;
        toml::from_str(&content).map_err(|e| ScanError::Config {
            field: path.display().to_string(),
            reason: e.message().to_string(),
        })
    }

    /// Saves the configuration to the default config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| ScanError::io(parent, source))?;
            }
        }

        let content = toml::to_string_pretty(self).map_err(|e| ScanError::Config {
            field: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(path, content).map_err(|source| ScanError::io(path, source))
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use pkgscan::ScanConfig;
    ///
    /// let path = ScanConfig::config_path();
    /// assert!(path.ends_with("pkgscan/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pkgscan")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = ScanConfig::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Compiles the package and archive selections.
    pub fn build_filter(&self) -> Result<PatternFilter> {
        Ok(PatternFilter::new(
            self.packages.build(self.pattern_syntax)?,
            self.archives.build(self.pattern_syntax)?,
        ))
    }

    /// Compiles the version mappings, keeping their order.
    pub fn build_mappings(&self) -> Result<Vec<VersionMapping>> {
        let compiler = self.pattern_syntax.compiler();
        self.mappings
            .iter()
            .map(|m| {
                let mut mapping = VersionMapping::new(compiler.as_ref(), &m.package)?;
                if let Some(version) = &m.version {
                    mapping = mapping.to_version(version.as_str());
                }
                if !m.normalize {
                    mapping = mapping.without_normalization();
                }
                Ok(mapping)
            })
            .collect()
    }
}
