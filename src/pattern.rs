//! Name-pattern compilation.
//!
//! Package and archive filters, as well as version mappings, are written as
//! patterns. How a pattern string is interpreted is a strategy: simple `*`
//! wildcards by default, or exact names, or full regular expressions.

use crate::error::{Result, ScanError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A compiled name predicate.
pub trait CompiledPattern: fmt::Debug + Send + Sync {
    /// The pattern text this was compiled from.
    fn original(&self) -> &str;

    fn matches(&self, value: &str) -> bool;
}

/// Turns pattern strings into [`CompiledPattern`]s.
pub trait PatternCompiler: Send + Sync {
    fn compile(&self, pattern: &str) -> Result<Box<dyn CompiledPattern>>;
}

/// Selects which [`PatternCompiler`] interprets configured patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSyntax {
    /// `*` matches any run of characters; everything else is literal.
    #[default]
    Wildcard,
    /// The whole value must equal the pattern.
    Literal,
    /// Regular expression, anchored at both ends.
    Regex,
}

impl PatternSyntax {
    pub fn compiler(self) -> Box<dyn PatternCompiler> {
        match self {
            PatternSyntax::Wildcard => Box::new(WildcardCompiler),
            PatternSyntax::Literal => Box::new(LiteralCompiler),
            PatternSyntax::Regex => Box::new(RegexCompiler),
        }
    }
}

impl std::str::FromStr for PatternSyntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wildcard" | "glob" => Ok(PatternSyntax::Wildcard),
            "literal" | "exact" => Ok(PatternSyntax::Literal),
            "regex" => Ok(PatternSyntax::Regex),
            _ => Err(format!(
                "Unknown pattern syntax: {}. Use 'wildcard', 'literal', or 'regex'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WildcardCompiler;

impl PatternCompiler for WildcardCompiler {
    fn compile(&self, pattern: &str) -> Result<Box<dyn CompiledPattern>> {
        Ok(Box::new(WildcardPattern {
            pattern: pattern.to_string(),
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralCompiler;

impl PatternCompiler for LiteralCompiler {
    fn compile(&self, pattern: &str) -> Result<Box<dyn CompiledPattern>> {
        Ok(Box::new(LiteralPattern {
            pattern: pattern.to_string(),
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegexCompiler;

impl PatternCompiler for RegexCompiler {
    fn compile(&self, pattern: &str) -> Result<Box<dyn CompiledPattern>> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            ScanError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Box::new(RegexPattern {
            pattern: pattern.to_string(),
            regex,
        }))
    }
}

#[derive(Debug, Clone)]
struct WildcardPattern {
    pattern: String,
}

impl CompiledPattern for WildcardPattern {
    fn original(&self) -> &str {
        &self.pattern
    }

    fn matches(&self, value: &str) -> bool {
        glob_match(&self.pattern, value)
    }
}

#[derive(Debug, Clone)]
struct LiteralPattern {
    pattern: String,
}

impl CompiledPattern for LiteralPattern {
    fn original(&self) -> &str {
        &self.pattern
    }

    fn matches(&self, value: &str) -> bool {
        self.pattern == value
    }
}

#[derive(Debug, Clone)]
struct RegexPattern {
    pattern: String,
    regex: Regex,
}

impl CompiledPattern for RegexPattern {
    fn original(&self) -> &str {
        &self.pattern
    }

    fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    // Prefix (before first *)
    if !parts[0].is_empty() {
        if !remaining.starts_with(parts[0]) {
            return false;
        }
        remaining = &remaining[parts[0].len()..];
    }

    // Suffix (after last *)
    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        if !remaining.ends_with(last_part) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last_part.len()];
    }

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }

    true
}
