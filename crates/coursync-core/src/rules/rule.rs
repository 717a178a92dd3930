//! Classification rule model as it appears in the configuration file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do with a file a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Method {
    /// Duplicate into the destination; the source stays.
    #[default]
    Copy,
    /// Move into the destination and leave an empty placeholder behind.
    Rename,
}

impl From<String> for Method {
    /// `"rename"` selects [`Method::Rename`]; any other value means copy.
    fn from(s: String) -> Self {
        if s == "rename" {
            Method::Rename
        } else {
            Method::Copy
        }
    }
}

impl From<Method> for String {
    fn from(m: Method) -> Self {
        match m {
            Method::Copy => "copy".to_string(),
            Method::Rename => "rename".to_string(),
        }
    }
}

/// The eight optional predicates of a rule. Empty strings count as unset.
///
/// `*_path_pattern` fields test the file's full path, `*_file_pattern`
/// fields its base name. Plain fields are globs, `regex_*` fields are
/// regular expressions, `neg_*` fields must *not* match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePatterns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neg_path_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neg_file_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_path_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_file_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neg_regex_path_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neg_regex_file_pattern: Option<String>,
}

impl RulePatterns {
    /// Number of predicates that are set.
    pub fn active_count(&self) -> usize {
        [
            &self.path_pattern,
            &self.file_pattern,
            &self.neg_path_pattern,
            &self.neg_file_pattern,
            &self.regex_path_pattern,
            &self.regex_file_pattern,
            &self.neg_regex_path_pattern,
            &self.neg_regex_file_pattern,
        ]
        .into_iter()
        .filter(|p| active(p).is_some())
        .count()
    }
}

/// A predicate/action pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    #[serde(default)]
    pub method: Method,
    /// Destination directory; a relative path is taken relative to the sync root.
    pub dest: PathBuf,
    #[serde(flatten)]
    pub patterns: RulePatterns,
}

impl ClassificationRule {
    /// A rule with no predicate set is inactive and never matches.
    pub fn is_active(&self) -> bool {
        self.patterns.active_count() > 0
    }
}

pub(crate) fn active(pattern: &Option<String>) -> Option<&str> {
    pattern.as_deref().filter(|p| !p.is_empty())
}
