//! Predicate evaluation for a single rule against a single file.

use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::path::Path;

use super::rule::{active, ClassificationRule};
use crate::error::RuleError;

/// Shell-style matching: case-sensitive, wildcards never cross `/`.
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Evaluates the conjunction of the rule's predicates for `path`.
///
/// Patterns are compiled on every call, and every set pattern is compiled
/// even once the outcome is known, so a malformed pattern is reported the
/// first time the rule is consulted. A rule with no predicate never matches.
pub fn rule_matches(rule: &ClassificationRule, path: &Path) -> Result<bool, RuleError> {
    let p = &rule.patterns;
    let full = path.to_string_lossy();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    let mut is_match = true;
    if let Some(re) = active(&p.regex_path_pattern) {
        is_match &= regex_match(re, &full)?;
    }
    if let Some(re) = active(&p.regex_file_pattern) {
        is_match &= regex_match(re, &name)?;
    }
    if let Some(re) = active(&p.neg_regex_path_pattern) {
        is_match &= !regex_match(re, &full)?;
    }
    if let Some(re) = active(&p.neg_regex_file_pattern) {
        is_match &= !regex_match(re, &name)?;
    }
    if let Some(g) = active(&p.path_pattern) {
        is_match &= glob_match(g, &full)?;
    }
    if let Some(g) = active(&p.file_pattern) {
        is_match &= glob_match(g, &name)?;
    }
    if let Some(g) = active(&p.neg_path_pattern) {
        is_match &= !glob_match(g, &full)?;
    }
    if let Some(g) = active(&p.neg_file_pattern) {
        is_match &= !glob_match(g, &name)?;
    }

    Ok(is_match && rule.is_active())
}

fn regex_match(pattern: &str, haystack: &str) -> Result<bool, RuleError> {
    let re = Regex::new(pattern).map_err(|source| RuleError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(re.is_match(haystack))
}

fn glob_match(pattern: &str, candidate: &str) -> Result<bool, RuleError> {
    let glob = Pattern::new(pattern).map_err(|source| RuleError::InvalidGlob {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(glob.matches_with(candidate, GLOB_OPTIONS))
}
