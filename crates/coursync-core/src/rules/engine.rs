//! Single pass over the sync root applying each course's rules.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::matcher::rule_matches;
use super::rule::{ClassificationRule, Method};
use crate::config::CourseTarget;
use crate::error::RuleError;

/// Counters for one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyReport {
    /// Regular files found under a configured course directory.
    pub files_seen: usize,
    pub copied: usize,
    pub moved: usize,
}

/// Walks `root` depth-first and applies the rules of the course owning each
/// file (the first path component below `root`).
///
/// The file list is taken before any action runs, so files written by this
/// pass are not classified again in the same pass. Rules of a course are
/// applied in configured order and every matching rule acts; a later rule sees
/// the placeholder left by an earlier `rename`. Any pattern or filesystem
/// error stops the pass.
pub fn classify_and_act(root: &Path, courses: &[CourseTarget]) -> Result<ClassifyReport, RuleError> {
    let mut report = ClassifyReport::default();

    for file in collect_files(root)? {
        let Some(course) = owning_course(root, &file, courses) else {
            continue;
        };
        report.files_seen += 1;

        for rule in &course.rules {
            if !rule_matches(rule, &file)? {
                continue;
            }
            match apply(root, rule, &file)? {
                Some(Method::Copy) => report.copied += 1,
                Some(Method::Rename) => report.moved += 1,
                None => {}
            }
        }
    }

    tracing::info!(
        files = report.files_seen,
        copied = report.copied,
        moved = report.moved,
        "classification finished"
    );
    Ok(report)
}

/// Regular files under `root` in lexical depth-first order.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>, RuleError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| RuleError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Course whose name equals the first directory below `root`. Files placed
/// directly in `root` belong to no course.
fn owning_course<'a>(root: &Path, file: &Path, courses: &'a [CourseTarget]) -> Option<&'a CourseTarget> {
    let rel = file.strip_prefix(root).ok()?;
    let mut components = rel.components();
    let first = match components.next()? {
        Component::Normal(name) => name,
        _ => return None,
    };
    components.next()?;
    courses.iter().find(|c| first == c.course.as_str())
}

/// Performs the rule's action on `file`. Returns the action taken, or `None`
/// when the destination is the file itself.
fn apply(root: &Path, rule: &ClassificationRule, file: &Path) -> Result<Option<Method>, RuleError> {
    let Some(name) = file.file_name() else {
        return Ok(None);
    };
    let dest_dir = if rule.dest.is_absolute() {
        rule.dest.clone()
    } else {
        root.join(&rule.dest)
    };
    fs::create_dir_all(&dest_dir).map_err(|e| io_err(&dest_dir, e))?;

    // Compared on resolved paths: a relative root, `..` or a symlink must not
    // hide that source and target are one file.
    let canonical_dir = fs::canonicalize(&dest_dir).map_err(|e| io_err(&dest_dir, e))?;
    let canonical_file = fs::canonicalize(file).map_err(|e| io_err(file, e))?;
    if canonical_dir.join(name) == canonical_file {
        tracing::debug!("{} already in place", file.display());
        return Ok(None);
    }
    let target = dest_dir.join(name);

    match rule.method {
        Method::Copy => {
            fs::copy(file, &target).map_err(|e| io_err(&target, e))?;
            tracing::info!("copied {} -> {}", file.display(), target.display());
        }
        Method::Rename => {
            move_file(file, &target)?;
            // Zero-length marker: "downloaded before and already filed away".
            fs::File::create(file).map_err(|e| io_err(file, e))?;
            tracing::info!("moved {} -> {}", file.display(), target.display());
        }
    }
    Ok(Some(rule.method))
}

fn move_file(from: &Path, to: &Path) -> Result<(), RuleError> {
    if let Err(rename_err) = fs::rename(from, to) {
        // Across filesystems rename fails; copy then remove instead.
        tracing::debug!("rename {} failed ({}), copying", from.display(), rename_err);
        fs::copy(from, to).map_err(|e| io_err(to, e))?;
        fs::remove_file(from).map_err(|e| io_err(from, e))?;
    }
    Ok(())
}

fn io_err(path: &Path, source: io::Error) -> RuleError {
    RuleError::Io {
        path: path.to_path_buf(),
        source,
    }
}
