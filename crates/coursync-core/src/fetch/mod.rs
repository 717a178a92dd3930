//! Course archive download through an authenticated session.
//!
//! The course server either answers the archive URL with the ZIP itself or
//! with a confirmation page whose form has to be POSTed back (without its
//! `cancel` button) to get the archive.

mod archive;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::config::CourseTarget;
use crate::error::FetchError;
use crate::html::{extract_form, FormScope};
use crate::http::{headers, resolve_url, Redirects, Request, Response, Session};

/// Confirmation-form input that must not be submitted.
const CANCEL_FIELD: &str = "cancel";

/// What one course download produced.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub course: String,
    /// Files written (new or overwritten).
    pub written: usize,
    /// Files that did not exist before this download.
    pub new_files: Vec<PathBuf>,
}

/// Result of one course's task.
#[derive(Debug)]
pub struct FetchOutcome {
    pub course: String,
    pub result: Result<FetchReport, FetchError>,
}

/// Downloads one course archive and unpacks it into `root/<course>`.
///
/// Redirects are not followed: the course server answers an expired session
/// with a redirect to its login page, which is reported as an error rather
/// than unpacked.
pub fn fetch_course(session: &Session, course: &CourseTarget, root: &Path) -> Result<FetchReport, FetchError> {
    let resp = session.send(
        &Request::get(&course.url)
            .headers(headers::base())
            .redirects(Redirects::Manual),
    )?;
    let resp = expect_success(resp, &course.url)?;

    let body = if archive::is_zip(&resp.body) {
        resp.body
    } else {
        confirm_download(session, course, &resp)?
    };

    let dest = root.join(&course.course);
    let unpacked = archive::unpack(&body, &dest)?;
    tracing::info!(
        course = %course.course,
        written = unpacked.written,
        new = unpacked.new_files.len(),
        "archive unpacked"
    );
    Ok(FetchReport {
        course: course.course.clone(),
        written: unpacked.written,
        new_files: unpacked.new_files,
    })
}

/// Resubmits the confirmation form of `page` and returns the archive bytes.
fn confirm_download(session: &Session, course: &CourseTarget, page: &Response) -> Result<Vec<u8>, FetchError> {
    let form = extract_form(&page.text(), FormScope::WholeForm).without(CANCEL_FIELD);
    if form.is_empty() {
        return Err(FetchError::MissingConfirmForm);
    }
    let action = resolve_url(&page.effective_url, &form.action).map_err(|source| FetchError::InvalidUrl {
        url: form.action.clone(),
        source,
    })?;
    tracing::debug!(course = %course.course, "confirming download at {}", action);

    let resp = session.send(
        &Request::post(&action)
            .header("Referer", &course.url)
            .header("Content-Type", headers::FORM_URLENCODED)
            .header("Accept", headers::ACCEPT_DOWNLOAD)
            .body(form.encode())
            .redirects(Redirects::Manual),
    )?;
    Ok(expect_success(resp, &action)?.body)
}

fn expect_success(resp: Response, url: &str) -> Result<Response, FetchError> {
    if resp.is_success() {
        Ok(resp)
    } else {
        Err(FetchError::UnexpectedStatus {
            url: url.to_string(),
            status: resp.status,
        })
    }
}

/// Starts one blocking download task per course. Outcomes come out of the
/// returned set in completion order; a failing course is logged and reported
/// in its outcome and never affects the others.
pub fn spawn_fetches(session: Arc<Session>, courses: &[CourseTarget], root: &Path) -> JoinSet<FetchOutcome> {
    let mut join_set = JoinSet::new();
    for course in courses {
        let session = Arc::clone(&session);
        let course = course.clone();
        let root = root.to_path_buf();
        join_set.spawn_blocking(move || {
            let result = fetch_course(&session, &course, &root);
            if let Err(e) = &result {
                tracing::warn!(course = %course.course, "fetch failed: {}", e);
            }
            FetchOutcome {
                course: course.course,
                result,
            }
        });
    }
    join_set
}
