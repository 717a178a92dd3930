//! One synchronization run: authenticate, fetch every course concurrently,
//! then classify the merged tree.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

use crate::auth::{self, Credentials};
use crate::config::SyncConfig;
use crate::fetch::{self, FetchOutcome};
use crate::rules::{self, ClassifyReport};

/// Progress of a run, for display by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Authenticating,
    Authenticated,
    RequestingArchives { courses: usize },
    CourseFetched {
        course: String,
        new_files: Vec<PathBuf>,
        written: usize,
    },
    CourseFailed { course: String, error: String },
    ProcessingRules,
    Done(ClassifyReport),
}

/// Everything a run did.
#[derive(Debug)]
pub struct SyncSummary {
    /// Empty when fetching was skipped.
    pub fetched: Vec<FetchOutcome>,
    pub classified: ClassifyReport,
}

impl SyncSummary {
    pub fn failed_courses(&self) -> impl Iterator<Item = &str> {
        self.fetched
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.course.as_str())
    }
}

/// Runs one synchronization.
///
/// Configuration and handshake errors abort before anything is written;
/// a failed course download is reported and the run continues with the
/// classification pass over whatever is on disk. With `skip_fetch`, only
/// the classification pass runs and no credentials are needed.
pub async fn run_sync(
    cfg: &SyncConfig,
    skip_fetch: bool,
    progress: Option<&Sender<SyncEvent>>,
) -> Result<SyncSummary> {
    cfg.validate(!skip_fetch)?;
    let root = cfg.root_path();
    fs::create_dir_all(&root).with_context(|| format!("create root {}", root.display()))?;

    let mut fetched = Vec::new();
    if !skip_fetch {
        emit(progress, SyncEvent::Authenticating).await;
        let sso = cfg.sso.clone();
        let credentials = Credentials::new(cfg.username.clone(), cfg.password.clone());
        let session = tokio::task::spawn_blocking(move || auth::authenticate(&sso, &credentials))
            .await
            .context("authentication task")?
            .context("authentication failed")?;
        emit(progress, SyncEvent::Authenticated).await;

        emit(
            progress,
            SyncEvent::RequestingArchives {
                courses: cfg.courses.len(),
            },
        )
        .await;
        // Each course is reported as soon as its task finishes.
        let mut tasks = fetch::spawn_fetches(Arc::new(session), &cfg.courses, &root);
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("fetch task did not complete: {}", e);
                    continue;
                }
            };
            let event = match &outcome.result {
                Ok(report) => SyncEvent::CourseFetched {
                    course: report.course.clone(),
                    new_files: report.new_files.clone(),
                    written: report.written,
                },
                Err(e) => SyncEvent::CourseFailed {
                    course: outcome.course.clone(),
                    error: e.to_string(),
                },
            };
            emit(progress, event).await;
            fetched.push(outcome);
        }
    }

    emit(progress, SyncEvent::ProcessingRules).await;
    let courses = cfg.courses.clone();
    let walk_root = root.clone();
    let classified = tokio::task::spawn_blocking(move || rules::classify_and_act(&walk_root, &courses))
        .await
        .context("classification task")?
        .with_context(|| format!("processing rules under {}", root.display()))?;
    emit(progress, SyncEvent::Done(classified)).await;

    Ok(SyncSummary { fetched, classified })
}

async fn emit(progress: Option<&Sender<SyncEvent>>, event: SyncEvent) {
    if let Some(tx) = progress {
        let _ = tx.send(event).await;
    }
}
