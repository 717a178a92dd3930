//! `coursync sync` – log in, download every course, then file by rules.

use anyhow::Result;
use coursync_core::config::SyncConfig;
use coursync_core::sync::{self, SyncEvent};

pub async fn run_sync(cfg: &SyncConfig, skip_fetch: bool) -> Result<()> {
    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<SyncEvent>(16);
    let progress_handle = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            match &event {
                SyncEvent::CourseFailed { .. } => eprintln!("{}", describe(&event)),
                _ => println!("{}", describe(&event)),
            }
        }
    });

    let result = sync::run_sync(cfg, skip_fetch, Some(&progress_tx)).await;
    drop(progress_tx);
    let _ = progress_handle.await;
    let summary = result?;

    let failed: Vec<&str> = summary.failed_courses().collect();
    if !failed.is_empty() {
        tracing::warn!("{} course(s) failed to download", failed.len());
        println!("Failed: {}", failed.join(", "));
    }
    Ok(())
}

/// One line of console output per event.
pub(crate) fn describe(event: &SyncEvent) -> String {
    match event {
        SyncEvent::Authenticating => "Authenticating".to_string(),
        SyncEvent::Authenticated => "Authenticated".to_string(),
        SyncEvent::RequestingArchives { courses } => format!("Requesting ZIPs ({courses} courses)"),
        SyncEvent::CourseFetched {
            course,
            new_files,
            written,
        } => {
            let mut out = format!("{course}: {written} file(s)");
            for path in new_files {
                out.push_str(&format!("\nNew: {}", path.display()));
            }
            out
        }
        SyncEvent::CourseFailed { course, error } => format!("{course}: download failed: {error}"),
        SyncEvent::ProcessingRules => "Processing Rules".to_string(),
        SyncEvent::Done(report) => format!(
            "Done ({} files seen, {} copied, {} moved)",
            report.files_seen, report.copied, report.moved
        ),
    }
}
