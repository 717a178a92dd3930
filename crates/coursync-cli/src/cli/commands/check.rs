//! `coursync check` – validate the configuration and print what it covers.

use anyhow::Result;
use coursync_core::config::SyncConfig;
use coursync_core::logging;

pub fn run_check(cfg: &SyncConfig) -> Result<()> {
    cfg.validate(true)?;
    println!("root:     {}", cfg.root_path().display());
    println!("user:     {}", cfg.username);
    println!("entry:    {}", cfg.sso.entry_url);
    if let Ok(path) = logging::log_path() {
        println!("log:      {}", path.display());
    }
    println!("{:<6} {:<6} {}", "ID", "RULES", "COURSE");
    for c in &cfg.courses {
        println!("{:<6} {:<6} {}", c.course_id, c.rules.len(), c.course);
    }
    Ok(())
}
