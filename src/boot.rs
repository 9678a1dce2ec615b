use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use crate::config::{AppConfig, StorageStrategy, StoreBackend, DEFAULT_CONFIG_PATH};

/// Create `dir` if missing, then prove it is writable.
/// Returns the problem, if any, as a log-ready message.
fn ensure_writable_dir(dir: &Path) -> Result<(), String> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| format!("FAILED to create directory {}: {}", dir.display(), e))?;
        info!("  Created directory: {}", dir.display());
    }
    let test_file = dir.join(".write_test");
    fs::write(&test_file, "test").map_err(|e| format!("{} not writable: {}", dir.display(), e))?;
    let _ = fs::remove_file(&test_file);
    Ok(())
}

/// Count of problems found by `check`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BootReport {
    pub warnings: u32,
    pub errors: u32,
}

/// Run every check without exiting.
pub fn check(config: &AppConfig) -> BootReport {
    let mut report = BootReport::default();

    // ── 1. Uploads directory ───────────────────────────
    let uploads = Path::new(&config.uploads.dir);
    match (config.uploads.strategy, ensure_writable_dir(uploads)) {
        (_, Ok(())) => {}
        (StorageStrategy::Disk, Err(e)) => {
            error!("  Uploads directory unusable: {}", e);
            report.errors += 1;
        }
        (StorageStrategy::Inline, Err(e)) => {
            warn!("  Uploads directory unusable: {} (inline uploads unaffected)", e);
            report.warnings += 1;
        }
    }

    // ── 2. SQLite directory ────────────────────────────
    if config.store.backend == StoreBackend::Sqlite {
        if let Some(parent) = Path::new(&config.store.sqlite_path).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = ensure_writable_dir(parent) {
                    error!("  Database directory unusable: {}", e);
                    report.errors += 1;
                }
            }
        }
    }

    // ── 3. Config file ─────────────────────────────────
    let config_path =
        std::env::var("HOMEPAGE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&config_path).exists() {
        warn!("  {} not found, using default config", config_path);
        report.warnings += 1;
    }

    report
}

/// Run all boot checks. Call this before Rocket launches.
/// Aborts the process if any check failed.
pub fn run(config: &AppConfig) {
    info!("Homepage boot check starting...");

    let report = check(config);

    if report.errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            report.errors, report.warnings
        );
        process::exit(1);
    }

    if report.warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s).",
            report.warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.uploads.dir = dir.path().join("uploads").to_string_lossy().to_string();
        config.store.sqlite_path = dir
            .path()
            .join("db/homepage.db")
            .to_string_lossy()
            .to_string();

        let report = check(&config);
        assert_eq!(report.errors, 0);
        assert!(dir.path().join("uploads").is_dir());
        assert!(dir.path().join("db").is_dir());
        assert!(!dir.path().join("uploads/.write_test").exists());
    }

    #[test]
    fn uploads_path_that_is_a_file_fails_for_disk() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("uploads");
        fs::write(&blocker, b"not a dir").unwrap();

        let mut config = AppConfig::default();
        config.uploads.dir = blocker.to_string_lossy().to_string();
        config.store.sqlite_path = dir.path().join("h.db").to_string_lossy().to_string();
        assert_eq!(check(&config).errors, 1);

        config.uploads.strategy = StorageStrategy::Inline;
        assert_eq!(check(&config).errors, 0);
    }
}
