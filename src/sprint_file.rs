//! Sprint CSV files on disk: `sprint_<start>_to_<end>.csv`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use log::{debug, info};
use regex::Regex;

use crate::error::{BurndownError, Result};
use crate::types::SprintWindow;

static SPRINT_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sprint_(\d{4}-\d{2}-\d{2})_to_(\d{4}-\d{2}-\d{2})\.csv$")
        .expect("sprint file name pattern is valid")
});

pub fn is_sprint_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SPRINT_FILE_NAME.is_match(name))
}

/// Sprint window encoded in a file name.
pub fn window_from_file_name(path: &Path) -> Result<SprintWindow> {
    let not_a_sprint_file = || BurndownError::SprintFileName(path.to_path_buf());

    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(not_a_sprint_file)?;
    let captures = SPRINT_FILE_NAME.captures(name).ok_or_else(not_a_sprint_file)?;

    let parse = |index: usize| {
        NaiveDate::parse_from_str(&captures[index], "%Y-%m-%d").map_err(|_| not_a_sprint_file())
    };

    SprintWindow::new(parse(1)?, parse(2)?)
}

/// Sprint files directly inside `dir`, sorted by name. A missing directory has none.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        debug!("Data directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_sprint_file(&path) {
            files.push(path);
        }
    }
    files.sort();

    debug!("Found {} sprint file(s) in {}", files.len(), dir.display());
    Ok(files)
}

/// Move a processed file into `backup_dir` without overwriting earlier backups.
pub fn move_to_backup(path: &Path, backup_dir: &Path) -> Result<PathBuf> {
    let move_error = |source: std::io::Error| BurndownError::BackupMove {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(backup_dir).map_err(move_error)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| move_error(std::io::ErrorKind::InvalidInput.into()))?;
    let target = free_target(&backup_dir.join(file_name));

    if std::fs::rename(path, &target).is_err() {
        // rename fails across filesystems
        std::fs::copy(path, &target).map_err(move_error)?;
        std::fs::remove_file(path).map_err(move_error)?;
    }

    info!("Moved {} to {}", path.display(), target.display());
    Ok(target)
}

fn free_target(target: &Path) -> PathBuf {
    if !target.exists() {
        return target.to_path_buf();
    }

    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| target.with_file_name(format!("{stem}-{n}{extension}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| target.to_path_buf())
}
