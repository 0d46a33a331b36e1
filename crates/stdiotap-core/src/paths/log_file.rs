use std::env;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::error::PathError;

/// File name prefix for every audit log.
pub const LOG_FILE_PREFIX: &str = "stdio-";

/// File name extension for every audit log.
pub const LOG_FILE_EXTENSION: &str = "log";

/// `strftime` pattern for the start-time stamp embedded in the file name.
const STAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Upper bound on `_N` suffixes tried for one start second.
const MAX_ATTEMPTS: u32 = 1000;

/// Directory containing the running executable.
pub fn default_log_dir() -> Result<PathBuf, PathError> {
    let exe = env::current_exe().map_err(|e| PathError::NoExecutableDir(e.to_string()))?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        PathError::NoExecutableDir(format!("{} has no parent directory", exe.display()))
    })
}

/// Pick the log directory: the override if given (created when missing),
/// otherwise the executable's directory.
pub fn resolve_log_dir(override_dir: Option<&Path>) -> Result<PathBuf, PathError> {
    let Some(dir) = override_dir else {
        return default_log_dir();
    };

    if dir.as_os_str().is_empty() {
        return Err(PathError::EmptyPath);
    }

    if dir.exists() {
        if !dir.is_dir() {
            return Err(PathError::NotADirectory(dir.to_path_buf()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PathError::CreateFailed {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(dir = %dir.display(), "Created log directory");
    }

    Ok(dir.to_path_buf())
}

/// File name for a session started at `started_at`.
///
/// `attempt` 0 gives the plain name; later attempts add a `_N` suffix.
#[must_use]
pub fn log_file_name(started_at: DateTime<Utc>, attempt: u32) -> String {
    let stamp = started_at.format(STAMP_FORMAT);
    if attempt == 0 {
        format!("{LOG_FILE_PREFIX}{stamp}.{LOG_FILE_EXTENSION}")
    } else {
        format!("{LOG_FILE_PREFIX}{stamp}_{attempt}.{LOG_FILE_EXTENSION}")
    }
}

/// Claim a fresh log file in `dir` for a session started at `started_at`.
///
/// The file is created empty with `create_new`, so two wrappers started in
/// the same second never share (or overwrite) a log: the second one gets a
/// `_1` suffix, and so on.
pub fn log_file_path(dir: &Path, started_at: DateTime<Utc>) -> Result<PathBuf, PathError> {
    for attempt in 0..MAX_ATTEMPTS {
        let path = dir.join(log_file_name(started_at, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(PathError::CreateFailed {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    Err(PathError::CreateFailed {
        path: dir.join(log_file_name(started_at, MAX_ATTEMPTS)),
        reason: format!("{MAX_ATTEMPTS} log files already exist for this second"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn started() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 14, 3).unwrap()
    }

    #[test]
    fn test_log_file_name_embeds_utc_start_time() {
        assert_eq!(log_file_name(started(), 0), "stdio-2026-10-16_091403.log");
        assert_eq!(log_file_name(started(), 2), "stdio-2026-10-16_091403_2.log");
    }

    #[test]
    fn test_log_file_path_never_reuses_a_name() {
        let temp_dir = TempDir::new().unwrap();

        let first = log_file_path(temp_dir.path(), started()).unwrap();
        let second = log_file_path(temp_dir.path(), started()).unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "stdio-2026-10-16_091403_1.log"
        );
    }

    #[test]
    fn test_log_file_path_leaves_existing_content_alone() {
        let temp_dir = TempDir::new().unwrap();
        let taken = temp_dir.path().join(log_file_name(started(), 0));
        fs::write(&taken, "previous session\n").unwrap();

        let path = log_file_path(temp_dir.path(), started()).unwrap();

        assert_ne!(path, taken);
        assert_eq!(fs::read_to_string(&taken).unwrap(), "previous session\n");
    }

    #[test]
    fn test_resolve_log_dir_creates_missing_override() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        let dir = resolve_log_dir(Some(&nested)).unwrap();

        assert_eq!(dir, nested);
        assert!(nested.is_dir());
    }

    #[test]
    fn test_resolve_log_dir_rejects_files_and_empty_paths() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not-a-dir");
        fs::write(&file, "").unwrap();

        assert!(matches!(
            resolve_log_dir(Some(&file)),
            Err(PathError::NotADirectory(_))
        ));
        assert!(matches!(
            resolve_log_dir(Some(Path::new(""))),
            Err(PathError::EmptyPath)
        ));
    }

    #[test]
    fn test_default_log_dir_is_the_executable_directory() {
        let dir = resolve_log_dir(None).unwrap();
        let exe = env::current_exe().unwrap();
        assert_eq!(Some(dir.as_path()), exe.parent());
    }
}
