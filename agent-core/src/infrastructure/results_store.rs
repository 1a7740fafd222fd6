// agent-core/src/infrastructure/results_store.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write `content` to `path` via a temp file in the same directory, then
/// rename over the target. A reader can never observe a partially written
/// `pid` file.
fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, content: C) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;
    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// The on-disk contract for one non-blocking transaction's results
/// directory: `stdout`, `stderr`, `exitcode` written by the child, `pid`
/// written by the parent before the child exits.
pub struct ResultsDir {
    root: PathBuf,
}

impl ResultsDir {
    /// Create the directory (and any missing parents) before the child is
    /// spawned. Never mutated by the agent after child exit.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, InfrastructureError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn stdout_path(&self) -> PathBuf {
        self.root.join("stdout")
    }

    pub fn stderr_path(&self) -> PathBuf {
        self.root.join("stderr")
    }

    pub fn exitcode_path(&self) -> PathBuf {
        self.root.join("exitcode")
    }

    pub fn pid_path(&self) -> PathBuf {
        self.root.join("pid")
    }

    /// Atomically write the child's pid, trailing newline.
    pub fn write_pid(&self, pid: u32) -> Result<(), InfrastructureError> {
        atomic_write(self.pid_path(), format!("{pid}\n"))
    }

    /// Read back `stdout` after child exit. Required to exist; absence is
    /// a hard error for the caller to turn into a `ProcessingError`.
    pub fn read_stdout(&self) -> std::io::Result<String> {
        std::fs::read_to_string(self.stdout_path())
    }

    /// Read back `stderr` after child exit. Missing file is non-fatal —
    /// the caller should treat it as empty.
    pub fn read_stderr(&self) -> String {
        match std::fs::read_to_string(self.stderr_path()) {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "no stderr file for non-blocking job, treating as empty");
                String::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_pid_is_readable_with_trailing_newline() {
        let dir = tempdir().unwrap();
        let results = ResultsDir::create(dir.path().join("t1")).unwrap();
        results.write_pid(4242).unwrap();

        let content = std::fs::read_to_string(results.pid_path()).unwrap();
        assert_eq!(content, "4242\n");
    }

    #[test]
    fn write_pid_overwrites_a_previous_pid() {
        let dir = tempdir().unwrap();
        let results = ResultsDir::create(dir.path().join("t4")).unwrap();

        results.write_pid(111).unwrap();
        results.write_pid(222).unwrap();

        let content = std::fs::read_to_string(results.pid_path()).unwrap();
        assert_eq!(content, "222\n");
    }

    #[test]
    fn atomic_write_never_leaves_a_temp_file_behind_in_the_results_dir() {
        let dir = tempdir().unwrap();
        let results = ResultsDir::create(dir.path().join("t5")).unwrap();
        atomic_write(results.exitcode_path(), "3\n").unwrap();

        let entries: Vec<_> = std::fs::read_dir(results.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("exitcode")]);
    }

    #[test]
    fn missing_stderr_is_treated_as_empty() {
        let dir = tempdir().unwrap();
        let results = ResultsDir::create(dir.path().join("t2")).unwrap();
        assert_eq!(results.read_stderr(), "");
    }

    #[test]
    fn missing_stdout_is_a_hard_error() {
        let dir = tempdir().unwrap();
        let results = ResultsDir::create(dir.path().join("t3")).unwrap();
        assert!(results.read_stdout().is_err());
    }
}
