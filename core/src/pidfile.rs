//! PID file bookkeeping for supervisor-spawned worker processes.
//!
//! One file per worker under a working directory (default `tmp/pids/`),
//! written at spawn and removed on clean stop, per spec.md §6.

use std::fs;
use std::path::{Path, PathBuf};

/// Default directory workers' PID files are written under.
pub const DEFAULT_PID_DIR: &str = "tmp/pids";

/// A worker's on-disk PID file handle. Dropping it does **not** remove the
/// file — callers remove it explicitly on clean shutdown, per spec.md §4.E
/// ("On forced termination, any PID files are removed.").
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Writes `pid` to `<dir>/<name>.pid`, creating `dir` if needed.
    pub fn write(dir: impl AsRef<Path>, name: &str, pid: u32) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{name}.pid"));
        fs::write(&path, pid.to_string())?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back the PID this file holds, if it still exists.
    pub fn read(&self) -> std::io::Result<u32> {
        let content = fs::read_to_string(&self.path)?;
        content
            .trim()
            .parse()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "malformed pid file"))
    }

    /// Removes the PID file. Missing-file is not an error: shutdown may run
    /// this twice (clean stop followed by a forced-termination fallback).
    pub fn remove(&self) -> std::io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_reads_and_removes() {
        let dir = std::env::temp_dir().join(format!("pipeline-pidfile-test-{}", std::process::id()));
        let pid_file = PidFile::write(&dir, "se", 1234).unwrap();
        assert_eq!(pid_file.read().unwrap(), 1234);
        pid_file.remove().unwrap();
        assert!(pid_file.read().is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = std::env::temp_dir().join(format!("pipeline-pidfile-test2-{}", std::process::id()));
        let pid_file = PidFile::write(&dir, "oeg", 1).unwrap();
        pid_file.remove().unwrap();
        pid_file.remove().unwrap();
        let _ = fs::remove_dir_all(&dir);
    }
}
