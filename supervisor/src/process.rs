//! Spawns and tears down the two child-process workers (SE, OEG) spec.md
//! §2 and §5 describe: no shared memory, inter-process communication is
//! the only coordination mechanism between a worker and Main.

use pipeline_core::PidFile;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{info, warn};

/// A spawned worker failed to reach READY, or did not stop within its grace
/// window.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn {name}: {source}")]
    Spawn { name: String, source: std::io::Error },
    #[error("{name} did not emit READY within {timeout_ms}ms")]
    ReadyTimeout { name: String, timeout_ms: u64 },
    #[error("{name} exited before emitting READY")]
    ExitedBeforeReady { name: String },
    #[error("io error waiting on {name}: {source}")]
    Io { name: String, source: std::io::Error },
}

/// A running worker process: SE (Worker-1) or OEG (Worker-2).
///
/// Holds the [`Child`] handle and the [`PidFile`] written at spawn, removed
/// on [`WorkerProcess::stop`].
#[derive(Debug)]
pub struct WorkerProcess {
    name: String,
    child: Child,
    pid_file: PidFile,
}

impl WorkerProcess {
    /// Spawns `binary_path` with `env`, redirecting its stdout through a
    /// pipe, and blocks until it emits a `READY` line or `ready_timeout`
    /// elapses — the "out-of-band control channel" heartbeat spec.md §4.E
    /// calls for, implemented as the simplest channel available to a freshly
    /// spawned child: its own stdout.
    pub async fn spawn(
        name: &str,
        binary_path: &str,
        env: &HashMap<String, String>,
        pid_dir: &str,
        ready_timeout: Duration,
    ) -> Result<Self, ProcessError> {
        let mut command = Command::new(binary_path);
        command
            .envs(env)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            name: name.to_string(),
            source,
        })?;

        let stdout = child.stdout.take().expect("stdout was piped");
        let mut lines = BufReader::new(stdout).lines();

        let wait_for_ready = async {
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim() == "READY" => return Ok(()),
                    Ok(Some(_)) => continue,
                    Ok(None) => return Err(ProcessError::ExitedBeforeReady { name: name.to_string() }),
                    Err(source) => {
                        return Err(ProcessError::Io {
                            name: name.to_string(),
                            source,
                        })
                    }
                }
            }
        };

        match timeout(ready_timeout, wait_for_ready).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = child.start_kill();
                return Err(e);
            }
            Err(_) => {
                let _ = child.start_kill();
                return Err(ProcessError::ReadyTimeout {
                    name: name.to_string(),
                    timeout_ms: ready_timeout.as_millis() as u64,
                });
            }
        }

        let pid = child.id().unwrap_or(0);
        let pid_file = PidFile::write(pid_dir, name, pid).map_err(|source| ProcessError::Io {
            name: name.to_string(),
            source,
        })?;

        info!(event = "component.status_changed", component = %name, status = "RUNNING", pid, "worker ready");
        Ok(Self {
            name: name.to_string(),
            child,
            pid_file,
        })
    }

    /// Sends a polite termination request, waits up to `grace` for the
    /// child to exit on its own, then force-kills it if it hasn't. The PID
    /// file is removed either way (spec.md §4.E: "On forced termination,
    /// any PID files are removed").
    pub async fn stop(mut self, grace: Duration) -> Result<(), ProcessError> {
        request_polite_termination(&self.child);

        let outcome = timeout(grace, self.child.wait()).await;
        match outcome {
            Ok(Ok(status)) => {
                info!(event = "component.status_changed", component = %self.name, status = "STOPPED", exit = ?status, "worker stopped cleanly");
            }
            Ok(Err(source)) => {
                warn!(event = "lifecycle.wait_failed", component = %self.name, error = %source, "error waiting on worker exit");
            }
            Err(_) => {
                warn!(event = "lifecycle.grace_exceeded", component = %self.name, "worker did not exit within its grace window, killing");
                let _ = self.child.start_kill();
                let _ = self.child.wait().await;
            }
        }

        self.pid_file.remove().map_err(|source| ProcessError::Io {
            name: self.name.clone(),
            source,
        })
    }
}

/// Requests a polite SIGTERM via the `kill` binary rather than linking
/// against raw libc bindings for one syscall: this crate has no other use
/// for unsafe FFI, and shelling out keeps `#![forbid(unsafe_code)]`
/// meaningful across the whole workspace.
#[cfg(unix)]
fn request_polite_termination(child: &Child) {
    if let Some(pid) = child.id() {
        let _ = std::process::Command::new("kill")
            .args(["-TERM", &pid.to_string()])
            .status();
    }
}

#[cfg(not(unix))]
fn request_polite_termination(_child: &Child) {
    // No portable polite-termination signal off unix; the grace-window
    // timeout below falls through to a hard kill.
}
