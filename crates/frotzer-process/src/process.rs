//! Interpreter process handle.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use frotzer_core::{Error, Result};

use crate::stream::OutputStream;

/// Handle to a spawned interpreter process.
///
/// The handle owns the process and all three of its standard streams. The
/// process is killed if the handle is dropped while it is still running.
#[derive(Debug)]
pub struct ProcessHandle {
    /// Program that was spawned
    program: String,
    /// The child process
    child: Child,
    /// Standard input (None once closed)
    stdin: Option<ChildStdin>,
    /// Standard output
    output: OutputStream,
    /// Task forwarding stderr lines to the log
    stderr_task: JoinHandle<()>,
}

impl ProcessHandle {
    /// Spawn `program` with `args` and piped standard streams.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(program: &Path, args: &[String]) -> Result<Self> {
        let program_name = program.display().to_string();
        info!("Spawning process: program='{}' args={:?}", program_name, args);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                error!("Failed to spawn '{}': {}", program_name, source);
                Error::SpawnFailed {
                    program: program_name.clone(),
                    source,
                }
            })?;

        let stdin = child.stdin.take().ok_or_else(|| not_captured("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| not_captured("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| not_captured("stderr"))?;

        info!(
            "Process spawned: program='{}' pid={:?}",
            program_name,
            child.id()
        );

        Ok(Self {
            program: program_name,
            child,
            stdin: Some(stdin),
            output: OutputStream::spawn(stdout),
            stderr_task: tokio::spawn(forward_stderr(stderr)),
        })
    }

    /// Get the spawned program.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the OS process id, if the process has not been reaped yet.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Get the output stream.
    pub fn output(&mut self) -> &mut OutputStream {
        &mut self.output
    }

    /// Write raw bytes to the process's stdin.
    ///
    /// A closed pipe is reported as [`Error::ProcessTerminated`].
    pub async fn write(&mut self, data: &[u8]) -> Result<usize> {
        debug!("Writing to process: {} bytes", data.len());

        let stdin = self.stdin.as_mut().ok_or(Error::ProcessTerminated)?;
        let written = match stdin.write_all(data).await {
            Ok(()) => stdin.flush().await,
            Err(e) => Err(e),
        };

        match written {
            Ok(()) => Ok(data.len()),
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                warn!("Process stdin is closed: {}", e);
                Err(Error::ProcessTerminated)
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Write one line (the text plus `\n`) to the process's stdin.
    pub async fn write_line(&mut self, line: &str) -> Result<usize> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.write(&data).await
    }

    /// Check whether the process has exited, without waiting.
    pub fn try_exited(&mut self) -> Result<Option<ExitStatus>> {
        Ok(self.child.try_wait()?)
    }

    /// Terminate the process and wait for it to exit.
    ///
    /// Sends SIGTERM (a hard kill on other platforms). If the process is
    /// still alive after `timeout`, it is killed.
    pub async fn terminate(mut self, timeout: Duration) -> Result<ExitStatus> {
        info!("Terminating process: program='{}' pid={:?}", self.program, self.pid());

        self.stdin.take();
        send_terminate(&mut self.child)?;
        self.reap(timeout).await
    }

    /// Close stdin and wait for the process to exit on its own.
    ///
    /// Falls back to [`ProcessHandle::terminate`] after `timeout`.
    pub async fn close(mut self, timeout: Duration) -> Result<ExitStatus> {
        debug!("Closing process: program='{}'", self.program);

        self.stdin.take();
        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                info!("Process exited: program='{}' status={}", self.program, status);
                Ok(status)
            }
            Err(_) => {
                warn!(
                    "Process '{}' did not exit within {}ms, terminating",
                    self.program,
                    timeout.as_millis()
                );
                self.terminate(timeout).await
            }
        }
    }

    async fn reap(&mut self, timeout: Duration) -> Result<ExitStatus> {
        let status = match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!(
                    "Process '{}' ignored termination for {}ms, killing",
                    self.program,
                    timeout.as_millis()
                );
                self.child.kill().await?;
                self.child.wait().await?
            }
        };

        self.stderr_task.abort();
        info!("Process exited: program='{}' status={}", self.program, status);
        Ok(status)
    }
}

/// Send a termination request (Unix implementation using SIGTERM).
#[cfg(unix)]
fn send_terminate(child: &mut Child) -> Result<()> {
    let Some(pid) = child.id() else {
        // Already reaped
        return Ok(());
    };

    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if rc == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            error!("Failed to signal pid {}: {}", pid, err);
            return Err(Error::Io(err));
        }
    }
    Ok(())
}

/// Send a termination request (non-Unix implementation, hard kill).
#[cfg(not(unix))]
fn send_terminate(child: &mut Child) -> Result<()> {
    match child.start_kill() {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()), // Already exited
        Err(e) => Err(Error::Io(e)),
    }
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if !line.trim().is_empty() {
            warn!("Process stderr: {}", line);
        }
    }
}

fn not_captured(stream: &str) -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("Failed to capture {stream}"),
    ))
}
