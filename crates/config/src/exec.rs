//! `${exec command="..."}` evaluation.
//!
//! Commands run through the system shell with the privileges of the current user. Stdout and
//! stderr share one pipe. A reader thread drains it while the caller waits on a deadline; on
//! timeout the whole process group is killed and the reader is left to finish on its own.

use std::{
    io::{self, Read},
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{RecvTimeoutError, bounded};
use tracing::{debug, warn};

use crate::include::{ERROR, first_line};

/// Returned when a command exceeds its time limit.
pub const TIMEOUT: &str = "[timeout]";

/// Wall-clock limit for one command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Bytes of combined output kept from one command.
pub const MAX_OUTPUT_BYTES: usize = 1024;

/// Interval between exit checks once output has closed.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs placeholder commands with a timeout and an output cap.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// Wall-clock limit per command.
    timeout: Duration,
    /// Bytes of output retained.
    max_output: usize,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_output: MAX_OUTPUT_BYTES,
        }
    }
}

impl ShellRunner {
    /// Override the wall-clock limit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured wall-clock limit.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `command` and return the first line of its output, trimmed.
    ///
    /// Returns [`TIMEOUT`] if the command outlives the limit and [`ERROR`] if it cannot be
    /// started or its output is not UTF-8.
    pub fn run(&self, command: &str) -> String {
        let deadline = Instant::now() + self.timeout;
        let (reader, mut child) = match spawn(command) {
            Ok(spawned) => spawned,
            Err(e) => {
                warn!("exec placeholder failed to start: {}", e);
                return ERROR.to_string();
            }
        };

        let (tx, rx) = bounded(1);
        let cap = self.max_output;
        thread::spawn(move || {
            let _ignored = tx.send(drain(reader, cap));
        });

        let output = match rx.recv_deadline(deadline) {
            Ok(output) => output,
            Err(RecvTimeoutError::Timeout) => {
                debug!("exec placeholder timed out: {}", command);
                kill_group(&mut child);
                return TIMEOUT.to_string();
            }
            Err(RecvTimeoutError::Disconnected) => {
                kill_group(&mut child);
                return ERROR.to_string();
            }
        };

        // Output closing does not mean the shell exited.
        if !wait_until(&mut child, deadline) {
            debug!("exec placeholder closed output but kept running: {}", command);
            kill_group(&mut child);
            return TIMEOUT.to_string();
        }

        match output.and_then(decode) {
            Some(text) => first_line(&text),
            None => ERROR.to_string(),
        }
    }
}

/// Start `command` under the shell with stdout and stderr on one pipe.
fn spawn(command: &str) -> io::Result<(io::PipeReader, Child)> {
    let (reader, writer) = io::pipe()?;
    let writer_err = writer.try_clone()?;
    // Dropping `cmd` closes the parent's copies of the write end.
    let child = {
        let mut cmd = shell_command(command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(writer))
            .stderr(Stdio::from(writer_err));
        cmd.spawn()?
    };
    Ok((reader, child))
}

#[cfg(unix)]
/// `/bin/sh -c command` in its own process group.
fn shell_command(command: &str) -> Command {
    use std::os::unix::process::CommandExt;

    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(command).process_group(0);
    cmd
}

#[cfg(not(unix))]
/// `cmd /C command`.
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

/// Read until EOF, keeping the first `cap` bytes. `None` on a read error.
fn drain(mut reader: impl Read, cap: usize) -> Option<Vec<u8>> {
    let mut kept = Vec::with_capacity(cap);
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Some(kept),
            Ok(n) => {
                let room = cap.saturating_sub(kept.len());
                kept.extend_from_slice(&chunk[..n.min(room)]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(_) => return None,
        }
    }
}

/// Decode captured output, dropping a multi-byte character cut off by the cap.
fn decode(bytes: Vec<u8>) -> Option<String> {
    match String::from_utf8(bytes) {
        Ok(s) => Some(s),
        Err(e) if e.utf8_error().error_len().is_none() => {
            let valid = e.utf8_error().valid_up_to();
            let mut bytes = e.into_bytes();
            bytes.truncate(valid);
            String::from_utf8(bytes).ok()
        }
        Err(_) => None,
    }
}

/// Poll for exit until `deadline`. Returns whether the child exited.
fn wait_until(child: &mut Child, deadline: Instant) -> bool {
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return true,
            Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL_INTERVAL),
            Ok(None) | Err(_) => return false,
        }
    }
}

#[cfg(unix)]
/// SIGKILL the child's process group and reap the child.
fn kill_group(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: signalling a process group we created; a stale id only yields ESRCH.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
    let _ignored = child.wait();
}

#[cfg(not(unix))]
/// Kill and reap the child.
fn kill_group(child: &mut Child) {
    let _ignored = child.kill();
    let _ignored = child.wait();
}
