//! Assistant backend subprocess: launch, line feed, liveness, shutdown.
//!
//! The backend is opaque: it talks through tagged stdout lines and may exit
//! at any time. A reader thread parses those lines into the shared transcript
//! log and terminates quietly on EOF. Shutdown asks politely first and kills
//! after a bounded grace period.

use crate::transcript::{parse_line, TranscriptLog};
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long a terminated backend gets before it is force-killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Poll interval while waiting out the grace period.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

pub struct BackendLink {
    child: Child,
    reader: Option<JoinHandle<()>>,
}

impl BackendLink {
    /// Launch the backend with piped stdout/stderr and start the line reader.
    pub fn spawn(command: &str, args: &[String], log: TranscriptLog) -> Result<Self> {
        let mut child = Command::new(command)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to launch backend '{command}'"))?;

        let stdout = child
            .stdout
            .take()
            .context("backend stdout was not piped")?;
        let reader = thread::Builder::new()
            .name("backend-reader".into())
            .spawn(move || read_lines(stdout, log))
            .context("failed to spawn backend reader thread")?;

        // Drain stderr so a chatty backend cannot fill the pipe and stall.
        if let Some(stderr) = child.stderr.take() {
            let _ = thread::Builder::new()
                .name("backend-stderr".into())
                .spawn(move || {
                    for line in BufReader::new(stderr).lines() {
                        match line {
                            Ok(line) => tracing::debug!(target: "backend", stderr = %line),
                            Err(_) => break,
                        }
                    }
                });
        }

        tracing::info!(command, "backend started");
        Ok(Self {
            child,
            reader: Some(reader),
        })
    }

    /// Whether the subprocess is still running.
    pub fn alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Terminate with a bounded grace period, then force-kill.
    pub fn shutdown(&mut self) {
        if !self.alive() {
            self.join_reader();
            return;
        }

        request_terminate(&self.child);

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    tracing::info!(%status, "backend terminated");
                    self.join_reader();
                    return;
                }
                Ok(None) => thread::sleep(SHUTDOWN_POLL),
                Err(err) => {
                    tracing::warn!(error = %err, "backend wait failed");
                    break;
                }
            }
        }

        tracing::warn!("backend ignored terminate, killing");
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.join_reader();
    }

    fn join_reader(&mut self) {
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}

fn read_lines(stdout: std::process::ChildStdout, log: TranscriptLog) {
    // EOF or a read error ends the task quietly; the orchestrator notices
    // backend death through poll(), not through this thread.
    for line in BufReader::new(stdout).lines() {
        let Ok(line) = line else { break };
        if let Some(entry) = parse_line(&line) {
            log.push(entry);
        }
    }
    tracing::debug!("backend stdout closed");
}

#[cfg(unix)]
fn request_terminate(child: &Child) {
    // SIGTERM first so the backend can flush and release its own resources.
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGTERM);
    }
}

#[cfg(not(unix))]
fn request_terminate(_child: &Child) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Speaker, TRANSCRIPT_CAPACITY};

    fn wait_for_exit(link: &mut BackendLink) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while link.alive() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn reader_appends_only_tagged_lines() {
        let log = TranscriptLog::new();
        let mut link = BackendLink::spawn(
            "sh",
            &[
                "-c".to_string(),
                concat!(
                    "echo '[COMMAND][YOU] open browser'; ",
                    "echo 'diagnostic noise'; ",
                    "echo '[COMMAND][SIDD] Opening browser.'"
                )
                .to_string(),
            ],
            log.clone(),
        )
        .unwrap();

        // Reader exits at EOF; joining via shutdown guarantees all lines landed.
        wait_for_exit(&mut link);
        link.shutdown();

        let entries = log.snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].speaker, Speaker::You);
        assert_eq!(entries[0].text, "open browser");
        assert_eq!(entries[1].speaker, Speaker::Sidd);
        assert_eq!(entries[1].text, "Opening browser.");
    }

    #[test]
    fn poll_reports_exit() {
        let log = TranscriptLog::new();
        let mut link = BackendLink::spawn("true", &[], log).unwrap();
        wait_for_exit(&mut link);
        link.shutdown();
        assert!(!link.alive());
    }

    #[test]
    fn spawn_failure_is_an_error() {
        let log = TranscriptLog::new();
        assert!(BackendLink::spawn("definitely-not-a-real-binary", &[], log).is_err());
    }

    #[test]
    fn flood_respects_transcript_cap() {
        let log = TranscriptLog::new();
        let script = format!(
            "for i in $(seq 1 {}); do echo \"[COMMAND][SIDD] line $i\"; done",
            TRANSCRIPT_CAPACITY + 20
        );
        let mut link =
            BackendLink::spawn("sh", &["-c".to_string(), script], log.clone()).unwrap();
        wait_for_exit(&mut link);
        link.shutdown();

        let entries = log.snapshot();
        assert_eq!(entries.len(), TRANSCRIPT_CAPACITY);
        assert_eq!(entries[0].text, "line 21");
        assert_eq!(entries.last().unwrap().text, format!("line {}", TRANSCRIPT_CAPACITY + 20));
    }
}
