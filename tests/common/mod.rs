//! Shared integration-test harness for running the `confession` binary as
//! a child process.

#![allow(dead_code)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

/// Default timeout for reading a single state line.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A running `confession play` process.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
#[allow(clippy::missing_panics_doc)]
pub struct PlayProcess {
    child: Child,
    stdin: tokio::process::ChildStdin,
    reader: BufReader<tokio::process::ChildStdout>,
}

impl PlayProcess {
    /// Spawns `confession play --quiet` with extra arguments.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(extra: &[&str]) -> Self {
        let mut child = Command::new(bin())
            .arg("play")
            .args(extra)
            .arg("--quiet")
            .env_remove("CONFESSION_CONFIG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn confession");

        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");

        Self {
            child,
            stdin,
            reader: BufReader::new(stdout),
        }
    }

    /// Sends one command line.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send(&mut self, command: &str) {
        self.stdin
            .write_all(format!("{command}\n").as_bytes())
            .await
            .expect("failed to write to stdin");
        self.stdin.flush().await.expect("failed to flush stdin");
    }

    /// Reads the next render-state line.
    ///
    /// Panics on EOF, I/O error, or if nothing arrives within `timeout`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn read_state(&mut self, timeout: Duration) -> Value {
        let mut line = String::new();
        let result = tokio::time::timeout(timeout, async {
            loop {
                line.clear();
                let n = self
                    .reader
                    .read_line(&mut line)
                    .await
                    .expect("read_line I/O error");
                assert!(n > 0, "unexpected EOF from confession");
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return serde_json::from_str::<Value>(trimmed)
                        .unwrap_or_else(|e| panic!("invalid JSON: {e}\nline: {line}"));
                }
            }
        })
        .await;
        result.expect("timed out waiting for state")
    }

    /// Sends a command and reads the state it produced.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_and_read(&mut self, command: &str) -> Value {
        self.send(command).await;
        self.read_state(DEFAULT_TIMEOUT).await
    }

    /// Closes stdin and waits for the process to exit.
    #[allow(clippy::missing_panics_doc)]
    pub async fn shutdown(self) -> std::process::ExitStatus {
        let Self {
            mut child, stdin, ..
        } = self;
        drop(stdin);

        match tokio::time::timeout(Duration::from_secs(5), child.wait()).await {
            Ok(status) => status.expect("failed to wait on child"),
            Err(_) => {
                child.kill().await.expect("failed to kill child");
                panic!("confession did not exit after stdin closed");
            }
        }
    }
}

/// Path to the built binary.
#[must_use]
pub fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_confession")
}

/// Runs the binary to completion with the given arguments.
#[allow(clippy::missing_panics_doc)]
#[must_use]
pub fn run_command(args: &[&str]) -> Output {
    std::process::Command::new(bin())
        .args(args)
        .env_remove("CONFESSION_CONFIG")
        .output()
        .expect("failed to run confession")
}

/// Runs the binary feeding `input` on stdin.
#[allow(clippy::missing_panics_doc)]
#[must_use]
pub fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = std::process::Command::new(bin())
        .args(args)
        .env_remove("CONFESSION_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn confession");
    child
        .stdin
        .take()
        .expect("stdin not captured")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait on child")
}

/// Parses every non-empty stdout line as JSON.
#[allow(clippy::missing_panics_doc)]
#[must_use]
pub fn stdout_states(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("invalid JSON: {e}\n{l}")))
        .collect()
}

/// Returns the path to a test fixture.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
