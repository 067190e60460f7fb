//! Cell execution strategies
//!
//! An executor decides where a single cell runs and whether a budget
//! applies. The runner does not care which one it is given.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use xml_parser_traits::ErrorKind;

use crate::adapter::attempt;
use crate::outcome::Outcome;
use crate::payload::Payload;
use crate::variant::ParserVariant;

/// Runs one (variant, payload) cell to an [`Outcome`]. Must never panic.
pub trait CellExecutor: Send + Sync {
    fn execute(&self, variant: &ParserVariant, payload: &Payload) -> Outcome;
}

/// Runs the cell on the calling thread with no budget
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl CellExecutor for InlineExecutor {
    fn execute(&self, variant: &ParserVariant, payload: &Payload) -> Outcome {
        attempt(variant, payload)
    }
}

/// Runs each cell on a dedicated thread and stops waiting once the budget
/// is spent.
///
/// A thread cannot be killed, so a timed-out cell keeps running in the
/// background until its backend returns. Use [`ProcessExecutor`] when that
/// matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadExecutor {
    budget: Option<Duration>,
}

impl ThreadExecutor {
    pub fn new(budget: Option<Duration>) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }
}

impl CellExecutor for ThreadExecutor {
    fn execute(&self, variant: &ParserVariant, payload: &Payload) -> Outcome {
        let (tx, rx) = mpsc::channel();
        let worker_variant = variant.clone();
        let worker_payload = payload.clone();
        let spawned = thread::Builder::new()
            .name(format!("cell-{}", variant.name()))
            .spawn(move || {
                let _ = tx.send(attempt(&worker_variant, &worker_payload));
            });
        if let Err(err) = spawned {
            return Outcome::failed(
                ErrorKind::Unknown,
                format!("cannot spawn worker thread: {err}"),
            );
        }

        let received = match self.budget {
            Some(budget) => rx.recv_timeout(budget),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                let budget = self.budget.unwrap_or_default();
                tracing::warn!(
                    variant = variant.name(),
                    tier = %payload.tier(),
                    budget_ms = budget.as_millis() as u64,
                    "cell exceeded its budget; worker thread left running"
                );
                Outcome::timed_out(budget)
            }
            Err(RecvTimeoutError::Disconnected) => Outcome::failed(
                ErrorKind::Unknown,
                "worker thread exited without an outcome",
            ),
        }
    }
}

/// Runs each cell in its own child process.
///
/// The child is invoked as `program args.. --variant <name> --tier <tier>`
/// with the payload document on its stdin, and must print the JSON-encoded
/// [`Outcome`] as the last line of its stdout. Past the budget the child is
/// killed. A child that dies without printing an outcome is reported as a
/// failure: `ResourceExhausted` when a signal ended it (an out-of-memory kill
/// or abort), `Unknown` otherwise.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: PathBuf,
    args: Vec<String>,
    budget: Option<Duration>,
    poll_interval: Duration,
}

impl ProcessExecutor {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            budget: None,
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Arguments placed before `--variant`
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_budget(mut self, budget: Option<Duration>) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    fn command(&self, variant: &ParserVariant, payload: &Payload) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--variant")
            .arg(variant.name())
            .arg("--tier")
            .arg(payload.tier().to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        command
    }
}

impl CellExecutor for ProcessExecutor {
    fn execute(&self, variant: &ParserVariant, payload: &Payload) -> Outcome {
        let mut child = match self.command(variant, payload).spawn() {
            Ok(child) => child,
            Err(err) => {
                return Outcome::failed(
                    ErrorKind::Unknown,
                    format!("cannot spawn worker {}: {err}", self.program.display()),
                )
            }
        };

        // Written from its own thread so a child that never reads cannot
        // hold up the budget.
        if let Some(mut stdin) = child.stdin.take() {
            let document = payload.as_bytes().to_vec();
            thread::spawn(move || {
                if let Err(err) = stdin.write_all(&document) {
                    tracing::debug!(%err, "worker did not take the whole payload");
                }
            });
        }

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if let Some(budget) = self.budget {
                        if start.elapsed() >= budget {
                            let _ = child.kill();
                            let _ = child.wait();
                            tracing::warn!(
                                variant = variant.name(),
                                tier = %payload.tier(),
                                budget_ms = budget.as_millis() as u64,
                                "worker killed after exceeding its budget"
                            );
                            return Outcome::timed_out(budget);
                        }
                    }
                    thread::sleep(self.poll_interval);
                }
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Outcome::failed(
                        ErrorKind::Unknown,
                        format!("cannot wait for worker: {err}"),
                    );
                }
            }
        };

        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            if let Err(err) = pipe.read_to_string(&mut stdout) {
                tracing::warn!(%err, "cannot read worker output");
            }
        }
        worker_outcome(status, &stdout)
    }
}

fn worker_outcome(status: ExitStatus, stdout: &str) -> Outcome {
    let reported = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| serde_json::from_str::<Outcome>(line.trim()).ok());
    if let Some(outcome) = reported {
        return outcome;
    }

    tracing::warn!(%status, "worker exited without an outcome");
    if status.code().is_none() {
        Outcome::failed(
            ErrorKind::ResourceExhausted,
            format!("worker terminated abnormally ({status})"),
        )
    } else {
        Outcome::failed(
            ErrorKind::Unknown,
            format!("worker exited with {status} without reporting an outcome"),
        )
    }
}
