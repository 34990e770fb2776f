use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

#[cfg(test)]
use mockall::automock;

use super::ProcessInvocation;
use crate::error::{Result, ReframeError};

/// How a child process ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitReport {
    pub program: String,
    /// Exit code, absent when the process was killed by a signal
    pub code: Option<i32>,
    /// Terminating signal (unix only)
    pub signal: Option<i32>,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl ExitReport {
    pub fn from_status<S: Into<String>>(program: S, status: ExitStatus, elapsed: Duration) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            program: program.into(),
            code: status.code(),
            signal,
            elapsed,
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into [`ReframeError::AbnormalExit`]
    pub fn into_result(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }

        warn!(
            "{} exited abnormally: code={:?} signal={:?}",
            self.program, self.code, self.signal
        );
        Err(ReframeError::AbnormalExit {
            program: self.program,
            code: self.code,
            signal: self.signal,
        })
    }
}

/// Result of a run whose standard streams were captured
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub report: ExitReport,
    pub stdout: String,
    pub stderr: String,
}

/// Runs process invocations to completion on the calling thread.
#[cfg_attr(test, automock)]
pub trait CommandRunner: Send + Sync {
    /// Spawn the invocation with inherited stdio and wait for it to exit.
    ///
    /// Only a failure to start the program is an error; any exit status is
    /// reported in the returned [`ExitReport`].
    fn status(&self, invocation: &ProcessInvocation) -> Result<ExitReport>;

    /// Like [`CommandRunner::status`] but with stdout and stderr captured.
    fn capture(&self, invocation: &ProcessInvocation) -> Result<CapturedOutput>;

    /// Run the invocation and fail unless it exits with code 0.
    fn run(&self, invocation: ProcessInvocation) -> Result<ExitReport> {
        self.status(&invocation)?.into_result()
    }
}

/// [`CommandRunner`] backed by `std::process`; the program is executed
/// directly, never through a shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &ProcessInvocation) -> Command {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.arguments());
        cmd
    }

    fn launch_error(invocation: &ProcessInvocation, source: std::io::Error) -> ReframeError {
        ReframeError::Launch {
            program: invocation.program().to_string(),
            source,
        }
    }
}

impl CommandRunner for SystemRunner {
    fn status(&self, invocation: &ProcessInvocation) -> Result<ExitReport> {
        if let Some(description) = invocation.description() {
            debug!("Description: {}", description);
        }
        debug!("Executing: {:?}", invocation.tokens());

        let started = Instant::now();
        let status = Self::command(invocation)
            .status()
            .map_err(|e| Self::launch_error(invocation, e))?;

        let report = ExitReport::from_status(invocation.program(), status, started.elapsed());
        info!(
            "{} finished in {:.2?} (code={:?})",
            invocation.program(),
            report.elapsed,
            report.code
        );
        Ok(report)
    }

    fn capture(&self, invocation: &ProcessInvocation) -> Result<CapturedOutput> {
        debug!("Executing with captured output: {:?}", invocation.tokens());

        let started = Instant::now();
        let output = Self::command(invocation)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Self::launch_error(invocation, e))?;

        Ok(CapturedOutput {
            report: ExitReport::from_status(invocation.program(), output.status, started.elapsed()),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
