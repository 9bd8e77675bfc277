use std::io::{self, Read, Write};
use std::process::{Child, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::cases::{CaseResult, CaseStatus, ExecutionOutcome, MutationSet};
use crate::error::{FuzzError, Result};
use crate::target::Target;

/// How long to wait for the output pipe to close after a timed-out target is
/// killed. A descendant that left the process group may still hold the write
/// end open.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Owns a spawned target. Dropping it without a successful wait kills and
/// reaps the process, so no exit path leaks a child.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        ChildGuard { child, reaped: false }
    }

    /// Kills the target and everything it spawned. The target leads its own
    /// process group (see `Target::command`), so the group id is its pid.
    /// Must run before the child is reaped, while the pid is still ours.
    fn kill(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            if let Err(e) = killpg(Pid::from_raw(self.child.id() as i32), Signal::SIGKILL) {
                debug!("killpg {}: {}", self.child.id(), e);
            }
        }
        let _ = self.child.kill();
    }

    /// Returns the exit status and whether the timeout fired.
    fn wait(&mut self, timeout: Option<Duration>) -> io::Result<(ExitStatus, bool)> {
        let Some(timeout) = timeout else {
            let status = self.child.wait()?;
            self.reaped = true;
            return Ok((status, false));
        };

        let start = Instant::now();
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok((status, false));
            }
            if start.elapsed() > timeout {
                self.kill();
                let status = self.child.wait()?;
                self.reaped = true;
                return Ok((status, true));
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            self.kill();
            let _ = self.child.wait();
        }
    }
}

pub struct Harness {
    target: Target,
}

impl Harness {
    pub fn new(target: Target) -> Self {
        Harness { target }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Runs the target once with `input` on stdin.
    ///
    /// stdout and stderr share a single pipe, so `output` holds them in the
    /// order the target wrote them. The pipe is drained on a helper thread
    /// while the input is written.
    pub fn run(&self, input: &str) -> Result<ExecutionOutcome> {
        let start = Instant::now();

        let (mut reader, writer) = io::pipe().map_err(|e| FuzzError::io("creating output pipe", e))?;
        let child = {
            // The command holds the parent's copies of the write end; it must be
            // dropped before the drain thread can ever see EOF.
            let mut cmd = self.target.command();
            let err_writer = writer
                .try_clone()
                .map_err(|e| FuzzError::io("creating output pipe", e))?;
            cmd.stdin(Stdio::piped()).stdout(writer).stderr(err_writer);
            cmd.spawn().map_err(|source| FuzzError::Launch {
                command: self.target.command.clone(),
                source,
            })?
        };
        let mut child = ChildGuard::new(child);
        debug!("spawned pid {} for {} byte input", child.child.id(), input.len());

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let res = reader.read_to_end(&mut buf).map(|_| buf);
            let _ = tx.send(res);
        });

        let input_truncated = write_input(&mut child, input.as_bytes())?;

        let (status, timed_out) = child
            .wait(self.target.timeout)
            .map_err(|e| FuzzError::io("waiting for target", e))?;
        if timed_out {
            warn!("target timed out after {:?}, killed", self.target.timeout.unwrap_or_default());
        }

        let drained = if timed_out {
            rx.recv_timeout(DRAIN_GRACE).ok()
        } else {
            rx.recv().ok()
        };
        let output = match drained {
            Some(Ok(buf)) => buf,
            Some(Err(e)) => return Err(FuzzError::io("reading target output", e)),
            None => {
                warn!("output pipe still open after target exit, output discarded");
                Vec::new()
            }
        };
        trace!("collected {} bytes of output", output.len());

        let signal = exit_signal(&status);
        let exit_code = status
            .code()
            .or_else(|| signal.map(|s| 128 + s))
            .unwrap_or(-1);

        Ok(ExecutionOutcome {
            input: input.to_string(),
            exit_code,
            signal,
            timed_out,
            input_truncated,
            output: String::from_utf8_lossy(&output).into_owned(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    pub fn run_all(&self, set: &MutationSet) -> Vec<CaseResult> {
        self.run_all_with(set, |_| {})
    }

    /// Runs every case in order. `on_result` sees each result as soon as it is
    /// final; a failed case never stops the ones after it.
    pub fn run_all_with<F>(&self, set: &MutationSet, mut on_result: F) -> Vec<CaseResult>
    where
        F: FnMut(&CaseResult),
    {
        let mut results = Vec::with_capacity(set.len());

        for (index, case) in set.iter().enumerate() {
            debug!("case {} ({})", index, case.mutator);
            let status = match self.run(&case.input) {
                Ok(outcome) => CaseStatus::Completed(outcome),
                Err(e) => {
                    warn!("case {} ({}): {}", index, case.mutator, e);
                    CaseStatus::from(e)
                }
            };

            let result = CaseResult {
                index,
                mutator: case.mutator.clone(),
                input: case.input.clone(),
                status,
            };
            on_result(&result);
            results.push(result);
        }

        results
    }
}

/// Writes the whole input and closes stdin. A target that exits without
/// reading everything is not a harness failure; it is reported as truncation.
fn write_input(child: &mut ChildGuard, input: &[u8]) -> Result<bool> {
    let mut stdin = child
        .child
        .stdin
        .take()
        .ok_or_else(|| FuzzError::io("opening stdin", io::Error::other("stdin was not piped")))?;

    let written = stdin.write_all(input).and_then(|_| stdin.flush());
    drop(stdin);

    match written {
        Ok(()) => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("target closed stdin early: {}", e);
            Ok(true)
        }
        Err(e) => Err(FuzzError::io("writing stdin", e)),
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
