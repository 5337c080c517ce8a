//! Running external utilities with captured output and a deadline.

use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, bounded};

use crate::error::ResolverError;

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Extra time allowed for stdout to drain after the child has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Run `program` with `args`, returning its stdout if it exits successfully
/// within `timeout`.
///
/// Stdin is closed and stderr discarded. A child still running at the
/// deadline is killed and reaped.
pub(crate) fn run_captured(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<String, ResolverError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| match err.kind() {
            ErrorKind::NotFound => ResolverError::CommandNotFound {
                program: program.to_string(),
            },
            _ => ResolverError::Io(err),
        })?;

    let Some(mut stdout) = child.stdout.take() else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(ResolverError::Io(std::io::Error::other("stdout was not captured")));
    };

    // Drain stdout on a helper thread so a chatty child can't fill the pipe
    // and block while we poll for its exit.
    let (output_tx, output_rx) = bounded(1);
    thread::Builder::new()
        .name("netchange-cmd-output".to_string())
        .spawn(move || {
            let mut buf = Vec::new();
            let result = stdout.read_to_end(&mut buf).map(|_| buf);
            let _ = output_tx.send(result);
        })
        .map_err(|err| {
            let _ = child.kill();
            let _ = child.wait();
            ResolverError::Io(err)
        })?;

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ResolverError::Timeout {
                program: program.to_string(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
    };

    if !status.success() {
        return Err(ResolverError::CommandFailed {
            program: program.to_string(),
            status,
        });
    }

    let remaining = timeout.saturating_sub(started.elapsed());
    match output_rx.recv_timeout(remaining + DRAIN_GRACE) {
        Ok(Ok(buf)) => Ok(String::from_utf8_lossy(&buf).into_owned()),
        Ok(Err(err)) => Err(ResolverError::Io(err)),
        // A grandchild may still hold the pipe open.
        Err(RecvTimeoutError::Timeout) => Err(ResolverError::Timeout {
            program: program.to_string(),
            timeout,
        }),
        Err(RecvTimeoutError::Disconnected) => Err(ResolverError::Io(std::io::Error::other(
            "output reader exited without a result",
        ))),
    }
}
