//! Child process execution bounded by a deadline and a cancellation token

use std::process::{Output, Stdio};
use std::time::Duration;

use humantime_serde::re::humantime;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{Error, Result};

/// Run `cmd` to completion and collect its output
///
/// On timeout or cancellation the child is dropped while still running,
/// which kills it.
pub(crate) async fn run_with_deadline(
    mut cmd: Command,
    tool: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Output> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::execution(tool, "executable not found")
        } else {
            Error::execution(tool, format!("failed to start: {}", e))
        }
    })?;

    tokio::select! {
        output = child.wait_with_output() => {
            output.map_err(|e| Error::execution(tool, format!("failed to collect output: {}", e)))
        }
        _ = tokio::time::sleep(timeout) => {
            debug!(tool, "Deadline expired, killing analyzer");
            Err(Error::execution(
                tool,
                format!("timed out after {}", humantime::format_duration(timeout)),
            ))
        }
        _ = cancel.cancelled() => {
            debug!(tool, "Analysis cancelled, killing analyzer");
            Err(Error::execution(tool, "cancelled"))
        }
    }
}
