//! Making sure the wrapped child is not left running.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tracing::debug;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
#[cfg(unix)]
use tokio::time::timeout;

/// Default grace period between SIGTERM and SIGKILL.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Send a kill to the child if it is still addressable.
///
/// Errors are expected here (the child has normally been reaped already) and
/// are only logged at debug level.
pub fn kill_if_running(child: &mut Child) {
    match child.start_kill() {
        Ok(()) => debug!(pid = ?child.id(), "Sent kill to child"),
        Err(e) => debug!(error = %e, "Child already exited"),
    }
}

/// Shut a child down whose status is unknown, escalating from SIGTERM to
/// SIGKILL.
///
/// # Strategy
/// 1. Send SIGTERM and wait up to `grace` for the child to exit
/// 2. If still running, send SIGKILL
/// 3. Wait for the child to be reaped
///
/// # Platform behavior
/// - Unix: SIGTERM via the nix crate, then SIGKILL via `.kill()`
/// - Windows: immediate `.kill()` (no graceful termination available)
pub async fn shutdown_child(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        shutdown_unix(child, grace).await
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        child.kill().await?;
        child.wait().await
    }
}

#[cfg(unix)]
async fn shutdown_unix(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    let Some(pid) = child.id() else {
        // Already reaped.
        return child.wait().await;
    };
    let pid = i32::try_from(pid).map_err(io::Error::other)?;

    if let Err(e) = signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
        if e == nix::errno::Errno::ESRCH {
            return child.wait().await;
        }
        return Err(io::Error::other(e));
    }

    if let Ok(result) = timeout(grace, child.wait()).await {
        return result;
    }

    debug!(pid, "Child ignored SIGTERM, sending SIGKILL");
    child.kill().await?;
    child.wait().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::process::Command;
    use tokio::time::sleep;

    #[tokio::test]
    #[cfg(unix)]
    async fn shutdown_responds_to_sigterm() {
        let mut child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");

        let status = shutdown_child(&mut child, DEFAULT_SHUTDOWN_GRACE).await.unwrap();

        assert!(!status.success());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn shutdown_escalates_when_sigterm_is_ignored() {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg("trap '' TERM; sleep 30")
            .spawn()
            .expect("failed to spawn sh");
        // Let the shell install its trap.
        sleep(Duration::from_millis(200)).await;

        let status = shutdown_child(&mut child, Duration::from_millis(200)).await.unwrap();

        assert!(!status.success());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn shutdown_handles_already_exited() {
        let mut child = Command::new("true").spawn().expect("failed to spawn true");
        child.wait().await.unwrap();

        let result = shutdown_child(&mut child, DEFAULT_SHUTDOWN_GRACE).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn kill_after_exit_is_harmless() {
        let mut child = Command::new("true").spawn().expect("failed to spawn true");
        let status = child.wait().await.unwrap();

        kill_if_running(&mut child);

        assert!(status.success());
    }
}
