use log::{debug, error, info, trace};
use std::ffi::OsStr;
use tokio::process::Command;

use pyswap_backend::HostError;

/// Run a command to completion and hand back stdout, mapping a non-zero exit
/// into `HostError::CommandFailed` with the captured stderr.
pub(crate) async fn run(mut cmd: Command, what: &str) -> Result<String, HostError> {
    info!("Running {what}");

    let output = cmd.output().await.map_err(|source| HostError::Spawn {
        command: what.to_string(),
        source,
    })?;

    debug!("{what} exit status: {:?}", output.status);
    trace!("{what} stdout: {}", String::from_utf8_lossy(&output.stdout));

    if !output.stderr.is_empty() {
        trace!("{what} stderr: {}", String::from_utf8_lossy(&output.stderr));
    }

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!("{what} failed: {stderr}");
        Err(HostError::command_failed(what, stderr))
    }
}

/// Whether a probe command exits successfully. Failures of any kind count as
/// a negative probe, including a missing binary.
pub(crate) async fn probe(mut cmd: Command, what: &str) -> bool {
    debug!("Probing {what}");

    match cmd.output().await {
        Ok(output) => {
            trace!("{what} probe exit status: {:?}", output.status);
            output.status.success()
        }
        Err(source) => {
            debug!("{what} probe could not spawn: {source}");
            false
        }
    }
}

/// Build a command that needs root. The session image normally runs the
/// kernel as root with sudo present; when sudo is missing the command runs
/// directly and the kernel's own privileges decide the outcome.
pub(crate) fn privileged<I, S>(program: &str, args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    if which::which("sudo").is_ok() {
        let mut cmd = Command::new("sudo");
        cmd.arg(program);
        cmd.args(args);
        cmd
    } else {
        debug!("sudo not found, running {program} directly");
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_captures_stdout_on_success() {
        let mut cmd = Command::new("echo");
        cmd.arg("hello");

        let stdout = run(cmd, "echo hello").await.expect("echo should succeed");
        assert_eq!(stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn run_maps_missing_binary_to_spawn_error() {
        let cmd = Command::new("definitely-not-a-real-binary-pyswap");

        let error = run(cmd, "missing binary").await.unwrap_err();
        assert!(matches!(error, HostError::Spawn { .. }));
    }

    #[tokio::test]
    async fn run_maps_nonzero_exit_to_command_failed() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo boom >&2; exit 3"]);

        let error = run(cmd, "sh exit 3").await.unwrap_err();
        assert!(
            matches!(error, HostError::CommandFailed { ref stderr, .. } if stderr.contains("boom"))
        );
    }

    #[tokio::test]
    async fn probe_is_true_only_for_zero_exit() {
        let mut ok = Command::new("sh");
        ok.args(["-c", "exit 0"]);
        assert!(probe(ok, "exit 0").await);

        let mut failing = Command::new("sh");
        failing.args(["-c", "exit 1"]);
        assert!(!probe(failing, "exit 1").await);

        let missing = Command::new("definitely-not-a-real-binary-pyswap");
        assert!(!probe(missing, "missing").await);
    }
}
