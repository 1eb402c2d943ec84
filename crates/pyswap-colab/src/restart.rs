use async_trait::async_trait;
use log::info;
use tokio::process::Command;

use pyswap_backend::{HostError, SessionRestart};

use crate::command::run;
use crate::detect::is_colab_host;

const UNASSIGN_SNIPPET: &str = "from google.colab import runtime; runtime.unassign()";

/// The Colab runtime restart primitive, reached through the host's own
/// `google.colab.runtime` API.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColabRuntime;

impl ColabRuntime {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionRestart for ColabRuntime {
    async fn is_available(&self) -> bool {
        is_colab_host().await
    }

    /// Unassigns the Colab runtime. On success the session, including the
    /// process running this call, is torn down before the subprocess
    /// completes; control only comes back here when the primitive failed.
    async fn restart(&self) -> Result<(), HostError> {
        info!("Requesting Colab runtime restart");
        let mut cmd = Command::new("python3");
        cmd.args(["-c", UNASSIGN_SNIPPET]);
        run(cmd, "colab runtime.unassign").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassign_snippet_targets_the_runtime_module() {
        assert!(UNASSIGN_SNIPPET.starts_with("from google.colab import runtime"));
        assert!(UNASSIGN_SNIPPET.contains("unassign()"));
    }
}
