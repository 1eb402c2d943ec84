use async_trait::async_trait;
use log::info;
use tokio::process::Command;

use pyswap_backend::{ExtraInstaller, HostError, InstalledInterpreter};

use crate::command::run;

/// Installs the uv package manager through the interpreter's pip. Requires a
/// functional pip; the pipeline skips this installer entirely when the
/// bootstrap chain came up empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct UvInstaller;

impl UvInstaller {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExtraInstaller for UvInstaller {
    fn name(&self) -> &'static str {
        "uv"
    }

    async fn install(&self, interpreter: &InstalledInterpreter) -> Result<(), HostError> {
        info!("Installing uv with {}", interpreter.path.display());
        let mut cmd = Command::new(&interpreter.path);
        cmd.args(["-m", "pip", "install", "uv"]);
        run(cmd, "pip install uv").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installer_is_named_after_the_tool() {
        assert_eq!(UvInstaller::new().name(), "uv");
    }

    #[tokio::test]
    async fn install_fails_cleanly_without_an_interpreter() {
        let interpreter = InstalledInterpreter {
            version: pyswap_backend::PythonVersion::new(3, 12),
            path: std::path::PathBuf::from("/nonexistent/python3.12"),
            is_registered_alternative: true,
        };

        let error = UvInstaller::new().install(&interpreter).await.unwrap_err();
        assert!(matches!(error, HostError::Spawn { .. }));
    }
}
