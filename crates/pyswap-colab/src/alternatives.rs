use async_trait::async_trait;
use log::info;
use std::path::Path;

use pyswap_backend::{AlternativesRegistry, HostError, InstalledInterpreter};

use crate::command::{privileged, run};

const GENERIC_LINK: &str = "/usr/bin/python3";
const GENERIC_NAME: &str = "python3";
const REGISTER_PRIORITY: u32 = 100;

/// The Debian `update-alternatives` registry for the generic `python3`
/// binary. Selection is a two-step: `--install` registers the candidate
/// (a no-op when it is already known) and `--set` forces it to be the
/// current choice regardless of priority ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateAlternatives;

impl UpdateAlternatives {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn install_args(candidate: &Path) -> Vec<String> {
    vec![
        "--install".to_string(),
        GENERIC_LINK.to_string(),
        GENERIC_NAME.to_string(),
        candidate.display().to_string(),
        REGISTER_PRIORITY.to_string(),
    ]
}

fn set_args(candidate: &Path) -> Vec<String> {
    vec![
        "--set".to_string(),
        GENERIC_NAME.to_string(),
        candidate.display().to_string(),
    ]
}

#[async_trait]
impl AlternativesRegistry for UpdateAlternatives {
    async fn select(&self, interpreter: &InstalledInterpreter) -> Result<(), HostError> {
        info!(
            "Registering {} as the {GENERIC_NAME} alternative",
            interpreter.path.display()
        );
        run(
            privileged("update-alternatives", install_args(&interpreter.path)),
            "update-alternatives --install",
        )
        .await?;

        info!(
            "Selecting {} as the current {GENERIC_NAME}",
            interpreter.path.display()
        );
        run(
            privileged("update-alternatives", set_args(&interpreter.path)),
            "update-alternatives --set",
        )
        .await?;

        Ok(())
    }
}
