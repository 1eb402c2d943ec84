use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::process::Command;

use pyswap_backend::{HostError, InstalledInterpreter, PipStrategy};

use crate::command::{privileged, run};

const GET_PIP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_RETRY_DELAYS_SECS: [u64; 3] = [0, 2, 5];

/// The bootstrap chain for pip, in the order the pipeline tries it. First
/// success wins; every failure is downgraded to a warning by the caller.
#[must_use]
pub fn default_strategies() -> Vec<Box<dyn PipStrategy>> {
    vec![
        Box::new(ExistingPip),
        Box::new(EnsurePip),
        Box::new(GetPipScript),
        Box::new(AptPip),
    ]
}

/// Succeeds when the interpreter can already import and invoke pip.
pub struct ExistingPip;

#[async_trait]
impl PipStrategy for ExistingPip {
    fn name(&self) -> &'static str {
        "existing pip"
    }

    async fn attempt(&self, interpreter: &InstalledInterpreter) -> Result<(), HostError> {
        let mut cmd = Command::new(&interpreter.path);
        cmd.args(["-m", "pip", "--version"]);
        let report = run(cmd, "pip version probe").await?;
        debug!("pip already functional: {}", report.trim());
        Ok(())
    }
}

/// The interpreter's built-in bootstrap module.
pub struct EnsurePip;

#[async_trait]
impl PipStrategy for EnsurePip {
    fn name(&self) -> &'static str {
        "ensurepip"
    }

    async fn attempt(&self, interpreter: &InstalledInterpreter) -> Result<(), HostError> {
        let mut cmd = Command::new(&interpreter.path);
        cmd.args(["-m", "ensurepip", "--upgrade"]);
        run(cmd, "ensurepip").await?;
        Ok(())
    }
}

/// Downloads the upstream get-pip.py installer and runs it with the target
/// interpreter. Network-facing, so this is the one strategy with timeout and
/// retry policy on its download.
pub struct GetPipScript;

#[async_trait]
impl PipStrategy for GetPipScript {
    fn name(&self) -> &'static str {
        "get-pip.py"
    }

    async fn attempt(&self, interpreter: &InstalledInterpreter) -> Result<(), HostError> {
        let script = download_with_retries(GET_PIP_URL).await?;

        let dir = tempfile::tempdir()?;
        let script_path = dir.path().join("get-pip.py");
        tokio::fs::write(&script_path, &script).await?;
        info!(
            "Running get-pip.py with {} ({} bytes)",
            interpreter.path.display(),
            script.len()
        );

        let mut cmd = Command::new(&interpreter.path);
        cmd.arg(&script_path).arg("--force-reinstall");
        run(cmd, "get-pip.py").await?;
        Ok(())
    }
}

/// The distribution package, as a last resort. Only covers the python3
/// packaging default, which is why it sits at the end of the chain.
pub struct AptPip;

#[async_trait]
impl PipStrategy for AptPip {
    fn name(&self) -> &'static str {
        "apt python3-pip"
    }

    async fn attempt(&self, interpreter: &InstalledInterpreter) -> Result<(), HostError> {
        debug!(
            "Installing python3-pip from apt for {}",
            interpreter.version
        );
        run(
            privileged("apt-get", ["update", "-y"]),
            "apt-get update",
        )
        .await?;
        run(
            privileged("apt-get", ["install", "python3-pip", "-y"]),
            "apt-get install python3-pip",
        )
        .await?;
        Ok(())
    }
}

async fn download_with_retries(url: &str) -> Result<Vec<u8>, HostError> {
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT)
        .user_agent(format!("pyswap/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| HostError::download(url, source))?;

    let mut last_error = None;

    for delay_secs in DOWNLOAD_RETRY_DELAYS_SECS {
        if delay_secs > 0 {
            warn!("retrying {url} download in {delay_secs}s");
            tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        }

        match download_once(&client, url).await {
            Ok(bytes) => return Ok(bytes),
            Err(error) => {
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| HostError::download(url, "no download attempt was made")))
}

async fn download_once(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, HostError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| HostError::download(url, source))?;

    if !response.status().is_success() {
        return Err(HostError::download(
            url,
            format!("HTTP {}", response.status()),
        ));
    }

    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|source| HostError::download(url, source))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn default_chain_probes_before_bootstrapping() {
        let names: Vec<&str> = default_strategies().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["existing pip", "ensurepip", "get-pip.py", "apt python3-pip"]
        );
    }

    #[test]
    fn strategy_names_are_unique() {
        let strategies = default_strategies();
        let unique: HashSet<&str> = strategies.iter().map(|s| s.name()).collect();
        assert_eq!(unique.len(), strategies.len());
    }

    #[tokio::test]
    async fn existing_pip_fails_cleanly_for_a_broken_interpreter() {
        let interpreter = InstalledInterpreter {
            version: pyswap_backend::PythonVersion::new(3, 11),
            path: std::path::PathBuf::from("/nonexistent/python3.11"),
            is_registered_alternative: false,
        };

        let error = ExistingPip.attempt(&interpreter).await.unwrap_err();
        assert!(matches!(error, HostError::Spawn { .. }));
    }
}
