use log::{debug, trace};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use which::which;

use pyswap_backend::{HostError, InstalledInterpreter, PythonVersion};

use crate::command::probe;

/// Where the Debian alternatives mechanism materializes the current
/// selection for `python3`.
pub(crate) const ALTERNATIVES_SELECTION: &str = "/etc/alternatives/python3";

/// The environment variable every Colab session exports.
pub(crate) const COLAB_ENV_VAR: &str = "COLAB_RELEASE_TAG";

const INTERPRETER_DIRS: [&str; 2] = ["/usr/bin", "/usr/local/bin"];

/// Conventional locations for a `pythonX.Y` binary, most likely first.
fn candidate_paths(version: &PythonVersion) -> Vec<PathBuf> {
    let binary = version.binary_name();
    let mut paths: Vec<PathBuf> = INTERPRETER_DIRS
        .iter()
        .map(|dir| Path::new(dir).join(&binary))
        .collect();

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".local").join("bin").join(&binary));
    }

    paths
}

/// Extract a feature release from a binary file name, accepting only the
/// bare `pythonX.Y` form (rejects `python3`, `python3.11-config`, ...).
fn version_from_file_name(name: &str) -> Option<PythonVersion> {
    name.strip_prefix("python")?.parse().ok()
}

/// Parse `--version` output of the shape `Python 3.11.4` down to its feature
/// release.
fn parse_version_report(output: &str) -> Option<PythonVersion> {
    let rest = output.trim().strip_prefix("Python ")?;
    let mut parts = rest.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some(PythonVersion::new(major, minor))
}

async fn current_selection() -> Option<PathBuf> {
    match tokio::fs::read_link(ALTERNATIVES_SELECTION).await {
        Ok(target) => {
            trace!("alternatives selection points at {}", target.display());
            Some(target)
        }
        Err(source) => {
            debug!("no readable alternatives selection: {source}");
            None
        }
    }
}

/// Probes the host filesystem and PATH for interpreter binaries. Stateless:
/// every call reprobes, because a switch earlier in the session may have
/// changed what is installed and selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLocator;

impl SystemLocator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl pyswap_backend::InterpreterLocator for SystemLocator {
    async fn locate(
        &self,
        version: &PythonVersion,
    ) -> Result<Option<InstalledInterpreter>, HostError> {
        let selection = current_selection().await;

        for path in candidate_paths(version) {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                debug!("found {} at {}", version.binary_name(), path.display());
                return Ok(Some(InstalledInterpreter {
                    version: *version,
                    is_registered_alternative: selection.as_deref() == Some(path.as_path()),
                    path,
                }));
            }
        }

        if let Ok(path) = which(version.binary_name()) {
            debug!("found {} on PATH at {}", version.binary_name(), path.display());
            return Ok(Some(InstalledInterpreter {
                version: *version,
                is_registered_alternative: selection.as_deref() == Some(path.as_path()),
                path,
            }));
        }

        debug!("{} not present on this host", version.binary_name());
        Ok(None)
    }

    async fn resolve_default(&self) -> Result<Option<InstalledInterpreter>, HostError> {
        if let Some(target) = current_selection().await
            && let Some(name) = target.file_name().and_then(|n| n.to_str())
            && let Some(version) = version_from_file_name(name)
        {
            return Ok(Some(InstalledInterpreter {
                version,
                path: target,
                is_registered_alternative: true,
            }));
        }

        // Hosts without an alternatives entry still usually have a python3
        // on PATH; ask it what it is.
        let Ok(path) = which("python3") else {
            return Ok(None);
        };
        let mut cmd = Command::new(&path);
        cmd.arg("--version");
        let report = crate::command::run(cmd, "python3 --version").await?;
        Ok(parse_version_report(&report).map(|version| InstalledInterpreter {
            version,
            path,
            is_registered_alternative: false,
        }))
    }

    async fn list(&self) -> Result<Vec<InstalledInterpreter>, HostError> {
        let selection = current_selection().await;
        let mut found: Vec<InstalledInterpreter> = Vec::new();

        for dir in INTERPRETER_DIRS {
            let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
                continue;
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };
                let Some(version) = version_from_file_name(name) else {
                    continue;
                };
                if found.iter().any(|i| i.version == version) {
                    continue;
                }
                let path = entry.path();
                found.push(InstalledInterpreter {
                    version,
                    is_registered_alternative: selection.as_deref() == Some(path.as_path()),
                    path,
                });
            }
        }

        found.sort_by_key(|i| i.version);
        Ok(found)
    }
}

/// Whether this process is running inside a Colab session. The env var is
/// authoritative; the import probe covers images that scrub the environment.
pub async fn is_colab_host() -> bool {
    if std::env::var_os(COLAB_ENV_VAR).is_some() {
        return true;
    }

    let mut cmd = Command::new("python3");
    cmd.args(["-c", "import google.colab"]);
    probe(cmd, "google.colab import").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_paths_prefer_usr_bin() {
        let paths = candidate_paths(&PythonVersion::new(3, 11));
        assert_eq!(paths[0], PathBuf::from("/usr/bin/python3.11"));
        assert_eq!(paths[1], PathBuf::from("/usr/local/bin/python3.11"));
    }

    #[test]
    fn version_from_file_name_accepts_bare_feature_release() {
        assert_eq!(
            version_from_file_name("python3.12"),
            Some(PythonVersion::new(3, 12))
        );
    }

    #[test]
    fn version_from_file_name_rejects_generic_and_decorated_names() {
        assert_eq!(version_from_file_name("python3"), None);
        assert_eq!(version_from_file_name("python3.11-config"), None);
        assert_eq!(version_from_file_name("python3.11.4"), None);
        assert_eq!(version_from_file_name("pypy3.9"), None);
    }

    #[test]
    fn parse_version_report_takes_feature_release_only() {
        assert_eq!(
            parse_version_report("Python 3.11.4\n"),
            Some(PythonVersion::new(3, 11))
        );
        assert_eq!(
            parse_version_report("Python 3.14.0a2"),
            Some(PythonVersion::new(3, 14))
        );
        assert_eq!(parse_version_report("pypy 7.3"), None);
        assert_eq!(parse_version_report(""), None);
    }
}
