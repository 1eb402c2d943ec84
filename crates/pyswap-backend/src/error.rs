use thiserror::Error;

use crate::types::{PythonVersion, VersionParseError};

/// Command- and IO-level failures reported by host implementations. Host
/// code maps subprocess exits and network problems into this taxonomy; the
/// pipeline decides which of them are fatal.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("{command} exited with failure: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("download of {url} failed: {details}")]
    Download { url: String, details: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    pub fn download(url: impl Into<String>, details: impl std::fmt::Display) -> Self {
        Self::Download {
            url: url.into(),
            details: details.to_string(),
        }
    }
}

/// Unrecoverable switch failures. Everything here aborts the pipeline;
/// toolchain and uv problems never appear in this taxonomy because they are
/// downgraded to outcome warnings.
#[derive(Error, Debug)]
pub enum SwitchError {
    #[error("unsupported version string '{input}': {source}")]
    UnsupportedVersion {
        input: String,
        #[source]
        source: VersionParseError,
    },

    #[error(
        "Python {version} is not installed on this host; the host image owns interpreter provisioning"
    )]
    InterpreterNotFound { version: PythonVersion },

    #[error("failed to register python{version} as the default python3: {source}")]
    Registration {
        version: PythonVersion,
        #[source]
        source: HostError,
    },

    #[error("the host exposes no restart primitive; restart the session manually")]
    RestartUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn io_error_converts_to_host_error() {
        let mapped = HostError::from(std::io::Error::other("disk full"));
        assert!(matches!(mapped, HostError::Io(ref e) if e.to_string().contains("disk full")));
    }

    #[test]
    fn command_failed_display_names_the_command() {
        let error = HostError::command_failed("update-alternatives", "permission denied");
        assert_eq!(
            error.to_string(),
            "update-alternatives exited with failure: permission denied"
        );
    }

    #[test]
    fn unsupported_version_carries_the_offending_input() {
        let source = PythonVersion::from_str("3.x").unwrap_err();
        let error = SwitchError::UnsupportedVersion {
            input: "3.x".to_string(),
            source,
        };
        assert!(error.to_string().contains("3.x"));
    }

    #[test]
    fn interpreter_not_found_names_the_version() {
        let error = SwitchError::InterpreterNotFound {
            version: PythonVersion::new(3, 8),
        };
        assert!(error.to_string().contains("3.8"));
    }

    #[test]
    fn registration_error_chains_the_host_failure() {
        let error = SwitchError::Registration {
            version: PythonVersion::new(3, 11),
            source: HostError::command_failed("update-alternatives", "no such link"),
        };
        let chained = std::error::Error::source(&error).expect("host failure should be chained");
        assert!(chained.to_string().contains("no such link"));
    }
}
