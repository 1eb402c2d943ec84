use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A Python feature release identified by `major.minor`, the granularity at
/// which interpreter binaries are shipped (`python3.11`, `python3.12`, ...).
///
/// Patch releases are deliberately not representable: the host image installs
/// one patch level per feature release and the alternatives registry only ever
/// points at `pythonX.Y` binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl PythonVersion {
    #[must_use]
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Conventional binary name for this release, e.g. `python3.11`.
    #[must_use]
    pub fn binary_name(&self) -> String {
        format!("python{}.{}", self.major, self.minor)
    }
}

/// Feature releases the tool is routinely exercised against. Advisory only:
/// the hard gate is whether the interpreter binary exists on the host.
pub const KNOWN_VERSIONS: [PythonVersion; 6] = [
    PythonVersion { major: 3, minor: 9 },
    PythonVersion {
        major: 3,
        minor: 10,
    },
    PythonVersion {
        major: 3,
        minor: 11,
    },
    PythonVersion {
        major: 3,
        minor: 12,
    },
    PythonVersion {
        major: 3,
        minor: 13,
    },
    PythonVersion {
        major: 3,
        minor: 14,
    },
];

impl Ord for PythonVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
    }
}

impl PartialOrd for PythonVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Expected X.Y format, got: {input}")]
    InvalidFormat { input: String },
    #[error("Patch components are not accepted, expected X.Y, got: {input}")]
    UnexpectedPatch { input: String },
    #[error("Invalid {component} version: {value}")]
    InvalidComponent {
        component: VersionComponent,
        value: String,
    },
}

impl FromStr for PythonVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let mut parts = s.split('.');
        let major_str = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(|| VersionParseError::InvalidFormat {
                input: s.to_string(),
            })?;
        let minor_str = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(|| VersionParseError::InvalidFormat {
                input: s.to_string(),
            })?;
        if parts.next().is_some() {
            return Err(VersionParseError::UnexpectedPatch {
                input: s.to_string(),
            });
        }

        let major = major_str
            .parse()
            .map_err(|_| VersionParseError::InvalidComponent {
                component: VersionComponent::Major,
                value: major_str.to_string(),
            })?;
        let minor = minor_str
            .parse()
            .map_err(|_| VersionParseError::InvalidComponent {
                component: VersionComponent::Minor,
                value: minor_str.to_string(),
            })?;

        Ok(Self { major, minor })
    }
}

/// An interpreter found on the host at call time. Never cached: the session
/// is single-shot and the filesystem is reprobed on every switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledInterpreter {
    pub version: PythonVersion,
    pub path: PathBuf,
    /// Whether the alternatives registry currently selects this binary for
    /// the generic `python3` name.
    pub is_registered_alternative: bool,
}

/// Caller-facing switches for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchOptions {
    /// Install the uv package manager after pip is bootstrapped.
    pub install_uv: bool,
    /// Trigger the host restart primitive once the switch is complete. When
    /// disabled the outcome is returned to the caller for inspection and the
    /// restart is theirs to perform.
    pub auto_restart: bool,
}

impl Default for SwitchOptions {
    fn default() -> Self {
        Self {
            install_uv: false,
            auto_restart: true,
        }
    }
}

/// Result of one switch attempt. Warnings are ordered by occurrence and
/// reset on every call; degraded-but-successful outcomes carry them instead
/// of raising errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchOutcome {
    pub applied: PythonVersion,
    pub pip_installed: bool,
    pub uv_installed: bool,
    pub restarted: bool,
    pub warnings: Vec<String>,
}

impl SwitchOutcome {
    #[must_use]
    pub fn new(applied: PythonVersion) -> Self {
        Self {
            applied,
            pip_installed: false,
            uv_installed: false,
            restarted: false,
            warnings: Vec::new(),
        }
    }
}
