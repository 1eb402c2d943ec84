use async_trait::async_trait;

use crate::error::HostError;
use crate::types::{InstalledInterpreter, PythonVersion};

/// Finds interpreter binaries on the host. Probing happens at call time on
/// every invocation; implementations must not cache between calls.
#[async_trait]
pub trait InterpreterLocator: Send + Sync {
    /// Look up the binary for one feature release, conventional paths first.
    async fn locate(
        &self,
        version: &PythonVersion,
    ) -> Result<Option<InstalledInterpreter>, HostError>;

    /// Resolve what the generic `python3` name currently points at, if
    /// anything. Used to confirm a registration took effect.
    async fn resolve_default(&self) -> Result<Option<InstalledInterpreter>, HostError>;

    /// Enumerate every interpreter the host ships, ascending by version.
    async fn list(&self) -> Result<Vec<InstalledInterpreter>, HostError>;
}

/// The OS-wide default-binary registry. The only mutation the switch pipeline
/// performs before its point of no return; implementations must be idempotent
/// so repeated switches to the same version are no-ops in effect.
#[async_trait]
pub trait AlternativesRegistry: Send + Sync {
    /// Make `interpreter` the selection for the generic `python3` name,
    /// registering it first if the registry has never seen it.
    async fn select(&self, interpreter: &InstalledInterpreter) -> Result<(), HostError>;
}

/// One way of producing a working pip for a freshly selected interpreter.
/// Strategies are tried in order and the first success wins; a failure is
/// logged and the chain moves on.
#[async_trait]
pub trait PipStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, interpreter: &InstalledInterpreter) -> Result<(), HostError>;
}

/// Installs a supplementary package manager on top of a working pip.
#[async_trait]
pub trait ExtraInstaller: Send + Sync {
    fn name(&self) -> &'static str;

    async fn install(&self, interpreter: &InstalledInterpreter) -> Result<(), HostError>;
}

/// The host platform's session restart primitive.
#[async_trait]
pub trait SessionRestart: Send + Sync {
    /// Whether the primitive exists in this environment at all.
    async fn is_available(&self) -> bool;

    /// Tear down and relaunch the session. On success this call never
    /// returns: the process hosting the caller is terminated. An `Ok` return
    /// can only be observed by test doubles.
    async fn restart(&self) -> Result<(), HostError>;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FixedLocator {
        interpreters: Vec<InstalledInterpreter>,
        probes: AtomicUsize,
    }

    #[async_trait]
    impl InterpreterLocator for FixedLocator {
        async fn locate(
            &self,
            version: &PythonVersion,
        ) -> Result<Option<InstalledInterpreter>, HostError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .interpreters
                .iter()
                .find(|i| i.version == *version)
                .cloned())
        }

        async fn resolve_default(&self) -> Result<Option<InstalledInterpreter>, HostError> {
            Ok(self
                .interpreters
                .iter()
                .find(|i| i.is_registered_alternative)
                .cloned())
        }

        async fn list(&self) -> Result<Vec<InstalledInterpreter>, HostError> {
            Ok(self.interpreters.clone())
        }
    }

    fn interpreter(major: u32, minor: u32, registered: bool) -> InstalledInterpreter {
        let version = PythonVersion::new(major, minor);
        InstalledInterpreter {
            path: PathBuf::from("/usr/bin").join(version.binary_name()),
            version,
            is_registered_alternative: registered,
        }
    }

    #[tokio::test]
    async fn locator_finds_known_interpreter() {
        let locator = FixedLocator {
            interpreters: vec![interpreter(3, 10, false), interpreter(3, 11, true)],
            probes: AtomicUsize::new(0),
        };

        let found = locator
            .locate(&PythonVersion::new(3, 11))
            .await
            .unwrap()
            .expect("3.11 should be present");
        assert_eq!(found.path, PathBuf::from("/usr/bin/python3.11"));
        assert_eq!(locator.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn locator_reports_missing_interpreter_as_none() {
        let locator = FixedLocator {
            interpreters: vec![interpreter(3, 10, true)],
            probes: AtomicUsize::new(0),
        };

        let found = locator.locate(&PythonVersion::new(3, 14)).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn resolve_default_returns_the_registered_selection() {
        let locator = FixedLocator {
            interpreters: vec![interpreter(3, 10, false), interpreter(3, 12, true)],
            probes: AtomicUsize::new(0),
        };

        let default = locator
            .resolve_default()
            .await
            .unwrap()
            .expect("a default should be registered");
        assert_eq!(default.version, PythonVersion::new(3, 12));
    }
}
