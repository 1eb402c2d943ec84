//! Switches the active Python interpreter inside an ephemeral notebook
//! session, re-bootstraps the package toolchain for it, and hands the
//! session over to the host's restart primitive.
//!
//! One call to [`Switcher::switch`] runs the whole pipeline: validate the
//! requested version, register it as the system default through the
//! alternatives registry, bootstrap pip (optionally uv on top), then restart
//! the session or return the outcome to the caller. Failures before
//! registration abort with a typed error and leave the host untouched;
//! failures after registration degrade to warnings on the returned
//! [`SwitchOutcome`], because the interpreter switch itself has already
//! happened and is never rolled back.

mod logging;

use log::{debug, info, warn};

pub use logging::init_logging;
pub use pyswap_backend::{
    AlternativesRegistry, ExtraInstaller, HostError, InstalledInterpreter, InterpreterLocator,
    KNOWN_VERSIONS, PipStrategy, PythonVersion, SessionRestart, SwitchError, SwitchOptions,
    SwitchOutcome, VersionParseError,
};
pub use pyswap_colab::{
    ColabRuntime, SystemLocator, UpdateAlternatives, UvInstaller, default_strategies,
    is_colab_host,
};

/// The switch pipeline over injected host seams. Production code wires the
/// Colab host with [`Switcher::colab`]; tests substitute fakes through
/// [`Switcher::new`].
pub struct Switcher {
    locator: Box<dyn InterpreterLocator>,
    registry: Box<dyn AlternativesRegistry>,
    strategies: Vec<Box<dyn PipStrategy>>,
    extra: Box<dyn ExtraInstaller>,
    restart: Box<dyn SessionRestart>,
}

impl Switcher {
    #[must_use]
    pub fn new(
        locator: Box<dyn InterpreterLocator>,
        registry: Box<dyn AlternativesRegistry>,
        strategies: Vec<Box<dyn PipStrategy>>,
        extra: Box<dyn ExtraInstaller>,
        restart: Box<dyn SessionRestart>,
    ) -> Self {
        Self {
            locator,
            registry,
            strategies,
            extra,
            restart,
        }
    }

    /// Production wiring for a Colab/Debian host.
    #[must_use]
    pub fn colab() -> Self {
        Self::new(
            Box::new(SystemLocator::new()),
            Box::new(UpdateAlternatives::new()),
            default_strategies(),
            Box::new(UvInstaller::new()),
            Box::new(ColabRuntime::new()),
        )
    }

    /// Run one complete switch.
    ///
    /// With `auto_restart` enabled and a live host primitive, a successful
    /// call does not return: the session is torn down so the new default
    /// interpreter takes effect process-wide. Every other path returns the
    /// outcome, with degraded-but-successful steps recorded as warnings in
    /// order of occurrence.
    ///
    /// # Errors
    /// - [`SwitchError::UnsupportedVersion`] for anything but `major.minor`.
    /// - [`SwitchError::InterpreterNotFound`] when the host image does not
    ///   ship the requested interpreter.
    /// - [`SwitchError::Registration`] when the alternatives registry could
    ///   not be updated; nothing has been mutated past this point.
    pub async fn switch(
        &self,
        version: &str,
        options: SwitchOptions,
    ) -> Result<SwitchOutcome, SwitchError> {
        let requested: PythonVersion =
            version
                .parse()
                .map_err(|source| SwitchError::UnsupportedVersion {
                    input: version.to_string(),
                    source,
                })?;
        info!("Switching the session interpreter to Python {requested}");
        if !KNOWN_VERSIONS.contains(&requested) {
            debug!("{requested} is outside the routinely exercised set");
        }

        // A failed probe means the interpreter's presence cannot be proven,
        // which is as fatal as a clean miss.
        let located = match self.locator.locate(&requested).await {
            Ok(found) => found,
            Err(error) => {
                warn!("interpreter probe failed: {error}");
                None
            }
        };
        let interpreter = located.ok_or(SwitchError::InterpreterNotFound { version: requested })?;

        if interpreter.is_registered_alternative {
            debug!("{} is already the registered default", interpreter.path.display());
        }
        self.registry
            .select(&interpreter)
            .await
            .map_err(|source| SwitchError::Registration {
                version: requested,
                source,
            })?;
        info!("Registered {} as the default python3", interpreter.path.display());

        // Point of no return: from here on everything degrades to warnings.
        let mut outcome = SwitchOutcome::new(requested);

        self.verify_selection(&requested, &mut outcome).await;

        let pip_installed = self.bootstrap_pip(&interpreter, &mut outcome).await;
        outcome.pip_installed = pip_installed;

        if options.install_uv {
            self.provision_extra(&interpreter, &mut outcome).await;
        }

        if options.auto_restart {
            match self.trigger_restart().await {
                // Only observable with a test double standing in for the
                // host primitive; the real one tears the process down.
                Ok(()) => outcome.restarted = true,
                Err(error) => {
                    warn!("{error}");
                    outcome.warnings.push(error.to_string());
                }
            }
        } else {
            info!("Restart suppressed; the switch takes effect after a manual restart");
        }

        Ok(outcome)
    }

    /// Enumerate the interpreters the host ships, for operator listings.
    ///
    /// # Errors
    /// Propagates host probe failures.
    pub async fn installed(&self) -> Result<Vec<InstalledInterpreter>, HostError> {
        self.locator.list().await
    }

    /// Invoke the host restart primitive on its own.
    ///
    /// On success this never returns on a real host. A missing or failing
    /// primitive is reported as [`SwitchError::RestartUnavailable`]; callers
    /// treat that as "restart manually", not as a failed switch.
    ///
    /// # Errors
    /// [`SwitchError::RestartUnavailable`] when the primitive is absent or
    /// its invocation failed.
    pub async fn trigger_restart(&self) -> Result<(), SwitchError> {
        if !self.restart.is_available().await {
            return Err(SwitchError::RestartUnavailable);
        }
        self.restart.restart().await.map_err(|error| {
            warn!("restart primitive failed: {error}");
            SwitchError::RestartUnavailable
        })
    }

    /// Confirm the generic binary now resolves to the requested release and
    /// record a warning when it does not. The registry call has already
    /// succeeded at this point, so a mismatch is diagnostic, not fatal.
    async fn verify_selection(&self, requested: &PythonVersion, outcome: &mut SwitchOutcome) {
        match self.locator.resolve_default().await {
            Ok(Some(default)) if default.version == *requested => {
                debug!("python3 now resolves to {} as requested", default.version);
            }
            Ok(Some(default)) => {
                outcome.warnings.push(format!(
                    "python3 still reports {} after registering {requested}",
                    default.version
                ));
            }
            Ok(None) => {
                outcome
                    .warnings
                    .push("could not resolve what python3 points at after registration".to_string());
            }
            Err(error) => {
                outcome
                    .warnings
                    .push(format!("post-switch verification failed: {error}"));
            }
        }
    }

    /// Try the bootstrap chain in order; first success wins. Intermediate
    /// failures go to the log, only an exhausted chain surfaces on the
    /// outcome.
    async fn bootstrap_pip(
        &self,
        interpreter: &InstalledInterpreter,
        outcome: &mut SwitchOutcome,
    ) -> bool {
        let mut last_failure: Option<(&'static str, HostError)> = None;

        for strategy in &self.strategies {
            debug!("trying pip bootstrap strategy: {}", strategy.name());
            match strategy.attempt(interpreter).await {
                Ok(()) => {
                    info!("pip is functional via {}", strategy.name());
                    return true;
                }
                Err(error) => {
                    warn!("pip bootstrap via {} failed: {error}", strategy.name());
                    last_failure = Some((strategy.name(), error));
                }
            }
        }

        match last_failure {
            Some((name, error)) => outcome.warnings.push(format!(
                "pip could not be bootstrapped for {}; last attempt ({name}) failed: {error}",
                interpreter.version
            )),
            None => outcome
                .warnings
                .push("pip could not be bootstrapped: no strategies were configured".to_string()),
        }
        false
    }

    /// Install the supplementary package manager. Hard dependency on a
    /// working pip: skipped with a warning when the bootstrap came up empty.
    async fn provision_extra(&self, interpreter: &InstalledInterpreter, outcome: &mut SwitchOutcome) {
        if !outcome.pip_installed {
            outcome.warnings.push(format!(
                "skipping {} installation: no working pip for {}",
                self.extra.name(),
                interpreter.version
            ));
            return;
        }

        match self.extra.install(interpreter).await {
            Ok(()) => {
                info!("{} installed", self.extra.name());
                outcome.uv_installed = true;
            }
            Err(error) => {
                warn!("{} installation failed: {error}", self.extra.name());
                outcome
                    .warnings
                    .push(format!("{} installation failed: {error}", self.extra.name()));
            }
        }
    }
}
