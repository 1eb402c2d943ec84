mod error;
mod traits;
mod types;

pub use error::{HostError, SwitchError};
pub use traits::{
    AlternativesRegistry, ExtraInstaller, InterpreterLocator, PipStrategy, SessionRestart,
};
pub use types::{
    InstalledInterpreter, KNOWN_VERSIONS, PythonVersion, SwitchOptions, SwitchOutcome,
    VersionComponent, VersionParseError,
};
