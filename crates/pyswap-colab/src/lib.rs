//! Colab/Debian host implementation of the pyswap seams:
//! - Interpreter discovery over conventional paths and PATH.
//! - The `update-alternatives` registry for the generic `python3` binary.
//! - The pip bootstrap chain (probe, ensurepip, get-pip.py, apt).
//! - uv provisioning on top of a working pip.
//! - The Colab runtime restart primitive.
//!
//! Everything here shells out to pre-existing host commands; nothing is
//! reimplemented, and nothing is cached across calls.

mod alternatives;
mod command;
mod detect;
mod pip;
mod restart;
mod uv;

pub use alternatives::UpdateAlternatives;
pub use detect::{SystemLocator, is_colab_host};
pub use pip::{AptPip, EnsurePip, ExistingPip, GetPipScript, default_strategies};
pub use restart::ColabRuntime;
pub use uv::UvInstaller;
