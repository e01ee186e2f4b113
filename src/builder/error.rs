//! Build errors for the transition declaration DSL.

use thiserror::Error;

use crate::machine::MachineError;

/// Errors that can occur when committing a transition with `build()`.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("transition from '{from}' to '{to}' is already registered")]
    DuplicateTransition { from: &'static str, to: String },

    #[error(transparent)]
    Factory(#[from] MachineError),
}
