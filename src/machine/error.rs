//! Runtime errors for machine operations.

use thiserror::Error;

/// Errors surfaced by [`StateMachine`](crate::StateMachine) operations.
///
/// A tick on which no transition matches is not an error — the machine just
/// runs the current state's update. These variants all mark misuse of the
/// machine or its factory and are returned to the caller of the triggering
/// operation, never swallowed.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("current state is not set; call set_initial_state() before update()")]
    NoInitialState,

    #[error("no constructor for state '{name}'; register it on the StateFactory")]
    UnknownState { name: &'static str },

    #[error("factory produced the wrong concrete type for state '{expected}'")]
    FactoryTypeMismatch { expected: &'static str },

    #[error("state '{state}' does not accept the context carried by this transition")]
    ContextRejected { state: &'static str },
}
