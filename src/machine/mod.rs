//! The machine runtime: factory, slot arena, tick resolution, diagnostics.
//!
//! This module is the imperative shell around the pure core model. It owns
//! every state instance (one per type, created on first access), runs the
//! per-tick resolution algorithm, and performs the exit/enter handoff when a
//! transition commits.

mod diagram;
mod error;
mod factory;
#[allow(clippy::module_inception)]
mod machine;

pub use error::MachineError;
pub use factory::StateFactory;
pub use machine::StateMachine;
