//! Core state machine data model.
//!
//! This module contains the pure data model of the runtime:
//! - State definitions and identity via the [`State`] trait and [`StateId`]
//! - Composable [`Condition`] predicates for transition control
//! - The [`Transition`] edge model with weighted, check-time-resolved
//!   destinations
//!
//! Resolution over this model is a pure scan; all side effects (lifecycle
//! hooks, pointer swaps) live in the [`machine`](crate::machine) module.

mod condition;
mod state;
mod transition;

pub use condition::Condition;
pub use state::{ContextState, State, StateId};
pub use transition::{Target, TickView, Transition, TransitionParams};

pub(crate) use state::AnyState;
pub(crate) use transition::{select, ContextInjector, Resolved};
