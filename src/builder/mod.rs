//! Fluent API for declaring the transition graph.
//!
//! Transitions are authored before the machine starts ticking:
//!
//! ```text
//! machine.from::<Title>().to::<Play>().when(|| ...).build()?;
//! machine.from_any().to::<Settings>().when(|| ...).build()?;
//! machine.from::<Settings>().back().when(|| ...).build()?;
//! ```
//!
//! Each call returns the next stage type, so illegal orderings (a guard
//! after a parameter, `and` without `when`) do not compile.

pub mod error;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use transition::{ConditionChain, TransitionBuilder, TransitionFinalizer, TransitionSource};
