//! Playstate: a per-tick finite state machine for game and application modes
//!
//! Playstate drives discrete modes (title screen, play, pause, result, …)
//! with guarded transitions evaluated once per update tick. The host game
//! loop calls [`StateMachine::update`] once per frame; the machine checks
//! global transitions first, then the current state's own, and either
//! performs one exit/enter handoff or runs the current state's update hook.
//!
//! # Core Concepts
//!
//! - **State**: a mode with lifecycle hooks via the [`State`] trait, owned
//!   and cached by its machine (one instance per type)
//! - **Transition**: a weighted, guarded edge declared through the fluent
//!   builder (`from`/`to`/`when`/`build`)
//! - **Condition**: composable predicates guarding transitions
//! - **Context**: a value a transition hands to its destination state
//!
//! # Example
//!
//! ```rust
//! use playstate::{StateFactory, StateMachine};
//! use playstate::unit_states;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! unit_states! {
//!     struct Title;
//!     struct Play;
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = StateFactory::new()
//!     .register_default::<Title>()
//!     .register_default::<Play>();
//! let mut machine = StateMachine::new(factory);
//!
//! let start = Rc::new(Cell::new(false));
//! let pressed = Rc::clone(&start);
//! machine
//!     .from::<Title>()
//!     .to::<Play>()
//!     .when(move || pressed.get())
//!     .build()?;
//!
//! machine.set_initial_state::<Title>()?;
//!
//! machine.update()?; // stays on Title
//! start.set(true);
//! machine.update()?; // Title -> Play
//! assert!(machine.current_is::<Play>());
//! # Ok(()) }
//! ```

pub mod builder;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use crate::builder::{
    BuildError, ConditionChain, TransitionBuilder, TransitionFinalizer, TransitionSource,
};
pub use crate::core::{
    Condition, ContextState, State, StateId, Target, TickView, Transition, TransitionParams,
};
pub use crate::machine::{MachineError, StateFactory, StateMachine};
