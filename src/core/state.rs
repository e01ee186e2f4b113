//! Core `State` trait and state identity.
//!
//! A state is a discrete mode of the host application (title screen, play,
//! pause, …). User types implement [`State`] and override the lifecycle
//! hooks they care about; the owning [`StateMachine`](crate::StateMachine)
//! is the only caller of those hooks and never skips one.

use std::any::{Any, TypeId};
use std::fmt;

/// A discrete mode with per-tick lifecycle hooks.
///
/// All hooks default to no-ops, so a marker type is a complete state:
///
/// ```rust
/// use playstate::State;
///
/// struct Title;
/// impl State for Title {}
/// ```
///
/// The machine guarantees each hook runs exactly once per transition:
/// `on_exit` on the outgoing state, then `on_enter` on the incoming one.
/// On a tick where a transition commits, `on_update` does not run.
///
/// States live inside exactly one machine. The machine creates them through
/// its [`StateFactory`](crate::StateFactory), caches one instance per type,
/// and hands the same instance back on every re-entry.
pub trait State: Any {
    /// Called once when the machine switches into this state.
    fn on_enter(&mut self) {}

    /// Called once per tick while this state is current and no transition
    /// matched.
    fn on_update(&mut self) {}

    /// Called once when the machine switches away from this state.
    fn on_exit(&mut self) {}
}

/// A state variant that accepts a context value.
///
/// Context is handed over by the transition that enters the state (see
/// [`to_with`](crate::builder::TransitionSource::to_with)) or directly via
/// [`at_with`](crate::StateMachine::at_with), and is installed on the cached
/// instance immediately before `on_enter`. Re-injecting while the state is
/// cached but not current takes effect on the next entry.
///
/// ```rust
/// use playstate::{ContextState, State};
///
/// #[derive(Default)]
/// struct Results {
///     score: Option<u32>,
/// }
///
/// impl State for Results {
///     fn on_enter(&mut self) {
///         if let Some(score) = self.score {
///             println!("final score: {score}");
///         }
///     }
/// }
///
/// impl ContextState for Results {
///     type Context = u32;
///
///     fn set_context(&mut self, context: u32) {
///         self.score = Some(context);
///     }
/// }
/// ```
pub trait ContextState: State {
    /// The value carried into this state by a context transition.
    type Context: 'static;

    /// Install a new context value. Takes effect on the next entry.
    fn set_context(&mut self, context: Self::Context);
}

/// Identity of a state type within one machine.
///
/// Doubles as the registry key and as the label used by
/// [`to_mermaid`](crate::StateMachine::to_mermaid) and error messages.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StateId {
    type_id: TypeId,
    name: &'static str,
}

impl StateId {
    /// The identity of state type `T`.
    pub fn of<T: State>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
        }
    }

    /// The short type name, without module path.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The reserved pseudo-state whose transitions are checked before the
/// current state's own on every tick.
///
/// Not exported: user code reaches it only through
/// [`from_any`](crate::StateMachine::from_any), so it can never be
/// registered, targeted, or made current.
pub(crate) struct AnyState;

impl State for AnyState {}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let head = full.split('<').next().unwrap_or(full);
    head.rsplit("::").next().unwrap_or(head)
}
