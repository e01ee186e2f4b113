//! Staged fluent builder for declaring transitions.
//!
//! Construction walks through distinct stage types so that the call order is
//! checked at compile time: a destination must come first, guards can only
//! be extended after `when`, and once a parameter is set the condition can
//! no longer change. `build()` is the single mutating step — everything
//! before it only accumulates builder state.
//!
//! ```rust
//! use playstate::{StateFactory, StateMachine};
//! use playstate::unit_states;
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
//! machine
//!     .from::<Title>()
//!     .to::<Play>()
//!     .when(|| true)
//!     .and(|| true)
//!     .set_weight(2.0)
//!     .build()?;
//! # Ok(()) }
//! ```

use std::any::Any;
use std::rc::Rc;

use crate::builder::error::BuildError;
use crate::core::{
    Condition, ContextInjector, ContextState, State, StateId, Target, TickView, Transition,
    TransitionParams,
};
use crate::machine::{MachineError, StateMachine};

type LazyStateRef = Box<dyn FnOnce(&mut StateMachine) -> Result<StateId, MachineError>>;

/// Destination accumulated by the builder, resolved when `build()` runs.
enum LazyTarget {
    Fixed(LazyStateRef),
    Deferred(Rc<dyn Fn(&TickView) -> Option<StateId>>),
}

/// Accumulated builder state shared by all stages.
struct BuilderCore<'m> {
    machine: &'m mut StateMachine,
    source: LazyStateRef,
    target: LazyTarget,
    condition: Option<Condition>,
    params: TransitionParams,
    inject: Option<ContextInjector>,
}

impl BuilderCore<'_> {
    fn commit(self) -> Result<(), BuildError> {
        let machine = self.machine;
        let source = (self.source)(machine)?;
        let target = match self.target {
            LazyTarget::Fixed(resolve) => Target::Fixed(resolve(machine)?),
            LazyTarget::Deferred(resolver) => Target::Deferred(resolver),
        };
        machine.add_transition(
            source,
            Transition::new(target, self.condition, self.params, self.inject),
        )
    }
}

/// First stage: a source state waiting for its destination.
///
/// Obtained from [`StateMachine::from`] or [`StateMachine::from_any`].
pub struct TransitionSource<'m> {
    machine: &'m mut StateMachine,
    source: LazyStateRef,
}

impl<'m> TransitionSource<'m> {
    pub(crate) fn typed<S: State>(machine: &'m mut StateMachine) -> Self {
        Self {
            machine,
            source: Box::new(|machine| machine.at::<S>()),
        }
    }

    pub(crate) fn any(machine: &'m mut StateMachine) -> Self {
        Self {
            machine,
            source: Box::new(|machine| Ok(machine.any_id())),
        }
    }

    /// Target a fixed destination state.
    pub fn to<T: State>(self) -> TransitionBuilder<'m> {
        self.into_builder(LazyTarget::Fixed(Box::new(|machine| machine.at::<T>())), None)
    }

    /// Target a context-bearing destination, handing it `context` when the
    /// transition commits. The value is captured now and installed on every
    /// commit, immediately before the destination's enter hook.
    pub fn to_with<T>(self, context: T::Context) -> TransitionBuilder<'m>
    where
        T: ContextState,
        T::Context: Clone,
    {
        let inject: ContextInjector = Rc::new(move |state: &mut dyn State| {
            let any: &mut dyn Any = state;
            match any.downcast_mut::<T>() {
                Some(state) => {
                    state.set_context(context.clone());
                    true
                }
                None => false,
            }
        });
        self.into_builder(
            LazyTarget::Fixed(Box::new(|machine| machine.at::<T>())),
            Some(inject),
        )
    }

    /// Like [`to_with`](Self::to_with), but samples the provider each time
    /// the transition commits instead of capturing one value up front.
    pub fn to_with_provider<T, F>(self, provider: F) -> TransitionBuilder<'m>
    where
        T: ContextState,
        F: Fn() -> T::Context + 'static,
    {
        let inject: ContextInjector = Rc::new(move |state: &mut dyn State| {
            let any: &mut dyn Any = state;
            match any.downcast_mut::<T>() {
                Some(state) => {
                    state.set_context(provider());
                    true
                }
                None => false,
            }
        });
        self.into_builder(
            LazyTarget::Fixed(Box::new(|machine| machine.at::<T>())),
            Some(inject),
        )
    }

    /// Target whatever the machine's previous state is when the transition
    /// is checked. Until a first transition has occurred there is no
    /// previous state and the transition is disqualified.
    pub fn back(self) -> TransitionBuilder<'m> {
        self.into_builder(
            LazyTarget::Deferred(Rc::new(|view: &TickView| view.previous)),
            None,
        )
    }

    fn into_builder(
        self,
        target: LazyTarget,
        inject: Option<ContextInjector>,
    ) -> TransitionBuilder<'m> {
        TransitionBuilder {
            core: BuilderCore {
                machine: self.machine,
                source: self.source,
                target,
                condition: None,
                params: TransitionParams::default(),
                inject,
            },
        }
    }
}

/// Second stage: destination chosen, guard and parameters still open.
pub struct TransitionBuilder<'m> {
    core: BuilderCore<'m>,
}

impl<'m> TransitionBuilder<'m> {
    /// Guard the transition with a predicate closure.
    pub fn when<F>(self, predicate: F) -> ConditionChain<'m>
    where
        F: Fn() -> bool + 'static,
    {
        self.guard(Condition::new(predicate))
    }

    /// Guard the transition with a pre-composed [`Condition`].
    pub fn guard(mut self, condition: Condition) -> ConditionChain<'m> {
        self.core.condition = Some(condition);
        ConditionChain { core: self.core }
    }

    /// Override the tie-break weight (default 1.0).
    pub fn set_weight(mut self, weight: f32) -> TransitionFinalizer<'m> {
        self.core.params.weight = weight;
        TransitionFinalizer { core: self.core }
    }

    /// Permit the transition to land on the already-current state
    /// (default false).
    pub fn set_allow_reentry(mut self, allow_reentry: bool) -> TransitionFinalizer<'m> {
        self.core.params.allow_reentry = allow_reentry;
        TransitionFinalizer { core: self.core }
    }

    /// Commit an unconditional transition. Sugar for [`build`](Self::build)
    /// with no guard.
    pub fn always(self) -> Result<(), BuildError> {
        self.core.commit()
    }

    /// Commit the transition onto its source state.
    pub fn build(self) -> Result<(), BuildError> {
        self.core.commit()
    }
}

/// Third stage: a guarded transition whose condition can still be extended.
pub struct ConditionChain<'m> {
    core: BuilderCore<'m>,
}

impl<'m> ConditionChain<'m> {
    /// Extend the guard: both the existing condition and `predicate` must
    /// hold.
    pub fn and<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        let condition = match self.core.condition.take() {
            Some(current) => current.and(Condition::new(predicate)),
            None => Condition::new(predicate),
        };
        self.core.condition = Some(condition);
        self
    }

    /// Extend the guard: either the existing condition or `predicate` must
    /// hold.
    pub fn or<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        let condition = match self.core.condition.take() {
            Some(current) => current.or(Condition::new(predicate)),
            None => Condition::new(predicate),
        };
        self.core.condition = Some(condition);
        self
    }

    /// Override the tie-break weight (default 1.0).
    pub fn set_weight(mut self, weight: f32) -> TransitionFinalizer<'m> {
        self.core.params.weight = weight;
        TransitionFinalizer { core: self.core }
    }

    /// Permit the transition to land on the already-current state
    /// (default false).
    pub fn set_allow_reentry(mut self, allow_reentry: bool) -> TransitionFinalizer<'m> {
        self.core.params.allow_reentry = allow_reentry;
        TransitionFinalizer { core: self.core }
    }

    /// Commit the transition onto its source state.
    pub fn build(self) -> Result<(), BuildError> {
        self.core.commit()
    }
}

/// Final stage: parameters set, only more parameters or `build()` remain.
pub struct TransitionFinalizer<'m> {
    core: BuilderCore<'m>,
}

impl<'m> TransitionFinalizer<'m> {
    /// Override the tie-break weight (default 1.0).
    pub fn set_weight(mut self, weight: f32) -> Self {
        self.core.params.weight = weight;
        self
    }

    /// Permit the transition to land on the already-current state
    /// (default false).
    pub fn set_allow_reentry(mut self, allow_reentry: bool) -> Self {
        self.core.params.allow_reentry = allow_reentry;
        self
    }

    /// Commit the transition onto its source state.
    pub fn build(self) -> Result<(), BuildError> {
        self.core.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::StateFactory;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Menu;
    impl State for Menu {}

    #[derive(Default)]
    struct Play;
    impl State for Play {}

    fn machine() -> StateMachine {
        StateMachine::new(
            StateFactory::new()
                .register_default::<Menu>()
                .register_default::<Play>(),
        )
    }

    fn registered(machine: &StateMachine, source: StateId) -> &[Transition] {
        machine.transitions_of(source).unwrap()
    }

    #[test]
    fn build_registers_on_the_source_state() {
        let mut machine = machine();
        machine.from::<Menu>().to::<Play>().always().unwrap();

        assert_eq!(registered(&machine, StateId::of::<Menu>()).len(), 1);
        assert_eq!(registered(&machine, StateId::of::<Play>()).len(), 0);
    }

    #[test]
    fn nothing_is_registered_before_build() {
        let mut machine = machine();
        {
            let _staged = machine.from::<Menu>().to::<Play>().when(|| true);
        }

        assert!(machine.transitions_of(StateId::of::<Menu>()).is_none());
    }

    #[test]
    fn build_resolves_source_and_destination_through_the_factory() {
        let mut machine = machine();
        machine.from::<Menu>().to::<Play>().always().unwrap();

        assert!(machine.get::<Menu>().is_some());
        assert!(machine.get::<Play>().is_some());
    }

    #[test]
    fn unregistered_destination_fails_at_build() {
        struct Missing;
        impl State for Missing {}

        let mut machine = machine();
        let result = machine.from::<Menu>().to::<Missing>().always();

        assert!(matches!(
            result,
            Err(BuildError::Factory(MachineError::UnknownState { name: "Missing" }))
        ));
    }

    #[test]
    fn parameters_are_recorded() {
        let mut machine = machine();
        machine
            .from::<Menu>()
            .to::<Play>()
            .set_weight(3.5)
            .set_allow_reentry(true)
            .build()
            .unwrap();

        let transition = &registered(&machine, StateId::of::<Menu>())[0];
        assert_eq!(transition.params().weight, 3.5);
        assert!(transition.params().allow_reentry);
    }

    #[test]
    fn defaults_are_weight_one_no_reentry() {
        let mut machine = machine();
        machine.from::<Menu>().to::<Play>().always().unwrap();

        let transition = &registered(&machine, StateId::of::<Menu>())[0];
        assert_eq!(transition.params().weight, 1.0);
        assert!(!transition.params().allow_reentry);
        assert!(transition.condition().is_none());
    }

    #[test]
    fn when_and_or_extend_the_condition() {
        let mut machine = machine();
        let left = Rc::new(Cell::new(false));
        let right = Rc::new(Cell::new(false));
        let (in_and, in_or) = (Rc::clone(&left), Rc::clone(&right));

        machine
            .from::<Menu>()
            .to::<Play>()
            .when(move || in_and.get())
            .or(move || in_or.get())
            .build()
            .unwrap();

        let transition = &registered(&machine, StateId::of::<Menu>())[0];
        let condition = transition.condition().unwrap();

        assert!(!condition.check());
        right.set(true);
        assert!(condition.check());
        right.set(false);
        left.set(true);
        assert!(condition.check());
    }

    #[test]
    fn and_requires_both_predicates() {
        let mut machine = machine();
        let gate = Rc::new(Cell::new(false));
        let in_chain = Rc::clone(&gate);

        machine
            .from::<Menu>()
            .to::<Play>()
            .when(|| true)
            .and(move || in_chain.get())
            .build()
            .unwrap();

        let transition = &registered(&machine, StateId::of::<Menu>())[0];
        assert!(!transition.condition().unwrap().check());
        gate.set(true);
        assert!(transition.condition().unwrap().check());
    }

    #[test]
    fn back_registers_a_deferred_target() {
        let mut machine = machine();
        machine.from::<Menu>().back().when(|| true).build().unwrap();

        let transition = &registered(&machine, StateId::of::<Menu>())[0];
        assert!(matches!(transition.target(), Target::Deferred(_)));
    }

    #[test]
    fn from_any_registers_on_the_global_state() {
        let mut machine = machine();
        machine.from_any().to::<Play>().always().unwrap();

        let any_id = machine.any_id();
        assert_eq!(registered(&machine, any_id).len(), 1);
        assert!(machine.transitions_of(StateId::of::<Menu>()).is_none());
    }
}
