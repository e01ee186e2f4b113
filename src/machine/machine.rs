//! The state machine runtime: slot arena, pointer swap, per-tick resolution.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use tracing::{debug, trace};

use crate::builder::{BuildError, TransitionSource};
use crate::core::{select, AnyState, ContextState, Resolved, State, StateId, TickView, Transition};
use crate::machine::error::MachineError;
use crate::machine::factory::StateFactory;

/// One cached state instance together with its outgoing transitions.
pub(crate) struct StateSlot {
    pub(crate) id: StateId,
    pub(crate) instance: Box<dyn State>,
    pub(crate) transitions: Vec<Transition>,
}

/// A per-tick finite state machine.
///
/// The machine exclusively owns every state instance: states are created on
/// first access through the [`StateFactory`], cached for the machine's
/// lifetime (one instance per type), and never handed out by value. The
/// pseudo-state checked first on every tick is installed eagerly at
/// construction; its transitions are authored through
/// [`from_any`](Self::from_any).
///
/// ```rust
/// use playstate::{State, StateFactory, StateMachine};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// #[derive(Default)]
/// struct Title;
/// impl State for Title {}
///
/// #[derive(Default)]
/// struct Play;
/// impl State for Play {}
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let factory = StateFactory::new()
///     .register_default::<Title>()
///     .register_default::<Play>();
/// let mut machine = StateMachine::new(factory);
///
/// let start = Rc::new(Cell::new(false));
/// let pressed = Rc::clone(&start);
/// machine
///     .from::<Title>()
///     .to::<Play>()
///     .when(move || pressed.get())
///     .build()?;
///
/// machine.set_initial_state::<Title>()?;
/// machine.update()?; // no match: stays on Title
/// assert!(machine.current_is::<Title>());
///
/// start.set(true);
/// machine.update()?; // transitions
/// assert!(machine.current_is::<Play>());
/// # Ok(()) }
/// ```
pub struct StateMachine {
    slots: Vec<StateSlot>,
    index: HashMap<TypeId, usize>,
    current: Option<usize>,
    previous: Option<usize>,
    factory: StateFactory,
}

const ANY_SLOT: usize = 0;

impl StateMachine {
    /// Construct a machine around a configured factory.
    pub fn new(factory: StateFactory) -> Self {
        let any_id = StateId::of::<AnyState>();
        let mut index = HashMap::new();
        index.insert(any_id.type_id(), ANY_SLOT);

        Self {
            slots: vec![StateSlot {
                id: any_id,
                instance: Box::new(AnyState),
                transitions: Vec::new(),
            }],
            index,
            current: None,
            previous: None,
            factory,
        }
    }

    /// Create-and-cache registry access: the first call constructs `T`
    /// through the factory, later calls return the cached instance's id.
    pub fn at<T: State>(&mut self) -> Result<StateId, MachineError> {
        let id = StateId::of::<T>();
        if self.index.contains_key(&id.type_id()) {
            return Ok(id);
        }

        let instance = self.factory.create(id)?;
        let any: &dyn Any = instance.as_ref();
        if !any.is::<T>() {
            return Err(MachineError::FactoryTypeMismatch { expected: id.name() });
        }

        self.index.insert(id.type_id(), self.slots.len());
        self.slots.push(StateSlot {
            id,
            instance,
            transitions: Vec::new(),
        });
        Ok(id)
    }

    /// Like [`at`](Self::at), additionally installing `context` on the
    /// (possibly pre-existing) cached instance. The new context is observed
    /// on the state's next entry.
    pub fn at_with<T>(&mut self, context: T::Context) -> Result<StateId, MachineError>
    where
        T: ContextState,
    {
        let id = self.at::<T>()?;
        let slot = self.index[&id.type_id()];
        let any: &mut dyn Any = self.slots[slot].instance.as_mut();
        match any.downcast_mut::<T>() {
            Some(state) => {
                state.set_context(context);
                Ok(id)
            }
            None => Err(MachineError::FactoryTypeMismatch { expected: id.name() }),
        }
    }

    /// Set the starting state and run its enter hook, bypassing transition
    /// resolution. Must be called once before the first [`update`](Self::update).
    pub fn set_initial_state<T: State>(&mut self) -> Result<(), MachineError> {
        let id = self.at::<T>()?;
        let slot = self.index[&id.type_id()];
        self.current = Some(slot);
        debug!(state = %id, "initial state set");
        self.slots[slot].instance.on_enter();
        Ok(())
    }

    /// Advance the machine by one tick.
    ///
    /// Transitions of the global pseudo-state are checked first and win
    /// outright over the current state's own. When a transition commits, the
    /// exit/enter handoff replaces the current state's update for this tick;
    /// otherwise the current state's update hook runs. Exactly one of the
    /// two happens per call.
    pub fn update(&mut self) -> Result<(), MachineError> {
        let current = self.current.ok_or(MachineError::NoInitialState)?;
        let view = TickView {
            current: self.slots[current].id,
            previous: self.previous.map(|slot| self.slots[slot].id),
        };

        let resolved = select(&self.slots[ANY_SLOT].transitions, &view)
            .or_else(|| select(&self.slots[current].transitions, &view));

        match resolved {
            Some(resolved) => self.commit(current, resolved),
            None => {
                trace!(state = %view.current, "no transition matched");
                self.slots[current].instance.on_update();
                Ok(())
            }
        }
    }

    /// Exit the current state, swap pointers, enter the destination. Context
    /// injection runs and is validated first so a failure changes nothing.
    fn commit(&mut self, current: usize, resolved: Resolved) -> Result<(), MachineError> {
        let Some(&next) = self.index.get(&resolved.dest.type_id()) else {
            return Err(MachineError::UnknownState {
                name: resolved.dest.name(),
            });
        };

        if let Some(inject) = &resolved.inject {
            if !inject(self.slots[next].instance.as_mut()) {
                return Err(MachineError::ContextRejected {
                    state: resolved.dest.name(),
                });
            }
        }

        debug!(from = %self.slots[current].id, to = %resolved.dest, "state transition");
        self.slots[current].instance.on_exit();
        self.previous = Some(current);
        self.current = Some(next);
        self.slots[next].instance.on_enter();
        Ok(())
    }

    /// Identity of the current state, if the machine has been started.
    pub fn current_id(&self) -> Option<StateId> {
        self.current.map(|slot| self.slots[slot].id)
    }

    /// Identity of the state before the last transition.
    pub fn previous_id(&self) -> Option<StateId> {
        self.previous.map(|slot| self.slots[slot].id)
    }

    /// Whether the current state is of type `T`.
    pub fn current_is<T: State>(&self) -> bool {
        self.current_id() == Some(StateId::of::<T>())
    }

    /// Borrow the cached instance of `T`, if one has been created.
    pub fn get<T: State>(&self) -> Option<&T> {
        let slot = *self.index.get(&TypeId::of::<T>())?;
        let any: &dyn Any = self.slots[slot].instance.as_ref();
        any.downcast_ref::<T>()
    }

    /// Mutably borrow the cached instance of `T`, if one has been created.
    pub fn get_mut<T: State>(&mut self) -> Option<&mut T> {
        let slot = *self.index.get(&TypeId::of::<T>())?;
        let any: &mut dyn Any = self.slots[slot].instance.as_mut();
        any.downcast_mut::<T>()
    }

    /// Start declaring a transition out of state `S`.
    pub fn from<S: State>(&mut self) -> TransitionSource<'_> {
        TransitionSource::typed::<S>(self)
    }

    /// Start declaring a global transition, checked before the current
    /// state's own on every tick.
    pub fn from_any(&mut self) -> TransitionSource<'_> {
        TransitionSource::any(self)
    }

    pub(crate) fn any_id(&self) -> StateId {
        self.slots[ANY_SLOT].id
    }

    pub(crate) fn current_view(&self) -> Option<TickView> {
        let current = self.current?;
        Some(TickView {
            current: self.slots[current].id,
            previous: self.previous.map(|slot| self.slots[slot].id),
        })
    }

    pub(crate) fn slots(&self) -> &[StateSlot] {
        &self.slots
    }

    pub(crate) fn transitions_of(&self, id: StateId) -> Option<&[Transition]> {
        let slot = *self.index.get(&id.type_id())?;
        Some(&self.slots[slot].transitions)
    }

    pub(crate) fn add_transition(
        &mut self,
        source: StateId,
        transition: Transition,
    ) -> Result<(), BuildError> {
        let Some(&slot) = self.index.get(&source.type_id()) else {
            return Err(BuildError::Factory(MachineError::UnknownState {
                name: source.name(),
            }));
        };

        let transitions = &mut self.slots[slot].transitions;
        if transitions.iter().any(|existing| *existing == transition) {
            return Err(BuildError::DuplicateTransition {
                from: source.name(),
                to: transition.target().describe(),
            });
        }
        transitions.push(transition);
        Ok(())
    }
}
