//! Constructor registry for state instances.

use std::any::TypeId;
use std::collections::HashMap;

use crate::core::{State, StateId};
use crate::machine::error::MachineError;

type Constructor = Box<dyn Fn() -> Box<dyn State>>;
type Resolver = Box<dyn Fn(StateId) -> Option<Box<dyn State>>>;

/// Creates state instances on first access.
///
/// A factory is configured once, before it is handed to
/// [`StateMachine::new`](crate::StateMachine::new), with any mix of:
/// - per-type constructor closures ([`register`](Self::register)),
/// - per-type default construction ([`register_default`](Self::register_default)),
/// - a single polymorphic resolver keyed by [`StateId`]
///   ([`resolver`](Self::resolver)).
///
/// Lookup tries the per-type entry first, then the resolver. Asking for a
/// state covered by neither is a [`MachineError::UnknownState`].
///
/// ```rust
/// use playstate::{State, StateFactory};
///
/// #[derive(Default)]
/// struct Title;
/// impl State for Title {}
///
/// struct Play {
///     lives: u32,
/// }
/// impl State for Play {}
///
/// let factory = StateFactory::new()
///     .register_default::<Title>()
///     .register(|| Play { lives: 3 });
/// ```
#[derive(Default)]
pub struct StateFactory {
    constructors: HashMap<TypeId, Constructor>,
    resolver: Option<Resolver>,
}

impl StateFactory {
    /// An empty factory; every state must be registered or resolvable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor closure for state type `T`.
    pub fn register<T, F>(mut self, constructor: F) -> Self
    where
        T: State,
        F: Fn() -> T + 'static,
    {
        self.constructors
            .insert(TypeId::of::<T>(), Box::new(move || Box::new(constructor())));
        self
    }

    /// Register default construction for state type `T`.
    pub fn register_default<T>(self) -> Self
    where
        T: State + Default,
    {
        self.register(T::default)
    }

    /// Install a polymorphic constructor consulted for every state type
    /// without its own registration. Returning `None` declines the request.
    pub fn resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(StateId) -> Option<Box<dyn State>> + 'static,
    {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub(crate) fn create(&self, id: StateId) -> Result<Box<dyn State>, MachineError> {
        if let Some(constructor) = self.constructors.get(&id.type_id()) {
            return Ok(constructor());
        }
        if let Some(resolver) = &self.resolver {
            if let Some(instance) = resolver(id) {
                return Ok(instance);
            }
        }
        Err(MachineError::UnknownState { name: id.name() })
    }
}
