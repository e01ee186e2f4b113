//! Guarded, weighted edges between states.
//!
//! A transition belongs to exactly one source state and names its
//! destination either directly ([`Target::Fixed`]) or through a resolver
//! evaluated at check time ([`Target::Deferred`]) — the latter is how
//! "back to the previous state" adapts to whatever the previous state is
//! when the tick runs.

use std::fmt;
use std::rc::Rc;

use crate::core::condition::Condition;
use crate::core::state::{State, StateId};

/// Snapshot of the machine's pointers handed to a resolution pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickView {
    /// The state the machine is currently in.
    pub current: StateId,
    /// The state before the last transition, if any has occurred.
    pub previous: Option<StateId>,
}

/// Destination of a transition, resolved at check time.
#[derive(Clone)]
pub enum Target {
    /// A destination known when the transition was built.
    Fixed(StateId),
    /// A destination computed per tick; returning `None` disqualifies the
    /// transition for that tick.
    Deferred(Rc<dyn Fn(&TickView) -> Option<StateId>>),
}

impl Target {
    /// Resolve the destination against the current tick.
    pub fn resolve(&self, view: &TickView) -> Option<StateId> {
        match self {
            Target::Fixed(id) => Some(*id),
            Target::Deferred(resolver) => resolver(view),
        }
    }

    /// Identity comparison for duplicate detection: fixed targets compare by
    /// state id, deferred targets by resolver closure.
    fn same_target(&self, other: &Target) -> bool {
        match (self, other) {
            (Target::Fixed(a), Target::Fixed(b)) => a == b,
            (Target::Deferred(a), Target::Deferred(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Target::Fixed(id) => id.name().to_string(),
            Target::Deferred(_) => "(deferred)".to_string(),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Fixed(id) => f.debug_tuple("Fixed").field(id).finish(),
            Target::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Tie-break weight and reentry policy of a transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionParams {
    /// Breaks ties when several transitions are satisfied on the same pass;
    /// the strictly greatest weight wins.
    pub weight: f32,
    /// Whether the transition may land on the state that is already current.
    pub allow_reentry: bool,
}

impl Default for TransitionParams {
    fn default() -> Self {
        Self {
            weight: 1.0,
            allow_reentry: false,
        }
    }
}

/// Installs a carried context value on the destination instance at commit
/// time. Returns false when the instance is not of the expected type.
pub(crate) type ContextInjector = Rc<dyn Fn(&mut dyn State) -> bool>;

/// A guarded, weighted edge owned by its source state.
#[derive(Clone)]
pub struct Transition {
    target: Target,
    condition: Option<Condition>,
    params: TransitionParams,
    inject: Option<ContextInjector>,
}

impl Transition {
    pub(crate) fn new(
        target: Target,
        condition: Option<Condition>,
        params: TransitionParams,
        inject: Option<ContextInjector>,
    ) -> Self {
        Self {
            target,
            condition,
            params,
            inject,
        }
    }

    /// The transition's destination.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The guard, or `None` for an unconditional transition.
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Weight and reentry policy.
    pub fn params(&self) -> TransitionParams {
        self.params
    }

    /// Whether the guard holds this tick. Unconditional transitions are
    /// always satisfied.
    pub fn is_satisfied(&self) -> bool {
        self.condition.as_ref().is_none_or(Condition::check)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("target", &self.target)
            .field("conditional", &self.condition.is_some())
            .field("params", &self.params)
            .finish()
    }
}

/// Structural identity: same destination resolution and same condition
/// identity. Weight and reentry policy are deliberately excluded — two
/// otherwise-identical registrations differing only in parameters are still
/// duplicates.
impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.target.same_target(&other.target)
            && match (&self.condition, &other.condition) {
                (None, None) => true,
                (Some(a), Some(b)) => a.same_predicate(b),
                _ => false,
            }
    }
}

/// Outcome of a resolution pass over one transition list.
pub(crate) struct Resolved {
    pub dest: StateId,
    pub inject: Option<ContextInjector>,
}

/// Evaluate a transition list against the current tick.
///
/// Linear scan in registration order. A transition survives when its
/// condition holds, its target resolves, and its destination is not the
/// current state unless reentry is allowed. Among survivors the strictly
/// greatest weight wins; the first registered survivor keeps a tied weight.
pub(crate) fn select(transitions: &[Transition], view: &TickView) -> Option<Resolved> {
    let mut best: Option<(&Transition, StateId)> = None;
    for transition in transitions {
        if !transition.is_satisfied() {
            continue;
        }
        let Some(dest) = transition.target.resolve(view) else {
            continue;
        };
        if !transition.params.allow_reentry && dest == view.current {
            continue;
        }
        match &best {
            Some((leader, _)) if transition.params.weight <= leader.params.weight => {}
            _ => best = Some((transition, dest)),
        }
    }

    best.map(|(transition, dest)| Resolved {
        dest,
        inject: transition.inject.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha;
    impl State for Alpha {}

    struct Beta;
    impl State for Beta {}

    struct Gamma;
    impl State for Gamma {}

    fn id<T: State>() -> StateId {
        StateId::of::<T>()
    }

    fn view_at<T: State>() -> TickView {
        TickView {
            current: id::<T>(),
            previous: None,
        }
    }

    fn fixed<T: State>(condition: Option<Condition>, weight: f32) -> Transition {
        Transition::new(
            Target::Fixed(id::<T>()),
            condition,
            TransitionParams {
                weight,
                allow_reentry: false,
            },
            None,
        )
    }

    #[test]
    fn unconditional_transition_is_always_satisfied() {
        assert!(fixed::<Beta>(None, 1.0).is_satisfied());
    }

    #[test]
    fn select_skips_unsatisfied_conditions() {
        let transitions = vec![fixed::<Beta>(Some(Condition::new(|| false)), 1.0)];
        assert!(select(&transitions, &view_at::<Alpha>()).is_none());
    }

    #[test]
    fn select_picks_strictly_greatest_weight() {
        let transitions = vec![fixed::<Beta>(None, 1.0), fixed::<Gamma>(None, 2.0)];
        let resolved = select(&transitions, &view_at::<Alpha>()).unwrap();
        assert_eq!(resolved.dest, id::<Gamma>());

        let reversed = vec![fixed::<Gamma>(None, 2.0), fixed::<Beta>(None, 1.0)];
        let resolved = select(&reversed, &view_at::<Alpha>()).unwrap();
        assert_eq!(resolved.dest, id::<Gamma>());
    }

    #[test]
    fn select_keeps_first_registered_on_equal_weight() {
        let transitions = vec![fixed::<Beta>(None, 1.0), fixed::<Gamma>(None, 1.0)];
        let resolved = select(&transitions, &view_at::<Alpha>()).unwrap();
        assert_eq!(resolved.dest, id::<Beta>());
    }

    #[test]
    fn select_rejects_reentry_by_default() {
        let transitions = vec![fixed::<Alpha>(None, 1.0)];
        assert!(select(&transitions, &view_at::<Alpha>()).is_none());
    }

    #[test]
    fn select_permits_explicit_reentry() {
        let transitions = vec![Transition::new(
            Target::Fixed(id::<Alpha>()),
            None,
            TransitionParams {
                weight: 1.0,
                allow_reentry: true,
            },
            None,
        )];
        let resolved = select(&transitions, &view_at::<Alpha>()).unwrap();
        assert_eq!(resolved.dest, id::<Alpha>());
    }

    #[test]
    fn unresolvable_deferred_target_disqualifies() {
        let back = Transition::new(
            Target::Deferred(Rc::new(|view: &TickView| view.previous)),
            None,
            TransitionParams::default(),
            None,
        );
        let transitions = vec![back];

        assert!(select(&transitions, &view_at::<Alpha>()).is_none());

        let with_previous = TickView {
            current: id::<Alpha>(),
            previous: Some(id::<Beta>()),
        };
        let resolved = select(&transitions, &with_previous).unwrap();
        assert_eq!(resolved.dest, id::<Beta>());
    }

    #[test]
    fn lower_weighted_reentry_does_not_shadow_survivor() {
        let transitions = vec![
            Transition::new(
                Target::Fixed(id::<Alpha>()),
                None,
                TransitionParams {
                    weight: 5.0,
                    allow_reentry: false,
                },
                None,
            ),
            fixed::<Beta>(None, 1.0),
        ];
        let resolved = select(&transitions, &view_at::<Alpha>()).unwrap();
        assert_eq!(resolved.dest, id::<Beta>());
    }

    #[test]
    fn structural_equality_tracks_target_and_condition_identity() {
        let condition = Condition::new(|| true);

        let a = fixed::<Beta>(Some(condition.clone()), 1.0);
        let b = fixed::<Beta>(Some(condition.clone()), 3.0);
        assert_eq!(a, b);

        let fresh = fixed::<Beta>(Some(Condition::new(|| true)), 1.0);
        assert_ne!(a, fresh);

        let other_dest = fixed::<Gamma>(Some(condition), 1.0);
        assert_ne!(a, other_dest);

        assert_eq!(fixed::<Beta>(None, 1.0), fixed::<Beta>(None, 2.0));
        assert_ne!(fixed::<Beta>(None, 1.0), a);
    }

    #[test]
    fn deferred_targets_compare_by_resolver_identity() {
        let resolver: Rc<dyn Fn(&TickView) -> Option<StateId>> =
            Rc::new(|view: &TickView| view.previous);

        let a = Transition::new(
            Target::Deferred(Rc::clone(&resolver)),
            None,
            TransitionParams::default(),
            None,
        );
        let b = Transition::new(
            Target::Deferred(resolver),
            None,
            TransitionParams::default(),
            None,
        );
        assert_eq!(a, b);

        let other = Transition::new(
            Target::Deferred(Rc::new(|view: &TickView| view.previous)),
            None,
            TransitionParams::default(),
            None,
        );
        assert_ne!(a, other);
    }
}
