//! Macros for declaring states with minimal boilerplate.

/// Declare unit-struct states with no-op lifecycle hooks.
///
/// Each declared type derives `Default` so it can be registered with
/// [`StateFactory::register_default`](crate::StateFactory::register_default).
///
/// # Example
///
/// ```
/// use playstate::unit_states;
///
/// unit_states! {
///     pub struct Title;
///     pub struct Credits;
/// }
/// ```
#[macro_export]
macro_rules! unit_states {
    ($($(#[$meta:meta])* $vis:vis struct $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Default)]
            $vis struct $name;

            impl $crate::State for $name {}
        )+
    };
}

#[cfg(test)]
mod tests {
    use crate::machine::{StateFactory, StateMachine};

    unit_states! {
        struct Splash;
        struct Attract;
    }

    #[test]
    fn unit_states_work_as_machine_states() {
        let mut machine = StateMachine::new(
            StateFactory::new()
                .register_default::<Splash>()
                .register_default::<Attract>(),
        );

        machine.from::<Splash>().to::<Attract>().always().unwrap();
        machine.set_initial_state::<Splash>().unwrap();
        machine.update().unwrap();

        assert!(machine.current_is::<Attract>());
    }

    #[test]
    fn unit_states_supports_visibility_and_attributes() {
        unit_states! {
            /// Shown while assets stream in.
            pub struct Loading;
        }

        let _state = Loading;
    }
}
