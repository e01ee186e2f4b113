//! Mermaid graph export for debug introspection.

use std::fmt::Write;

use crate::core::Target;
use crate::machine::machine::StateMachine;

impl StateMachine {
    /// Render the transition graph as a Mermaid `stateDiagram-v2` string:
    /// one edge line per registered transition, states in creation order,
    /// transitions in registration order.
    ///
    /// A deferred destination is resolved against the machine's current
    /// pointers; when it cannot be resolved (for example a "back" transition
    /// before any transition has occurred) the edge is labeled `AnyState`.
    ///
    /// Pure: mutates nothing and is safe to call at any point after
    /// construction, even before the first tick.
    pub fn to_mermaid(&self) -> String {
        let view = self.current_view();
        let mut out = String::from("stateDiagram-v2\n");
        for slot in self.slots() {
            for transition in &slot.transitions {
                let label = match transition.target() {
                    Target::Fixed(id) => id.name(),
                    Target::Deferred(resolver) => view
                        .as_ref()
                        .and_then(|view| resolver(view))
                        .map_or("AnyState", |id| id.name()),
                };
                let _ = writeln!(out, "    {} --> {}", slot.id, label);
            }
        }
        out
    }
}
