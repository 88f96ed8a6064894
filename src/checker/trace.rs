use std::fmt;

use crate::types::{Value, Var};
use crate::valuation::Valuation;

/// A counterexample: states interleaved with the actions between them.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Trace<S, A> {
    states: Vec<S>,
    actions: Vec<A>,
}

impl<S, A> Trace<S, A> {
    /// # Panics
    ///
    /// Panics unless there is exactly one action less than there are states.
    pub fn new(states: Vec<S>, actions: Vec<A>) -> Self {
        assert!(!states.is_empty(), "Trace should have at least one state");
        assert_eq!(
            actions.len() + 1,
            states.len(),
            "Trace should have one action between each pair of states"
        );
        Trace { states, actions }
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// Number of actions.
    pub fn length(&self) -> usize {
        self.actions.len()
    }
}

impl<S: fmt::Display, A: fmt::Display> fmt::Display for Trace<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, state) in self.states.iter().enumerate() {
            if i > 0 {
                writeln!(f, "  --[{}]-->", self.actions[i - 1])?;
            }
            writeln!(f, "{}: {}", i, state)?;
        }
        Ok(())
    }
}

/// An action given by the variables that change value.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Update {
    changes: Vec<(Var, Value, Value)>,
}

impl Update {
    /// Variables of `after` whose value differs from `before`.
    pub fn between(before: &Valuation, after: &Valuation) -> Self {
        let changes = after
            .iter()
            .filter_map(|(var, new)| match before.get(var) {
                Some(old) if old == new => None,
                Some(old) => Some((var.clone(), old, new)),
                None => Some((var.clone(), Value::default_for(var.sort()), new)),
            })
            .collect();
        Update { changes }
    }

    /// `(variable, old value, new value)` triples, ordered by variable.
    pub fn changes(&self) -> &[(Var, Value, Value)] {
        &self.changes
    }

    pub fn is_stutter(&self) -> bool {
        self.changes.is_empty()
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changes.is_empty() {
            return write!(f, "skip");
        }
        for (i, (var, old, new)) in self.changes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {} -> {}", var, old, new)?;
        }
        Ok(())
    }
}
