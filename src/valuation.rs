use std::collections::BTreeMap;
use std::fmt;

use crate::types::{Symbol, Value, Var};

/// Concrete values of base variables: one state of a transition system.
#[derive(Debug, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Valuation {
    values: BTreeMap<Var, Value>,
}

impl Valuation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, var: Var, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(var, value.into())
    }

    /// Chainable version of [`insert`][Valuation::insert].
    pub fn with(mut self, var: &Var, value: impl Into<Value>) -> Self {
        self.insert(var.clone(), value);
        self
    }

    pub fn get(&self, var: &Var) -> Option<Value> {
        self.values.get(var).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Var, Value)> + '_ {
        self.values.iter().map(|(var, &value)| (var, value))
    }
}

impl FromIterator<(Var, Value)> for Valuation {
    fn from_iter<T: IntoIterator<Item = (Var, Value)>>(iter: T) -> Self {
        Valuation {
            values: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", var, value)?;
        }
        write!(f, "}}")
    }
}

/// A satisfying assignment reported by a solver, over indexed symbols.
///
/// A complete model assigns every symbol: the ones the solver never saw are
/// unconstrained and take their sort's default value.
#[derive(Debug, Clone, Default)]
pub struct Model {
    values: BTreeMap<Symbol, Value>,
    complete: bool,
}

impl Model {
    pub fn partial(values: BTreeMap<Symbol, Value>) -> Self {
        Model {
            values,
            complete: false,
        }
    }

    pub fn complete(values: BTreeMap<Symbol, Value>) -> Self {
        Model {
            values,
            complete: true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn get(&self, symbol: &Symbol) -> Option<Value> {
        match self.values.get(symbol) {
            Some(&value) => Some(value),
            None if self.complete => Some(Value::default_for(symbol.sort())),
            None => None,
        }
    }

    /// Explicitly assigned symbols.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, Value)> + '_ {
        self.values.iter().map(|(symbol, &value)| (symbol, value))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_valuation() {
        let x = Var::int("x", 8);
        let b = Var::bool("b");
        let v = Valuation::new().with(&x, 3).with(&b, true);
        assert_eq!(v.get(&x), Some(Value::Int(3)));
        assert_eq!(v.get(&b), Some(Value::Bool(true)));
        assert_eq!(v.len(), 2);
        assert_eq!(v.to_string(), "{b = true, x = 3}");
    }

    #[test]
    fn test_model_defaults() {
        let x = Var::int("x", 8);
        let b = Var::bool("b");
        let values = BTreeMap::from([(Symbol::new(x.clone(), 0), Value::Int(7))]);

        let partial = Model::partial(values.clone());
        assert_eq!(partial.get(&Symbol::new(x.clone(), 0)), Some(Value::Int(7)));
        assert_eq!(partial.get(&Symbol::new(x.clone(), 1)), None);

        let complete = Model::complete(values);
        assert_eq!(complete.get(&Symbol::new(x.clone(), 1)), Some(Value::Int(0)));
        assert_eq!(complete.get(&Symbol::new(b, 4)), Some(Value::Bool(false)));
    }
}
