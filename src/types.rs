//! Sorts, values and variables of transition systems.
//!
//! Integers are signed two's complement of a fixed width. Arithmetic wraps at
//! the width of the expression (see [`Expr`][crate::expr::Expr]), comparisons
//! are exact.

use std::fmt;
use std::sync::Arc;

/// The sort of a state variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Sort {
    Bool,
    /// Signed two's complement integer of the given width.
    Int { bits: u32 },
}

impl Sort {
    /// Creates an integer sort.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not in `1..=32`.
    pub fn int(bits: u32) -> Self {
        assert!(
            (1..=32).contains(&bits),
            "Integer width should be in the range 1..=32"
        );
        Sort::Int { bits }
    }

    /// Number of bits needed to store a value of this sort.
    pub fn bits(self) -> u32 {
        match self {
            Sort::Bool => 1,
            Sort::Int { bits } => bits,
        }
    }

    pub fn is_bool(self) -> bool {
        matches!(self, Sort::Bool)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "bool"),
            Sort::Int { bits } => write!(f, "i{}", bits),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Value {
    Bool(bool),
    Int(i64),
}

impl Value {
    /// The value an unconstrained variable of the given sort takes.
    pub fn default_for(sort: Sort) -> Self {
        match sort {
            Sort::Bool => Value::Bool(false),
            Sort::Int { .. } => Value::Int(0),
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            Value::Int(_) => None,
        }
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(v),
            Value::Bool(_) => None,
        }
    }

    /// Whether the value is a member of the given sort.
    pub fn fits(self, sort: Sort) -> bool {
        match (self, sort) {
            (Value::Bool(_), Sort::Bool) => true,
            (Value::Int(v), Sort::Int { bits }) => wrap_signed(v, bits) == v,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

/// Truncates `value` to `bits` bits and sign-extends the result.
pub fn wrap_signed(value: i64, bits: u32) -> i64 {
    assert!((1..=64).contains(&bits));
    let shift = 64 - bits;
    (value << shift) >> shift
}

/// The smallest two's complement width able to hold `value`.
pub fn signed_width(value: i64) -> u32 {
    let magnitude = if value < 0 { !value } else { value };
    65 - magnitude.leading_zeros()
}

/// A state variable of a transition system.
///
/// Variables are compared by name first, so two variables with the same name
/// and different sorts are distinct (but confusing).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var {
    name: Arc<str>,
    sort: Sort,
}

impl Var {
    pub fn new(name: &str, sort: Sort) -> Self {
        Var {
            name: Arc::from(name),
            sort,
        }
    }

    pub fn bool(name: &str) -> Self {
        Var::new(name, Sort::Bool)
    }

    pub fn int(name: &str, bits: u32) -> Self {
        Var::new(name, Sort::int(bits))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A variable tagged with a generation: the copy of `var` at one unrolling step.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Symbol {
    var: Var,
    generation: u32,
}

impl Symbol {
    pub fn new(var: Var, generation: u32) -> Self {
        Symbol { var, generation }
    }

    pub fn var(&self) -> &Var {
        &self.var
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn sort(&self) -> Sort {
        self.var.sort()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.var, self.generation)
    }
}
