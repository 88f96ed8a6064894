//! Incremental solving capabilities consumed by the checker.
//!
//! A [`Solver`] accepts formulas over indexed symbols, supports scoped
//! assertions with [`push`][Solver::push]/[`pop`][Solver::pop], and reports a
//! [`Model`] after a satisfiable check. An [`ItpSolver`] additionally assigns
//! formulas to one of two [`Partition`]s and extracts Craig interpolants.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::expr::{Expr, ExprError};
use crate::valuation::Model;

pub mod blast;
pub mod bdd;
pub mod shared;

pub use self::bdd::BddSolver;
pub use self::shared::SharedSolver;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SolverStatus {
    Sat,
    Unsat,
    Unknown,
}

impl SolverStatus {
    pub fn is_sat(self) -> bool {
        self == SolverStatus::Sat
    }
    pub fn is_unsat(self) -> bool {
        self == SolverStatus::Unsat
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverStatus::Sat => write!(f, "SAT"),
            SolverStatus::Unsat => write!(f, "UNSAT"),
            SolverStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Identity of a solver instance.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SolverId(u64);

impl SolverId {
    /// A process-wide unique id.
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SolverId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "solver#{}", self.0)
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SolverError {
    #[error("pop without a matching push")]
    EmptyScope,

    #[error("model requested, but the last check was not satisfiable")]
    NoModel,

    #[error("interpolant requested, but the last check was not unsatisfiable")]
    NoInterpolant,

    #[error("binary pattern over a single partition {0:?}")]
    DegeneratePattern(Partition),

    #[error("BDD variable x{0} does not belong to any symbol")]
    ForeignVariable(u32),

    #[error(transparent)]
    Encoding(#[from] ExprError),
}

pub trait Solver {
    fn id(&self) -> SolverId;

    /// Asserts a formula in the innermost scope.
    fn add(&mut self, expr: &Expr) -> Result<(), SolverError>;

    fn push(&mut self);

    /// Discards the innermost scope and everything asserted in it.
    fn pop(&mut self) -> Result<(), SolverError>;

    fn check(&mut self) -> Result<SolverStatus, SolverError>;

    /// The model of the last check. Valid until the next `add`, `push` or `pop`.
    fn model(&self) -> Result<Model, SolverError>;
}

/// The two sides of a binary interpolation query.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Partition {
    A,
    B,
}

/// Request for an interpolant of `a` with respect to `b`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BinItpPattern {
    a: Partition,
    b: Partition,
}

impl BinItpPattern {
    pub fn new(a: Partition, b: Partition) -> Result<Self, SolverError> {
        if a == b {
            return Err(SolverError::DegeneratePattern(a));
        }
        Ok(BinItpPattern { a, b })
    }

    pub fn a(&self) -> Partition {
        self.a
    }
    pub fn b(&self) -> Partition {
        self.b
    }
}

pub trait ItpSolver: Solver {
    /// Asserts a formula in the innermost scope, as part of `partition`.
    fn add_to(&mut self, partition: Partition, expr: &Expr) -> Result<(), SolverError>;

    /// After an unsatisfiable check, a formula `I` over the symbols shared by
    /// both sides such that `a ⊨ I` and `I ∧ b` is unsatisfiable.
    ///
    /// Assertions made without a partition count as part of `a`.
    fn interpolant(&self, pattern: &BinItpPattern) -> Result<Expr, SolverError>;
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_fresh_ids_differ() {
        let a = SolverId::fresh();
        let b = SolverId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn test_pattern_rejects_single_partition() {
        assert!(BinItpPattern::new(Partition::A, Partition::B).is_ok());
        assert_eq!(
            BinItpPattern::new(Partition::B, Partition::B),
            Err(SolverError::DegeneratePattern(Partition::B))
        );
    }
}
