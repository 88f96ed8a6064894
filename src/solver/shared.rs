use std::cell::{Ref as Borrowed, RefCell, RefMut};
use std::rc::Rc;

use crate::expr::Expr;
use crate::solver::{BinItpPattern, ItpSolver, Partition, Solver, SolverError, SolverId, SolverStatus};
use crate::valuation::Model;

/// A clonable handle to one solver instance.
///
/// All clones drive the same solver and report the same [`SolverId`]. Handing
/// two clones to two strategies of one checker is rejected when the checker
/// is built.
#[derive(Debug, Default)]
pub struct SharedSolver<S> {
    inner: Rc<RefCell<S>>,
}

impl<S> Clone for SharedSolver<S> {
    fn clone(&self) -> Self {
        SharedSolver {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> SharedSolver<S> {
    pub fn new(solver: S) -> Self {
        SharedSolver {
            inner: Rc::new(RefCell::new(solver)),
        }
    }

    pub fn borrow(&self) -> Borrowed<'_, S> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, S> {
        self.inner.borrow_mut()
    }
}

impl<S: Solver> Solver for SharedSolver<S> {
    fn id(&self) -> SolverId {
        self.inner.borrow().id()
    }

    fn add(&mut self, expr: &Expr) -> Result<(), SolverError> {
        self.inner.borrow_mut().add(expr)
    }

    fn push(&mut self) {
        self.inner.borrow_mut().push()
    }

    fn pop(&mut self) -> Result<(), SolverError> {
        self.inner.borrow_mut().pop()
    }

    fn check(&mut self) -> Result<SolverStatus, SolverError> {
        self.inner.borrow_mut().check()
    }

    fn model(&self) -> Result<Model, SolverError> {
        self.inner.borrow().model()
    }
}

impl<S: ItpSolver> ItpSolver for SharedSolver<S> {
    fn add_to(&mut self, partition: Partition, expr: &Expr) -> Result<(), SolverError> {
        self.inner.borrow_mut().add_to(partition, expr)
    }

    fn interpolant(&self, pattern: &BinItpPattern) -> Result<Expr, SolverError> {
        self.inner.borrow().interpolant(pattern)
    }
}
