use std::collections::HashMap;

use log::debug;
use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::expr::{Expr, ExprError};
use crate::reference::Ref;
use crate::solver::blast::{to_expr, Blaster, SymbolTable};
use crate::solver::{BinItpPattern, ItpSolver, Partition, Solver, SolverError, SolverId, SolverStatus};
use crate::valuation::Model;

/// One scope.
///
/// `all` is the conjunction of everything asserted in this scope and the
/// enclosing ones. The partition lists hold this scope's own assertions and
/// are only conjoined when an interpolant is requested.
#[derive(Debug, Clone)]
struct Frame {
    all: Ref,
    plain: Vec<Ref>,
    a: Vec<Ref>,
    b: Vec<Ref>,
}

impl Frame {
    fn new(all: Ref) -> Self {
        Frame {
            all,
            plain: Vec::new(),
            a: Vec::new(),
            b: Vec::new(),
        }
    }

    fn part(&self, partition: Partition) -> &[Ref] {
        match partition {
            Partition::A => &self.a,
            Partition::B => &self.b,
        }
    }
}

/// A complete decision procedure for bounded formulas, backed by BDDs.
///
/// Every assertion is bit-blasted into the shared manager and conjoined into
/// the running context of the innermost scope, whatever its partition.
/// Checking is a comparison against the zero BDD, and interpolants are
/// obtained by existential quantification, so no answer is ever
/// [`Unknown`][SolverStatus::Unknown].
///
/// # Examples
///
/// ```
/// use bounded_rs::expr::Expr;
/// use bounded_rs::solver::{BddSolver, Solver, SolverStatus};
/// use bounded_rs::types::{Symbol, Value, Var};
///
/// let x = Var::int("x", 8);
/// let mut solver = BddSolver::new();
/// solver.add(&Expr::eq(Expr::add(Expr::sym(&x, 0), Expr::int(1)), Expr::int(5)))?;
/// assert_eq!(solver.check()?, SolverStatus::Sat);
/// assert_eq!(solver.model()?.get(&Symbol::new(x, 0)), Some(Value::Int(4)));
/// # Ok::<(), bounded_rs::solver::SolverError>(())
/// ```
pub struct BddSolver {
    id: SolverId,
    bdd: Bdd,
    symbols: SymbolTable,
    frames: Vec<Frame>,
    last: Option<(SolverStatus, Ref)>,
}

impl BddSolver {
    pub fn new() -> Self {
        Self::with_storage_bits(16)
    }

    /// Creates a solver whose BDD manager pre-allocates `2^bits` nodes.
    pub fn with_storage_bits(bits: usize) -> Self {
        let bdd = Bdd::new(bits);
        let top = Frame::new(bdd.one);
        BddSolver {
            id: SolverId::fresh(),
            bdd,
            symbols: SymbolTable::default(),
            frames: vec![top],
            last: None,
        }
    }

    /// Number of BDD variables allocated so far.
    pub fn num_vars(&self) -> usize {
        self.symbols.num_vars()
    }

    /// Number of open scopes, the outermost included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of assignments to the allocated BDD variables satisfying the
    /// active assertions.
    pub fn model_count(&self) -> BigUint {
        self.bdd.sat_count(self.context(), self.num_vars())
    }

    fn encode(&mut self, expr: &Expr) -> Result<Ref, SolverError> {
        if expr.is_unindexed() {
            return Err(ExprError::Unindexed(expr.to_string()).into());
        }
        let f = Blaster::new(&self.bdd, &mut self.symbols).encode_bool(expr)?;
        Ok(f)
    }

    /// Conjunction of all active assertions.
    fn context(&self) -> Ref {
        self.frames.last().map_or(self.bdd.one, |frame| frame.all)
    }

    fn assert_in(&mut self, partition: Option<Partition>, expr: &Expr) -> Result<(), SolverError> {
        let f = self.encode(expr)?;
        self.last = None;
        let bdd = &self.bdd;
        let Some(frame) = self.frames.last_mut() else {
            return Err(SolverError::EmptyScope);
        };
        frame.all = bdd.apply_and(frame.all, f);
        match partition {
            None => frame.plain.push(f),
            Some(Partition::A) => frame.a.push(f),
            Some(Partition::B) => frame.b.push(f),
        }
        Ok(())
    }
}

impl Default for BddSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for BddSolver {
    fn id(&self) -> SolverId {
        self.id
    }

    fn add(&mut self, expr: &Expr) -> Result<(), SolverError> {
        self.assert_in(None, expr)
    }

    fn push(&mut self) {
        self.last = None;
        let all = self.context();
        self.frames.push(Frame::new(all));
    }

    fn pop(&mut self) -> Result<(), SolverError> {
        if self.frames.len() <= 1 {
            return Err(SolverError::EmptyScope);
        }
        self.last = None;
        self.frames.pop();
        Ok(())
    }

    fn check(&mut self) -> Result<SolverStatus, SolverError> {
        let all = self.context();
        let status = if self.bdd.is_zero(all) {
            SolverStatus::Unsat
        } else {
            SolverStatus::Sat
        };
        debug!(
            "{}: {} with {} scope(s), {} node(s)",
            self.id,
            status,
            self.frames.len(),
            self.bdd.size(all)
        );
        self.last = Some((status, all));
        Ok(status)
    }

    fn model(&self) -> Result<Model, SolverError> {
        let Some((SolverStatus::Sat, all)) = self.last else {
            return Err(SolverError::NoModel);
        };
        let literals = self.bdd.one_sat(all).ok_or(SolverError::NoModel)?;
        let assignment: HashMap<u32, bool> = literals
            .into_iter()
            .map(|lit| (lit.unsigned_abs(), lit > 0))
            .collect();
        let values = self
            .symbols
            .symbols()
            .filter_map(|(symbol, _)| {
                let value = self.symbols.decode(symbol, &assignment)?;
                Some((symbol.clone(), value))
            })
            .collect();
        Ok(Model::complete(values))
    }
}

impl ItpSolver for BddSolver {
    fn add_to(&mut self, partition: Partition, expr: &Expr) -> Result<(), SolverError> {
        self.assert_in(Some(partition), expr)
    }

    fn interpolant(&self, pattern: &BinItpPattern) -> Result<Expr, SolverError> {
        if !matches!(self.last, Some((SolverStatus::Unsat, _))) {
            return Err(SolverError::NoInterpolant);
        }
        let a = self.bdd.apply_and_many(
            self.frames
                .iter()
                .flat_map(|frame| frame.plain.iter().chain(frame.part(pattern.a())).copied()),
        );
        let b = self
            .bdd
            .apply_and_many(self.frames.iter().flat_map(|frame| frame.part(pattern.b()).iter().copied()));

        let shared = self.bdd.support(b);
        let local = self
            .bdd
            .support(a)
            .into_iter()
            .filter(|v| !shared.contains(v))
            .collect();
        let itp = self.bdd.exists(a, &local);
        debug!(
            "{}: interpolant over {} variable(s), {} node(s)",
            self.id,
            self.bdd.support(itp).len(),
            self.bdd.size(itp)
        );
        to_expr(&self.bdd, &self.symbols, itp)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::{Symbol, Value, Var};

    #[test]
    fn test_scopes() {
        let b = Var::bool("b");
        let mut solver = BddSolver::new();

        solver.add(&Expr::sym(&b, 0)).unwrap();
        assert_eq!(solver.check().unwrap(), SolverStatus::Sat);

        solver.push();
        solver.add(&Expr::not(Expr::sym(&b, 0))).unwrap();
        assert_eq!(solver.check().unwrap(), SolverStatus::Unsat);
        assert_eq!(solver.model().unwrap_err(), SolverError::NoModel);

        solver.pop().unwrap();
        assert_eq!(solver.check().unwrap(), SolverStatus::Sat);
        assert_eq!(solver.model().unwrap().get(&Symbol::new(b, 0)), Some(Value::Bool(true)));

        assert_eq!(solver.pop(), Err(SolverError::EmptyScope));
    }

    #[test]
    fn test_model_is_complete() {
        let x = Var::int("x", 8);
        let y = Var::int("y", 8);
        let mut solver = BddSolver::new();

        solver
            .add(&Expr::eq(Expr::sym(&x, 1), Expr::sub(Expr::sym(&x, 0), Expr::int(3))))
            .unwrap();
        solver.add(&Expr::eq(Expr::sym(&x, 0), Expr::int(-127))).unwrap();
        assert!(solver.check().unwrap().is_sat());

        let model = solver.model().unwrap();
        assert_eq!(model.get(&Symbol::new(x.clone(), 0)), Some(Value::Int(-127)));
        assert_eq!(model.get(&Symbol::new(x, 1)), Some(Value::Int(126)));
        assert_eq!(model.get(&Symbol::new(y, 0)), Some(Value::Int(0)));
    }

    #[test]
    fn test_model_invalidated_by_add() {
        let b = Var::bool("b");
        let mut solver = BddSolver::new();
        solver.add(&Expr::sym(&b, 0)).unwrap();
        solver.check().unwrap();
        solver.add(&Expr::sym(&b, 1)).unwrap();
        assert_eq!(solver.model().unwrap_err(), SolverError::NoModel);
    }

    #[test]
    fn test_rejects_unindexed() {
        let x = Var::int("x", 8);
        let mut solver = BddSolver::new();
        let err = solver.add(&Expr::lt(Expr::var(&x), Expr::int(5))).unwrap_err();
        assert!(matches!(err, SolverError::Encoding(ExprError::Unindexed(_))));
    }

    #[test]
    fn test_interpolant() {
        let x = Var::int("x", 8);
        let mut solver = BddSolver::new();
        let pattern = BinItpPattern::new(Partition::A, Partition::B).unwrap();

        // A: x0 = 0 && x1 = x0 + 1
        solver.add_to(Partition::A, &Expr::eq(Expr::sym(&x, 0), Expr::int(0))).unwrap();
        solver
            .add_to(
                Partition::A,
                &Expr::eq(Expr::sym(&x, 1), Expr::add(Expr::sym(&x, 0), Expr::int(1))),
            )
            .unwrap();
        // B: x1 > 5
        solver.add_to(Partition::B, &Expr::gt(Expr::sym(&x, 1), Expr::int(5))).unwrap();

        assert_eq!(solver.interpolant(&pattern).unwrap_err(), SolverError::NoInterpolant);
        assert!(solver.check().unwrap().is_unsat());

        let itp = solver.interpolant(&pattern).unwrap();
        assert!(itp.symbols().iter().all(|s| s.generation() == 1));

        // A implies the interpolant...
        let mut check = BddSolver::new();
        check.add(&Expr::eq(Expr::sym(&x, 1), Expr::int(1))).unwrap();
        check.add(&Expr::not(itp.clone())).unwrap();
        assert!(check.check().unwrap().is_unsat());

        // ...and the interpolant contradicts B.
        let mut check = BddSolver::new();
        check.add(&itp).unwrap();
        check.add(&Expr::gt(Expr::sym(&x, 1), Expr::int(5))).unwrap();
        assert!(check.check().unwrap().is_unsat());
    }

    #[test]
    fn test_model_count() {
        let x = Var::int("x", 3);
        let mut solver = BddSolver::new();
        solver.add(&Expr::ge(Expr::sym(&x, 0), Expr::int(0))).unwrap();
        assert_eq!(solver.model_count(), BigUint::from(4u32));
    }

    #[test]
    fn test_scoped_assertions_see_the_context() {
        let x = Var::int("x", 8);
        let mut solver = BddSolver::new();

        // A single path x0 = 0, x1 = 1, ..., x6 = 6.
        solver.add(&Expr::eq(Expr::sym(&x, 0), Expr::int(0))).unwrap();
        for i in 0..6 {
            let next = Expr::add(Expr::sym(&x, i), Expr::int(1));
            solver.add(&Expr::eq(Expr::sym(&x, i + 1), next)).unwrap();
        }

        solver.push();
        for i in 0..6 {
            let same = Expr::eq(Expr::sym(&x, 6), Expr::sym(&x, i));
            solver.add_to(Partition::A, &Expr::not(same)).unwrap();
        }
        assert!(solver.check().unwrap().is_sat());
        assert_eq!(solver.model_count(), BigUint::from(1u32));
        let all = solver.context();
        assert!(solver.bdd.size(all) <= solver.num_vars() + 1);

        solver.add_to(Partition::B, &Expr::eq(Expr::sym(&x, 6), Expr::sym(&x, 0))).unwrap();
        assert!(solver.check().unwrap().is_unsat());

        solver.pop().unwrap();
        assert!(solver.check().unwrap().is_sat());
        assert_eq!(solver.model().unwrap().get(&Symbol::new(x, 6)), Some(Value::Int(6)));
    }

    #[test]
    fn test_interpolant_spans_scopes() {
        let x = Var::int("x", 4);
        let mut solver = BddSolver::new();
        let pattern = BinItpPattern::new(Partition::A, Partition::B).unwrap();

        // Plain assertions of the outer scope belong to A.
        solver.add(&Expr::eq(Expr::sym(&x, 0), Expr::int(2))).unwrap();
        solver.push();
        solver
            .add_to(
                Partition::A,
                &Expr::eq(Expr::sym(&x, 1), Expr::add(Expr::sym(&x, 0), Expr::int(1))),
            )
            .unwrap();
        solver.push();
        solver.add_to(Partition::B, &Expr::lt(Expr::sym(&x, 1), Expr::int(0))).unwrap();
        assert!(solver.check().unwrap().is_unsat());

        let itp = solver.interpolant(&pattern).unwrap();
        assert!(itp.symbols().iter().all(|s| s.generation() == 1));

        let mut check = BddSolver::new();
        check.add(&itp).unwrap();
        check.add(&Expr::eq(Expr::sym(&x, 1), Expr::int(3))).unwrap();
        assert!(check.check().unwrap().is_sat());
        assert_eq!(check.model_count(), BigUint::from(1u32));
    }
}
