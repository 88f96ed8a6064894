//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use bounded_rs::checker::{Trace, Update};
use bounded_rs::eval::{eval_step, holds};
use bounded_rs::expr::Expr;
use bounded_rs::solver::{BinItpPattern, ItpSolver, Partition, Solver, SolverError, SolverId, SolverStatus};
use bounded_rs::system::MonolithicSystem;
use bounded_rs::types::{Value, Var};
use bounded_rs::valuation::{Model, Valuation};

// ─── Systems ───────────────────────────────────────────────────────────────────

/// `x := 0; loop { x := x + step }` with the property `x < limit`.
pub fn counter(bits: u32, step: i64, limit: i64) -> MonolithicSystem {
    let x = Var::int("x", bits);
    MonolithicSystem::new(
        Expr::eq(Expr::var(&x), Expr::int(0)),
        Expr::eq(Expr::prime(Expr::var(&x)), Expr::add(Expr::var(&x), Expr::int(step))),
        Expr::lt(Expr::var(&x), Expr::int(limit)),
    )
}

/// `x := 0; loop { skip }` with the property `x >= 0`.
pub fn stutter(bits: u32) -> MonolithicSystem {
    let x = Var::int("x", bits);
    MonolithicSystem::new(
        Expr::eq(Expr::var(&x), Expr::int(0)),
        Expr::eq(Expr::prime(Expr::var(&x)), Expr::var(&x)),
        Expr::ge(Expr::var(&x), Expr::int(0)),
    )
}

/// A flag toggling every step, and a counter incremented only while the flag is set.
pub fn toggle(bits: u32, limit: i64) -> MonolithicSystem {
    let b = Var::bool("b");
    let x = Var::int("x", bits);
    MonolithicSystem::new(
        Expr::and([Expr::not(Expr::var(&b)), Expr::eq(Expr::var(&x), Expr::int(0))]),
        Expr::and([
            Expr::eq(Expr::prime(Expr::var(&b)), Expr::not(Expr::var(&b))),
            Expr::eq(
                Expr::prime(Expr::var(&x)),
                Expr::ite(
                    Expr::var(&b),
                    Expr::add(Expr::var(&x), Expr::int(1)),
                    Expr::var(&x),
                ),
            ),
        ]),
        Expr::lt(Expr::var(&x), Expr::int(limit)),
    )
}

/// `x` either stays or moves up by `step`, but never above `cap`.
pub fn capped(bits: u32, step: i64, cap: i64, limit: i64) -> MonolithicSystem {
    let x = Var::int("x", bits);
    let next = Expr::prime(Expr::var(&x));
    let up = Expr::add(Expr::var(&x), Expr::int(step));
    MonolithicSystem::new(
        Expr::eq(Expr::var(&x), Expr::int(0)),
        Expr::or([
            Expr::eq(next.clone(), Expr::var(&x)),
            Expr::and([Expr::le(up.clone(), Expr::int(cap)), Expr::eq(next, up)]),
        ]),
        Expr::le(Expr::var(&x), Expr::int(limit)),
    )
}

// ─── Explicit-state oracle ─────────────────────────────────────────────────────

fn domain(var: &Var) -> Vec<Value> {
    let sort = var.sort();
    if sort.is_bool() {
        vec![Value::Bool(false), Value::Bool(true)]
    } else {
        let half = 1i64 << (sort.bits() - 1);
        (-half..half).map(Value::Int).collect()
    }
}

/// Runs `check` on its own thread and fails if it takes longer than `limit`.
pub fn within<T: Send + 'static>(limit: Duration, check: impl FnOnce() -> T + Send + 'static) -> T {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(check());
    });
    rx.recv_timeout(limit).expect("checker did not finish in time")
}

/// Every valuation of `vars`.
pub fn all_states(system: &MonolithicSystem) -> Vec<Valuation> {
    let mut states = vec![Valuation::new()];
    for var in system.vars() {
        let mut extended = Vec::new();
        for s in &states {
            for &v in &domain(&var) {
                extended.push(s.clone().with(&var, v));
            }
        }
        states = extended;
    }
    states
}

fn step_holds(trans: &Expr, current: &Valuation, next: &Valuation) -> bool {
    eval_step(trans, current, next).unwrap().as_bool().unwrap()
}

/// Length of the shortest counterexample, by breadth-first search over all states.
pub fn shortest_counterexample(system: &MonolithicSystem) -> Option<usize> {
    let states = all_states(system);
    let mut depth: HashMap<usize, usize> = HashMap::new();
    let mut queue = VecDeque::new();
    for (i, s) in states.iter().enumerate() {
        if holds(&system.init, s).unwrap() {
            depth.insert(i, 0);
            queue.push_back(i);
        }
    }
    while let Some(i) = queue.pop_front() {
        let d = depth[&i];
        if !holds(&system.prop, &states[i]).unwrap() {
            return Some(d);
        }
        for (j, t) in states.iter().enumerate() {
            if !depth.contains_key(&j) && step_holds(&system.trans, &states[i], t) {
                depth.insert(j, d + 1);
                queue.push_back(j);
            }
        }
    }
    None
}

/// Asserts that `trace` starts in `init`, follows `trans` and ends in a violation.
pub fn assert_counterexample(system: &MonolithicSystem, trace: &Trace<Valuation, Update>) {
    let states = trace.states();
    assert!(holds(&system.init, &states[0]).unwrap(), "{} is not initial", states[0]);
    for (i, pair) in states.windows(2).enumerate() {
        assert!(
            step_holds(&system.trans, &pair[0], &pair[1]),
            "step {} from {} to {} is not a transition",
            i,
            pair[0],
            pair[1]
        );
        assert_eq!(trace.actions()[i], Update::between(&pair[0], &pair[1]));
    }
    let last = &states[states.len() - 1];
    assert!(!holds(&system.prop, last).unwrap(), "{} satisfies the property", last);
}

// ─── Counting solver ───────────────────────────────────────────────────────────

/// Call counters that outlive the solver handed to the checker.
#[derive(Debug, Clone, Default)]
pub struct Calls {
    checks: Rc<Cell<usize>>,
    interpolants: Rc<Cell<usize>>,
}

impl Calls {
    pub fn checks(&self) -> usize {
        self.checks.get()
    }

    pub fn interpolants(&self) -> usize {
        self.interpolants.get()
    }
}

pub struct Counting<S> {
    inner: S,
    calls: Calls,
}

impl<S> Counting<S> {
    pub fn new(inner: S) -> (Self, Calls) {
        let calls = Calls::default();
        let solver = Counting {
            inner,
            calls: calls.clone(),
        };
        (solver, calls)
    }
}

impl<S: Solver> Solver for Counting<S> {
    fn id(&self) -> SolverId {
        self.inner.id()
    }

    fn add(&mut self, expr: &Expr) -> Result<(), SolverError> {
        self.inner.add(expr)
    }

    fn push(&mut self) {
        self.inner.push()
    }

    fn pop(&mut self) -> Result<(), SolverError> {
        self.inner.pop()
    }

    fn check(&mut self) -> Result<SolverStatus, SolverError> {
        self.calls.checks.set(self.calls.checks.get() + 1);
        self.inner.check()
    }

    fn model(&self) -> Result<Model, SolverError> {
        self.inner.model()
    }
}

impl<S: ItpSolver> ItpSolver for Counting<S> {
    fn add_to(&mut self, partition: Partition, expr: &Expr) -> Result<(), SolverError> {
        self.inner.add_to(partition, expr)
    }

    fn interpolant(&self, pattern: &BinItpPattern) -> Result<Expr, SolverError> {
        self.calls.interpolants.set(self.calls.interpolants.get() + 1);
        self.inner.interpolant(pattern)
    }
}

/// A solver that never decides anything.
pub struct Undecided {
    id: SolverId,
}

impl Undecided {
    pub fn new() -> Self {
        Undecided { id: SolverId::fresh() }
    }
}

impl Solver for Undecided {
    fn id(&self) -> SolverId {
        self.id
    }

    fn add(&mut self, _expr: &Expr) -> Result<(), SolverError> {
        Ok(())
    }

    fn push(&mut self) {}

    fn pop(&mut self) -> Result<(), SolverError> {
        Ok(())
    }

    fn check(&mut self) -> Result<SolverStatus, SolverError> {
        Ok(SolverStatus::Unknown)
    }

    fn model(&self) -> Result<Model, SolverError> {
        Err(SolverError::NoModel)
    }
}
