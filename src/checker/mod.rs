//! The bounded verification engine.
//!
//! [`BoundedChecker`] unrolls a [`MonolithicSystem`] one step per iteration
//! and offers the growing unrolling to up to three strategies, always in the
//! same order:
//!
//! 1. **BMC** looks for a counterexample ending in the newest frame. With the
//!    loop-free-path restriction it also proves safety once no loop-free path
//!    of the current length exists.
//! 2. **k-induction** proves that no path of `k` property-satisfying states
//!    can be extended by a violating one. It relies on BMC for the base case,
//!    so it may only run in iterations where BMC runs too.
//! 3. **IMC** computes an over-approximation of the reachable states from
//!    Craig interpolants and stops once it reaches a fixpoint.
//!
//! Every strategy owns its solver and remembers how much of the unrolling it
//! has asserted so far. The first strategy with a verdict ends the run.
//!
//! ```
//! use bounded_rs::checker::{BoundedChecker, CheckerConfig, Strategy, Verdict};
//! use bounded_rs::expr::Expr;
//! use bounded_rs::solver::BddSolver;
//! use bounded_rs::system::MonolithicSystem;
//! use bounded_rs::types::Var;
//!
//! let x = Var::int("x", 8);
//! let system = MonolithicSystem::new(
//!     Expr::eq(Expr::var(&x), Expr::int(0)),
//!     Expr::eq(Expr::prime(Expr::var(&x)), Expr::add(Expr::var(&x), Expr::int(1))),
//!     Expr::lt(Expr::var(&x), Expr::int(5)),
//! );
//! let checker = BoundedChecker::explicit(system)
//!     .config(CheckerConfig::bmc_only())
//!     .bmc_solver(BddSolver::new())
//!     .build()?;
//!
//! let verdict = checker.run()?;
//! assert!(matches!(verdict, Verdict::Unsafe { strategy: Strategy::Bmc, iteration: 5, .. }));
//! assert_eq!(verdict.trace().map(|t| t.length()), Some(5));
//! # Ok::<(), bounded_rs::checker::CheckerError>(())
//! ```

use log::info;
use thiserror::Error;

use crate::path::PathError;
use crate::solver::{ItpSolver, Solver, SolverError, SolverId};
use crate::system::MonolithicSystem;
use crate::valuation::Valuation;

mod bmc;
mod config;
mod imc;
mod kind;
mod trace;
mod unrolling;
mod verdict;

pub use self::config::{CheckerConfig, IterationPredicate};
pub use self::trace::{Trace, Update};
pub use self::unrolling::Unrolling;
pub use self::verdict::{Strategy, Verdict};

use self::bmc::Bmc;
use self::imc::Imc;
use self::kind::KInduction;

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("{id} is used by both {first} and {second}")]
    SharedSolver {
        id: SolverId,
        first: Strategy,
        second: Strategy,
    },

    #[error("{strategy} is enabled in iteration {iteration}, but has no solver")]
    MissingSolver { strategy: Strategy, iteration: usize },

    #[error("k-induction is enabled in iteration {iteration} without BMC establishing the base case")]
    InductionWithoutBmc { iteration: usize },

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// What a strategy concluded in one iteration.
pub(crate) enum Outcome<S, A> {
    Safe,
    Unsafe(Trace<S, A>),
    /// A check the verdict depends on was undecided.
    Unknown,
}

/// Turns extracted valuations into the caller's state and action types.
pub struct Reconstruct<S, A> {
    pub(crate) state: Box<dyn Fn(&Valuation) -> S>,
    pub(crate) action: Box<dyn Fn(&Valuation, &Valuation) -> A>,
}

impl<S, A> Reconstruct<S, A> {
    pub fn new(
        state: impl Fn(&Valuation) -> S + 'static,
        action: impl Fn(&Valuation, &Valuation) -> A + 'static,
    ) -> Self {
        Reconstruct {
            state: Box::new(state),
            action: Box::new(action),
        }
    }
}

pub struct BoundedChecker<S, A> {
    unrolling: Unrolling,
    config: CheckerConfig,
    bmc: Option<Bmc>,
    kind: Option<KInduction>,
    imc: Option<Imc>,
    reconstruct: Reconstruct<S, A>,
}

impl<S, A> BoundedChecker<S, A> {
    pub fn builder(
        system: MonolithicSystem,
        state: impl Fn(&Valuation) -> S + 'static,
        action: impl Fn(&Valuation, &Valuation) -> A + 'static,
    ) -> BoundedCheckerBuilder<S, A> {
        BoundedCheckerBuilder {
            system,
            config: CheckerConfig::default(),
            bmc_solver: None,
            kind_solver: None,
            imc_solver: None,
            reconstruct: Reconstruct::new(state, action),
        }
    }
}

impl BoundedChecker<Valuation, Update> {
    /// A checker whose traces are plain valuations connected by [`Update`]s.
    pub fn explicit(system: MonolithicSystem) -> BoundedCheckerBuilder<Valuation, Update> {
        BoundedChecker::builder(system, Valuation::clone, Update::between)
    }
}

pub struct BoundedCheckerBuilder<S, A> {
    system: MonolithicSystem,
    config: CheckerConfig,
    bmc_solver: Option<Box<dyn Solver>>,
    kind_solver: Option<Box<dyn Solver>>,
    imc_solver: Option<Box<dyn ItpSolver>>,
    reconstruct: Reconstruct<S, A>,
}

impl<S, A> BoundedCheckerBuilder<S, A> {
    pub fn config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bmc_solver(mut self, solver: impl Solver + 'static) -> Self {
        self.bmc_solver = Some(Box::new(solver));
        self
    }

    pub fn kind_solver(mut self, solver: impl Solver + 'static) -> Self {
        self.kind_solver = Some(Box::new(solver));
        self
    }

    pub fn imc_solver(mut self, solver: impl ItpSolver + 'static) -> Self {
        self.imc_solver = Some(Box::new(solver));
        self
    }

    /// Fails if one solver instance is given to two strategies.
    pub fn build(self) -> Result<BoundedChecker<S, A>, CheckerError> {
        let ids = [
            (Strategy::Bmc, self.bmc_solver.as_ref().map(|s| s.id())),
            (Strategy::KInduction, self.kind_solver.as_ref().map(|s| s.id())),
            (Strategy::Imc, self.imc_solver.as_ref().map(|s| s.id())),
        ];
        for (i, &(first, a)) in ids.iter().enumerate() {
            for &(second, b) in &ids[i + 1..] {
                if let (Some(a), Some(b)) = (a, b) {
                    if a == b {
                        return Err(CheckerError::SharedSolver { id: a, first, second });
                    }
                }
            }
        }

        Ok(BoundedChecker {
            unrolling: Unrolling::new(self.system),
            config: self.config,
            bmc: self.bmc_solver.map(Bmc::new),
            kind: self.kind_solver.map(KInduction::new),
            imc: self.imc_solver.map(Imc::new),
            reconstruct: self.reconstruct,
        })
    }
}

impl<S, A> BoundedChecker<S, A> {
    /// Runs the unrolling loop until a strategy decides or the configuration gives up.
    pub fn run(mut self) -> Result<Verdict<S, A>, CheckerError> {
        let mut iteration = 0;

        while !self.config.should_give_up(iteration) {
            iteration += 1;
            info!("Starting iteration {}", iteration);

            self.unrolling.extend();

            let bmc_enabled = self.config.is_bmc_enabled(iteration);
            if bmc_enabled {
                let bmc = self.bmc.as_mut().ok_or(CheckerError::MissingSolver {
                    strategy: Strategy::Bmc,
                    iteration,
                })?;
                let lf = self.config.is_lf_path_only();
                if let Some(outcome) = bmc.step(&self.unrolling, lf, &self.reconstruct)? {
                    return Ok(verdict(outcome, Strategy::Bmc, iteration));
                }
            }

            if self.config.is_kind_enabled(iteration) {
                if !bmc_enabled {
                    return Err(CheckerError::InductionWithoutBmc { iteration });
                }
                let kind = self.kind.as_mut().ok_or(CheckerError::MissingSolver {
                    strategy: Strategy::KInduction,
                    iteration,
                })?;
                let lf = self.config.is_lf_path_only();
                if let Some(outcome) = kind.step(&self.unrolling, lf)? {
                    return Ok(verdict(outcome, Strategy::KInduction, iteration));
                }
            }

            if self.config.is_imc_enabled(iteration) {
                let imc = self.imc.as_mut().ok_or(CheckerError::MissingSolver {
                    strategy: Strategy::Imc,
                    iteration,
                })?;
                let lf = self.config.is_lf_path_only();
                if let Some(outcome) = imc.step(&self.unrolling, lf, &self.reconstruct)? {
                    return Ok(verdict(outcome, Strategy::Imc, iteration));
                }
            }
        }

        info!("Gave up after iteration {}", iteration);
        Ok(Verdict::Unknown { iteration })
    }
}

fn verdict<S, A>(outcome: Outcome<S, A>, strategy: Strategy, iteration: usize) -> Verdict<S, A> {
    match outcome {
        Outcome::Safe => Verdict::Safe { strategy, iteration },
        Outcome::Unsafe(trace) => Verdict::Unsafe {
            strategy,
            iteration,
            trace,
        },
        Outcome::Unknown => Verdict::Unknown { iteration },
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::expr::Expr;
    use crate::solver::{BddSolver, SharedSolver};
    use crate::types::Var;

    fn stutter() -> MonolithicSystem {
        let x = Var::int("x", 8);
        MonolithicSystem::new(
            Expr::eq(Expr::var(&x), Expr::int(0)),
            Expr::eq(Expr::prime(Expr::var(&x)), Expr::var(&x)),
            Expr::ge(Expr::var(&x), Expr::int(0)),
        )
    }

    #[test]
    fn test_shared_solver_rejected() {
        let shared = SharedSolver::new(BddSolver::new());
        let res = BoundedChecker::explicit(stutter())
            .bmc_solver(shared.clone())
            .imc_solver(shared)
            .build();
        assert!(matches!(
            res,
            Err(CheckerError::SharedSolver {
                first: Strategy::Bmc,
                second: Strategy::Imc,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_solver() {
        let checker = BoundedChecker::explicit(stutter())
            .config(CheckerConfig::bmc_only())
            .build()
            .unwrap();
        assert!(matches!(
            checker.run(),
            Err(CheckerError::MissingSolver {
                strategy: Strategy::Bmc,
                iteration: 1
            })
        ));
    }

    #[test]
    fn test_induction_without_bmc() {
        let checker = BoundedChecker::explicit(stutter())
            .config(CheckerConfig::default().bmc_enabled(|i| i != 1))
            .bmc_solver(BddSolver::new())
            .kind_solver(BddSolver::new())
            .build()
            .unwrap();
        assert!(matches!(
            checker.run(),
            Err(CheckerError::InductionWithoutBmc { iteration: 1 })
        ));
    }

    #[test]
    fn test_give_up_immediately() {
        let checker = BoundedChecker::explicit(stutter())
            .config(CheckerConfig::default().give_up(|_| true))
            .build()
            .unwrap();
        assert!(matches!(checker.run(), Ok(Verdict::Unknown { iteration: 0 })));
    }

    #[test]
    fn test_errors_cross_threads() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<CheckerError>();
        assert_send_sync::<SolverError>();
        assert_send_sync::<PathError>();
        assert_send_sync::<crate::expr::ExprError>();

        let err = CheckerError::from(SolverError::Encoding(crate::expr::ExprError::Unbound(Var::int("x", 8))));
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        assert_eq!(boxed.to_string(), "variable `x` is not bound");
    }
}
