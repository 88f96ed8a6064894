//! Schedules and solver assignments the checker has to reject or tolerate.

mod common;

use bounded_rs::checker::{BoundedChecker, CheckerConfig, CheckerError, Strategy, Verdict};
use bounded_rs::solver::{BddSolver, SharedSolver, Solver};
use test_log::test;

use common::{counter, stutter, Counting, Undecided};

#[test]
fn shared_solver_rejected_before_solving() {
    let (inner, calls) = Counting::new(BddSolver::new());
    let shared = SharedSolver::new(inner);
    let res = BoundedChecker::explicit(counter(8, 1, 5))
        .bmc_solver(shared.clone())
        .kind_solver(shared)
        .build();

    match res {
        Err(CheckerError::SharedSolver { first, second, .. }) => {
            assert_eq!(first, Strategy::Bmc);
            assert_eq!(second, Strategy::KInduction);
        }
        _ => panic!("sharing a solver between strategies should be rejected"),
    }
    assert_eq!(calls.checks(), 0);
}

#[test]
fn distinct_shared_handles_accepted() {
    let bmc = SharedSolver::new(BddSolver::new());
    let kind = SharedSolver::new(BddSolver::new());
    assert_ne!(bmc.id(), kind.id());

    let verdict = BoundedChecker::explicit(stutter(8))
        .config(CheckerConfig::kind().lf_path_only(|| false))
        .bmc_solver(bmc.clone())
        .kind_solver(kind.clone())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(verdict.is_safe());
    // Every scope opened during the run was closed again.
    assert_eq!(bmc.borrow().depth(), 1);
    assert_eq!(kind.borrow().depth(), 1);
}

#[test]
fn missing_imc_solver_reported_when_needed() {
    // IMC only kicks in from iteration 3, after BMC had its chance.
    let res = BoundedChecker::explicit(counter(8, 1, 5))
        .config(CheckerConfig::bmc_only().imc_enabled(|i| i >= 3))
        .bmc_solver(BddSolver::new())
        .build()
        .unwrap()
        .run();

    assert!(matches!(
        res,
        Err(CheckerError::MissingSolver {
            strategy: Strategy::Imc,
            iteration: 3
        })
    ));
}

#[test]
fn missing_solver_for_disabled_strategy_is_fine() {
    let verdict = BoundedChecker::explicit(counter(8, 1, 5))
        .config(CheckerConfig::bmc_only())
        .bmc_solver(BddSolver::new())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(verdict.is_unsafe());
}

#[test]
fn induction_requires_bmc_in_the_same_iteration() {
    let res = BoundedChecker::explicit(stutter(8))
        .config(
            CheckerConfig::disabled()
                .kind_enabled(|i| i >= 2)
                .bmc_enabled(|i| i == 1)
                .lf_path_only(|| false),
        )
        .bmc_solver(BddSolver::new())
        .kind_solver(BddSolver::new())
        .build()
        .unwrap()
        .run();

    assert!(matches!(res, Err(CheckerError::InductionWithoutBmc { iteration: 2 })));
}

#[test]
fn undecided_bmc_ends_the_run() {
    let verdict = BoundedChecker::explicit(counter(8, 1, 5))
        .config(CheckerConfig::bmc_only())
        .bmc_solver(Undecided::new())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(matches!(verdict, Verdict::Unknown { iteration: 1 }));
}

#[test]
fn undecided_induction_keeps_going() {
    // k-induction never concludes, so BMC finds the counterexample as usual.
    let verdict = BoundedChecker::explicit(counter(8, 1, 5))
        .config(CheckerConfig::kind())
        .bmc_solver(BddSolver::new())
        .kind_solver(Undecided::new())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(matches!(
        verdict,
        Verdict::Unsafe {
            strategy: Strategy::Bmc,
            iteration: 5,
            ..
        }
    ));
}

#[test]
fn schedules_are_independent() {
    let quick = CheckerConfig::bmc_only().max_iterations(2);
    let patient = CheckerConfig::bmc_only().max_iterations(10);

    let first = BoundedChecker::explicit(counter(8, 1, 5))
        .config(quick)
        .bmc_solver(BddSolver::new())
        .build()
        .unwrap();
    let second = BoundedChecker::explicit(counter(8, 1, 5))
        .config(patient)
        .bmc_solver(BddSolver::new())
        .build()
        .unwrap();

    assert!(matches!(first.run().unwrap(), Verdict::Unknown { iteration: 2 }));
    assert!(second.run().unwrap().is_unsafe());
}
