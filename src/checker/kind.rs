//! The inductive step of k-induction.
//!
//! The solver context is `P(0) ∧ T(0,1) ∧ … ∧ P(k-1) ∧ T(k-1,k)` without
//! `init`; the step holds when `¬P(k)` is unsatisfiable on top of it. The
//! base case is left to BMC.

use log::{debug, info};

use crate::checker::unrolling::Unrolling;
use crate::checker::{CheckerError, Outcome};
use crate::expr::Expr;
use crate::solver::{Solver, SolverStatus};

pub(crate) struct KInduction {
    solver: Box<dyn Solver>,
    synced: usize,
}

impl KInduction {
    pub(crate) fn new(solver: Box<dyn Solver>) -> Self {
        KInduction { solver, synced: 0 }
    }

    pub(crate) fn step<S, A>(
        &mut self,
        unrolling: &Unrolling,
        lf_path_only: bool,
    ) -> Result<Option<Outcome<S, A>>, CheckerError> {
        info!("Starting k-induction");

        while self.synced < unrolling.steps().len() {
            let i = self.synced;
            self.solver.add(&unrolling.prop_at(i))?;
            self.solver.add(&unrolling.steps()[i])?;
            if lf_path_only {
                for distinct in unrolling.distinct_from_earlier(i + 1) {
                    self.solver.add(&distinct)?;
                }
            }
            self.synced += 1;
        }
        debug!("k-induction: synced {} step(s)", self.synced);

        let last = unrolling.last_frame();
        self.solver.push();
        self.solver.add(&Expr::not(unrolling.prop_at(last)))?;
        let status = self.solver.check()?;
        self.solver.pop()?;
        debug!("k-induction: step of length {} is {}", last, status);

        match status {
            SolverStatus::Unsat => {
                info!("Safety proven in k-induction step");
                Ok(Some(Outcome::Safe))
            }
            SolverStatus::Sat | SolverStatus::Unknown => Ok(None),
        }
    }
}
