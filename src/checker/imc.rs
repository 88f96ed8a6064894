//! Interpolation-based model checking.
//!
//! For the latest frame `k`, the unrolling is split into
//! `A = init ∧ T(0,1)` and `B = T(1,2) ∧ … ∧ T(k-1,k) ∧ ¬P(k)`. When `A ∧ B`
//! is unsatisfiable, the interpolant over frame 1, shifted back to frame 0,
//! over-approximates the states reachable in one step. It replaces `init` in
//! `A` until either the accumulated image stops growing (a fixpoint, so the
//! property holds) or `A ∧ B` becomes satisfiable (the approximation is too
//! coarse for this bound, and the unrolling has to grow).

use log::{debug, info};

use crate::checker::unrolling::Unrolling;
use crate::checker::{CheckerError, Outcome, Reconstruct};
use crate::expr::Expr;
use crate::path::{fold, unfold};
use crate::solver::{BinItpPattern, ItpSolver, Partition, SolverStatus};

pub(crate) struct Imc {
    solver: Box<dyn ItpSolver>,
    /// Frames `0..checked` are known to satisfy the property on every path from `init`.
    checked: usize,
}

impl Imc {
    pub(crate) fn new(solver: Box<dyn ItpSolver>) -> Self {
        Imc { solver, checked: 0 }
    }

    pub(crate) fn step<S, A>(
        &mut self,
        unrolling: &Unrolling,
        lf_path_only: bool,
        reconstruct: &Reconstruct<S, A>,
    ) -> Result<Option<Outcome<S, A>>, CheckerError> {
        info!("Starting IMC");

        let last = unrolling.last_frame();

        // Frames skipped so far (at least frame 0 on the first call) are
        // checked directly, so a fixpoint below is a complete proof.
        while self.checked < last {
            let frame = self.checked;
            self.solver.push();
            self.solver.add(unrolling.init())?;
            for step in &unrolling.steps()[..frame] {
                self.solver.add(step)?;
            }
            self.solver.add(&Expr::not(unrolling.prop_at(frame)))?;
            let status = self.solver.check()?;
            debug!("IMC: frame {} is {}", frame, status);
            let outcome = match status {
                SolverStatus::Sat => {
                    let trace = unrolling.trace(&self.solver.model()?, frame, reconstruct)?;
                    info!("Counterexample found in IMC/BMC step (length {})", trace.length());
                    Some(Some(Outcome::Unsafe(trace)))
                }
                SolverStatus::Unknown => Some(None),
                SolverStatus::Unsat => None,
            };
            self.solver.pop()?;
            if let Some(outcome) = outcome {
                return Ok(outcome);
            }
            self.checked += 1;
        }

        let pattern = BinItpPattern::new(Partition::A, Partition::B)?;
        self.solver.push();
        let outcome = self.refine(unrolling, &pattern, lf_path_only, reconstruct);
        self.solver.pop()?;
        outcome
    }

    /// Asserts `A := first ∧ T(0,1)` and `B := T(1,2) ∧ … ∧ ¬P(last)` in a new scope.
    fn assert_split(&mut self, unrolling: &Unrolling, first: &Expr, with_bad: bool) -> Result<(), CheckerError> {
        self.solver.push();
        self.solver.add_to(Partition::A, first)?;
        self.solver.add_to(Partition::A, &unrolling.steps()[0])?;
        for step in &unrolling.steps()[1..] {
            self.solver.add_to(Partition::B, step)?;
        }
        if with_bad {
            let bad = Expr::not(unrolling.prop_at(unrolling.last_frame()));
            self.solver.add_to(Partition::B, &bad)?;
        }
        Ok(())
    }

    fn refine<S, A>(
        &mut self,
        unrolling: &Unrolling,
        pattern: &BinItpPattern,
        lf_path_only: bool,
        reconstruct: &Reconstruct<S, A>,
    ) -> Result<Option<Outcome<S, A>>, CheckerError> {
        let last = unrolling.last_frame();
        let indices = unrolling.indices();

        self.assert_split(unrolling, unrolling.init(), false)?;

        if lf_path_only {
            // Plain, so they are conjoined with the whole path. Popped before any interpolant.
            self.solver.push();
            for distinct in unrolling.distinct_from_earlier(last) {
                self.solver.add(&distinct)?;
            }
            let status = self.solver.check()?;
            self.solver.pop()?;
            if status.is_unsat() {
                self.solver.pop()?;
                info!("Safety proven in IMC/BMC step (no loop-free path of length {})", last);
                return Ok(Some(Outcome::Safe));
            }
        }

        let bad = Expr::not(unrolling.prop_at(last));
        self.solver.add_to(Partition::B, &bad)?;

        match self.solver.check()? {
            SolverStatus::Sat => {
                let trace = unrolling.trace(&self.solver.model()?, last, reconstruct)?;
                self.solver.pop()?;
                info!("Counterexample found in IMC/BMC step (length {})", trace.length());
                return Ok(Some(Outcome::Unsafe(trace)));
            }
            SolverStatus::Unknown => {
                self.solver.pop()?;
                return Ok(None);
            }
            SolverStatus::Unsat => {}
        }
        self.checked = last + 1;

        let mut img = unrolling.init().clone();
        let mut round = 0;
        loop {
            round += 1;
            let interpolant = self.solver.interpolant(pattern)?;
            let itp = unfold(&fold(&interpolant, &indices[1])?, &indices[0]);
            debug!("IMC: interpolant #{} of size {}", round, itp.size());
            self.solver.pop()?;

            self.solver.push();
            self.solver.add_to(Partition::A, &itp)?;
            self.solver.add_to(Partition::A, &Expr::not(img.clone()))?;
            let status = self.solver.check()?;
            self.solver.pop()?;
            match status {
                SolverStatus::Unsat => {
                    info!("Safety proven in IMC step (fixpoint after {} interpolant(s))", round);
                    return Ok(Some(Outcome::Safe));
                }
                SolverStatus::Unknown => return Ok(None),
                SolverStatus::Sat => {}
            }
            img = Expr::or([img, itp.clone()]);

            self.assert_split(unrolling, &itp, true)?;
            match self.solver.check()? {
                SolverStatus::Unsat => {}
                status => {
                    // The approximation reaches a bad state, maybe spuriously.
                    debug!("IMC: refinement #{} is {}", round, status);
                    self.solver.pop()?;
                    return Ok(None);
                }
            }
        }
    }
}
