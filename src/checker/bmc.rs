//! Bounded model checking.
//!
//! The solver context holds `init` and every step up to the frame under
//! examination. Each frame is checked for a violation in a scope of its own,
//! so the context keeps growing by exactly one step per frame.

use log::{debug, info};

use crate::checker::unrolling::Unrolling;
use crate::checker::{CheckerError, Outcome, Reconstruct};
use crate::expr::Expr;
use crate::solver::{Solver, SolverStatus};

pub(crate) struct Bmc {
    solver: Box<dyn Solver>,
    /// Steps already asserted.
    synced: usize,
    /// Next frame to examine.
    frame: usize,
}

impl Bmc {
    pub(crate) fn new(solver: Box<dyn Solver>) -> Self {
        Bmc {
            solver,
            synced: 0,
            frame: 0,
        }
    }

    pub(crate) fn step<S, A>(
        &mut self,
        unrolling: &Unrolling,
        lf_path_only: bool,
        reconstruct: &Reconstruct<S, A>,
    ) -> Result<Option<Outcome<S, A>>, CheckerError> {
        info!("Starting BMC");

        while self.frame <= unrolling.last_frame() {
            let frame = self.frame;

            if frame == 0 {
                self.solver.add(unrolling.init())?;
            } else {
                for step in &unrolling.steps()[self.synced..frame] {
                    self.solver.add(step)?;
                }
                self.synced = frame;
                debug!("BMC: synced {} step(s)", self.synced);

                if lf_path_only {
                    for distinct in unrolling.distinct_from_earlier(frame) {
                        self.solver.add(&distinct)?;
                    }
                    if self.solver.check()?.is_unsat() {
                        info!("Safety proven in BMC step (no loop-free path of length {})", frame);
                        return Ok(Some(Outcome::Safe));
                    }
                }
            }

            self.solver.push();
            self.solver.add(&Expr::not(unrolling.prop_at(frame)))?;
            let status = self.solver.check()?;
            debug!("BMC: frame {} is {}", frame, status);
            let outcome = match status {
                SolverStatus::Sat => {
                    let model = self.solver.model()?;
                    let trace = unrolling.trace(&model, frame, reconstruct)?;
                    info!("Counterexample found in BMC step (length {})", trace.length());
                    Some(Outcome::Unsafe(trace))
                }
                SolverStatus::Unknown => Some(Outcome::Unknown),
                SolverStatus::Unsat => None,
            };
            self.solver.pop()?;
            if outcome.is_some() {
                return Ok(outcome);
            }

            self.frame += 1;
        }

        Ok(None)
    }
}
