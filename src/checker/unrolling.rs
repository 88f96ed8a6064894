use log::debug;

use crate::checker::trace::Trace;
use crate::checker::Reconstruct;
use crate::expr::Expr;
use crate::indexing::VarIndexing;
use crate::path::{extract_valuation, unfold, PathError};
use crate::system::MonolithicSystem;
use crate::types::Var;
use crate::valuation::Model;

/// The indexed unrolling shared by all strategies of one run.
///
/// Frame `f` is the state at `indices[f]`; `steps[f]` is the transition from
/// frame `f` to frame `f + 1`. Both sequences only grow.
pub struct Unrolling {
    system: MonolithicSystem,
    vars: Vec<Var>,
    indices: Vec<VarIndexing>,
    steps: Vec<Expr>,
    init: Expr,
}

impl Unrolling {
    pub fn new(system: MonolithicSystem) -> Self {
        let vars = system.vars().into_iter().collect();
        let zero = VarIndexing::zero();
        let init = unfold(&system.init, &zero);
        Unrolling {
            system,
            vars,
            indices: vec![zero],
            steps: Vec::new(),
            init,
        }
    }

    /// Appends one transition step and the frame it leads to.
    pub fn extend(&mut self) {
        let last = self.last_index().clone();
        self.steps.push(unfold(&self.system.trans, &last));
        let next = last.add(&self.system.offset);
        debug!("unrolled to frame {} at {}", self.indices.len(), next);
        self.indices.push(next);
    }

    fn last_index(&self) -> &VarIndexing {
        // `indices` starts with the zero indexing and never shrinks.
        &self.indices[self.indices.len() - 1]
    }

    pub fn vars(&self) -> &[Var] {
        &self.vars
    }

    pub fn indices(&self) -> &[VarIndexing] {
        &self.indices
    }

    pub fn steps(&self) -> &[Expr] {
        &self.steps
    }

    /// Index of the latest frame.
    pub fn last_frame(&self) -> usize {
        self.indices.len() - 1
    }

    /// `init` at generation 0.
    pub fn init(&self) -> &Expr {
        &self.init
    }

    pub fn prop_at(&self, frame: usize) -> Expr {
        unfold(&self.system.prop, &self.indices[frame])
    }

    /// Every variable has the same value in both frames.
    pub fn all_vars_same(&self, i: usize, j: usize) -> Expr {
        let (ii, ij) = (&self.indices[i], &self.indices[j]);
        Expr::and(
            self.vars
                .iter()
                .map(|var| Expr::eq(Expr::sym(var, ii.get(var)), Expr::sym(var, ij.get(var)))),
        )
    }

    /// Constraints stating that `frame` differs from every earlier frame.
    pub fn distinct_from_earlier(&self, frame: usize) -> Vec<Expr> {
        (0..frame)
            .filter(|&i| self.indices[i] != self.indices[frame])
            .map(|i| Expr::not(self.all_vars_same(i, frame)))
            .collect()
    }

    /// Reconstructs the path through frames `0..=frame` from a model.
    pub fn trace<S, A>(
        &self,
        model: &Model,
        frame: usize,
        reconstruct: &Reconstruct<S, A>,
    ) -> Result<Trace<S, A>, PathError> {
        let mut states = Vec::with_capacity(frame + 1);
        let mut actions = Vec::with_capacity(frame);
        let mut previous = None;
        for index in &self.indices[..=frame] {
            let valuation = extract_valuation(model, index, &self.vars)?;
            states.push((reconstruct.state)(&valuation));
            if let Some(previous) = &previous {
                actions.push((reconstruct.action)(previous, &valuation));
            }
            previous = Some(valuation);
        }
        Ok(Trace::new(states, actions))
    }
}
