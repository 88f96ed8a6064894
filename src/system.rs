use std::collections::BTreeSet;

use crate::expr::Expr;
use crate::indexing::VarIndexing;
use crate::types::Var;

/// A transition system given by three formulas over the same variables.
///
/// `trans` relates the current state (plain variables) to the next one
/// (primed variables). `offset` is how far one application of `trans`
/// advances the generation of each variable.
#[derive(Debug, Clone)]
pub struct MonolithicSystem {
    pub init: Expr,
    pub trans: Expr,
    pub prop: Expr,
    pub offset: VarIndexing,
}

impl MonolithicSystem {
    /// A system in which every step advances every variable by one generation.
    pub fn new(init: Expr, trans: Expr, prop: Expr) -> Self {
        Self::with_offset(init, trans, prop, VarIndexing::all(1))
    }

    pub fn with_offset(init: Expr, trans: Expr, prop: Expr, offset: VarIndexing) -> Self {
        MonolithicSystem {
            init,
            trans,
            prop,
            offset,
        }
    }

    /// Variables free in any of the three formulas.
    pub fn vars(&self) -> BTreeSet<Var> {
        let mut vars = self.init.vars();
        vars.extend(self.trans.vars());
        vars.extend(self.prop.vars());
        vars
    }
}
