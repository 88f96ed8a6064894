//! Evaluation of unindexed formulas over a [`Valuation`].
//!
//! Used to check traces and to enumerate the state space of small systems.
//! A primed subexpression is evaluated over the `next` valuation, so a
//! transition relation can be evaluated on a pair of states with [`eval_step`].

use crate::expr::{Expr, ExprError};
use crate::types::{signed_width, wrap_signed, Value};
use crate::valuation::Valuation;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Val {
    Bool(bool),
    Int(i64, u32),
}

impl From<Val> for Value {
    fn from(v: Val) -> Self {
        match v {
            Val::Bool(b) => Value::Bool(b),
            Val::Int(v, _) => Value::Int(v),
        }
    }
}

struct Evaluator<'a> {
    current: &'a Valuation,
    next: Option<&'a Valuation>,
}

/// Evaluates a state formula.
pub fn eval(expr: &Expr, valuation: &Valuation) -> Result<Value, ExprError> {
    let evaluator = Evaluator {
        current: valuation,
        next: None,
    };
    evaluator.eval(expr, false).map(Value::from)
}

/// Evaluates a formula over a pair of states; primed variables read `next`.
pub fn eval_step(expr: &Expr, current: &Valuation, next: &Valuation) -> Result<Value, ExprError> {
    let evaluator = Evaluator {
        current,
        next: Some(next),
    };
    evaluator.eval(expr, false).map(Value::from)
}

/// Evaluates a boolean formula.
pub fn holds(expr: &Expr, valuation: &Valuation) -> Result<bool, ExprError> {
    match eval(expr, valuation)? {
        Value::Bool(b) => Ok(b),
        Value::Int(_) => Err(ExprError::SortMismatch(expr.to_string())),
    }
}

impl Evaluator<'_> {
    fn eval_bool(&self, e: &Expr, primed: bool) -> Result<bool, ExprError> {
        match self.eval(e, primed)? {
            Val::Bool(b) => Ok(b),
            Val::Int(..) => Err(ExprError::SortMismatch(e.to_string())),
        }
    }

    fn eval_int(&self, e: &Expr, primed: bool) -> Result<(i64, u32), ExprError> {
        match self.eval(e, primed)? {
            Val::Int(v, w) => Ok((v, w)),
            Val::Bool(_) => Err(ExprError::SortMismatch(e.to_string())),
        }
    }

    fn eval(&self, e: &Expr, primed: bool) -> Result<Val, ExprError> {
        let res = match e {
            Expr::Bool(b) => Val::Bool(*b),
            Expr::Int(v) => Val::Int(*v, signed_width(*v)),
            Expr::Var(var) => {
                let valuation = if primed {
                    self.next.ok_or_else(|| ExprError::Unindexed(e.to_string()))?
                } else {
                    self.current
                };
                let value = valuation
                    .get(var)
                    .ok_or_else(|| ExprError::Unbound(var.clone()))?;
                if !value.fits(var.sort()) {
                    return Err(ExprError::OutOfRange { var: var.clone() });
                }
                match value {
                    Value::Bool(b) => Val::Bool(b),
                    Value::Int(v) => Val::Int(v, var.sort().bits()),
                }
            }
            Expr::Prime(inner) => {
                if primed {
                    // x'' has no meaning over a pair of states
                    return Err(ExprError::Unindexed(e.to_string()));
                }
                self.eval(inner, true)?
            }
            Expr::Sym(_) => return Err(ExprError::Indexed(e.to_string())),

            Expr::Not(a) => Val::Bool(!self.eval_bool(a, primed)?),
            Expr::And(es) => {
                let mut res = true;
                for a in es {
                    res &= self.eval_bool(a, primed)?;
                }
                Val::Bool(res)
            }
            Expr::Or(es) => {
                let mut res = false;
                for a in es {
                    res |= self.eval_bool(a, primed)?;
                }
                Val::Bool(res)
            }
            Expr::Imply(a, b) => {
                let a = self.eval_bool(a, primed)?;
                let b = self.eval_bool(b, primed)?;
                Val::Bool(!a || b)
            }
            Expr::Ite(c, t, f) => {
                let c = self.eval_bool(c, primed)?;
                let t = self.eval(t, primed)?;
                let f = self.eval(f, primed)?;
                match (t, f) {
                    (Val::Bool(t), Val::Bool(f)) => Val::Bool(if c { t } else { f }),
                    (Val::Int(t, wt), Val::Int(f, wf)) => Val::Int(if c { t } else { f }, wt.max(wf)),
                    _ => return Err(ExprError::SortMismatch(e.to_string())),
                }
            }

            Expr::Add(a, b) => {
                let (a, wa) = self.eval_int(a, primed)?;
                let (b, wb) = self.eval_int(b, primed)?;
                let w = wa.max(wb);
                Val::Int(wrap_signed(a.wrapping_add(b), w), w)
            }
            Expr::Sub(a, b) => {
                let (a, wa) = self.eval_int(a, primed)?;
                let (b, wb) = self.eval_int(b, primed)?;
                let w = wa.max(wb);
                Val::Int(wrap_signed(a.wrapping_sub(b), w), w)
            }
            Expr::Neg(a) => {
                let (a, w) = self.eval_int(a, primed)?;
                Val::Int(wrap_signed(a.wrapping_neg(), w), w)
            }

            Expr::Eq(a, b) => match (self.eval(a, primed)?, self.eval(b, primed)?) {
                (Val::Bool(a), Val::Bool(b)) => Val::Bool(a == b),
                (Val::Int(a, _), Val::Int(b, _)) => Val::Bool(a == b),
                _ => return Err(ExprError::SortMismatch(e.to_string())),
            },
            Expr::Lt(a, b) => {
                let (a, _) = self.eval_int(a, primed)?;
                let (b, _) = self.eval_int(b, primed)?;
                Val::Bool(a < b)
            }
            Expr::Le(a, b) => {
                let (a, _) = self.eval_int(a, primed)?;
                let (b, _) = self.eval_int(b, primed)?;
                Val::Bool(a <= b)
            }

            Expr::Bit(a, index) => {
                let (a, w) = self.eval_int(a, primed)?;
                if *index >= w {
                    return Err(ExprError::BitOutOfRange { index: *index, width: w });
                }
                Val::Bool((a >> index) & 1 == 1)
            }
        };
        Ok(res)
    }
}
