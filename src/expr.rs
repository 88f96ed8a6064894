//! Formulas over state variables.
//!
//! An [`Expr`] mentions either base variables ([`Expr::Var`], possibly under
//! [`Expr::Prime`]) or generation-tagged symbols ([`Expr::Sym`]). The former
//! describe a transition system, the latter are what solvers consume. See
//! [`path`][crate::path] for the conversions between the two.
//!
//! ## Integer widths
//!
//! Every integer subexpression has a width: a variable has its sort's width,
//! a literal the smallest signed width holding it, `add`/`sub`/`ite` the
//! maximum of their operands and `neg` the width of its operand. Arithmetic
//! wraps at that width. Comparisons sign-extend both operands and are exact.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::types::{Symbol, Var};

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Expr {
    Bool(bool),
    Int(i64),
    Var(Var),
    /// Next-state version of the inner expression.
    Prime(Box<Expr>),
    Sym(Symbol),

    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Imply(Box<Expr>, Box<Expr>),
    Ite(Box<Expr>, Box<Expr>, Box<Expr>),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),

    Eq(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),

    /// Bit `i` (0 is the least significant) of an integer expression.
    Bit(Box<Expr>, u32),
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ExprError {
    #[error("sort mismatch in `{0}`")]
    SortMismatch(String),

    #[error("variable `{0}` is not bound")]
    Unbound(Var),

    #[error("value of `{var}` does not fit its sort")]
    OutOfRange { var: Var },

    #[error("`{0}` must be unfolded before it can be handled here")]
    Unindexed(String),

    #[error("`{0}` is indexed and cannot be evaluated over a valuation")]
    Indexed(String),

    #[error("bit {index} out of range for width {width}")]
    BitOutOfRange { index: u32, width: u32 },
}

impl Expr {
    pub fn tt() -> Expr {
        Expr::Bool(true)
    }
    pub fn ff() -> Expr {
        Expr::Bool(false)
    }
    pub fn int(value: i64) -> Expr {
        Expr::Int(value)
    }
    pub fn var(var: &Var) -> Expr {
        Expr::Var(var.clone())
    }
    pub fn sym(var: &Var, generation: u32) -> Expr {
        Expr::Sym(Symbol::new(var.clone(), generation))
    }
    pub fn prime(e: Expr) -> Expr {
        Expr::Prime(Box::new(e))
    }

    pub fn not(e: Expr) -> Expr {
        match e {
            Expr::Bool(b) => Expr::Bool(!b),
            Expr::Not(inner) => *inner,
            e => Expr::Not(Box::new(e)),
        }
    }

    /// Conjunction. The empty conjunction is `true`.
    pub fn and(es: impl IntoIterator<Item = Expr>) -> Expr {
        let mut ops = Vec::new();
        for e in es {
            match e {
                Expr::Bool(true) => {}
                Expr::Bool(false) => return Expr::ff(),
                e => ops.push(e),
            }
        }
        match ops.len() {
            0 => Expr::tt(),
            1 => ops.pop().unwrap_or_else(Expr::tt),
            _ => Expr::And(ops),
        }
    }

    /// Disjunction. The empty disjunction is `false`.
    pub fn or(es: impl IntoIterator<Item = Expr>) -> Expr {
        let mut ops = Vec::new();
        for e in es {
            match e {
                Expr::Bool(false) => {}
                Expr::Bool(true) => return Expr::tt(),
                e => ops.push(e),
            }
        }
        match ops.len() {
            0 => Expr::ff(),
            1 => ops.pop().unwrap_or_else(Expr::ff),
            _ => Expr::Or(ops),
        }
    }

    pub fn imply(a: Expr, b: Expr) -> Expr {
        Expr::Imply(Box::new(a), Box::new(b))
    }
    pub fn iff(a: Expr, b: Expr) -> Expr {
        Expr::Eq(Box::new(a), Box::new(b))
    }
    pub fn ite(c: Expr, t: Expr, e: Expr) -> Expr {
        Expr::Ite(Box::new(c), Box::new(t), Box::new(e))
    }

    pub fn add(a: Expr, b: Expr) -> Expr {
        Expr::Add(Box::new(a), Box::new(b))
    }
    pub fn sub(a: Expr, b: Expr) -> Expr {
        Expr::Sub(Box::new(a), Box::new(b))
    }
    pub fn neg(a: Expr) -> Expr {
        Expr::Neg(Box::new(a))
    }

    pub fn eq(a: Expr, b: Expr) -> Expr {
        Expr::Eq(Box::new(a), Box::new(b))
    }
    pub fn neq(a: Expr, b: Expr) -> Expr {
        Expr::not(Expr::eq(a, b))
    }
    pub fn lt(a: Expr, b: Expr) -> Expr {
        Expr::Lt(Box::new(a), Box::new(b))
    }
    pub fn le(a: Expr, b: Expr) -> Expr {
        Expr::Le(Box::new(a), Box::new(b))
    }
    pub fn gt(a: Expr, b: Expr) -> Expr {
        Expr::lt(b, a)
    }
    pub fn ge(a: Expr, b: Expr) -> Expr {
        Expr::le(b, a)
    }

    pub fn bit(e: Expr, index: u32) -> Expr {
        Expr::Bit(Box::new(e), index)
    }
}

impl From<&Var> for Expr {
    fn from(var: &Var) -> Self {
        Expr::var(var)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Sym(symbol)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Bool(b)
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Expr::Int(v)
    }
}

impl Expr {
    /// Direct subexpressions, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Bool(_) | Expr::Int(_) | Expr::Var(_) | Expr::Sym(_) => vec![],
            Expr::Prime(e) | Expr::Not(e) | Expr::Neg(e) | Expr::Bit(e, _) => vec![e.as_ref()],
            Expr::And(es) | Expr::Or(es) => es.iter().collect(),
            Expr::Imply(a, b)
            | Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Eq(a, b)
            | Expr::Lt(a, b)
            | Expr::Le(a, b) => vec![a.as_ref(), b.as_ref()],
            Expr::Ite(c, t, e) => vec![c.as_ref(), t.as_ref(), e.as_ref()],
        }
    }

    /// Rebuilds this node with every direct subexpression replaced by `f(child)`.
    ///
    /// Leaves are cloned.
    pub fn try_map_children<E>(
        &self,
        mut f: impl FnMut(&Expr) -> Result<Expr, E>,
    ) -> Result<Expr, E> {
        let mut g = |e: &Expr| f(e).map(Box::new);
        Ok(match self {
            Expr::Bool(_) | Expr::Int(_) | Expr::Var(_) | Expr::Sym(_) => self.clone(),
            Expr::Prime(e) => Expr::Prime(g(e)?),
            Expr::Not(e) => Expr::Not(g(e)?),
            Expr::Neg(e) => Expr::Neg(g(e)?),
            Expr::Bit(e, i) => Expr::Bit(g(e)?, *i),
            Expr::And(es) => Expr::And(
                es.iter()
                    .map(|e| g(e).map(|b| *b))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::Or(es) => Expr::Or(
                es.iter()
                    .map(|e| g(e).map(|b| *b))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::Imply(a, b) => Expr::Imply(g(a)?, g(b)?),
            Expr::Add(a, b) => Expr::Add(g(a)?, g(b)?),
            Expr::Sub(a, b) => Expr::Sub(g(a)?, g(b)?),
            Expr::Eq(a, b) => Expr::Eq(g(a)?, g(b)?),
            Expr::Lt(a, b) => Expr::Lt(g(a)?, g(b)?),
            Expr::Le(a, b) => Expr::Le(g(a)?, g(b)?),
            Expr::Ite(c, t, e) => Expr::Ite(g(c)?, g(t)?, g(e)?),
        })
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Free base variables, primed or not.
    pub fn vars(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        self.visit(&mut |e| {
            if let Expr::Var(v) = e {
                vars.insert(v.clone());
            }
        });
        vars
    }

    /// Indexed symbols.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = BTreeSet::new();
        self.visit(&mut |e| {
            if let Expr::Sym(s) = e {
                symbols.insert(s.clone());
            }
        });
        symbols
    }

    /// Whether the formula mentions a base variable or a prime.
    pub fn is_unindexed(&self) -> bool {
        let mut found = false;
        self.visit(&mut |e| {
            if matches!(e, Expr::Var(_) | Expr::Prime(_)) {
                found = true;
            }
        });
        found
    }

    /// Number of nodes in the expression tree.
    pub fn size(&self) -> usize {
        let mut size = 0;
        self.visit(&mut |_| size += 1);
        size
    }
}

fn join(f: &mut fmt::Formatter<'_>, es: &[Expr], op: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, e) in es.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", op)?;
        }
        write!(f, "{}", e)?;
    }
    write!(f, ")")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Int(v) => write!(f, "{}", v),
            Expr::Var(v) => write!(f, "{}", v),
            Expr::Prime(e) => write!(f, "{}'", e),
            Expr::Sym(s) => write!(f, "{}", s),
            Expr::Not(e) => write!(f, "!{}", e),
            Expr::And(es) => join(f, es, "&&"),
            Expr::Or(es) => join(f, es, "||"),
            Expr::Imply(a, b) => write!(f, "({} -> {})", a, b),
            Expr::Ite(c, t, e) => write!(f, "ite({}, {}, {})", c, t, e),
            Expr::Add(a, b) => write!(f, "({} + {})", a, b),
            Expr::Sub(a, b) => write!(f, "({} - {})", a, b),
            Expr::Neg(e) => write!(f, "-{}", e),
            Expr::Eq(a, b) => write!(f, "({} == {})", a, b),
            Expr::Lt(a, b) => write!(f, "({} < {})", a, b),
            Expr::Le(a, b) => write!(f, "({} <= {})", a, b),
            Expr::Bit(e, i) => write!(f, "{}[{}]", e, i),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_and_or_simplify() {
        let x = Var::bool("x");
        assert_eq!(Expr::and([]), Expr::tt());
        assert_eq!(Expr::or([]), Expr::ff());
        assert_eq!(Expr::and([Expr::tt(), Expr::var(&x)]), Expr::var(&x));
        assert_eq!(Expr::and([Expr::var(&x), Expr::ff()]), Expr::ff());
        assert_eq!(Expr::or([Expr::var(&x), Expr::tt()]), Expr::tt());
        assert_eq!(Expr::not(Expr::not(Expr::var(&x))), Expr::var(&x));
    }

    #[test]
    fn test_vars_and_symbols() {
        let x = Var::int("x", 8);
        let y = Var::bool("y");
        let e = Expr::and([
            Expr::eq(Expr::prime(Expr::var(&x)), Expr::add(Expr::var(&x), Expr::int(1))),
            Expr::sym(&y, 2),
        ]);
        assert_eq!(e.vars(), BTreeSet::from([x.clone()]));
        assert_eq!(e.symbols(), BTreeSet::from([Symbol::new(y, 2)]));
        assert!(e.is_unindexed());
        assert!(!Expr::sym(&x, 0).is_unindexed());
    }

    #[test]
    fn test_display() {
        let x = Var::int("x", 8);
        let e = Expr::eq(Expr::prime(Expr::var(&x)), Expr::add(Expr::var(&x), Expr::int(1)));
        assert_eq!(e.to_string(), "(x' == (x + 1))");
        assert_eq!(Expr::bit(Expr::sym(&x, 1), 7).to_string(), "x@1[7]");
    }

    #[test]
    fn test_try_map_children() {
        let x = Var::int("x", 8);
        let e = Expr::lt(Expr::var(&x), Expr::int(5));
        let mapped = e
            .try_map_children(|c| match c {
                Expr::Var(v) => Ok::<_, ()>(Expr::sym(v, 3)),
                c => Ok(c.clone()),
            })
            .unwrap();
        assert_eq!(mapped, Expr::lt(Expr::sym(&x, 3), Expr::int(5)));
    }
}
