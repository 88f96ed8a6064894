//! Moving formulas between base variables and indexed symbols.
//!
//! ```
//! use bounded_rs::expr::Expr;
//! use bounded_rs::indexing::VarIndexing;
//! use bounded_rs::path::{fold, unfold};
//! use bounded_rs::types::Var;
//!
//! let x = Var::int("x", 8);
//! let trans = Expr::eq(Expr::prime(Expr::var(&x)), Expr::add(Expr::var(&x), Expr::int(1)));
//!
//! let index = VarIndexing::all(2);
//! let step = unfold(&trans, &index);
//! assert_eq!(step, Expr::eq(Expr::sym(&x, 3), Expr::add(Expr::sym(&x, 2), Expr::int(1))));
//! assert_eq!(fold(&step, &index).unwrap(), trans);
//! ```

use thiserror::Error;

use crate::expr::Expr;
use crate::indexing::VarIndexing;
use crate::types::{Symbol, Var};
use crate::valuation::{Model, Valuation};

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum PathError {
    #[error("cannot fold `{symbol}` to generation {target}")]
    BelowIndex { symbol: Symbol, target: u32 },

    #[error("model has no value for `{0}`")]
    MissingValue(Symbol),
}

/// Replaces every variable `x` by `x@I(x)` and every `x` under `n` primes by `x@(I(x)+n)`.
///
/// Symbols already present are left untouched.
pub fn unfold(expr: &Expr, index: &VarIndexing) -> Expr {
    unfold_(expr, index, 0)
}

fn unfold_(expr: &Expr, index: &VarIndexing, primes: u32) -> Expr {
    match expr {
        Expr::Var(var) => Expr::sym(var, index.get(var) + primes),
        Expr::Prime(inner) => unfold_(inner, index, primes + 1),
        e => match e.try_map_children(|c| Ok::<_, std::convert::Infallible>(unfold_(c, index, primes))) {
            Ok(res) => res,
            Err(never) => match never {},
        },
    }
}

/// Replaces every symbol `x@g` by `x` under `g - I(x)` primes.
pub fn fold(expr: &Expr, index: &VarIndexing) -> Result<Expr, PathError> {
    match expr {
        Expr::Sym(symbol) => {
            let var = symbol.var();
            let target = index.get(var);
            let g = symbol.generation();
            if g < target {
                return Err(PathError::BelowIndex {
                    symbol: symbol.clone(),
                    target,
                });
            }
            let mut res = Expr::var(var);
            for _ in target..g {
                res = Expr::prime(res);
            }
            Ok(res)
        }
        e => e.try_map_children(|c| fold(c, index)),
    }
}

/// Reads the values of `vars` at the generations given by `index`.
pub fn extract_valuation<'a>(
    model: &Model,
    index: &VarIndexing,
    vars: impl IntoIterator<Item = &'a Var>,
) -> Result<Valuation, PathError> {
    let mut valuation = Valuation::new();
    for var in vars {
        let symbol = Symbol::new(var.clone(), index.get(var));
        let value = model
            .get(&symbol)
            .ok_or_else(|| PathError::MissingValue(symbol.clone()))?;
        valuation.insert(var.clone(), value);
    }
    Ok(valuation)
}
