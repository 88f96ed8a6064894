//! Bit-blasting of indexed formulas into BDDs, and back.
//!
//! Integers are little-endian vectors of BDD functions (bit 0 first). Widths
//! follow the rules documented in [`expr`][crate::expr], so the encoding
//! agrees with [`eval`][crate::eval::eval] on every assignment.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::bdd::Bdd;
use crate::expr::{Expr, ExprError};
use crate::reference::Ref;
use crate::solver::SolverError;
use crate::types::{signed_width, wrap_signed, Sort, Symbol, Value};

/// BDD variables allocated to indexed symbols, in order of first use.
#[derive(Debug, Default)]
pub struct SymbolTable {
    bits: BTreeMap<Symbol, Vec<u32>>,
    owners: Vec<(Symbol, u32)>,
}

impl SymbolTable {
    /// Number of allocated BDD variables.
    pub fn num_vars(&self) -> usize {
        self.owners.len()
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&[u32]> {
        self.bits.get(symbol).map(|bits| bits.as_slice())
    }

    /// BDD variables of `symbol`, allocating them on first use.
    pub fn bits(&mut self, symbol: &Symbol) -> Vec<u32> {
        if let Some(bits) = self.bits.get(symbol) {
            return bits.clone();
        }
        let n = symbol.sort().bits();
        let start = self.owners.len() as u32 + 1;
        let bits: Vec<u32> = (start..start + n).collect();
        for i in 0..n {
            self.owners.push((symbol.clone(), i));
        }
        debug!("allocated {} for {}", describe(&bits), symbol);
        self.bits.insert(symbol.clone(), bits.clone());
        bits
    }

    /// The symbol and bit position a BDD variable encodes.
    pub fn owner(&self, v: u32) -> Option<&(Symbol, u32)> {
        self.owners.get((v as usize).checked_sub(1)?)
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&Symbol, &[u32])> + '_ {
        self.bits.iter().map(|(s, bits)| (s, bits.as_slice()))
    }

    /// Value of `symbol` under a (partial) assignment of BDD variables.
    ///
    /// Unassigned bits are taken as false.
    pub fn decode(&self, symbol: &Symbol, assignment: &HashMap<u32, bool>) -> Option<Value> {
        let bits = self.bits.get(symbol)?;
        let bit = |v: &u32| assignment.get(v).copied().unwrap_or(false);
        Some(match symbol.sort() {
            Sort::Bool => Value::Bool(bit(&bits[0])),
            Sort::Int { bits: width } => {
                let raw = bits
                    .iter()
                    .enumerate()
                    .fold(0i64, |acc, (i, v)| if bit(v) { acc | (1 << i) } else { acc });
                Value::Int(wrap_signed(raw, width))
            }
        })
    }
}

fn describe(bits: &[u32]) -> String {
    match (bits.first(), bits.last()) {
        (Some(first), Some(last)) if first != last => format!("x{}..x{}", first, last),
        (Some(first), _) => format!("x{}", first),
        _ => "nothing".to_string(),
    }
}

enum Term {
    Bool(Ref),
    Int(Vec<Ref>),
}

pub struct Blaster<'a> {
    bdd: &'a Bdd,
    symbols: &'a mut SymbolTable,
}

impl<'a> Blaster<'a> {
    pub fn new(bdd: &'a Bdd, symbols: &'a mut SymbolTable) -> Self {
        Blaster { bdd, symbols }
    }

    pub fn encode_bool(&mut self, e: &Expr) -> Result<Ref, ExprError> {
        match self.encode(e)? {
            Term::Bool(f) => Ok(f),
            Term::Int(_) => Err(ExprError::SortMismatch(e.to_string())),
        }
    }

    fn encode_int(&mut self, e: &Expr) -> Result<Vec<Ref>, ExprError> {
        match self.encode(e)? {
            Term::Int(bits) => Ok(bits),
            Term::Bool(_) => Err(ExprError::SortMismatch(e.to_string())),
        }
    }

    fn encode(&mut self, e: &Expr) -> Result<Term, ExprError> {
        let bdd = self.bdd;
        let res = match e {
            Expr::Bool(b) => Term::Bool(if *b { bdd.one } else { bdd.zero }),
            Expr::Int(v) => Term::Int(self.constant(*v, signed_width(*v))),
            Expr::Var(_) | Expr::Prime(_) => return Err(ExprError::Unindexed(e.to_string())),
            Expr::Sym(symbol) => {
                let bits = self.symbols.bits(symbol);
                let fs = bits.into_iter().map(|v| bdd.mk_var(v)).collect::<Vec<_>>();
                match symbol.sort() {
                    Sort::Bool => Term::Bool(fs[0]),
                    Sort::Int { .. } => Term::Int(fs),
                }
            }

            Expr::Not(a) => Term::Bool(-self.encode_bool(a)?),
            Expr::And(es) => {
                let mut res = bdd.one;
                for a in es {
                    let f = self.encode_bool(a)?;
                    res = bdd.apply_and(res, f);
                }
                Term::Bool(res)
            }
            Expr::Or(es) => {
                let mut res = bdd.zero;
                for a in es {
                    let f = self.encode_bool(a)?;
                    res = bdd.apply_or(res, f);
                }
                Term::Bool(res)
            }
            Expr::Imply(a, b) => {
                let a = self.encode_bool(a)?;
                let b = self.encode_bool(b)?;
                Term::Bool(bdd.apply_imply(a, b))
            }
            Expr::Ite(c, t, f) => {
                let c = self.encode_bool(c)?;
                match (self.encode(t)?, self.encode(f)?) {
                    (Term::Bool(t), Term::Bool(f)) => Term::Bool(bdd.apply_ite(c, t, f)),
                    (Term::Int(t), Term::Int(f)) => {
                        let w = t.len().max(f.len());
                        let t = sign_extend(&t, w);
                        let f = sign_extend(&f, w);
                        Term::Int(t.iter().zip(&f).map(|(&t, &f)| bdd.apply_ite(c, t, f)).collect())
                    }
                    _ => return Err(ExprError::SortMismatch(e.to_string())),
                }
            }

            Expr::Add(a, b) => {
                let (a, b) = self.operands(a, b)?;
                Term::Int(self.adder(&a, &b, bdd.zero))
            }
            Expr::Sub(a, b) => {
                let (a, b) = self.operands(a, b)?;
                let not_b = b.iter().map(|&f| -f).collect::<Vec<_>>();
                Term::Int(self.adder(&a, &not_b, bdd.one))
            }
            Expr::Neg(a) => {
                let a = self.encode_int(a)?;
                let zero = vec![bdd.zero; a.len()];
                let not_a = a.iter().map(|&f| -f).collect::<Vec<_>>();
                Term::Int(self.adder(&zero, &not_a, bdd.one))
            }

            Expr::Eq(a, b) => match (self.encode(a)?, self.encode(b)?) {
                (Term::Bool(a), Term::Bool(b)) => Term::Bool(bdd.apply_eq(a, b)),
                (Term::Int(a), Term::Int(b)) => {
                    let w = a.len().max(b.len());
                    let a = sign_extend(&a, w);
                    let b = sign_extend(&b, w);
                    Term::Bool(bdd.apply_and_many(a.iter().zip(&b).map(|(&a, &b)| bdd.apply_eq(a, b))))
                }
                _ => return Err(ExprError::SortMismatch(e.to_string())),
            },
            Expr::Lt(a, b) => {
                let (a, b) = self.operands(a, b)?;
                Term::Bool(self.signed_less(&a, &b))
            }
            Expr::Le(a, b) => {
                let (a, b) = self.operands(a, b)?;
                Term::Bool(-self.signed_less(&b, &a))
            }

            Expr::Bit(a, index) => {
                let a = self.encode_int(a)?;
                match a.get(*index as usize) {
                    Some(&f) => Term::Bool(f),
                    None => {
                        return Err(ExprError::BitOutOfRange {
                            index: *index,
                            width: a.len() as u32,
                        })
                    }
                }
            }
        };
        Ok(res)
    }

    /// Both operands, sign-extended to the wider width.
    fn operands(&mut self, a: &Expr, b: &Expr) -> Result<(Vec<Ref>, Vec<Ref>), ExprError> {
        let a = self.encode_int(a)?;
        let b = self.encode_int(b)?;
        let w = a.len().max(b.len());
        Ok((sign_extend(&a, w), sign_extend(&b, w)))
    }

    fn constant(&self, value: i64, width: u32) -> Vec<Ref> {
        (0..width)
            .map(|i| {
                if (value >> i) & 1 == 1 {
                    self.bdd.one
                } else {
                    self.bdd.zero
                }
            })
            .collect()
    }

    /// Ripple-carry adder; the carry out of the top bit is dropped.
    fn adder(&self, a: &[Ref], b: &[Ref], carry_in: Ref) -> Vec<Ref> {
        assert_eq!(a.len(), b.len());
        let bdd = self.bdd;
        let mut carry = carry_in;
        let mut sum = Vec::with_capacity(a.len());
        for (&x, &y) in a.iter().zip(b) {
            let x_xor_y = bdd.apply_xor(x, y);
            sum.push(bdd.apply_xor(x_xor_y, carry));
            carry = bdd.apply_or(bdd.apply_and(x, y), bdd.apply_and(carry, x_xor_y));
        }
        sum
    }

    /// Two's complement `a < b`: unsigned comparison with the sign bits flipped.
    fn signed_less(&self, a: &[Ref], b: &[Ref]) -> Ref {
        assert_eq!(a.len(), b.len());
        let bdd = self.bdd;
        let top = a.len() - 1;
        let mut less = bdd.zero;
        for i in 0..a.len() {
            let (x, y) = if i == top { (-a[i], -b[i]) } else { (a[i], b[i]) };
            // The most significant differing bit decides.
            less = bdd.apply_ite(bdd.apply_xor(x, y), y, less);
        }
        less
    }
}

fn sign_extend(bits: &[Ref], width: usize) -> Vec<Ref> {
    let mut res = bits.to_vec();
    if let Some(&sign) = bits.last() {
        res.resize(width.max(bits.len()), sign);
    }
    res
}

/// Converts a BDD back to a formula over the symbols in `symbols`.
///
/// Fails with [`SolverError::ForeignVariable`] when `f` depends on a BDD
/// variable that no symbol was blasted into.
pub fn to_expr(bdd: &Bdd, symbols: &SymbolTable, f: Ref) -> Result<Expr, SolverError> {
    let mut cache = HashMap::new();
    to_expr_(bdd, symbols, f, &mut cache)
}

fn to_expr_(bdd: &Bdd, symbols: &SymbolTable, f: Ref, cache: &mut HashMap<Ref, Expr>) -> Result<Expr, SolverError> {
    if bdd.is_one(f) {
        return Ok(Expr::tt());
    }
    if bdd.is_zero(f) {
        return Ok(Expr::ff());
    }
    if f.is_negated() {
        return Ok(Expr::not(to_expr_(bdd, symbols, -f, cache)?));
    }
    if let Some(e) = cache.get(&f) {
        return Ok(e.clone());
    }

    let v = bdd.variable(f.index());
    let lit = match symbols.owner(v) {
        Some((symbol, _)) if symbol.sort().is_bool() => Expr::Sym(symbol.clone()),
        Some((symbol, bit)) => Expr::bit(Expr::Sym(symbol.clone()), *bit),
        None => return Err(SolverError::ForeignVariable(v)),
    };

    let low = bdd.low_node(f);
    let high = bdd.high_node(f);
    let res = if bdd.is_zero(low) && bdd.is_one(high) {
        lit
    } else if bdd.is_one(low) && bdd.is_zero(high) {
        Expr::not(lit)
    } else if bdd.is_zero(low) {
        Expr::and([lit, to_expr_(bdd, symbols, high, cache)?])
    } else if bdd.is_zero(high) {
        Expr::and([Expr::not(lit), to_expr_(bdd, symbols, low, cache)?])
    } else if bdd.is_one(high) {
        Expr::or([lit, to_expr_(bdd, symbols, low, cache)?])
    } else if bdd.is_one(low) {
        Expr::or([Expr::not(lit), to_expr_(bdd, symbols, high, cache)?])
    } else {
        let high = to_expr_(bdd, symbols, high, cache)?;
        let low = to_expr_(bdd, symbols, low, cache)?;
        Expr::ite(lit, high, low)
    };

    cache.insert(f, res.clone());
    Ok(res)
}
