use std::collections::BTreeMap;
use std::fmt;

use crate::types::Var;

/// Generation counter of every variable.
///
/// Variables that are not mentioned explicitly share the `default` generation.
/// The representation is normalized (no explicit entry equals the default), so
/// structural equality is equality of the mappings.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct VarIndexing {
    default: u32,
    generations: BTreeMap<Var, u32>,
}

impl VarIndexing {
    /// Every variable at generation 0.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Every variable at generation `n`.
    pub fn all(n: u32) -> Self {
        VarIndexing {
            default: n,
            generations: BTreeMap::new(),
        }
    }

    /// Returns a copy with `var` at generation `n`.
    pub fn with(mut self, var: &Var, n: u32) -> Self {
        if n == self.default {
            self.generations.remove(var);
        } else {
            self.generations.insert(var.clone(), n);
        }
        self
    }

    pub fn get(&self, var: &Var) -> u32 {
        self.generations.get(var).copied().unwrap_or(self.default)
    }

    /// Pointwise sum.
    pub fn add(&self, offset: &VarIndexing) -> VarIndexing {
        let mut res = VarIndexing::all(self.default + offset.default);
        for var in self.generations.keys().chain(offset.generations.keys()) {
            let n = self.get(var) + offset.get(var);
            res = res.with(var, n);
        }
        res
    }

    /// Whether every generation is at most the corresponding one in `other`.
    pub fn le(&self, other: &VarIndexing) -> bool {
        self.default <= other.default
            && self
                .generations
                .keys()
                .chain(other.generations.keys())
                .all(|var| self.get(var) <= other.get(var))
    }
}

impl fmt::Display for VarIndexing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (var, n) in &self.generations {
            write!(f, "{}:{}, ", var, n)?;
        }
        write!(f, "_:{}]", self.default)
    }
}
