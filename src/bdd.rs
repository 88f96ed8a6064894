//! Reduced ordered BDDs with complement edges.
//!
//! This is the decision procedure behind [`BddSolver`][crate::solver::bdd::BddSolver].
//! Variables are 1-indexed `u32`s, smaller indices sit closer to the root, and
//! negation is a sign flip on the [`Ref`] handle. The high edge of a stored
//! node is never complemented, which keeps the representation canonical.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use log::debug;

use crate::cache::Cache;
use crate::reference::Ref;
use crate::table::Table;
use crate::utils::{triple, SlotHash};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Node {
    variable: u32,
    low: Ref,
    high: Ref,
}

/// The terminal node, stored at index 1.
impl Default for Node {
    fn default() -> Self {
        Node {
            variable: 0,
            low: Ref::INVALID,
            high: Ref::INVALID,
        }
    }
}

impl SlotHash for Node {
    fn slot_hash(&self) -> u64 {
        triple(self.variable as u64, self.low.unsigned() as u64, self.high.unsigned() as u64)
    }
}

/// Normalized arguments of an ITE call: `f` and `g` are regular.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct IteKey(Ref, Ref, Ref);

impl SlotHash for IteKey {
    fn slot_hash(&self) -> u64 {
        triple(self.0.unsigned() as u64, self.1.unsigned() as u64, self.2.unsigned() as u64)
    }
}

pub struct Bdd {
    nodes: RefCell<Table<Node>>,
    ite_cache: RefCell<Cache<IteKey, Ref>>,
    pub zero: Ref,
    pub one: Ref,
}

impl Bdd {
    /// A manager with room for `2^storage_bits` nodes before it has to grow.
    pub fn new(storage_bits: usize) -> Self {
        let mut nodes = Table::new(storage_bits);
        let terminal = nodes.add(Node::default());
        debug_assert_eq!(terminal, 1);
        let one = Ref::positive(terminal as u32);

        Bdd {
            nodes: RefCell::new(nodes),
            ite_cache: RefCell::new(Cache::new(storage_bits.min(16))),
            zero: -one,
            one,
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new(16)
    }
}

impl fmt::Debug for Bdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.ite_cache.borrow();
        f.debug_struct("Bdd")
            .field("nodes", &self.num_nodes())
            .field("cache_hits", &cache.hits())
            .field("cache_misses", &cache.misses())
            .finish()
    }
}

impl Bdd {
    /// Number of stored nodes, the terminal included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().size()
    }

    fn node(&self, index: usize) -> Node {
        *self.nodes.borrow().get(index)
    }

    pub fn variable(&self, index: usize) -> u32 {
        self.node(index).variable
    }
    pub fn low(&self, index: usize) -> Ref {
        self.node(index).low
    }
    pub fn high(&self, index: usize) -> Ref {
        self.node(index).high
    }

    /// Else-child of `f`, with the complement of `f` pushed down.
    pub fn low_node(&self, f: Ref) -> Ref {
        let low = self.low(f.index());
        if f.is_negated() {
            -low
        } else {
            low
        }
    }
    /// Then-child of `f`, with the complement of `f` pushed down.
    pub fn high_node(&self, f: Ref) -> Ref {
        let high = self.high(f.index());
        if f.is_negated() {
            -high
        } else {
            high
        }
    }

    pub fn is_zero(&self, f: Ref) -> bool {
        f == self.zero
    }
    pub fn is_one(&self, f: Ref) -> bool {
        f == self.one
    }
    fn is_const(&self, f: Ref) -> bool {
        f.index() == self.one.index()
    }

    pub fn mk_node(&self, v: u32, low: Ref, high: Ref) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");
        if low == high {
            return low;
        }
        if high.is_negated() {
            return -self.mk_node(v, -low, -high);
        }
        let index = self.nodes.borrow_mut().put(Node { variable: v, low, high });
        Ref::positive(index as u32)
    }

    pub fn mk_var(&self, v: u32) -> Ref {
        self.mk_node(v, self.zero, self.one)
    }

    /// Conjunction of DIMACS-style literals.
    pub fn cube(&self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut literals: Vec<i32> = literals.into_iter().collect();
        // Built bottom-up, so the deepest variable goes first.
        literals.sort_by_key(|lit| std::cmp::Reverse(lit.unsigned_abs()));
        literals.into_iter().fold(self.one, |acc, lit| {
            assert_ne!(lit, 0, "Variable index should not be zero");
            let v = lit.unsigned_abs();
            if lit > 0 {
                self.mk_node(v, self.zero, acc)
            } else {
                self.mk_node(v, acc, self.zero)
            }
        })
    }

    /// `(f|v=0, f|v=1)` for a `v` at or above the root of `f`.
    fn cofactors(&self, f: Ref, v: u32) -> (Ref, Ref) {
        if self.is_const(f) || self.variable(f.index()) != v {
            (f, f)
        } else {
            (self.low_node(f), self.high_node(f))
        }
    }

    /// If-then-else: `(f ∧ g) ∨ (¬f ∧ h)`.
    ///
    /// Every binary operation of the manager is an instance of this one.
    ///
    /// # Examples
    ///
    /// ```
    /// use bounded_rs::bdd::Bdd;
    ///
    /// let bdd = Bdd::default();
    /// let x = bdd.mk_var(1);
    /// let y = bdd.mk_var(2);
    /// let z = bdd.mk_var(3);
    /// let f = bdd.apply_ite(x, y, z);
    /// assert_eq!(f, bdd.apply_or(bdd.apply_and(x, y), bdd.apply_and(-x, z)));
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }

        // Inside the branches, f is known.
        let g = if g == f {
            self.one
        } else if g == -f {
            self.zero
        } else {
            g
        };
        let h = if h == f {
            self.zero
        } else if h == -f {
            self.one
        } else {
            h
        };

        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }

        // ite(¬f, g, h) = ite(f, h, g) and ite(f, ¬g, h) = ¬ite(f, g, ¬h).
        let (f, g, h) = if f.is_negated() { (-f, h, g) } else { (f, g, h) };
        let (g, h, flip) = if g.is_negated() { (-g, -h, true) } else { (g, h, false) };

        let key = IteKey(f, g, h);
        let cached = self.ite_cache.borrow().get(&key).copied();
        let res = match cached {
            Some(res) => res,
            None => {
                let top = [f, g, h]
                    .into_iter()
                    .filter(|&r| !self.is_const(r))
                    .map(|r| self.variable(r.index()))
                    .min()
                    .unwrap_or(0);
                let (f0, f1) = self.cofactors(f, top);
                let (g0, g1) = self.cofactors(g, top);
                let (h0, h1) = self.cofactors(h, top);
                let low = self.apply_ite(f0, g0, h0);
                let high = self.apply_ite(f1, g1, h1);
                let res = self.mk_node(top, low, high);
                self.ite_cache.borrow_mut().insert(key, res);
                res
            }
        };

        if flip {
            -res
        } else {
            res
        }
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.zero)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, self.one, v)
    }

    pub fn apply_xor(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, -v, v)
    }

    pub fn apply_eq(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, -v)
    }

    pub fn apply_imply(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.one)
    }

    /// Conjunction of all `nodes`, stopping early at zero.
    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.one;
        for node in nodes {
            res = self.apply_and(res, node);
            if self.is_zero(res) {
                break;
            }
        }
        res
    }

    /// `∃ vars. f`
    pub fn exists(&self, f: Ref, vars: &BTreeSet<u32>) -> Ref {
        debug!("exists(f = {}, vars = {:?})", f, vars);
        match vars.last() {
            Some(&deepest) => self.exists_rec(f, vars, deepest, &mut HashMap::new()),
            None => f,
        }
    }

    fn exists_rec(&self, f: Ref, vars: &BTreeSet<u32>, deepest: u32, memo: &mut HashMap<Ref, Ref>) -> Ref {
        // Below the deepest quantified variable there is nothing left to do.
        if self.is_const(f) || self.variable(f.index()) > deepest {
            return f;
        }
        if let Some(&res) = memo.get(&f) {
            return res;
        }

        let v = self.variable(f.index());
        let low = self.exists_rec(self.low_node(f), vars, deepest, memo);
        let high = self.exists_rec(self.high_node(f), vars, deepest, memo);
        let res = if vars.contains(&v) {
            self.apply_or(low, high)
        } else {
            self.mk_node(v, low, high)
        };
        memo.insert(f, res);
        res
    }

    /// Indices of the nodes reachable from `f`, the terminal included.
    fn reachable(&self, f: Ref) -> HashSet<usize> {
        let mut seen = HashSet::new();
        let mut stack = vec![f.index()];
        while let Some(i) = stack.pop() {
            if !seen.insert(i) || i == self.one.index() {
                continue;
            }
            let node = self.node(i);
            stack.push(node.low.index());
            stack.push(node.high.index());
        }
        seen
    }

    /// Variables `f` depends on.
    pub fn support(&self, f: Ref) -> BTreeSet<u32> {
        self.reachable(f)
            .into_iter()
            .filter(|&i| i != self.one.index())
            .map(|i| self.variable(i))
            .collect()
    }

    /// Number of nodes in `f`, the terminal included.
    pub fn size(&self, f: Ref) -> usize {
        self.reachable(f).len()
    }
}
